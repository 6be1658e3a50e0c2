use std::fmt;
use std::io;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

use crate::smtp::SmtpReply;

/// Pipeline stage that produced a [`ValidationError`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolution,
    Connection,
    Handshake,
    Sender,
    Recipient,
    Close,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Connection => "connection",
            Self::Handshake => "handshake",
            Self::Sender => "sender",
            Self::Recipient => "recipient",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single SMTP step failed.
#[derive(Debug, Error)]
pub enum SmtpFailure {
    #[error("server replied {0}")]
    Reply(SmtpReply),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmtpFailure {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Reply(reply) => Some(reply),
            _ => None,
        }
    }
}

/// Errors reported by [`validate_host`](crate::validate_host).
///
/// Every variant belongs to exactly one [`Stage`]; the first failing stage
/// is reported, except that a failed close always wins.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("domain {domain:?} cannot be looked up: {reason}")]
    InvalidDomain { domain: String, reason: String },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: io::Error,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
    #[error("no mail exchanger found for {domain}")]
    NoMailExchanger { domain: String },
    #[error("connection to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: SmtpFailure,
    },
    #[error("greeting rejected: {source}")]
    Handshake {
        #[source]
        source: SmtpFailure,
    },
    #[error("sender rejected: {source}")]
    SenderRejected {
        #[source]
        source: SmtpFailure,
    },
    #[error("recipient rejected: {source}")]
    RecipientRejected {
        #[source]
        source: SmtpFailure,
    },
    #[error("session close failed: {source}")]
    Close {
        #[source]
        source: SmtpFailure,
    },
}

impl ValidationError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidDomain { .. }
            | Self::ResolverInit { .. }
            | Self::Lookup { .. }
            | Self::NoMailExchanger { .. } => Stage::Resolution,
            Self::Connect { .. } => Stage::Connection,
            Self::Handshake { .. } => Stage::Handshake,
            Self::SenderRejected { .. } => Stage::Sender,
            Self::RecipientRejected { .. } => Stage::Recipient,
            Self::Close { .. } => Stage::Close,
        }
    }

    /// The SMTP reply behind the failure, when the server answered.
    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Connect { source, .. }
            | Self::Handshake { source }
            | Self::SenderRejected { source }
            | Self::RecipientRejected { source }
            | Self::Close { source } => source.reply(),
            _ => None,
        }
    }

    pub(crate) fn invalid_domain(domain: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDomain {
            domain: domain.to_string(),
            reason: reason.into(),
        }
    }

    pub fn connect(address: &str, source: impl Into<SmtpFailure>) -> Self {
        Self::Connect {
            address: address.to_string(),
            source: source.into(),
        }
    }

    pub fn handshake(source: impl Into<SmtpFailure>) -> Self {
        Self::Handshake {
            source: source.into(),
        }
    }

    pub fn sender_rejected(source: impl Into<SmtpFailure>) -> Self {
        Self::SenderRejected {
            source: source.into(),
        }
    }

    pub fn recipient_rejected(source: impl Into<SmtpFailure>) -> Self {
        Self::RecipientRejected {
            source: source.into(),
        }
    }

    pub fn close(source: impl Into<SmtpFailure>) -> Self {
        Self::Close {
            source: source.into(),
        }
    }
}

impl From<SmtpReply> for SmtpFailure {
    fn from(reply: SmtpReply) -> Self {
        Self::Reply(reply)
    }
}
