use std::io::{Read, Write};

use super::SmtpReply;
use super::stream::SmtpStream;
use crate::error::{SmtpFailure, ValidationError};

/// The handshake operations the validator drives, in order.
///
/// Each method reports its failure already classified into the matching
/// [`ValidationError`] variant. `close` consumes the session, so nothing can
/// be issued once it has run.
pub trait ProbeSession {
    fn hello(&mut self, local_name: &str) -> Result<(), ValidationError>;
    fn mail(&mut self, from: &str) -> Result<(), ValidationError>;
    fn rcpt(&mut self, to: &str) -> Result<(), ValidationError>;
    fn close(self) -> Result<(), ValidationError>
    where
        Self: Sized;
}

/// Progress of a live [`SmtpSession`].
///
/// A session only exists once connected and stops existing once closed, so
/// those two ends of the lifecycle have no variant here.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Greeted,
    SenderDeclared,
    RecipientDeclared,
}

/// Minimal SMTP client over a byte stream, enough to walk EHLO, MAIL FROM and
/// RCPT TO, then QUIT.
#[derive(Debug)]
pub struct SmtpSession<S> {
    stream: SmtpStream<S>,
    state: SessionState,
    greeting: SmtpReply,
    capabilities: Vec<String>,
}

impl<S: Read + Write> SmtpSession<S> {
    /// Wraps an established stream and reads the server greeting, which must be `220`.
    pub fn open(inner: S) -> Result<Self, SmtpFailure> {
        let mut stream = SmtpStream::new(inner);
        let greeting = stream.read_reply()?;
        if greeting.code != 220 {
            return Err(SmtpFailure::Reply(greeting));
        }
        Ok(Self {
            stream,
            state: SessionState::Connected,
            greeting,
            capabilities: Vec::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn greeting(&self) -> &SmtpReply {
        &self.greeting
    }

    /// Whether the EHLO answer advertised `keyword`. Always false after a HELO fallback.
    pub fn has_capability(&self, keyword: &str) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.eq_ignore_ascii_case(keyword))
    }

    fn command(&mut self, line: &str) -> Result<SmtpReply, SmtpFailure> {
        self.stream.send_command(line)?;
        self.stream.read_reply()
    }

    fn require(&self, allowed: &[SessionState], op: &str) -> Result<(), SmtpFailure> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SmtpFailure::protocol(format!(
                "{op} not allowed in state {:?}",
                self.state
            )))
        }
    }

    fn greet(&mut self, local_name: &str) -> Result<(), SmtpFailure> {
        self.require(&[SessionState::Connected], "HELO")?;
        check_line(local_name)?;

        let ehlo = self.command(&format!("EHLO {local_name}"))?;
        if ehlo.code == 250 {
            self.capabilities = ehlo
                .lines()
                .skip(1)
                .filter_map(|line| line.split_whitespace().next())
                .map(str::to_ascii_uppercase)
                .collect();
        } else {
            #[cfg(feature = "with-tracing")]
            tracing::debug!(code = ehlo.code, "EHLO refused, retrying with HELO");
            let helo = self.command(&format!("HELO {local_name}"))?;
            if helo.code != 250 {
                return Err(SmtpFailure::Reply(helo));
            }
        }
        self.state = SessionState::Greeted;
        Ok(())
    }

    fn declare_sender(&mut self, from: &str) -> Result<(), SmtpFailure> {
        self.require(&[SessionState::Greeted], "MAIL")?;
        check_line(from)?;

        let reply = self.command(&format!("MAIL FROM:<{from}>"))?;
        if reply.code != 250 {
            return Err(SmtpFailure::Reply(reply));
        }
        self.state = SessionState::SenderDeclared;
        Ok(())
    }

    fn declare_recipient(&mut self, to: &str) -> Result<(), SmtpFailure> {
        self.require(
            &[SessionState::SenderDeclared, SessionState::RecipientDeclared],
            "RCPT",
        )?;
        check_line(to)?;

        let reply = self.command(&format!("RCPT TO:<{to}>"))?;
        // 251 forwards and 252 cannot verify but will try; both accept
        if reply.code / 10 != 25 {
            return Err(SmtpFailure::Reply(reply));
        }
        self.state = SessionState::RecipientDeclared;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), SmtpFailure> {
        let reply = self.command("QUIT")?;
        if !reply.is_positive_completion() {
            return Err(SmtpFailure::Reply(reply));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn stream_ref(&self) -> &S {
        self.stream.get_ref()
    }
}

impl<S: Read + Write> ProbeSession for SmtpSession<S> {
    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    fn hello(&mut self, local_name: &str) -> Result<(), ValidationError> {
        self.greet(local_name).map_err(ValidationError::handshake)
    }

    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    fn mail(&mut self, from: &str) -> Result<(), ValidationError> {
        self.declare_sender(from)
            .map_err(ValidationError::sender_rejected)
    }

    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    fn rcpt(&mut self, to: &str) -> Result<(), ValidationError> {
        self.declare_recipient(to)
            .map_err(ValidationError::recipient_rejected)
    }

    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    fn close(mut self) -> Result<(), ValidationError> {
        self.quit().map_err(ValidationError::close)
    }
}

/// Command arguments end up on a single protocol line.
fn check_line(value: &str) -> Result<(), SmtpFailure> {
    if value.contains(['\r', '\n']) {
        Err(SmtpFailure::protocol(format!(
            "argument contains CR or LF: {value:?}"
        )))
    } else {
        Ok(())
    }
}
