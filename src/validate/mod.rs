//! The probe itself: resolve the domain's first mail exchanger, open a
//! session on port 25 and walk `HELO`, `MAIL FROM`, `RCPT TO`.
//!
//! The first failing step decides the outcome, except that the session is
//! always closed afterwards and a failed close replaces whatever came before.

mod options;

pub use options::{DEFAULT_HELO_NAME, DEFAULT_MAIL_FROM, ProbeOptions, SMTP_PORT};

use crate::address::domain_of;
use crate::error::ValidationError;
use crate::mx::{LookupMx, SystemResolver, resolve_exchanger};
use crate::smtp::{Connector, ProbeSession, TcpConnector};

/// `Ok(())` when the exchanger accepted the recipient, otherwise the error of
/// the stage that decided the outcome.
pub type ValidationOutcome = Result<(), ValidationError>;

/// Probes `email` with the system resolver, a TCP connector and default options.
pub fn validate_host(email: &str) -> ValidationOutcome {
    validate_host_with_options(email, &ProbeOptions::default())
}

/// Same as [`validate_host`], with explicit [`ProbeOptions`].
pub fn validate_host_with_options(email: &str, options: &ProbeOptions) -> ValidationOutcome {
    Validator::system(options.clone())?.validate_host(email)
}

/// Runs the probe against injected collaborators.
///
/// Holds no per-call state, so one validator can serve concurrent calls when
/// `R` and `C` allow it.
#[derive(Debug)]
pub struct Validator<R, C> {
    resolver: R,
    connector: C,
    options: ProbeOptions,
}

impl Validator<SystemResolver, TcpConnector> {
    pub fn system(options: ProbeOptions) -> Result<Self, ValidationError> {
        let resolver = SystemResolver::from_system_conf()?;
        let connector = TcpConnector::from_options(&options);
        Ok(Self::new(resolver, connector, options))
    }
}

impl<R: LookupMx, C: Connector> Validator<R, C> {
    pub fn new(resolver: R, connector: C, options: ProbeOptions) -> Self {
        Self {
            resolver,
            connector,
            options,
        }
    }

    #[cfg_attr(feature = "with-tracing", tracing::instrument(level = "debug", skip(self)))]
    pub fn validate_host(&self, email: &str) -> ValidationOutcome {
        let exchanger = resolve_exchanger(&self.resolver, domain_of(email))?;
        let session = self
            .connector
            .connect(&exchanger.target(self.options.port))?;
        #[cfg(feature = "with-tracing")]
        tracing::debug!(exchanger = %exchanger.exchange, "session opened");

        ScopedSession::new(session).run(|session| {
            session.hello(&self.options.helo_name)?;
            session.mail(&self.options.mail_from)?;
            session.rcpt(email)
        })
    }
}

/// Owns a session for the length of the handshake and closes it exactly once,
/// on the normal path through [`ScopedSession::run`] or on unwind through `Drop`.
struct ScopedSession<S: ProbeSession> {
    session: Option<S>,
}

impl<S: ProbeSession> ScopedSession<S> {
    fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn run<F>(mut self, steps: F) -> ValidationOutcome
    where
        F: FnOnce(&mut S) -> ValidationOutcome,
    {
        let pending = self.session.as_mut().map_or(Ok(()), steps);
        let closed = self.session.take().map_or(Ok(()), S::close);
        closed.and(pending)
    }
}

impl<S: ProbeSession> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.close();
        }
    }
}
