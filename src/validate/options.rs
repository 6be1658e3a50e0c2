use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Identity announced in `HELO`/`EHLO` unless overridden.
pub const DEFAULT_HELO_NAME: &str = "checkmail.me";
/// Envelope sender used for the probe unless overridden.
pub const DEFAULT_MAIL_FROM: &str = "testing-email-host@gmail.com";
pub const SMTP_PORT: u16 = 25;

/// Configuration knobs for [`Validator`](crate::Validator).
///
/// Timeouts are only applied by [`TcpConnector`](crate::TcpConnector); a value
/// of zero disables the corresponding deadline.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub helo_name: String,
    pub mail_from: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub command_timeout_ms: u64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            helo_name: DEFAULT_HELO_NAME.to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            port: SMTP_PORT,
            connect_timeout_ms: 10_000,
            command_timeout_ms: 10_000,
        }
    }
}

impl ProbeOptions {
    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        millis(self.command_timeout_ms)
    }
}

fn millis(value: u64) -> Option<Duration> {
    (value != 0).then(|| Duration::from_millis(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_policy() {
        let options = ProbeOptions::default();
        assert_eq!(options.helo_name, "checkmail.me");
        assert_eq!(options.mail_from, "testing-email-host@gmail.com");
        assert_eq!(options.port, 25);
        assert_eq!(options.connect_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let options = ProbeOptions {
            connect_timeout_ms: 0,
            command_timeout_ms: 0,
            ..ProbeOptions::default()
        };
        assert_eq!(options.connect_timeout(), None);
        assert_eq!(options.command_timeout(), None);
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let options: ProbeOptions =
            serde_json::from_str(r#"{"helo_name":"probe.example"}"#).expect("valid json");
        assert_eq!(options.helo_name, "probe.example");
        assert_eq!(options.port, 25);
    }
}
