use std::fmt;

/// One MX answer: the exchanger host and its preference rank.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub exchange: String,
    pub preference: u16,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            preference,
        }
    }

    /// `host:port` string handed to the connector.
    pub fn target(&self, port: u16) -> String {
        format!("{}:{port}", self.exchange)
    }
}

impl fmt::Display for MxRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}
