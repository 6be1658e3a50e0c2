//! SMTP side of the probe: reply type, stream framing, the session state
//! machine and the TCP connector that opens sessions.

mod connector;
mod reply;
mod session;
mod stream;

pub use connector::{Connector, TcpConnector};
pub use reply::SmtpReply;
pub use session::{ProbeSession, SessionState, SmtpSession};
