#![forbid(unsafe_code)]
//! mailhost_lib — checks whether the mail host of an address would accept it,
//! by walking the start of an SMTP transaction and stopping before `DATA`.
//!
//! ```no_run
//! match mailhost_lib::validate_host("someone@example.com") {
//!     Ok(()) => println!("accepted"),
//!     Err(err) => println!("{} failed: {err}", err.stage()),
//! }
//! ```

pub mod address;
pub mod error;
pub mod mx;
pub mod smtp;
pub mod validate;

pub use address::{domain_of, local_part_of};
pub use error::{SmtpFailure, Stage, ValidationError};
pub use mx::{LookupMx, MxRecord, SystemResolver, resolve_exchanger};
pub use smtp::{Connector, ProbeSession, SessionState, SmtpReply, SmtpSession, TcpConnector};
pub use validate::{
    DEFAULT_HELO_NAME, DEFAULT_MAIL_FROM, ProbeOptions, SMTP_PORT, ValidationOutcome, Validator,
    validate_host, validate_host_with_options,
};
