//! Mail exchanger lookup.
//!
//! [`resolve_exchanger`] asks a [`LookupMx`] implementation for the MX set of
//! a domain and keeps the first record as returned by the resolver. Records
//! are neither re-sorted by preference nor tried in turn.

mod resolver;
mod types;

pub use resolver::{LookupMx, SystemResolver, resolve_exchanger};
pub use types::MxRecord;

#[cfg(test)]
pub(crate) mod tests;
