use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::MxRecord;
use crate::error::ValidationError;

/// Source of MX records for a domain.
///
/// Implementations return the records in the order they want them tried;
/// only the first one is used.
pub trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

/// [`LookupMx`] backed by the system resolver configuration.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    pub fn from_system_conf() -> Result<Self, ValidationError> {
        let inner =
            Resolver::from_system_conf().map_err(|source| ValidationError::ResolverInit { source })?;
        Ok(Self { inner })
    }
}

impl LookupMx for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.inner.mx_lookup(domain)?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }
}

/// Looks up `domain` and returns the first mail exchanger.
pub fn resolve_exchanger<R>(resolver: &R, domain: &str) -> Result<MxRecord, ValidationError>
where
    R: LookupMx + ?Sized,
{
    let ascii = normalize_domain(domain)?;
    let records = match resolver.lookup_mx(&ascii) {
        Ok(records) => records,
        Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
            return Err(ValidationError::NoMailExchanger { domain: ascii });
        }
        Err(source) => {
            return Err(ValidationError::Lookup {
                domain: ascii,
                source,
            });
        }
    };

    records
        .into_iter()
        .next()
        .ok_or(ValidationError::NoMailExchanger { domain: ascii })
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, ValidationError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid_domain(domain, "domain is empty"));
    }
    idna::domain_to_ascii(trimmed)
        .map_err(|err| ValidationError::invalid_domain(domain, format!("IDNA conversion failed: {err}")))
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        self.calls.lock().expect("calls lock").push(domain.to_string());
        (self.on_lookup)(domain)
    }
}
