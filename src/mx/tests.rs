use std::sync::Mutex;

use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::{Query, ResponseCode};
use trust_dns_resolver::proto::rr::{Name, RecordType};

use super::{MxRecord, resolve_exchanger, resolver};
use crate::error::{Stage, ValidationError};

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult + Send + Sync;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
    pub calls: Mutex<Vec<String>>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + Send + Sync + 'static,
    {
        Self {
            on_lookup: Box::new(f),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn single(exchange: &'static str) -> Self {
        Self::new(move |_| Ok(vec![MxRecord::new(1, exchange)]))
    }

    pub(crate) fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(ResolveError::from(message)))
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[test]
fn first_record_wins_without_sorting() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MxRecord::new(30, "mx3.example.com"),
            MxRecord::new(10, "mx1.example.com"),
        ])
    });

    let record = resolve_exchanger(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(record.exchange, "mx3.example.com");
    assert_eq!(record.preference, 30);
    assert_eq!(stub.lookups(), vec!["example.com".to_string()]);
}

#[test]
fn empty_answer_is_no_mail_exchanger() {
    let stub = StubResolver::new(|_| Ok(Vec::new()));
    let err = resolve_exchanger(&stub, "example.com").expect_err("no records");
    assert!(matches!(err, ValidationError::NoMailExchanger { ref domain } if domain == "example.com"));
    assert_eq!(err.stage(), Stage::Resolution);
}

#[test]
fn nxdomain_is_no_mail_exchanger() {
    let stub = StubResolver::new(|domain| {
        let name = Name::from_ascii(domain).expect("valid name");
        Err(ResolveError::from(ResolveErrorKind::NoRecordsFound {
            query: Box::new(Query::query(name, RecordType::MX)),
            soa: None,
            negative_ttl: None,
            response_code: ResponseCode::NXDomain,
            trusted: true,
        }))
    });
    let err = resolve_exchanger(&stub, "missing.example").expect_err("nxdomain");
    assert!(matches!(err, ValidationError::NoMailExchanger { ref domain } if domain == "missing.example"));
    assert_eq!(err.stage(), Stage::Resolution);
    assert_eq!(stub.lookups(), vec!["missing.example".to_string()]);
}

#[test]
fn lookup_failure_keeps_resolver_error() {
    let stub = StubResolver::failing("Net Lookup MX Error");
    let err = resolve_exchanger(&stub, "company.com").expect_err("lookup fails");
    match err {
        ValidationError::Lookup { domain, source } => {
            assert_eq!(domain, "company.com");
            assert!(source.to_string().contains("Net Lookup MX Error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_domain_never_reaches_resolver() {
    let stub = StubResolver::single("host.tld");
    let err = resolve_exchanger(&stub, "  ").expect_err("empty domain");
    assert!(matches!(err, ValidationError::InvalidDomain { .. }));
    assert!(stub.lookups().is_empty());
}

#[test]
fn unicode_domain_is_queried_as_ascii() {
    let stub = StubResolver::single("mx.example");
    resolve_exchanger(&stub, "bücher.example").expect("lookup succeeds");
    assert_eq!(stub.lookups(), vec!["xn--bcher-kva.example".to_string()]);
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    assert_eq!(resolver::normalize_exchange("Mail.EXAMPLE.com."), "mail.example.com");
}
