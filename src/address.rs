//! Address splitting used by the probe.
//!
//! No syntax checks happen here: an address without `@` is handed to the
//! resolver as-is and fails there.

/// Returns the domain part of `email`, i.e. everything after the last `@`.
///
/// When no `@` is present the whole input is returned.
pub fn domain_of(email: &str) -> &str {
    match email.rfind('@') {
        Some(index) => &email[index + 1..],
        None => email,
    }
}

/// Returns everything before the last `@`, or an empty string when there is none.
pub fn local_part_of(email: &str) -> &str {
    email.rfind('@').map_or("", |index| &email[..index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn domain_follows_last_at() {
        assert_eq!(domain_of("mail@company.com"), "company.com");
        assert_eq!(domain_of("a@b@example.com"), "example.com");
        assert_eq!(local_part_of("a@b@example.com"), "a@b");
    }

    #[test]
    fn missing_at_returns_whole_input() {
        assert_eq!(domain_of("company.com"), "company.com");
        assert_eq!(local_part_of("company.com"), "");
    }

    #[test]
    fn trailing_at_yields_empty_domain() {
        assert_eq!(domain_of("user@"), "");
        assert_eq!(domain_of("@"), "");
    }

    proptest! {
        #[test]
        fn split_reassembles_input(local in "[a-z0-9.@+]{0,16}", domain in "[a-z0-9.-]{1,24}") {
            let email = format!("{local}@{domain}");
            prop_assert_eq!(domain_of(&email), domain.as_str());
            prop_assert_eq!(local_part_of(&email), local.as_str());
        }
    }
}
