//! Binding key identities to account email addresses.

use keyhold_common::{AppError, AppResult};
use keyhold_openpgp::Identity;

use super::account_directory::AccountEmail;

/// Resolve every identity of a key against the owner's verified addresses.
///
/// All-or-nothing: the first identity without an email, or whose email the
/// owner has not verified, fails the whole key. Comparison is exact and
/// case-sensitive. Returns the bound addresses in key order, each once.
pub fn bind_identities(
    identities: &[Identity],
    account_emails: &[AccountEmail],
) -> AppResult<Vec<String>> {
    if identities.is_empty() {
        return Err(AppError::UnverifiedIdentity(
            "key carries no user IDs".to_string(),
        ));
    }

    let mut bound: Vec<String> = Vec::with_capacity(identities.len());
    for identity in identities {
        let Some(email) = identity.email() else {
            return Err(AppError::UnverifiedIdentity(identity.user_id().to_string()));
        };

        let verified = account_emails
            .iter()
            .any(|candidate| candidate.verified && candidate.email == email);
        if !verified {
            return Err(AppError::UnverifiedIdentity(email.to_string()));
        }

        if !bound.iter().any(|b| b == email) {
            bound.push(email.to_string());
        }
    }

    Ok(bound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identities(user_ids: &[&str]) -> Vec<Identity> {
        user_ids.iter().map(|u| Identity::parse(u)).collect()
    }

    fn account() -> Vec<AccountEmail> {
        vec![
            AccountEmail::new("a@example.com", true),
            AccountEmail::new("work@example.com", true),
            AccountEmail::new("pending@example.com", false),
        ]
    }

    #[test]
    fn test_binds_verified_emails_in_key_order() {
        let bound = bind_identities(
            &identities(&["Alice (work) <work@example.com>", "Alice <a@example.com>"]),
            &account(),
        )
        .unwrap();

        assert_eq!(bound, vec!["work@example.com", "a@example.com"]);
    }

    #[test]
    fn test_unverified_email_rejects_key() {
        let err = bind_identities(
            &identities(&["Alice <a@example.com>", "Alice <pending@example.com>"]),
            &account(),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::UnverifiedIdentity(e) if e == "pending@example.com"));
    }

    #[test]
    fn test_unknown_email_rejects_key() {
        let err =
            bind_identities(&identities(&["Mallory <m@evil.example>"]), &account()).unwrap_err();
        assert!(matches!(err, AppError::UnverifiedIdentity(e) if e == "m@evil.example"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let err = bind_identities(&identities(&["Alice <A@example.com>"]), &account()).unwrap_err();
        assert!(matches!(err, AppError::UnverifiedIdentity(_)));
    }

    #[test]
    fn test_identity_without_email_rejects_key() {
        let err = bind_identities(
            &identities(&["Alice <a@example.com>", "just a name"]),
            &account(),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::UnverifiedIdentity(u) if u == "just a name"));
    }

    #[test]
    fn test_no_identities_rejected() {
        assert!(matches!(
            bind_identities(&[], &account()),
            Err(AppError::UnverifiedIdentity(_))
        ));
    }

    #[test]
    fn test_duplicate_emails_bound_once() {
        let bound = bind_identities(
            &identities(&["Alice <a@example.com>", "A. <a@example.com>"]),
            &account(),
        )
        .unwrap();

        assert_eq!(bound, vec!["a@example.com"]);
    }
}
