//! Tests for bearer tokens and the ownership/role gate.

use secrecy::SecretString;

use orchard_api::authz::{Identity, Requirement, authorize};
use orchard_api::services::{TokenError, TokenService};
use orchard_core::UserId;

const TTL_30_DAYS: u64 = 30 * 24 * 60 * 60;

fn token_service(secret: &str) -> TokenService {
    TokenService::new(&SecretString::from(secret.to_owned()), TTL_30_DAYS)
}

// =============================================================================
// Token Tests
// =============================================================================

#[test]
fn test_token_roundtrip() {
    let tokens = token_service("an-integration-test-secret-with-enough-length");
    let token = tokens.issue(UserId::new(42)).expect("issues");
    let verified = tokens.verify(&token).expect("verifies");
    assert_eq!(verified, UserId::new(42));
}

#[test]
fn test_token_from_different_secret_is_rejected() {
    let issuer = token_service("an-integration-test-secret-with-enough-length");
    let verifier = token_service("a-completely-different-secret-of-enough-length");

    let token = issuer.issue(UserId::new(1)).expect("issues");
    assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
}

#[test]
fn test_tampered_token_is_rejected() {
    let tokens = token_service("an-integration-test-secret-with-enough-length");
    let token = tokens.issue(UserId::new(1)).expect("issues");

    // Flip a character in the signature segment.
    let mut tampered = token.clone();
    let last = tampered.pop().expect("nonempty");
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    assert!(tokens.verify(&tampered).is_err());
}

#[test]
fn test_garbage_token_is_rejected() {
    let tokens = token_service("an-integration-test-secret-with-enough-length");
    assert!(tokens.verify("not-a-jwt").is_err());
    assert!(tokens.verify("").is_err());
}

// =============================================================================
// Authorization Matrix
// =============================================================================

#[test]
fn test_owner_sees_own_resource() {
    let caller = Identity {
        user_id: UserId::new(5),
        is_admin: false,
    };
    assert!(authorize(&caller, Requirement::Owner(UserId::new(5))));
}

#[test]
fn test_owner_gate_blocks_foreign_resource() {
    let caller = Identity {
        user_id: UserId::new(5),
        is_admin: false,
    };
    assert!(!authorize(&caller, Requirement::Owner(UserId::new(6))));
}

#[test]
fn test_admin_passes_owner_gate_for_anyone() {
    let admin = Identity {
        user_id: UserId::new(1),
        is_admin: true,
    };
    assert!(authorize(&admin, Requirement::Owner(UserId::new(99))));
}

#[test]
fn test_admin_gate() {
    let admin = Identity {
        user_id: UserId::new(1),
        is_admin: true,
    };
    let customer = Identity {
        user_id: UserId::new(2),
        is_admin: false,
    };
    assert!(authorize(&admin, Requirement::Admin));
    assert!(!authorize(&customer, Requirement::Admin));
}
