#![allow(clippy::unwrap_used)]

use super::*;

// ── Password hashing ──────────────────────────────────────────

#[test]
fn test_password_hash_and_verify() {
    let hash = hash_password("hunter2").unwrap();
    assert_ne!(hash, "hunter2");
    assert!(verify_password("hunter2", &hash).unwrap());
    assert!(!verify_password("wrong", &hash).unwrap());
}

#[test]
fn test_password_hashes_are_salted() {
    let a = hash_password("hunter2").unwrap();
    let b = hash_password("hunter2").unwrap();
    assert_ne!(a, b);
}

// ── Tokens ────────────────────────────────────────────────────

#[test]
fn test_token_round_trip() {
    let service = TokenService::new("test-secret");
    let token = service.issue(42, "alice@example.com", Utc::now()).unwrap();
    assert_eq!(service.verify(&token).unwrap(), 42);
}

#[test]
fn test_token_wrong_secret_rejected() {
    let service = TokenService::new("test-secret");
    let other = TokenService::new("other-secret");
    let token = service.issue(42, "alice@example.com", Utc::now()).unwrap();
    assert!(other.verify(&token).is_err());
}

#[test]
fn test_token_expired_rejected() {
    let service = TokenService::new("test-secret");
    // Issued two days ago, so the 24h lifetime has long passed
    let token = service
        .issue(42, "alice@example.com", Utc::now() - Duration::hours(48))
        .unwrap();
    assert!(service.verify(&token).is_err());
}

#[test]
fn test_token_garbage_rejected() {
    let service = TokenService::new("test-secret");
    assert!(service.verify("not-a-token").is_err());
    assert!(service.verify("").is_err());
}
