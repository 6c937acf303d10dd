use super::*;
use std::env;

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_SECRET", "supersecretjwtsecretforunittesting123");
    }
}

#[test]
fn test_issue_and_validate_token() {
    set_env_vars();
    let user_id = Uuid::new_v4();

    let token = issue_token(
        "supersecretjwtsecretforunittesting123",
        3600,
        user_id,
        "affiliate",
        Some("test@example.com".to_string()),
    )
    .unwrap();

    let claims = validate_token(&token).expect("Valid token should pass");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role, "affiliate");
    assert_eq!(claims.email, Some("test@example.com".to_string()));
}

#[test]
fn test_validate_token_expired() {
    set_env_vars();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: "affiliate".to_string(),
        email: None,
        exp: 1, // past
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret("supersecretjwtsecretforunittesting123".as_bytes()),
    )
    .unwrap();

    assert!(validate_token(&token).is_err());
}

#[test]
fn test_validate_token_invalid_signature() {
    set_env_vars();
    let token = issue_token(
        "wrongsecret",
        3600,
        Uuid::new_v4(),
        "admin",
        None,
    )
    .unwrap();

    assert!(validate_token(&token).is_err());
}

#[test]
fn test_password_hash_roundtrip() {
    let hash = hash_password("Sup3rSecret!").unwrap();
    assert!(verify_password("Sup3rSecret!", &hash));
    assert!(!verify_password("wrong-password", &hash));
}

#[test]
fn test_verify_password_garbage_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
}
