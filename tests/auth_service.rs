//! Auth Service Tests
//!
//! Drives the account and session lifecycle against an in-memory database.

use std::sync::Arc;
use std::time::Duration;

use storefront_auth::auth::{validate_password, INVALID_CREDENTIALS};
use storefront_auth::config::PasswordConfig;
use storefront_auth::{
    AccountStore, AuthError, AuthService, Database, LoginRequest, PasswordCheck, PasswordHasher,
    RegisterRequest, Role, TokenError, TokenIssuer,
};

const SECRET: &str = "service-test-secret";

fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    })
    .unwrap()
}

/// Create a service over a fresh in-memory database.
async fn create_service() -> (AuthService, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let tokens = TokenIssuer::new(SECRET, Duration::from_secs(1800), Duration::from_secs(604800))
        .expect("Failed to create token issuer");
    let service = AuthService::new(
        Arc::new(db.accounts()),
        fast_hasher(),
        tokens,
        Duration::from_secs(5),
    );
    (service, db)
}

fn register_request(email: &str, phone: &str) -> RegisterRequest {
    RegisterRequest {
        full_name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        password: "secret1".to_string(),
        role: Role::Shopper,
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn test_register_persists_account() {
    let (service, db) = create_service().await;

    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let stored = db
        .accounts()
        .find_by_id(&session.account.id)
        .await
        .unwrap()
        .expect("account was not stored");
    assert_eq!(stored.email, "ada@example.com");
    assert_eq!(stored.role, Role::Shopper);
    assert_ne!(stored.password, "secret1");
    assert!(fast_hasher().verify(&stored.password, "secret1").is_match());
}

#[tokio::test]
async fn test_register_conflicts() {
    let (service, db) = create_service().await;
    service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let email_taken = service
        .register(register_request("ADA@example.com", "555-0199"))
        .await;
    match email_taken {
        Err(AuthError::Conflict(msg)) => assert!(msg.to_lowercase().contains("email")),
        other => panic!("expected conflict, got {other:?}"),
    }

    let phone_taken = service
        .register(register_request("grace@example.com", "555-0100"))
        .await;
    match phone_taken {
        Err(AuthError::Conflict(msg)) => assert!(msg.to_lowercase().contains("phone")),
        other => panic!("expected conflict, got {other:?}"),
    }

    assert_eq!(db.accounts().count_by_phone("555-0199").await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_registrations_single_winner() {
    let (service, db) = create_service().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(register_request("race@example.com", &format!("555-02{i:02}")))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(
        db.accounts().count_by_email("race@example.com").await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (service, _db) = create_service().await;

    let mut request = register_request("ada@example.com", "555-0100");
    request.password = "12345".to_string();

    match service.register(request).await {
        Err(AuthError::Validation(details)) => {
            assert_eq!(details.len(), 1);
            assert!(details.contains_key("password"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Password hashing
// ============================================================================

#[test]
fn test_hash_verify_properties() {
    let hasher = fast_hasher();
    for password in ["secret1", "correct horse battery", "パスワード123"] {
        let hash = hasher.hash(password).unwrap();
        assert_eq!(hasher.verify(&hash, password), PasswordCheck::Match);
        assert_eq!(
            hasher.verify(&hash, &format!("{password}x")),
            PasswordCheck::Mismatch
        );
    }
    assert!(validate_password("12345").is_err());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_touches_updated_at() {
    let (service, db) = create_service().await;
    let registered = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let session = service
        .login(login_request("ada@example.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(session.account.id, registered.account.id);
    assert!(session.account.updated_at > registered.account.updated_at);

    let stored = db
        .accounts()
        .find_by_id(&session.account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.updated_at.timestamp_millis(),
        session.account.updated_at.timestamp_millis()
    );
    assert_eq!(
        stored.created_at.timestamp_millis(),
        registered.account.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_login_mints_fresh_pair() {
    let (service, _db) = create_service().await;
    let registered = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let session = service
        .login(login_request("ada@example.com", "secret1"))
        .await
        .unwrap();

    assert_ne!(session.tokens.access.token, registered.tokens.access.token);
    assert_ne!(session.tokens.refresh.token, registered.tokens.refresh.token);
    assert!(session.tokens.access.expires_at < session.tokens.refresh.expires_at);
}

#[tokio::test]
async fn test_login_failures() {
    let (service, _db) = create_service().await;
    service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    match service.login(login_request("nobody@example.com", "secret1")).await {
        Err(AuthError::NotFound(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
        other => panic!("expected not found, got {other:?}"),
    }

    match service.login(login_request("ada@example.com", "secret2")).await {
        Err(AuthError::Unauthorized(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

// ============================================================================
// Session validation and refresh
// ============================================================================

#[tokio::test]
async fn test_validate_session() {
    let (service, _db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let claims = service
        .validate_session(Some(&session.tokens.access.token))
        .unwrap();
    assert_eq!(claims.sub, session.account.id);
    assert_eq!(claims.email, "ada@example.com");

    assert!(matches!(
        service.validate_session(None),
        Err(AuthError::NotFound(_))
    ));
    assert!(matches!(
        service.validate_session(Some("garbage")),
        Err(AuthError::Unauthorized(_))
    ));
    assert!(matches!(
        service.validate_session(Some(&session.tokens.refresh.token)),
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_current_account() {
    let (service, _db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let account = service
        .current_account(Some(&session.tokens.access.token))
        .await
        .unwrap();
    assert_eq!(account.id, session.account.id);
    assert_eq!(account.phone, "555-0100");
}

#[tokio::test]
async fn test_refresh_issues_new_access_only() {
    let (service, _db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let refreshed = service
        .refresh_access(Some(&session.tokens.refresh.token))
        .await
        .unwrap();

    assert_eq!(refreshed.account_id, session.account.id);
    assert_ne!(refreshed.access.token, session.tokens.access.token);
    assert!(refreshed.access.expires_at > session.tokens.access.issued_at);

    // The original refresh token keeps working.
    service
        .refresh_access(Some(&session.tokens.refresh.token))
        .await
        .unwrap();
    assert!(service.tokens().validate_refresh(&session.tokens.refresh.token).is_ok());

    let claims = service
        .validate_session(Some(&refreshed.access.token))
        .unwrap();
    assert_eq!(claims.sub, session.account.id);
}

#[tokio::test]
async fn test_refresh_failures() {
    let (service, _db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    assert!(matches!(
        service.refresh_access(None).await,
        Err(AuthError::NotFound(_))
    ));
    assert!(matches!(
        service.refresh_access(Some("garbage")).await,
        Err(AuthError::Unauthorized(_))
    ));
    assert!(matches!(
        service
            .refresh_access(Some(&session.tokens.access.token))
            .await,
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_refresh_for_unknown_account() {
    let (service, _db) = create_service().await;
    let (other, _other_db) = create_service().await;

    // Same secret, different store: the token is valid but its subject is unknown here.
    let session = other
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    assert!(matches!(
        service
            .refresh_access(Some(&session.tokens.refresh.token))
            .await,
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_rotated_secret_invalidates_sessions() {
    let (service, db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    let rotated = AuthService::new(
        Arc::new(db.accounts()),
        fast_hasher(),
        TokenIssuer::new("rotated-secret", Duration::from_secs(1800), Duration::from_secs(604800))
            .unwrap(),
        Duration::from_secs(5),
    );

    assert_eq!(
        rotated
            .tokens()
            .validate_access(&session.tokens.access.token)
            .unwrap_err(),
        TokenError::BadSignature
    );
    assert!(matches!(
        rotated.current_account(Some(&session.tokens.access.token)).await,
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (service, _db) = create_service().await;
    let session = service
        .register(register_request("ada@example.com", "555-0100"))
        .await
        .unwrap();

    service.logout(Some(&session.tokens.access.token));
    service.logout(Some(&session.tokens.access.token));
    service.logout(None);

    // Nothing is revoked server-side.
    assert!(service
        .validate_session(Some(&session.tokens.access.token))
        .is_ok());
}
