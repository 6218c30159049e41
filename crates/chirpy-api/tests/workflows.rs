use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chirpy_api::error::{ApiError, AuthFailure};
use chirpy_api::service::ChirpyService;
use chirpy_api::tokens::{self, TokenError};
use chirpy_db::Store;
use chirpy_types::api::{SortOrder, TokenKind};

const SECRET: &str = "workflow-secret";
const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

struct Harness {
    _dir: tempfile::TempDir,
    service: Arc<ChirpyService>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("database.json")).unwrap();
    let service = ChirpyService::new(store, SECRET, POLKA_KEY, Duration::from_secs(5));
    Harness {
        _dir: dir,
        service: Arc::new(service),
    }
}

/// Sign up and log in, returning (user id, access token, refresh token).
async fn signed_in(service: &ChirpyService, email: &str) -> (u32, String, String) {
    service.create_user(email, "password").await.unwrap();
    let session = service.login(email, "password").await.unwrap();
    (session.user.id, session.token, session.refresh_token)
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let h = harness();
    h.service.create_user("a@b.com", "x").await.unwrap();

    let err = h.service.create_user("a@b.com", "y").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn login_issues_both_token_kinds() {
    let h = harness();
    let user = h.service.create_user("a@b.com", "pw").await.unwrap();
    assert_ne!(user.hashed_password, "pw");

    let session = h.service.login("a@b.com", "pw").await.unwrap();
    assert_eq!(session.user.id, user.id);
    assert_eq!(
        tokens::validate(&session.token, SECRET, TokenKind::Access).unwrap(),
        user.id.to_string()
    );
    assert_eq!(
        tokens::validate(&session.refresh_token, SECRET, TokenKind::Refresh).unwrap(),
        user.id.to_string()
    );
}

#[tokio::test]
async fn login_with_bad_credentials() {
    let h = harness();
    h.service.create_user("a@b.com", "pw").await.unwrap();

    let wrong_password = h.service.login("a@b.com", "nope").await.unwrap_err();
    assert!(matches!(
        wrong_password,
        ApiError::Unauthorized(AuthFailure::InvalidCredentials)
    ));

    let unknown_email = h.service.login("x@y.com", "pw").await.unwrap_err();
    assert!(matches!(
        unknown_email,
        ApiError::Unauthorized(AuthFailure::InvalidCredentials)
    ));
}

#[tokio::test]
async fn refresh_mints_access_token_and_keeps_refresh_usable() {
    let h = harness();
    let (id, _, refresh) = signed_in(&h.service, "a@b.com").await;

    let first = h.service.refresh(&refresh).await.unwrap();
    let second = h.service.refresh(&refresh).await.unwrap();
    for token in [first, second] {
        assert_eq!(h.service.authenticate(&token).unwrap(), id);
    }
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let h = harness();
    let (_, access, _) = signed_in(&h.service, "a@b.com").await;

    let err = h.service.refresh(&access).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized(AuthFailure::InvalidToken(TokenError::WrongKind { .. }))
    ));
}

#[tokio::test]
async fn revoked_refresh_token_is_refused_though_still_cryptographically_valid() {
    let h = harness();
    let (_, access, refresh) = signed_in(&h.service, "a@b.com").await;

    h.service.revoke(&refresh).await.unwrap();

    let err = h.service.refresh(&refresh).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(AuthFailure::Revoked)));
    assert!(tokens::validate(&refresh, SECRET, TokenKind::Refresh).is_ok());

    // access tokens are not checked against the ledger
    assert!(h.service.authenticate(&access).is_ok());
}

#[tokio::test]
async fn revoke_accepts_any_string() {
    let h = harness();
    h.service.revoke("not-even-a-jwt").await.unwrap();
    let err = h.service.refresh("not-even-a-jwt").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(AuthFailure::Revoked)));
}

#[tokio::test]
async fn refresh_token_cannot_authorize_requests() {
    let h = harness();
    let (_, _, refresh) = signed_in(&h.service, "a@b.com").await;

    let err = h.service.create_chirp(&refresh, "hello").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn chirp_length_boundary() {
    let h = harness();
    let (_, access, _) = signed_in(&h.service, "a@b.com").await;

    let exact = "a".repeat(140);
    assert!(h.service.create_chirp(&access, &exact).await.is_ok());

    let over = "a".repeat(141);
    let err = h.service.create_chirp(&access, &over).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn chirp_is_stored_redacted() {
    let h = harness();
    let (id, access, _) = signed_in(&h.service, "a@b.com").await;

    let chirp = h
        .service
        .create_chirp(&access, "what a Kerfuffle today")
        .await
        .unwrap();
    assert_eq!(chirp.author_id, id);
    assert_eq!(chirp.body, "what a **** today");
    assert_eq!(h.service.get_chirp(chirp.id).await.unwrap(), chirp);
}

#[tokio::test]
async fn delete_is_author_scoped() {
    let h = harness();
    let (_, alice, _) = signed_in(&h.service, "alice@b.com").await;
    let (_, bob, _) = signed_in(&h.service, "bob@b.com").await;

    let chirp = h.service.create_chirp(&alice, "mine").await.unwrap();

    let err = h.service.delete_chirp(&bob, chirp.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    h.service.delete_chirp(&alice, chirp.id).await.unwrap();
    let remaining = h.service.list_chirps(None, SortOrder::Asc).await.unwrap();
    assert!(remaining.iter().all(|c| c.id != chirp.id));

    let err = h.service.delete_chirp(&alice, chirp.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn list_filters_and_sorts() {
    let h = harness();
    let (alice_id, alice, _) = signed_in(&h.service, "alice@b.com").await;
    let (_, bob, _) = signed_in(&h.service, "bob@b.com").await;

    h.service.create_chirp(&alice, "one").await.unwrap();
    h.service.create_chirp(&bob, "two").await.unwrap();
    h.service.create_chirp(&alice, "three").await.unwrap();

    let asc: Vec<u32> = h
        .service
        .list_chirps(None, SortOrder::Asc)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(asc, vec![1, 2, 3]);

    let alice_desc: Vec<u32> = h
        .service
        .list_chirps(Some(alice_id), SortOrder::Desc)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(alice_desc, vec![3, 1]);
}

#[tokio::test]
async fn update_profile_rehashes_password() {
    let h = harness();
    let (id, access, _) = signed_in(&h.service, "a@b.com").await;

    let updated = h
        .service
        .update_user(&access, "new@b.com", "new-pw")
        .await
        .unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.email, "new@b.com");

    assert!(h.service.login("a@b.com", "password").await.is_err());
    assert!(h.service.login("new@b.com", "new-pw").await.is_ok());
}

#[tokio::test]
async fn update_profile_requires_access_token() {
    let h = harness();
    let err = h
        .service
        .update_user("garbage", "a@b.com", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn webhook_upgrade() {
    let h = harness();
    let (id, _, _) = signed_in(&h.service, "a@b.com").await;

    let err = h
        .service
        .upgrade_user("wrong-key", "user.upgraded", id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized(AuthFailure::InvalidApiKey)
    ));

    // unknown events are acknowledged without touching the user
    h.service
        .upgrade_user(POLKA_KEY, "user.payment_failed", id)
        .await
        .unwrap();
    let session = h.service.login("a@b.com", "password").await.unwrap();
    assert!(!session.user.is_chirpy_red);

    h.service
        .upgrade_user(POLKA_KEY, "user.upgraded", id)
        .await
        .unwrap();
    let session = h.service.login("a@b.com", "password").await.unwrap();
    assert!(session.user.is_chirpy_red);

    let err = h
        .service
        .upgrade_user(POLKA_KEY, "user.upgraded", 999)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_get_unique_ids() {
    let h = harness();

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let service = h.service.clone();
            tokio::spawn(async move {
                service
                    .create_user(&format!("user{i}@b.com"), "pw")
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(ids, (1..=12).collect::<HashSet<_>>());
}

#[tokio::test]
async fn reset_empties_the_document() {
    let h = harness();
    signed_in(&h.service, "a@b.com").await;
    h.service.reset().await.unwrap();

    let err = h.service.login("a@b.com", "password").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized(AuthFailure::InvalidCredentials)
    ));
}
