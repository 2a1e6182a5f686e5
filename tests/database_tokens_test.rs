// ABOUTME: Integration tests for token store operations
// ABOUTME: Validates append-only persistence, invalidation, and the revoke-and-save transaction

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use atlas_gym_server::database::Database;
use atlas_gym_server::models::{IssuedToken, TokenKind, TokenState, User, UserRole};
use chrono::{Duration, Utc};
use uuid::Uuid;

async fn test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

async fn seeded_user(db: &Database) -> Uuid {
    let user = User::new(
        "Harry.Potter.1".into(),
        "Harry".into(),
        "Potter".into(),
        "hashed_password".into(),
        UserRole::Trainee,
    );
    db.create_user(&user).await.expect("Failed to create user");
    user.id
}

fn access_token(user_id: Uuid, token: &str) -> IssuedToken {
    IssuedToken::new(
        user_id,
        token.to_owned(),
        TokenKind::Access,
        Utc::now() + Duration::hours(1),
    )
}

#[tokio::test]
async fn test_save_and_find_by_token() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;
    let token = access_token(user_id, "tok-1");

    db.save_token(&token).await.unwrap();

    let found = db.find_by_token("tok-1").await.unwrap().unwrap();
    assert_eq!(found.id, token.id);
    assert_eq!(found.user_id, user_id);
    assert_eq!(found.kind, TokenKind::Access);
    assert_eq!(found.state, TokenState::Active);

    assert!(db.find_by_token("tok-unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_valid_tokens_filters_state_and_expiry() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;

    let live = access_token(user_id, "tok-live");
    let stale = IssuedToken::new(
        user_id,
        "tok-stale".into(),
        TokenKind::Access,
        Utc::now() - Duration::hours(1),
    );
    let dead = access_token(user_id, "tok-dead");
    db.save_all_tokens(&[live.clone(), stale, dead.clone()])
        .await
        .unwrap();
    db.invalidate_token("tok-dead", TokenState::Revoked)
        .await
        .unwrap();

    let valid = db.find_valid_tokens(user_id).await.unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].token, "tok-live");
}

#[tokio::test]
async fn test_invalidate_only_touches_active_rows() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;
    db.save_token(&access_token(user_id, "tok-1")).await.unwrap();

    db.invalidate_token("tok-1", TokenState::Revoked)
        .await
        .unwrap();
    // A second invalidation with a different target state is a no-op
    db.invalidate_token("tok-1", TokenState::Expired)
        .await
        .unwrap();

    let found = db.find_by_token("tok-1").await.unwrap().unwrap();
    assert_eq!(found.state, TokenState::Revoked);
}

#[tokio::test]
async fn test_revoke_all_valid_and_save_replaces_session() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;

    let old_access = access_token(user_id, "old-access");
    let old_refresh = IssuedToken::new(
        user_id,
        "old-refresh".into(),
        TokenKind::Refresh,
        Utc::now() + Duration::hours(24),
    );
    db.save_all_tokens(&[old_access, old_refresh]).await.unwrap();

    let new_access = access_token(user_id, "new-access");
    db.revoke_all_valid_and_save(user_id, std::slice::from_ref(&new_access))
        .await
        .unwrap();

    // History survives: old rows remain, flipped to revoked
    let old = db.find_by_token("old-access").await.unwrap().unwrap();
    assert_eq!(old.state, TokenState::Revoked);
    let old = db.find_by_token("old-refresh").await.unwrap().unwrap();
    assert_eq!(old.state, TokenState::Revoked);

    let valid = db.find_valid_tokens(user_id).await.unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].token, "new-access");
}

#[tokio::test]
async fn test_revoke_all_does_not_touch_other_users() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;

    let other = User::new(
        "Ron.Weasley.1".into(),
        "Ron".into(),
        "Weasley".into(),
        "hashed_password".into(),
        UserRole::Trainee,
    );
    db.create_user(&other).await.unwrap();

    db.save_token(&access_token(user_id, "harry-token"))
        .await
        .unwrap();
    db.save_token(&access_token(other.id, "ron-token"))
        .await
        .unwrap();

    db.revoke_all_valid_and_save(user_id, &[]).await.unwrap();

    let rons = db.find_by_token("ron-token").await.unwrap().unwrap();
    assert_eq!(rons.state, TokenState::Active);
}

#[tokio::test]
async fn test_duplicate_token_string_rolls_back_transaction() {
    let db = test_database().await;
    let user_id = seeded_user(&db).await;
    db.save_token(&access_token(user_id, "tok-1")).await.unwrap();

    let fresh = access_token(user_id, "tok-2");
    let collision = access_token(user_id, "tok-1");
    let result = db.save_all_tokens(&[fresh, collision]).await;

    assert!(result.is_err());
    // The failed batch persisted nothing
    assert!(db.find_by_token("tok-2").await.unwrap().is_none());
}
