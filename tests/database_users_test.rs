// ABOUTME: Integration tests for user store operations
// ABOUTME: Validates user persistence, uniqueness surfacing, and mutations

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use atlas_gym_server::database::Database;
use atlas_gym_server::errors::ErrorCode;
use atlas_gym_server::models::{User, UserRole};

async fn test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

fn test_user(username: &str) -> User {
    User::new(
        username.to_owned(),
        "Harry".into(),
        "Potter".into(),
        "hashed_password".into(),
        UserRole::Trainee,
    )
}

#[tokio::test]
async fn test_create_and_get_user() {
    let db = test_database().await;
    let user = test_user("Harry.Potter.1");

    db.create_user(&user).await.expect("Failed to create user");

    let retrieved = db
        .get_user_by_username("Harry.Potter.1")
        .await
        .expect("Failed to get user")
        .expect("User not found");

    assert_eq!(retrieved.id, user.id);
    assert_eq!(retrieved.first_name, "Harry");
    assert_eq!(retrieved.role, UserRole::Trainee);
    assert!(!retrieved.is_active);
}

#[tokio::test]
async fn test_get_unknown_user_is_none() {
    let db = test_database().await;
    assert!(db
        .get_user_by_username("Nobody.Here.1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_username_surfaces_conflict() {
    let db = test_database().await;
    db.create_user(&test_user("Harry.Potter.1")).await.unwrap();

    let err = db
        .create_user(&test_user("Harry.Potter.1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_list_usernames_with_prefix() {
    let db = test_database().await;
    for username in ["Harry.Potter.1", "Harry.Potter.2", "Ron.Weasley.1"] {
        db.create_user(&test_user(username)).await.unwrap();
    }

    let mut names = db
        .list_usernames_with_prefix("Harry.Potter.")
        .await
        .unwrap();
    names.sort();
    assert_eq!(names, vec!["Harry.Potter.1", "Harry.Potter.2"]);
}

#[tokio::test]
async fn test_activation_toggle() {
    let db = test_database().await;
    let user = test_user("Harry.Potter.1");
    db.create_user(&user).await.unwrap();

    db.set_user_active(user.id, true).await.unwrap();
    let active = db
        .get_user_by_username("Harry.Potter.1")
        .await
        .unwrap()
        .unwrap();
    assert!(active.is_active);

    db.set_user_active(user.id, false).await.unwrap();
    let inactive = db
        .get_user_by_username("Harry.Potter.1")
        .await
        .unwrap()
        .unwrap();
    assert!(!inactive.is_active);
}

#[tokio::test]
async fn test_password_hash_update() {
    let db = test_database().await;
    let user = test_user("Harry.Potter.1");
    db.create_user(&user).await.unwrap();

    db.update_password_hash(user.id, "new_hash").await.unwrap();

    let updated = db
        .get_user_by_username("Harry.Potter.1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.password_hash, "new_hash");
}
