//! Postgres-backed authentication. These need a database: run them with
//! `DATABASE_URL=postgres://... cargo test --test remote_auth -- --ignored`.

use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use gatepass_server::auth::remote::RemoteAuthSettings;
use gatepass_server::auth::{AdminPolicy, AuthProvider, RemoteAuth, SignUpRequest};
use gatepass_server::utils::error::AppError;

fn remote(pool: PgPool) -> RemoteAuth {
    RemoteAuth::new(
        pool,
        AdminPolicy::default(),
        RemoteAuthSettings {
            session_ttl: Duration::hours(24),
            reset_ttl: Duration::minutes(30),
            reset_redirect: "http://localhost:5173/reset-password".to_string(),
        },
    )
}

fn sign_up_request(email: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: "senha123".to_string(),
        full_name: "Maria Souza".to_string(),
        phone: "+55 21 97777-7777".to_string(),
    }
}

async fn reset_token_for(pool: &PgPool, user_id: Uuid) -> String {
    sqlx::query_scalar("SELECT token FROM password_resets WHERE user_id = $1 AND NOT used")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn only_the_admin_is_approved_at_sign_up(pool: PgPool) {
    let auth = remote(pool.clone());

    let admin = auth.sign_up(sign_up_request("Alice@GatePass.com")).await.unwrap();
    assert!(!admin.needs_approval);
    let client = auth.sign_up(sign_up_request("maria@cliente.com")).await.unwrap();
    assert!(client.needs_approval);

    let approved: Vec<(String, bool)> =
        sqlx::query_as("SELECT email, approved FROM users ORDER BY email")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        approved,
        vec![
            ("alice@gatepass.com".to_string(), true),
            ("maria@cliente.com".to_string(), false),
        ]
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_conflicts(pool: PgPool) {
    let auth = remote(pool);
    auth.sign_up(sign_up_request("maria@cliente.com")).await.unwrap();

    let err = auth
        .sign_up(sign_up_request(" MARIA@cliente.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn sign_in_issues_expiring_sessions(pool: PgPool) {
    let auth = remote(pool);
    let outcome = auth.sign_up(sign_up_request("maria@cliente.com")).await.unwrap();

    let session = auth.sign_in("maria@cliente.com", "senha123").await.unwrap();
    assert_eq!(session.user_id, outcome.user_id);
    assert!(session.expires_at.is_some());
    assert_eq!(
        auth.user_id_for_token(&session.token).await.unwrap(),
        Some(outcome.user_id)
    );

    let err = auth.sign_in("maria@cliente.com", "wrong123").await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));

    auth.sign_out(&session.token).await.unwrap();
    assert_eq!(auth.user_id_for_token(&session.token).await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reset_for_unknown_email_is_silent(pool: PgPool) {
    let auth = remote(pool.clone());
    auth.request_password_reset("nobody@cliente.com").await.unwrap();

    let issued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_resets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(issued, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reset_token_is_single_use_and_ends_sessions(pool: PgPool) {
    let auth = remote(pool.clone());
    let outcome = auth.sign_up(sign_up_request("maria@cliente.com")).await.unwrap();
    let session = auth.sign_in("maria@cliente.com", "senha123").await.unwrap();

    auth.request_password_reset("maria@cliente.com").await.unwrap();
    let token = reset_token_for(&pool, outcome.user_id).await;

    auth.confirm_password_reset(&token, "nova4567").await.unwrap();
    assert_eq!(auth.user_id_for_token(&session.token).await.unwrap(), None);

    let err = auth
        .confirm_password_reset(&token, "outra8910")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));

    assert!(auth.sign_in("maria@cliente.com", "senha123").await.is_err());
    auth.sign_in("maria@cliente.com", "nova4567").await.unwrap();
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn expired_reset_token_is_rejected(pool: PgPool) {
    let auth = remote(pool.clone());
    let outcome = auth.sign_up(sign_up_request("maria@cliente.com")).await.unwrap();
    auth.request_password_reset("maria@cliente.com").await.unwrap();
    let token = reset_token_for(&pool, outcome.user_id).await;

    sqlx::query("UPDATE password_resets SET expires_at = now() - INTERVAL '1 minute'")
        .execute(&pool)
        .await
        .unwrap();

    let err = auth
        .confirm_password_reset(&token, "nova4567")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));
}
