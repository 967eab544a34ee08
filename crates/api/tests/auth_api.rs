//! End-to-end tests for registration, activation, authentication, and the
//! admin surface.
//!
//! These run against a PostgreSQL database provisioned by `sqlx::test` from
//! `DATABASE_URL`.

mod common;

use axum::http::StatusCode;
use booknet_api::auth::password::hash_password;
use booknet_core::roles::{ROLE_ADMIN, ROLE_USER};
use booknet_db::models::token::CreateToken;
use booknet_db::models::user::{CreateUser, User};
use booknet_db::repositories::{TokenRepo, UserRepo};
use chrono::Utc;
use common::{body_json, get, get_auth, post_json, post_json_auth, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "correct-horse";

async fn create_active_user(pool: &PgPool, email: &str, roles: &[&str]) -> User {
    let input = CreateUser {
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        date_of_birth: None,
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
        enabled: true,
    };
    UserRepo::create_with_roles(pool, &input, roles)
        .await
        .expect("user creation should succeed")
}

async fn login(pool: &PgPool, email: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    let body = serde_json::json!({ "email": email, "password": password });
    post_json(common::build_test_app(pool.clone()), "/auth/authenticate", body).await
}

async fn login_token(pool: &PgPool, email: &str) -> String {
    let response = login(pool, email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("token must be a string")
        .to_string()
}

fn registration(email: &str) -> serde_json::Value {
    serde_json::json!({
        "firstname": "Grace",
        "lastname": "Hopper",
        "date_of_birth": "1906-12-09",
        "email": email,
        "password": PASSWORD,
    })
}

// ---------------------------------------------------------------------------
// Registration and activation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_activate_then_authenticate(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/auth/register", registration("grace@test.com")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let user = UserRepo::find_by_email(&pool, "grace@test.com")
        .await
        .unwrap()
        .expect("user must exist");
    assert!(!user.enabled);
    assert!(!user.account_locked);

    // Disabled accounts cannot sign in yet.
    let response = login(&pool, "grace@test.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let tokens = TokenRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(tokens.len(), 1);
    let code = &tokens[0].token;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/auth/activate-account?token={code}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = login_token(&pool, "grace@test.com").await;
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["email"], "grace@test.com");
    assert_eq!(json["full_name"], "Grace Hopper");
    assert_eq!(json["enabled"], true);
    assert_eq!(json["roles"], serde_json::json!([ROLE_USER]));
    assert!(json.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_code_is_single_use(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    post_json(app, "/auth/register", registration("once@test.com")).await;
    let user = UserRepo::find_by_email(&pool, "once@test.com").await.unwrap().unwrap();
    let code = TokenRepo::list_for_user(&pool, user.id).await.unwrap()[0].token.clone();
    let uri = format!("/auth/activate-account?token={code}");

    let first = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_activation_code_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/auth/activate-account?token=000000").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_activation_code_issues_a_replacement(pool: PgPool) {
    let input = CreateUser {
        firstname: "Late".to_string(),
        lastname: "Comer".to_string(),
        date_of_birth: None,
        email: "late@test.com".to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        enabled: false,
    };
    let user = UserRepo::create(&pool, &input).await.unwrap();
    TokenRepo::create(
        &pool,
        &CreateToken {
            token: "123456".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
            user_id: user.id,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/auth/activate-account?token=123456").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let tokens = TokenRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(tokens.len(), 2, "a replacement code must be issued");
    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!user.enabled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_code_survives_purge_and_still_triggers_replacement(pool: PgPool) {
    let input = CreateUser {
        firstname: "Slow".to_string(),
        lastname: "Reader".to_string(),
        date_of_birth: None,
        email: "slow@test.com".to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        enabled: false,
    };
    let user = UserRepo::create(&pool, &input).await.unwrap();
    TokenRepo::create(
        &pool,
        &CreateToken {
            token: "654321".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
            user_id: user.id,
        },
    )
    .await
    .unwrap();

    TokenRepo::delete_stale(&pool).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/auth/activate-account?token=654321").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Activation token has expired. A new token has been sent to the same email address"
    );

    let tokens = TokenRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(tokens.len(), 2, "a replacement code must be issued");

    let fresh = &tokens[0].token;
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/auth/activate-account?token={fresh}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_code_of_active_account_is_not_reissued(pool: PgPool) {
    let user = create_active_user(&pool, "done@test.com", &[ROLE_USER]).await;
    TokenRepo::create(
        &pool,
        &CreateToken {
            token: "777777".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
            user_id: user.id,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/auth/activate-account?token=777777").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let tokens = TokenRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(tokens.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_registration_is_409(pool: PgPool) {
    create_active_user(&pool, "taken@test.com", &[ROLE_USER]).await;

    let app = common::build_test_app(pool);
    let response = post_json(app, "/auth/register", registration("taken@test.com")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_registration_is_400(pool: PgPool) {
    let mut body = registration("bad@test.com");
    body["password"] = serde_json::json!("short");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Password should be 8 characters long minimum"
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    create_active_user(&pool, "a@x.com", &[ROLE_USER]).await;

    let wrong_password = login(&pool, "a@x.com", "not-the-password").await;
    let unknown_email = login(&pool, "ghost@x.com", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_carries_role_authorities(pool: PgPool) {
    sqlx::query("INSERT INTO roles (name) VALUES ('READER')")
        .execute(&pool)
        .await
        .unwrap();
    create_active_user(&pool, "reader@x.com", &["READER"]).await;

    let token = login_token(&pool, "reader@x.com").await;
    let claims = booknet_api::auth::jwt::validate_token(&token, &common::test_config().jwt).unwrap();
    assert_eq!(claims.authorities, vec!["READER".to_string()]);
}

// ---------------------------------------------------------------------------
// Admin surface
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn locked_account_cannot_authenticate(pool: PgPool) {
    create_active_user(&pool, "admin@x.com", &[ROLE_ADMIN]).await;
    let target = create_active_user(&pool, "target@x.com", &[ROLE_USER]).await;
    let admin_token = login_token(&pool, "admin@x.com").await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/users/{}/lock", target.id);
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["account_locked"], true);

    let response = login(&pool, "target@x.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/users/{}/unlock", target.id);
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(&pool, "target@x.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_roles_and_assigns_them(pool: PgPool) {
    create_active_user(&pool, "admin@x.com", &[ROLE_ADMIN]).await;
    let target = create_active_user(&pool, "target@x.com", &[ROLE_USER]).await;
    let admin_token = login_token(&pool, "admin@x.com").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "name": "LIBRARIAN" });
    let response = post_json_auth(app, "/roles", body.clone(), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/roles", body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/users/{}/roles", target.id);
    let body = serde_json::json!({ "roles": ["LIBRARIAN", ROLE_USER] });
    let response = put_json_auth(app, &uri, body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let mut roles: Vec<String> = serde_json::from_value(json["roles"].clone()).unwrap();
    roles.sort();
    assert_eq!(roles, vec!["LIBRARIAN".to_string(), ROLE_USER.to_string()]);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "roles": ["NO_SUCH_ROLE"] });
    let response = put_json_auth(app, &uri, body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn authenticated_user_lists_roles_and_updates_profile(pool: PgPool) {
    create_active_user(&pool, "me@x.com", &[ROLE_USER]).await;
    let token = login_token(&pool, "me@x.com").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/roles", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let names: Vec<String> = body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&ROLE_USER.to_string()));
    assert!(names.contains(&ROLE_ADMIN.to_string()));

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "firstname": "Augusta" });
    let response = put_json_auth(app, "/users/me", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["firstname"], "Augusta");
    assert_eq!(json["lastname"], "Lovelace");
    assert!(json["last_modified_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn locking_revokes_access_of_issued_tokens(pool: PgPool) {
    create_active_user(&pool, "admin@x.com", &[ROLE_ADMIN]).await;
    let target = create_active_user(&pool, "target@x.com", &[ROLE_USER]).await;
    let admin_token = login_token(&pool, "admin@x.com").await;
    let target_token = login_token(&pool, "target@x.com").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/users/me", &target_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/users/{}/lock", target.id);
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/users/me", &target_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demoted_admin_loses_admin_access(pool: PgPool) {
    let admin = create_active_user(&pool, "admin@x.com", &[ROLE_ADMIN]).await;
    let admin_token = login_token(&pool, "admin@x.com").await;

    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "name": "LIBRARIAN" });
    let response = post_json_auth(app, "/roles", body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
