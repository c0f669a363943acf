use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use auction_engine::{
    db_types::{UserCredentials, UserId},
    engine_api::auth_api::{hash_password, random_salt},
    AuthApi,
    AuthApiError,
};
use chrono::Utc;
use jwt_compact::{alg::Hs256, AlgorithmExt, UntrustedToken};
use log::*;
use serde_json::{json, Value};

use super::{helpers::get_auth_config, mocks::MockUserDb};
use crate::{auth::JwtClaims, auth::TokenIssuer, data_objects::AuthResponse, routes::{LoginRoute, RegisterRoute}};

#[actix_web::test]
async fn registering_a_new_user() {
    let _ = env_logger::try_init().ok();
    let mut user_db = MockUserDb::new();
    user_db.expect_create_user().returning(|_, _, _| Ok(()));
    let (status, body) = post(user_db, "/auth/register", json!({"username": "alice", "password": "hunter2"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("User alice registered"), "was: {body}");
}

#[actix_web::test]
async fn registering_a_taken_username() {
    let mut user_db = MockUserDb::new();
    user_db.expect_create_user().returning(|u, _, _| Err(AuthApiError::UserAlreadyExists(u.clone())));
    let (status, body) = post(user_db, "/auth/register", json!({"username": "alice", "password": "hunter2"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"A user with that name already exists"}"#);
}

#[actix_web::test]
async fn login_with_valid_credentials() {
    let mut user_db = MockUserDb::new();
    let creds = credentials_for("bob", "hunter2");
    user_db.expect_fetch_credentials().returning(move |_| Ok(Some(creds.clone())));
    let (status, body) = post(user_db, "/auth/login", json!({"username": "bob", "password": "hunter2"})).await;
    assert!(status.is_success());
    let response: AuthResponse = serde_json::from_str(&body).expect("response is not valid JSON");
    // The issued token must verify against the server key and carry the verified username
    let untrusted = UntrustedToken::new(&response.token).expect("token is not a JWT");
    let token =
        Hs256.validator::<JwtClaims>(&get_auth_config().hs256_key()).validate(&untrusted).expect("bad signature");
    assert_eq!(token.claims().custom.sub, UserId::from("bob"));
    info!("Token verified for {}", token.claims().custom.sub);
}

#[actix_web::test]
async fn login_with_the_wrong_password() {
    let mut user_db = MockUserDb::new();
    let creds = credentials_for("bob", "hunter2");
    user_db.expect_fetch_credentials().returning(move |_| Ok(Some(creds.clone())));
    let (status, body) = post(user_db, "/auth/login", json!({"username": "bob", "password": "letmein"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The username or password is incorrect."}"#);
}

#[actix_web::test]
async fn login_with_an_unknown_username() {
    let mut user_db = MockUserDb::new();
    user_db.expect_fetch_credentials().returning(|_| Ok(None));
    let (status, body) = post(user_db, "/auth/login", json!({"username": "nobody", "password": "hunter2"})).await;
    // Indistinguishable from a wrong password, so usernames cannot be probed
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The username or password is incorrect."}"#);
}

fn credentials_for(username: &str, password: &str) -> UserCredentials {
    let salt = random_salt();
    UserCredentials {
        id: 1,
        username: UserId::from(username),
        password_digest: hash_password(&salt, password),
        salt,
        created_at: Utc::now(),
    }
}

fn configure_app(user_db: MockUserDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let auth_api = AuthApi::new(user_db);
        let jwt_signer = TokenIssuer::new(&get_auth_config());
        cfg.app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .service(RegisterRoute::<MockUserDb>::new())
            .service(LoginRoute::<MockUserDb>::new());
    }
}

async fn post(user_db: MockUserDb, path: &str, body: Value) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    let app = App::new().configure(configure_app(user_db));
    let app = test::init_service(app).await;
    let (_, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
