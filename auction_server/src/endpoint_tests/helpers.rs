use actix_jwt_auth_middleware::AuthenticationService;
use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{DateTime, Duration, Utc};
use jwt_compact::{alg::Hs256, AlgorithmExt, Claims, Header};
use log::debug;
use serde_json::Value;

use crate::{
    auth::{build_auction_authority, JwtClaims},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("test-only-hs256-key-0123456789abcdef")
}

pub fn issue_token(claims: JwtClaims, expiry: DateTime<Utc>) -> String {
    let config = get_auth_config();
    let header = Header::empty().with_token_type("JWT");
    let mut claims = Claims::new(claims);
    claims.expiration = Some(expiry);
    Hs256.token(&header, &claims, &config.hs256_key()).expect("Failed to sign token")
}

pub fn valid_token(username: &str) -> String {
    issue_token(JwtClaims { sub: username.into() }, Utc::now() + Duration::hours(1))
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !auth_header.is_empty() {
        req = req.insert_header(("access_token", auth_header));
    }
    send_request(req, configure).await
}

pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !auth_header.is_empty() {
        req = req.insert_header(("access_token", auth_header));
    }
    send_request(req, configure).await
}

async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    let config = get_auth_config();
    let authority = build_auction_authority(config);
    let app = App::new().wrap(AuthenticationService::new(authority)).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
