//! JWT issuance and verification for the REST API.
//!
//! Tokens are HS256-signed with the server's [`AuthConfig`] key. The only claim the rest of the system consumes is
//! the verified username, which handlers receive as a [`JwtClaims`] extractor once the middleware has validated the
//! token.

use std::time::Duration;

use actix_jwt_auth_middleware::{Authority, FromRequest, TokenSigner};
use actix_web::{error::Error as ActixWebError, Handler};
use auction_engine::db_types::UserId;
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    Header,
};
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

const TOKEN_VALIDITY: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRequest)]
pub struct JwtClaims {
    pub sub: UserId,
}

fn build_jwt_signer(jwt_key: Hs256Key) -> TokenSigner<JwtClaims, Hs256> {
    let header = Header::empty().with_token_type("JWT");
    TokenSigner::new()
        .signing_key(jwt_key)
        .algorithm(Hs256)
        .header(header)
        .build()
        .expect("Failed to build token signer")
}

pub fn build_auction_authority(
    auth_config: AuthConfig,
) -> Authority<JwtClaims, Hs256, impl Handler<(), Output = Result<(), ActixWebError>> + Clone, ()> {
    let jwt_key = auth_config.hs256_key();
    let token_signer = build_jwt_signer(jwt_key.clone());
    Authority::<JwtClaims, Hs256, _, _>::new()
        .refresh_authorizer(|| async { Ok(()) })
        .enable_header_tokens(true)
        .algorithm(Hs256)
        .verifying_key(jwt_key)
        .token_signer(Some(token_signer))
        .build()
        .expect("Failed to build authority")
}

pub struct TokenIssuer {
    signer: TokenSigner<JwtClaims, Hs256>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let signer = build_jwt_signer(config.hs256_key());
        Self { signer }
    }

    /// Issue a new access token for the given verified identity.
    /// This method DOES NOT verify credentials. That must be done prior to calling `issue_token`.
    pub fn issue_token(&self, user: UserId, duration: Option<Duration>) -> Result<String, AuthError> {
        let claim = JwtClaims { sub: user };
        let duration = duration.unwrap_or(TOKEN_VALIDITY);
        let token =
            self.signer.create_signed_token(&claim, duration).map_err(|e| AuthError::ValidationError(format!("{e:?}")))?;
        Ok(token)
    }
}
