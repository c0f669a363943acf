use std::time::Duration;

use actix_jwt_auth_middleware::use_jwt::UseJWTOnApp;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use auction_engine::{AuctionQueryApi, AuthApi, BidFlowApi, SqliteDatabase};

use crate::{
    auth::{build_auction_authority, TokenIssuer},
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        ActiveAuctionsRoute,
        AuctionByIdRoute,
        CancelAuctionRoute,
        CloseAuctionRoute,
        CreateAuctionRoute,
        LoginRoute,
        MyAuctionsRoute,
        MyBidsRoute,
        PlaceBidRoute,
        RegisterRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let bid_flow_api = BidFlowApi::new(db.clone());
        let query_api = AuctionQueryApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let authority = build_auction_authority(config.auth.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ah::access_log"))
            .app_data(web::Data::new(bid_flow_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer));
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .service(CreateAuctionRoute::<SqliteDatabase>::new())
            .service(PlaceBidRoute::<SqliteDatabase>::new())
            .service(CloseAuctionRoute::<SqliteDatabase>::new())
            .service(CancelAuctionRoute::<SqliteDatabase>::new())
            .service(MyAuctionsRoute::<SqliteDatabase>::new())
            .service(MyBidsRoute::<SqliteDatabase>::new());
        app.use_jwt(authority.clone(), auth_scope)
            .service(health)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ActiveAuctionsRoute::<SqliteDatabase>::new())
            .service(AuctionByIdRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
