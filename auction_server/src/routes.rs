//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler samples the server clock exactly once, at the top, and passes that timestamp into the engine. The
//! engine itself never consults a clock, so all deadline decisions for a single request are made against one instant.

use actix_web::{get, web, HttpResponse, Responder};
use auction_engine::{
    db_types::{AuctionId, NewAuction, UserId},
    AuctionQueryApi,
    AuctionStore,
    AuthApi,
    BidFlowApi,
    UserAuth,
};
use chrono::Utc;
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{AuthResponse, BidParams, JsonResponse, LoginParams, NewAuctionParams, RegisterParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl UserAuth);
/// Registers a new participant. The cleartext password is hashed inside the engine; it never touches disk.
pub async fn register<B: UserAuth>(
    body: web::Json<RegisterParams>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    let username = UserId::from(params.username.as_str());
    api.register_user(&username, &params.password).await?;
    debug!("💻️ Registered new user {username}");
    Ok(HttpResponse::Created().json(JsonResponse::success(format!("User {username} registered"))))
}

route!(login => Post "/auth/login" impl UserAuth);
/// Verifies a username/password pair and issues a JWT access token for it.
///
/// The token carries the verified username as its subject and is what the `/api` routes require. It is valid for a
/// fixed period and will NOT refresh.
pub async fn login<B: UserAuth>(
    body: web::Json<LoginParams>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    let username = UserId::from(params.username.as_str());
    let user = api.verify_credentials(&username, &params.password).await?;
    let token = signer.issue_token(user, None)?;
    trace!("💻️ Issued access token for {username}");
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

//----------------------------------------------   Auctions (write side)  --------------------------------------------
route!(create_auction => Post "/auctions" impl AuctionStore);
pub async fn create_auction<B: AuctionStore>(
    claims: JwtClaims,
    body: web::Json<NewAuctionParams>,
    api: web::Data<BidFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let params = body.into_inner();
    debug!("💻️ POST create_auction '{}' by {}", params.title, claims.sub);
    let mut auction = NewAuction::new(&params.title, &params.description, params.starting_price, claims.sub, params.end_time);
    if let Some(url) = &params.image_url {
        auction = auction.with_image_url(url);
    }
    let auction = api.create_auction(auction, now).await?;
    Ok(HttpResponse::Created().json(auction))
}

route!(place_bid => Post "/auctions/{id}/bid" impl AuctionStore);
/// Submits a bid on behalf of the authenticated user. The response is the auction as it stands after the bid was
/// accepted; rejected bids report the reason with a 400 status and leave the auction untouched.
pub async fn place_bid<B: AuctionStore>(
    claims: JwtClaims,
    path: web::Path<AuctionId>,
    body: web::Json<BidParams>,
    api: web::Data<BidFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let auction_id = path.into_inner();
    let amount = body.into_inner().amount;
    debug!("💻️ POST bid of {amount} on [{auction_id}] by {}", claims.sub);
    let auction = api.place_bid(&auction_id, claims.sub, amount, now).await?;
    Ok(HttpResponse::Ok().json(auction))
}

route!(close_auction => Post "/auctions/{id}/close" impl AuctionStore);
pub async fn close_auction<B: AuctionStore>(
    claims: JwtClaims,
    path: web::Path<AuctionId>,
    api: web::Data<BidFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let auction_id = path.into_inner();
    debug!("💻️ POST close [{auction_id}] by {}", claims.sub);
    let auction = api.close_auction(&auction_id, &claims.sub, now).await?;
    Ok(HttpResponse::Ok().json(auction))
}

route!(cancel_auction => Post "/auctions/{id}/cancel" impl AuctionStore);
pub async fn cancel_auction<B: AuctionStore>(
    claims: JwtClaims,
    path: web::Path<AuctionId>,
    api: web::Data<BidFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let auction_id = path.into_inner();
    debug!("💻️ POST cancel [{auction_id}] by {}", claims.sub);
    let auction = api.cancel_auction(&auction_id, &claims.sub, now).await?;
    Ok(HttpResponse::Ok().json(auction))
}

//----------------------------------------------   Auctions (read side)  ---------------------------------------------
route!(active_auctions => Get "/auctions" impl AuctionStore);
/// Lists auctions that are open for bidding right now, newest first. Public route.
pub async fn active_auctions<B: AuctionStore>(
    api: web::Data<AuctionQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let auctions = api.active_auctions(now).await?;
    Ok(HttpResponse::Ok().json(auctions))
}

route!(auction_by_id => Get "/auctions/{id}" impl AuctionStore);
/// Fetches a single auction with its full bid history. Public route.
pub async fn auction_by_id<B: AuctionStore>(
    path: web::Path<AuctionId>,
    api: web::Data<AuctionQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let now = Utc::now();
    let auction_id = path.into_inner();
    trace!("💻️ GET auction [{auction_id}]");
    let auction = api.auction(&auction_id, now).await?;
    Ok(HttpResponse::Ok().json(auction))
}

route!(my_auctions => Get "/my/auctions" impl AuctionStore);
pub async fn my_auctions<B: AuctionStore>(
    claims: JwtClaims,
    api: web::Data<AuctionQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_auctions for {}", claims.sub);
    let auctions = api.auctions_for_owner(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(auctions))
}

route!(my_bids => Get "/my/bids" impl AuctionStore);
/// Lists the auctions the authenticated user has bid on, whether or not they are currently the leading bidder.
pub async fn my_bids<B: AuctionStore>(
    claims: JwtClaims,
    api: web::Data<AuctionQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_bids for {}", claims.sub);
    let auctions = api.auctions_with_bids_from(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(auctions))
}
