use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use ah_common::Money;
use auction_engine::{
    db_types::{Auction, AuctionStatus, UserId},
    AuctionQueryApi,
    AuctionStoreError,
    BidFlowApi,
};
use chrono::{Duration, Utc};
use serde_json::json;

use super::{
    helpers::{get_request, post_request, valid_token},
    mocks::{auction_from, sample_auction, MockAuctionDb},
};
use crate::routes::{
    ActiveAuctionsRoute,
    AuctionByIdRoute,
    CloseAuctionRoute,
    CreateAuctionRoute,
    MyBidsRoute,
    PlaceBidRoute,
};

fn new_auction_body() -> serde_json::Value {
    json!({
        "title": "Vintage synthesizer",
        "description": "A well-loved analog synth",
        "starting_price": 100,
        "end_time": (Utc::now() + Duration::hours(1)).to_rfc3339(),
    })
}

#[actix_web::test]
async fn creating_an_auction_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let res = post_request("", "/auctions", new_auction_body(), configure_create).await;
    assert!(res.is_err(), "unauthenticated create was not rejected: {res:?}");
}

#[actix_web::test]
async fn an_authenticated_user_can_create_an_auction() {
    let token = valid_token("alice");
    let (status, body) = post_request(&token, "/auctions", new_auction_body(), configure_create).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let auction: Auction = serde_json::from_str(&body).expect("response is not an auction");
    // The owner comes from the verified token, never from the request body
    assert_eq!(auction.owner, UserId::from("alice"));
    assert_eq!(auction.status, AuctionStatus::Active);
    assert_eq!(auction.current_bid_amount, Money::from(100));
}

#[actix_web::test]
async fn auction_creation_is_validated() {
    let token = valid_token("alice");
    let body = json!({
        "title": "Vintage synthesizer",
        "description": "A well-loved analog synth",
        "starting_price": 100,
        "end_time": (Utc::now() - Duration::hours(1)).to_rfc3339(),
    });
    let (status, body) = post_request(&token, "/auctions", body, configure_create).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("end time must be in the future"), "was: {body}");
}

#[actix_web::test]
async fn placing_a_winning_bid() {
    let token = valid_token("bob");
    let (status, body) =
        post_request(&token, "/auctions/cafebabe/bid", json!({"amount": 150}), configure_bids).await.unwrap();
    assert!(status.is_success(), "was: {status} {body}");
    let auction: Auction = serde_json::from_str(&body).expect("response is not an auction");
    assert_eq!(auction.current_bid_amount, Money::from(150));
    assert_eq!(auction.current_bidder, Some(UserId::from("bob")));
}

#[actix_web::test]
async fn a_low_bid_is_rejected() {
    let token = valid_token("bob");
    let (status, body) =
        post_request(&token, "/auctions/cafebabe/bid", json!({"amount": 100}), configure_bids).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Bid rejected"), "was: {body}");
}

#[actix_web::test]
async fn bidding_on_an_unknown_auction() {
    let token = valid_token("bob");
    let (status, body) =
        post_request(&token, "/auctions/deadbeef/bid", json!({"amount": 150}), configure_missing).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("does not exist"), "was: {body}");
}

#[actix_web::test]
async fn a_contended_auction_reports_unavailable() {
    let token = valid_token("bob");
    let (status, body) =
        post_request(&token, "/auctions/cafebabe/bid", json!({"amount": 150}), configure_contention).await.unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("contention"), "was: {body}");
}

#[actix_web::test]
async fn only_the_owner_may_close() {
    let token = valid_token("mallory");
    let (status, body) =
        post_request(&token, "/auctions/cafebabe/close", json!({}), configure_close).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "was: {body}");
}

#[actix_web::test]
async fn the_owner_closes_their_auction() {
    let token = valid_token("alice");
    let (status, body) =
        post_request(&token, "/auctions/cafebabe/close", json!({}), configure_close).await.unwrap();
    assert!(status.is_success(), "was: {status} {body}");
    let auction: Auction = serde_json::from_str(&body).expect("response is not an auction");
    assert_eq!(auction.status, AuctionStatus::Ended);
}

#[actix_web::test]
async fn the_active_listing_is_public() {
    // Public listings live outside the JWT scope, so no middleware and no token here
    let mut db = MockAuctionDb::new();
    db.expect_fetch_active_auctions().returning(|now| Ok(vec![sample_auction("alice", now)]));
    let app = App::new()
        .app_data(web::Data::new(AuctionQueryApi::new(db)))
        .service(ActiveAuctionsRoute::<MockAuctionDb>::new());
    let app = test::init_service(app).await;
    let req = TestRequest::get().uri("/auctions").to_request();
    let (_, res) = test::call_service(&app, req).await.into_parts();
    assert!(res.status().is_success());
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    let auctions: Vec<Auction> = serde_json::from_str(&body).expect("response is not an auction list");
    assert_eq!(auctions.len(), 1);
    assert_eq!(auctions[0].owner, UserId::from("alice"));
}

#[actix_web::test]
async fn a_single_auction_view_is_public() {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auction().returning(|_| Ok(Some(sample_auction("alice", Utc::now()))));
    db.expect_fetch_bid_history().returning(|_| Ok(vec![]));
    let app = App::new()
        .app_data(web::Data::new(AuctionQueryApi::new(db)))
        .service(AuctionByIdRoute::<MockAuctionDb>::new());
    let app = test::init_service(app).await;
    let req = TestRequest::get().uri("/auctions/cafebabe").to_request();
    let (_, res) = test::call_service(&app, req).await.into_parts();
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn my_bids_reflects_history_membership() {
    let token = valid_token("bob");
    let (status, body) = get_request(&token, "/my/bids", configure_my_bids).await.unwrap();
    assert!(status.is_success(), "was: {status} {body}");
    let auctions: Vec<Auction> = serde_json::from_str(&body).expect("response is not an auction list");
    assert_eq!(auctions.len(), 1);
    assert_eq!(auctions[0].current_bidder, Some(UserId::from("bob")));
}

//----------------------------------------------   App configurations  -----------------------------------------------

fn configure_create(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_insert_auction().returning(|a, now| Ok(auction_from(a, now)));
    cfg.app_data(web::Data::new(BidFlowApi::new(db))).service(CreateAuctionRoute::<MockAuctionDb>::new());
}

fn configure_bids(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auction().returning(|_| Ok(Some(sample_auction("alice", Utc::now()))));
    db.expect_commit_bid().returning(|_, bid, now, version| {
        let mut auction = sample_auction("alice", now);
        auction.current_bid_amount = bid.amount;
        auction.current_bidder = Some(bid.bidder.clone());
        auction.current_bid_time = now;
        auction.version = version + 1;
        Ok(auction)
    });
    cfg.app_data(web::Data::new(BidFlowApi::new(db))).service(PlaceBidRoute::<MockAuctionDb>::new());
}

fn configure_missing(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auction().returning(|_| Ok(None));
    cfg.app_data(web::Data::new(BidFlowApi::new(db))).service(PlaceBidRoute::<MockAuctionDb>::new());
}

fn configure_contention(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auction().returning(|_| Ok(Some(sample_auction("alice", Utc::now()))));
    db.expect_commit_bid().returning(|_, _, _, _| Err(AuctionStoreError::WriteConflict));
    cfg.app_data(web::Data::new(BidFlowApi::new(db))).service(PlaceBidRoute::<MockAuctionDb>::new());
}

fn configure_close(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auction().returning(|_| Ok(Some(sample_auction("alice", Utc::now()))));
    db.expect_finalize_auction().returning(|_, status, now| {
        let mut auction = sample_auction("alice", now);
        auction.status = status;
        auction.version += 1;
        Ok(auction)
    });
    cfg.app_data(web::Data::new(BidFlowApi::new(db))).service(CloseAuctionRoute::<MockAuctionDb>::new());
}

fn configure_my_bids(cfg: &mut ServiceConfig) {
    let mut db = MockAuctionDb::new();
    db.expect_fetch_auctions_with_bids_from().returning(|bidder| {
        let mut auction = sample_auction("alice", Utc::now());
        auction.current_bidder = Some(bidder.clone());
        Ok(vec![auction])
    });
    cfg.app_data(web::Data::new(AuctionQueryApi::new(db))).service(MyBidsRoute::<MockAuctionDb>::new());
}
