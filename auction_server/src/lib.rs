//! # Auction house server
//! This crate hosts the REST front-end for the auction engine. It is responsible for:
//! * Authenticating participants and issuing short-lived JWT access tokens.
//! * Translating HTTP requests into engine calls, stamping each one with the server's clock.
//! * Mapping engine outcomes onto HTTP status codes and JSON bodies.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Public routes:
//! * `GET /health`: liveness check.
//! * `POST /auth/register`, `POST /auth/login`: account registration and token issuance.
//! * `GET /auctions`, `GET /auctions/{id}`: public auction listings.
//!
//! Routes under `/api` require a valid access token.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
