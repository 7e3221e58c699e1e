//! A mock of the ESIA (Gosuslugi) OAuth2 identity provider.
//!
//! Client applications can run the full authorization-code flow against this
//! server and receive stable synthetic person records, without touching the real
//! government service. All state lives in memory and is lost on restart.

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod oauth2;
