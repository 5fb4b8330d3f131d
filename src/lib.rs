//! Rust client library for the `CallTrack` billing API.
//!
//! This crate provides a typed client for the `CallTrack` telecom billing
//! backend together with the transaction reporting pipeline it feeds:
//! load → normalize → filter → sort → paginate → CSV export.
//!
//! The pipeline is a pure, in-memory transform over a
//! [`collection::TransactionCollection`]; the only suspension points are
//! the HTTP loads in [`client`].

pub mod collection;
pub mod error;
pub mod export;
pub mod models;
pub mod report;

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
