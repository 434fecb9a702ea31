//! Profile Progress API Library
//!
//! This library provides the core functionality for the profile-completion
//! progress service: the pure progress engine that scores partially-filled
//! dating profiles, the gate heuristics that decide whether a profile is
//! complete enough for navigation, and the thin HTTP surface around them.
//!
//! # Modules
//!
//! - `circuit_breaker`: Circuit breaker for the upstream profile API.
//! - `completion`: The three "complete enough" gate heuristics.
//! - `config`: Configuration management.
//! - `draft_store`: Checksum-sealed per-user draft storage.
//! - `errors`: Error handling types.
//! - `fields`: Step table and form/server field mapping.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `profile_client`: Upstream profile API client.
//! - `progress`: The progress engine (merge, classify, aggregate).

pub mod circuit_breaker;
pub mod completion;
pub mod config;
pub mod draft_store;
pub mod errors;
pub mod fields;
pub mod handlers;
pub mod models;
pub mod profile_client;
pub mod progress;
