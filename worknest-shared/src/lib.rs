//! # WorkNest Shared Library
//!
//! This crate contains the domain model, data access and business rules used
//! by the WorkNest API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their query functions
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `services`: User, task and comment business rules
//! - `auth`: Password hashing, JWT, auth context and access policy
//! - `db`: Connection pooling and migrations
//! - `seed`: Bootstrap data loaded at startup

pub mod auth;
pub mod db;
pub mod models;
pub mod seed;
pub mod services;
pub mod store;

/// Current version of the WorkNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
