//! # WorkNest API Server Library
//!
//! HTTP surface for WorkNest: authentication, dashboards, task and comment
//! handling for users, and user/task management for admins.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response-level middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
