//! FinSight server library.
//!
//! Financial document intake and analysis: authenticated upload to object
//! storage, LLM-backed extraction of text, summaries and metrics, and
//! stateless analytics helpers.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
