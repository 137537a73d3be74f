//! Pagewarden Kernel Library
//!
//! Role-based page access for the admin dashboard: access key derivation,
//! pattern matching, menu filtering, and the route guard, served over HTTP.
//! The main entry point for running the server is the `pagewarden` binary.

pub mod access;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod menu;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod theme;
