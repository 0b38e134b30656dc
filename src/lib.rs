//! User Registration Backend Library
//!
//! User account management over a relational store, with password login,
//! short-lived access tokens and rotating refresh tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod registration;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
