//! Bangwé La Massiwa API - Backend for a Comoros products and services marketplace
//!
//! This crate provides the REST API for the marketplace, enabling:
//! - Referents listing products and services for their zone, under admin moderation
//! - Customers browsing, rating and wishlisting approved items
//! - A small blog with categories and tags
//! - Contact forms relayed by email and image uploads to an external host

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
