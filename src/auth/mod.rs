//! # Authentication Module
//!
//! Password hashing, JWT token issuance and validation, and the middleware
//! that gates protected endpoints.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
