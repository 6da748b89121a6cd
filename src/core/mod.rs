//! Core business logic - framework-agnostic clinic operations.
//!
//! Every function takes a database connection and returns domain models or
//! [`crate::errors::Error`]. The HTTP layer only parses requests and checks roles.

/// Animals and their medical history
pub mod animal;
/// Token issuing, verification, role checks and password hashing
pub mod auth;
/// Client portal booking flow
pub mod booking;
/// Disease catalogue
pub mod disease;
/// Pet owners
pub mod owner;
/// Date parsing and report period normalization
pub mod period;
/// Service price resolution shared by visits and reports
pub mod pricing;
/// Revenue report aggregation
pub mod report;
/// Service price catalogue
pub mod service;
/// User accounts
pub mod user;
/// Visits and their service lists
pub mod visit;
