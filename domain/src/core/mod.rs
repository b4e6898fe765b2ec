//! Core domain concepts shared across all subdomains.
//!
//! - [`domain::Domain`]: the closed set of expert subject areas
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: truncation and similarity-key helpers

pub mod domain;
pub mod error;
pub mod string;
