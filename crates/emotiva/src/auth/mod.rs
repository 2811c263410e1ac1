//! # Account credentials
//!
//! - [`password`]: Argon2id hashing and verification for the email + password flow.

pub mod password;

pub use password::{hash_password, verify_password};
