//! # Crypto Core Library
//!
//! Shared cryptographic primitives for Feria services
//!
//! ## Modules
//! - `jwt`: bearer token codec (HS256 mint/verify/claims)
//! - `hash`: SHA-256 helpers for token denylist keys

pub mod hash;
pub mod jwt;

pub use jwt::{Claims, TokenCodec, TokenError};
