//! Common types, protocol definitions, and errors shared across `codecon-backend` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
