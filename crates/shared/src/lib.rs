//! Wire types shared between the dashboard client crates.

pub mod domain;
pub mod error;
pub mod protocol;
