//! CLI command implementations.

pub mod add;
pub mod check;
pub mod common;
pub mod connect;
pub mod new;
pub mod plan;
pub mod sessions;
pub mod units;
