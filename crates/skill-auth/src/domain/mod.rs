//! Domain layer: pure checks over bytes and timestamps.

pub mod chain;
pub mod errors;
pub mod freshness;
pub mod policy;
pub mod signature;
pub mod url;
