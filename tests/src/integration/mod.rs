//! Cross-crate scenarios. Everything runs in-process against the fixture PKI
//! from `skill_auth::testing`; no sockets or real network.

pub mod gate_flows;
pub mod gateway_e2e;
