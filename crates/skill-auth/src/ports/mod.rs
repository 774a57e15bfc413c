//! # Ports Layer
//!
//! - Inbound: [`inbound::RequestAuthenticator`], the API the HTTP layer calls.
//! - Outbound: [`outbound::CertificateFetcher`] and [`outbound::TimeSource`],
//!   the dependencies the gate is given.

pub mod inbound;
pub mod outbound;
