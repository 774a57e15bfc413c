//! # Skill Types Crate
//!
//! JSON envelopes exchanged with the voice-assistant platform.
//!
//! - [`request`]: the inbound request envelope (session, application identity,
//!   request type, timestamp, intent and slots).
//! - [`response`]: the outbound response envelope (speech, card, reprompt and
//!   the end-of-session flag).
//!
//! These types carry no authentication logic. The raw bytes of a request must
//! be verified by `skill-auth` before they are decoded into a [`SkillRequest`].

pub mod errors;
pub mod request;
pub mod response;

pub use errors::EnvelopeError;
pub use request::{
    Application, Intent, RequestBody, RequestKind, Session, SessionAttributes, SessionEndedReason,
    SkillRequest, Slot, User,
};
pub use response::{Card, OutputSpeech, Reprompt, ResponseBody, SkillResponse};

/// Protocol version written into every response envelope.
pub const PROTOCOL_VERSION: &str = "1.0";
