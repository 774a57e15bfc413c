//! Inbound request envelope.
//!
//! The platform posts one of three request kinds to a skill endpoint:
//! `LaunchRequest`, `IntentRequest` or `SessionEndedRequest`. The `type` field is
//! kept as the raw string so that unknown kinds still decode and can be
//! rejected by the request gate with a precise reason.

use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form attributes the skill carries from one turn of a session to the next.
///
/// Key order and number text are kept as received.
pub type SessionAttributes = serde_json::Map<String, serde_json::Value>;

/// The full request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(rename = "request")]
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub application: Application,
    #[serde(default)]
    pub attributes: SessionAttributes,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,
}

/// The `request` block of the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: String,
    /// ISO-8601 / RFC 3339 timestamp, possibly with fractional seconds.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: BTreeMap<String, Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The request kinds a skill endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
}

impl RequestKind {
    /// Map the wire `type` string to a known kind.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "LaunchRequest" => Some(Self::Launch),
            "IntentRequest" => Some(Self::Intent),
            "SessionEndedRequest" => Some(Self::SessionEnded),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Launch => "LaunchRequest",
            Self::Intent => "IntentRequest",
            Self::SessionEnded => "SessionEndedRequest",
        }
    }
}

/// Why the platform ended a session (`reason` on a `SessionEndedRequest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndedReason {
    UserInitiated,
    Error,
    ExceededMaxReprompts,
}

impl SessionEndedReason {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "USER_INITIATED" => Some(Self::UserInitiated),
            "ERROR" => Some(Self::Error),
            "EXCEEDED_MAX_REPROMPTS" => Some(Self::ExceededMaxReprompts),
            _ => None,
        }
    }
}

impl SkillRequest {
    /// Decode an envelope from the exact bytes received on the wire.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(EnvelopeError::Decode)
    }

    pub fn to_json_string(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(EnvelopeError::Encode)
    }

    /// The request kind, or `None` if the platform sent a type we do not handle.
    pub fn kind(&self) -> Option<RequestKind> {
        RequestKind::from_wire(&self.body.request_type)
    }

    pub fn is_launch_request(&self) -> bool {
        self.kind() == Some(RequestKind::Launch)
    }

    pub fn is_intent_request(&self) -> bool {
        self.kind() == Some(RequestKind::Intent)
    }

    pub fn is_session_ended_request(&self) -> bool {
        self.kind() == Some(RequestKind::SessionEnded)
    }

    /// Application identifier declared in the session block, if any.
    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.application.application_id.as_str())
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.body.intent.as_ref().map(|i| i.name.as_str())
    }

    /// Value of a named slot on the intent, if present and filled.
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.body
            .intent
            .as_ref()
            .and_then(|i| i.slots.get(slot))
            .and_then(|s| s.value.as_deref())
    }

    pub fn session_attributes(&self) -> Option<&SessionAttributes> {
        self.session.as_ref().map(|s| &s.attributes)
    }

    pub fn termination_reason(&self) -> Option<SessionEndedReason> {
        self.body
            .reason
            .as_deref()
            .and_then(SessionEndedReason::from_wire)
    }

    pub fn session_termination_was_user_initiated(&self) -> bool {
        self.termination_reason() == Some(SessionEndedReason::UserInitiated)
    }

    pub fn session_termination_is_due_to_error(&self) -> bool {
        self.termination_reason() == Some(SessionEndedReason::Error)
    }

    pub fn session_termination_is_due_to_max_reprompts(&self) -> bool {
        self.termination_reason() == Some(SessionEndedReason::ExceededMaxReprompts)
    }
}
