//! Outbound response envelope.

use crate::errors::EnvelopeError;
use crate::request::{SessionAttributes, SkillRequest};
use crate::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Only speech type the platform supports at protocol version 1.0.
const PLAIN_TEXT: &str = "PlainText";
/// Only card type the platform supports at protocol version 1.0.
const SIMPLE_CARD: &str = "Simple";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<SessionAttributes>,
    #[serde(rename = "response")]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub text: String,
}

impl OutputSpeech {
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self {
            speech_type: PLAIN_TEXT.to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Card {
    pub fn simple(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let content = content.into();
        Self {
            card_type: SIMPLE_CARD.to_string(),
            title: (!title.is_empty()).then_some(title),
            content: (!content.is_empty()).then_some(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
}

impl Reprompt {
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self {
            output_speech: Some(OutputSpeech::plain_text(text)),
        }
    }
}

impl SkillResponse {
    /// Start a response to `request`.
    ///
    /// Session attributes are carried forward unchanged and the session is
    /// ended unless the handler keeps it open.
    pub fn for_request(request: &SkillRequest) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            session_attributes: request
                .session_attributes()
                .filter(|attrs| !attrs.is_empty())
                .cloned(),
            body: ResponseBody {
                output_speech: None,
                card: None,
                reprompt: None,
                should_end_session: true,
            },
        }
    }

    pub fn with_speech(mut self, text: impl Into<String>) -> Self {
        self.body.output_speech = Some(OutputSpeech::plain_text(text));
        self
    }

    pub fn with_card(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.body.card = Some(Card::simple(title, content));
        self
    }

    pub fn with_reprompt(mut self, text: impl Into<String>) -> Self {
        self.body.reprompt = Some(Reprompt::plain_text(text));
        self
    }

    pub fn end_session(mut self, end: bool) -> Self {
        self.body.should_end_session = end;
        self
    }

    /// Set an attribute to be carried into the next turn of the session.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.session_attributes
            .get_or_insert_with(SessionAttributes::new)
            .insert(key.into(), value);
    }

    pub fn to_json_string(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(EnvelopeError::Encode)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(EnvelopeError::Encode)
    }
}
