//! The "hello" example skill.

use skill_gateway::SkillEndpoint;
use skill_types::{RequestKind, SkillRequest, SkillResponse};
use tracing::info;

pub const SAY_HELLO_INTENT: &str = "SayHello";

/// Answers launch with a greeting and `SayHello` with speech plus a card.
pub fn hello_handler(_endpoint: &SkillEndpoint, request: &SkillRequest) -> SkillResponse {
    let response = SkillResponse::for_request(request);

    match request.kind() {
        Some(RequestKind::Launch) => {
            info!("Launch request");
            response.with_speech("Your friendly neighborhood hello service is ready for commands.")
        }
        Some(RequestKind::Intent) => {
            let intent = request.intent_name().unwrap_or_default();
            info!(intent, "Intent request");
            match intent {
                SAY_HELLO_INTENT => response
                    .with_speech("Hi there!")
                    .with_card("Hi there", "You asked me to say hello."),
                _ => response.with_speech("Unknown command."),
            }
        }
        Some(RequestKind::SessionEnded) => {
            info!(reason = ?request.termination_reason(), "Session ended request");
            response
        }
        None => response,
    }
}
