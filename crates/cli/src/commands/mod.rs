pub mod analyze;
pub mod gaps;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct FailureOutcome {
    command: String,
    status: String,
    error_class: String,
    message: String,
}

impl CommandResult {
    pub fn success(payload: &impl Serialize) -> Self {
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = FailureOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: error_class.to_string(),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload(payload: &impl Serialize) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        format!(
            "{{\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
