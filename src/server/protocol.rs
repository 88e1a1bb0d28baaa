use serde::Serialize;

use crate::game::{GameView, Input};

/// Complete game picture sent to a client on connect.
#[derive(Debug, Clone, Serialize)]
pub struct ViewMessage<'a> {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    #[serde(flatten)]
    pub view: &'a GameView,
}

/// Reply to a client frame that is not a valid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub message: String,
}

/// Health endpoint response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus<'a> {
    pub status: &'static str,
    pub connected_clients: usize,
    pub view: &'a GameView,
}

pub fn build_view_json(view: &GameView) -> String {
    let message = ViewMessage {
        message_type: "view",
        view,
    };
    serde_json::to_string(&message).unwrap_or_else(|_| "{}".to_string())
}

pub fn build_error_json(message: impl Into<String>) -> String {
    let message = ErrorMessage {
        message_type: "error",
        message: message.into(),
    };
    serde_json::to_string(&message).unwrap_or_else(|_| "{}".to_string())
}

pub fn build_health_json(view: &GameView, connected_clients: usize) -> String {
    let status = HealthStatus {
        status: "ok",
        connected_clients,
        view,
    };
    serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string())
}

/// Decode one client text frame.
pub fn parse_input(text: &str) -> Result<Input, String> {
    serde_json::from_str(text).map_err(|e| format!("invalid input: {}", e))
}
