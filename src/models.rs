use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Pending,
    Completed,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub content: String,
    pub role: Role,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Locally constructed user message used for the optimistic append.
    pub fn pending_user(chat_id: &str, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            role: Role::User,
            status: MessageStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MockEndpoint {
    pub id: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub response_body: Value,
    pub status_code: u16,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub full_name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Theme::Light => "theme-light",
            Theme::Dark => "theme-dark",
        }
    }
}

// API DTOs

/// Every backend response is wrapped in this envelope.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub status_code: u16,
    pub data: T,
    #[serde(default)]
    pub message: String,
    #[serde(default = "succeeded")]
    pub success: bool,
}

fn succeeded() -> bool {
    true
}

#[derive(Serialize, Debug)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    pub full_name: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub chat_id: &'a str,
    pub message: &'a str,
    pub role: Role,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateData {
    pub model_message: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FetchEndpointsRequest<'a> {
    pub chat_id: &'a str,
}

/// Outcome of calling a generated mock endpoint.
#[derive(Clone, PartialEq, Debug)]
pub struct EndpointTestResult {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_message_list() {
        let raw = json!({
            "statusCode": 200,
            "data": [{
                "id": "m1",
                "chatId": "c1",
                "content": "Create a user API",
                "role": "USER",
                "status": "COMPLETED",
                "createdAt": "2024-01-15T10:30:00Z",
                "updatedAt": "2024-01-15T10:30:00Z"
            }],
            "message": "ok",
            "success": true
        });

        let env: Envelope<Vec<ChatMessage>> = serde_json::from_value(raw).unwrap();
        assert_eq!(env.data.len(), 1);
        assert_eq!(env.data[0].role, Role::User);
        assert_eq!(env.data[0].status, MessageStatus::Completed);
        assert!(env.data[0].is_user());
    }

    #[test]
    fn decodes_endpoint_without_request_body() {
        let raw = json!({
            "id": "e1",
            "method": "GET",
            "path": "/api/users",
            "description": "Get all users",
            "responseBody": { "users": [], "total": 0 },
            "statusCode": 200
        });

        let ep: MockEndpoint = serde_json::from_value(raw).unwrap();
        assert_eq!(ep.request_body, None);
        assert_eq!(ep.response_body["total"], 0);
        assert_eq!(ep.status_code, 200);
    }

    #[test]
    fn generate_request_uses_wire_names() {
        let req = GenerateRequest { chat_id: "c1", message: "hi", role: Role::User };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({ "chatId": "c1", "message": "hi", "role": "USER" }));
    }

    #[test]
    fn pending_user_message_is_pending() {
        let m = ChatMessage::pending_user("c1", "hello");
        assert_eq!(m.status, MessageStatus::Pending);
        assert_eq!(m.chat_id, "c1");
        assert!(m.is_user());
    }

    #[test]
    fn theme_round_trips_through_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
    }
}
