use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: &'static str,
}

/// Generic API message response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}

impl GenericMessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Incoming subscription form payload.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/subscribe-request.ts"
)]
pub struct SubscribeRequest {
    pub email: String,
    pub mailing_list_id: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Extra form fields stored on the contact once confirmed.
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub fields: Option<Map<String, Value>>,
}

/// Incoming unsubscribe form payload.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/unsubscribe-request.ts"
)]
pub struct UnsubscribeRequest {
    pub email: String,
    pub mailing_list_id: String,
}

/// Query string of the emailed subscribe verification link.
#[derive(Debug, Deserialize)]
pub struct VerifySubscribeQuery {
    pub token: String,
}

/// Query string of the emailed unsubscribe verification link.
#[derive(Debug, Deserialize)]
pub struct VerifyUnsubscribeQuery {
    pub cid: String,
    pub uid: String,
    pub mlid: String,
}

/// Confirmed subscription payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verify-subscribe-response.ts"
)]
pub struct VerifySubscribeResponse {
    pub contact_id: String,
    pub mailing_list_id: String,
    pub message: String,
}
