//! CEK request envelope.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Request body sent by Clova to an extension.
#[derive(Debug, Clone, Deserialize)]
pub struct ClovaRequest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub context: Context,
    pub request: RequestBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub session_attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: System,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct System {
    #[serde(default)]
    pub application: Application,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// The request category, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum RequestBody {
    #[serde(rename = "LaunchRequest")]
    Launch,
    #[serde(rename = "IntentRequest")]
    Intent { intent: Intent },
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded,
    #[serde(rename = "EventRequest")]
    Event {
        #[serde(default)]
        event: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: Option<HashMap<String, Slot>>,
}

/// A parameter extracted from the user's utterance.
#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ClovaRequest {
    /// Name of the intent, if this is an intent request.
    pub fn intent_name(&self) -> Option<&str> {
        match &self.request {
            RequestBody::Intent { intent } => Some(intent.name.as_str()),
            _ => None,
        }
    }

    /// Value of the named slot. Absent slots and null values are `None`.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        match &self.request {
            RequestBody::Intent { intent } => intent
                .slots
                .as_ref()?
                .get(name)?
                .value
                .as_deref(),
            _ => None,
        }
    }

    pub fn is_new_session(&self) -> bool {
        self.session.new
    }

    pub fn application_id(&self) -> &str {
        &self.context.system.application.application_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.context
            .system
            .user
            .as_ref()
            .or(self.session.user.as_ref())
            .map(|u| u.user_id.as_str())
    }
}
