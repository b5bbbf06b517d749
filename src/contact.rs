//! Contact form payload
//!
//! The form posts `{name, email, message}` as JSON. This module validates
//! the payload and maps outcomes onto the endpoint's status contract; mail
//! delivery itself is somebody else's job, handed in as a closure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Contact request failures
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("malformed contact payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl ContactError {
    /// HTTP status for this failure
    ///
    /// Only missing fields are the caller's fault; a body that is not JSON
    /// fails inside the handler and is reported like a delivery failure.
    pub fn status(&self) -> u16 {
        match self {
            ContactError::MissingFields => 400,
            ContactError::Malformed(_) | ContactError::Delivery(_) => 500,
        }
    }

    /// Message shown to the visitor
    pub fn public_message(&self) -> &'static str {
        match self {
            ContactError::MissingFields => "Missing required fields",
            ContactError::Malformed(_) | ContactError::Delivery(_) => "Error sending message",
        }
    }
}

/// A validated contact submission
///
/// Absent and `null` fields both read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ContactRequest {
    /// Parse and validate a JSON body; every field must be present and non-empty
    pub fn parse(body: &str) -> Result<Self, ContactError> {
        let request: ContactRequest = serde_json::from_str(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.is_empty() || self.email.is_empty() || self.message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        Ok(())
    }
}

/// Status and JSON body to send back
#[derive(Debug, Clone, PartialEq)]
pub struct ContactReply {
    pub status: u16,
    pub body: Value,
}

/// Handle one submission end to end
pub fn handle<F>(body: &str, deliver: F) -> ContactReply
where
    F: FnOnce(&ContactRequest) -> Result<(), String>,
{
    let result = ContactRequest::parse(body)
        .and_then(|request| deliver(&request).map_err(ContactError::Delivery));

    match result {
        Ok(()) => ContactReply {
            status: 200,
            body: json!({ "success": true }),
        },
        Err(err) => {
            if err.status() >= 500 {
                log::error!("Contact submission failed: {}", err);
            }
            ContactReply {
                status: err.status(),
                body: json!({ "error": err.public_message() }),
            }
        }
    }
}
