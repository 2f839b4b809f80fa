//! Message module.
//!
//! This module contains the representation of a stored message and
//! its on-disk record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::new_id;

/// Represents a stored message.
///
/// The serialized form uses the field names of the message store
/// file (`remitente`, `destinatario`, `asunto`, `cuerpo`). Missing
/// text fields decode as empty strings and a missing id is freshly
/// generated.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Represents the message identifier.
    #[serde(default = "new_id")]
    pub id: String,
    /// Represents the sender address.
    #[serde(rename = "remitente", default)]
    pub sender: String,
    /// Represents the recipient address.
    #[serde(rename = "destinatario", default)]
    pub recipient: String,
    /// Represents the subject.
    #[serde(rename = "asunto", default)]
    pub subject: String,
    /// Represents the body.
    #[serde(rename = "cuerpo", default)]
    pub body: String,
}

impl Message {
    pub fn new<S, R, T, B>(sender: S, recipient: R, subject: T, body: B) -> Self
    where
        S: ToString,
        R: ToString,
        T: ToString,
        B: ToString,
    {
        Self {
            id: new_id(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    /// Replaces the generated identifier with the given one.
    pub fn with_id<I: ToString>(mut self, id: I) -> Self {
        self.id = id.to_string();
        self
    }

    /// Checks if the subject or the sender contains the given term,
    /// ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.subject.to_lowercase().contains(&term) || self.sender.to_lowercase().contains(&term)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.sender)
    }
}
