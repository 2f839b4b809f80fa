//! Server node module.
//!
//! This module contains the representation of a mail server node of
//! the server graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::new_id;

/// Represents a mail server node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServerNode {
    /// Represents the node identifier.
    #[serde(default = "new_id")]
    pub id: String,
    /// Represents the node name.
    #[serde(rename = "nombre", default)]
    pub name: String,
}

impl ServerNode {
    pub fn new<N: ToString>(name: N) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
        }
    }

    /// Replaces the generated identifier with the given one.
    pub fn with_id<I: ToString>(mut self, id: I) -> Self {
        self.id = id.to_string();
        self
    }
}

impl fmt::Display for ServerNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
