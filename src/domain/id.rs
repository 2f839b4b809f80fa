//! Id module.
//!
//! Every entity (message, folder, server node) is identified by an
//! opaque string. Fresh ones are v4 uuids in their simple form (32
//! lowercase hex chars, no hyphens), which keeps them compatible with
//! the ids already present in existing data files.

use uuid::Uuid;

/// Generates a fresh entity identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_simple().to_string()
}
