//! Store module.
//!
//! This module contains the persisted message store: every message
//! plus the folder tree they are filed in.

pub mod store;
pub use store::*;
