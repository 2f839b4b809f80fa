//! Message module.
//!
//! This module contains everything related to stored messages.

pub mod message;
pub use message::*;
