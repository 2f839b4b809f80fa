//! Server module.
//!
//! This module contains everything related to mail server nodes.

pub mod server;
pub use server::*;
