//! Folder module.
//!
//! This module contains everything related to the folder tree.

pub mod folder;
pub use folder::*;

pub mod folders;
pub use folders::*;
