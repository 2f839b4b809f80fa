//! Network module.
//!
//! This module contains the persisted graph of mail servers and the
//! route computation used to simulate message delivery across it.

pub mod graph;
pub use graph::*;

pub mod path;
pub use path::{bfs_path, dfs_path, Adjacency};

pub mod delivery;
pub use delivery::*;
