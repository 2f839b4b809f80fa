pub mod config;
pub use config::{Config, DEFAULT_GRAPH_FILE, DEFAULT_ROOT_FOLDER, DEFAULT_STORE_FILE};

pub mod persist;

pub mod shared;
pub use shared::Shared;

pub mod domain;
pub use domain::*;

pub mod store;
pub use store::{MessageEntry, SearchHit, Store};

pub mod network;
pub use network::{
    bfs_path, dfs_path, Adjacency, Algorithm, Connection, Delivery, ServerGraph,
};
