//! Server graph module.
//!
//! This module contains the server graph service: named server nodes
//! linked by adjacency sets, rewritten to its file after every
//! mutation.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::{bfs_path, dfs_path, persist, Adjacency, ServerNode};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PersistError(#[from] persist::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the on-disk form of the graph.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    nodes: Vec<ServerNode>,
    #[serde(default)]
    adj: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    nodes: Vec<&'a ServerNode>,
    adj: &'a Adjacency,
}

/// Represents one adjacency entry of the graph. An undirected edge
/// gives two connections, one per direction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

/// Represents the graph of mail servers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerGraph {
    /// Represents the path of the graph file.
    path: PathBuf,
    /// Represents the server nodes, by id.
    nodes: HashMap<String, ServerNode>,
    /// Represents the node ids in insertion order.
    order: Vec<String>,
    /// Represents the neighbour ids of every node, by node id.
    adj: Adjacency,
}

impl ServerGraph {
    /// Builds an empty graph bound to the given file, without
    /// touching the file system.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            nodes: HashMap::new(),
            order: Vec::new(),
            adj: Adjacency::new(),
        }
    }

    /// Loads the graph from the given file. A missing file gives an
    /// empty graph, a malformed one gives an error.
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut graph = Self::new(path);

        if let Some(snapshot) = persist::load::<Snapshot, _>(&graph.path)? {
            for node in snapshot.nodes {
                graph.insert_node(node);
            }
            for (id, neighbours) in snapshot.adj {
                graph.adj.entry(id).or_default().extend(neighbours);
            }
        }

        debug!(
            "server graph {:?} opened with {} node(s)",
            graph.path,
            graph.order.len()
        );

        Ok(graph)
    }

    /// Loads the graph from the given file. Never fails: any error is
    /// logged and an empty graph is returned instead.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::try_open(path).unwrap_or_else(|err| {
            warn!("cannot open server graph {:?}, starting empty: {}", path, err);
            Self::new(path)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adj
    }

    /// Writes the whole graph to its file.
    pub fn save(&self) -> Result<()> {
        let snapshot = SnapshotRef {
            nodes: self.list_servers(),
            adj: &self.adj,
        };
        persist::save(&self.path, &snapshot)?;
        Ok(())
    }

    fn insert_node(&mut self, node: ServerNode) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Adds a server node with a fresh id and no connection.
    pub fn add_node(&mut self, name: &str) -> Result<ServerNode> {
        let node = ServerNode::new(name);
        self.adj.entry(node.id.clone()).or_default();
        self.insert_node(node.clone());
        info!("server {} added as {}", node.name, node.id);

        self.save()?;
        Ok(node)
    }

    /// Connects node `a` to node `b`, and `b` back to `a` unless the
    /// edge is directed. Returns `false` without any change if one of
    /// the nodes does not exist.
    pub fn add_edge(&mut self, a: &str, b: &str, directed: bool) -> Result<bool> {
        if !self.contains(a) || !self.contains(b) {
            debug!("cannot connect {} to {}: unknown server", a, b);
            return Ok(false);
        }

        self.adj.entry(a.to_owned()).or_default().insert(b.to_owned());
        if !directed {
            self.adj.entry(b.to_owned()).or_default().insert(a.to_owned());
        }
        info!(
            "server {} connected to {}{}",
            a,
            b,
            if directed { " (directed)" } else { "" }
        );

        self.save()?;
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&ServerNode> {
        self.nodes.get(id)
    }

    /// Lists every server node, in insertion order.
    pub fn list_servers(&self) -> Vec<&ServerNode> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Lists every adjacency entry, ordered by source then target id.
    pub fn list_connections(&self) -> Vec<Connection> {
        self.adj
            .iter()
            .flat_map(|(from, neighbours)| {
                neighbours.iter().map(move |to| Connection {
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect()
    }

    /// Finds a shortest path between two nodes. Returns an empty path
    /// if one of the nodes does not exist or if the goal cannot be
    /// reached.
    pub fn bfs_path(&self, start: &str, goal: &str) -> Vec<String> {
        if !self.contains(start) || !self.contains(goal) {
            return Vec::new();
        }
        bfs_path(&self.adj, start, goal)
    }

    /// Finds a path between two nodes, not necessarily a shortest
    /// one. Returns an empty path if one of the nodes does not exist
    /// or if the goal cannot be reached.
    pub fn dfs_path(&self, start: &str, goal: &str) -> Vec<String> {
        if !self.contains(start) || !self.contains(goal) {
            return Vec::new();
        }
        dfs_path(&self.adj, start, goal)
    }
}
