//! Delivery module.
//!
//! This module simulates the routing of a message across the server
//! graph, turning a computed path into a display-ready route.

use log::{debug, trace};
use serde::Serialize;
use std::{convert::Infallible, fmt, str::FromStr};

use crate::ServerGraph;

/// Represents the path search algorithm used to route a message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Breadth-first search, gives a shortest route.
    #[default]
    Bfs,
    /// Depth-first search, gives the first route found.
    Dfs,
}

impl FromStr for Algorithm {
    type Err = Infallible;

    /// Parses `dfs` (ignoring case) as depth-first search. Anything
    /// else falls back to breadth-first search.
    fn from_str(algorithm: &str) -> Result<Self, Self::Err> {
        if algorithm.trim().eq_ignore_ascii_case("dfs") {
            Ok(Self::Dfs)
        } else {
            Ok(Self::Bfs)
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bfs => write!(f, "bfs"),
            Self::Dfs => write!(f, "dfs"),
        }
    }
}

/// Represents the outcome of a simulated delivery.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Delivery {
    /// Tells if a route has been found.
    #[serde(rename = "ok")]
    pub success: bool,
    /// Represents the node ids of the route, origin and destination
    /// included.
    pub path_ids: Vec<String>,
    /// Represents the node names of the route.
    pub path_names: Vec<String>,
    /// Represents the number of hops of the route, if any.
    pub hops: Option<usize>,
}

impl ServerGraph {
    /// Simulates sending a message from the origin node to the
    /// destination node using the given algorithm.
    ///
    /// A route node without any node record is shown by its id.
    pub fn simulate_send(&self, origin: &str, destination: &str, algorithm: Algorithm) -> Delivery {
        let path_ids = match algorithm {
            Algorithm::Bfs => self.bfs_path(origin, destination),
            Algorithm::Dfs => self.dfs_path(origin, destination),
        };

        if path_ids.is_empty() {
            debug!(
                "no {} route from {} to {}",
                algorithm, origin, destination
            );
            return Delivery::default();
        }

        let path_names = path_ids
            .iter()
            .map(|id| {
                self.node(id)
                    .map(|node| node.name.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();

        let delivery = Delivery {
            success: true,
            hops: Some(path_ids.len() - 1),
            path_ids,
            path_names,
        };

        debug!(
            "{} route from {} to {} found in {:?} hop(s)",
            algorithm, origin, destination, delivery.hops
        );
        trace!("delivery: {:#?}", delivery);

        delivery
    }
}
