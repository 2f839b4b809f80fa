// courier-lib, a Rust library for message storage and mail routing.
// Copyright (C) 2022  soywod <clement.douin@posteo.net>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Config module.
//!
//! This module contains everything related to the location of the
//! persisted data files.

use serde::Deserialize;
use std::{env, path::PathBuf, result};
use thiserror::Error;

use crate::{ServerGraph, Store};

pub const DEFAULT_STORE_FILE: &str = "data.json";
pub const DEFAULT_GRAPH_FILE: &str = "servers.json";
pub const DEFAULT_ROOT_FOLDER: &str = "Inbox";

const DEFAULT_DATA_DIR_NAME: &str = "courier";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get XDG_DATA_HOME directory")]
    GetXdgDataDirError,
    #[error("cannot expand data directory {1}")]
    ExpandDataDirError(#[source] shellexpand::LookupError<env::VarError>, String),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the data files configuration.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Represents the directory containing the data files. Shell
    /// variables and `~` are expanded. Defaults to
    /// `$XDG_DATA_HOME/courier`.
    pub data_dir: Option<PathBuf>,
    /// Represents the message store file name, relative to the data
    /// directory unless absolute.
    pub store_file: Option<String>,
    /// Represents the server graph file name, relative to the data
    /// directory unless absolute.
    pub graph_file: Option<String>,
}

impl Config {
    /// Gets the data directory path.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match self.data_dir.as_ref() {
            Some(dir) => {
                let dir = dir.to_string_lossy();
                let dir = shellexpand::full(&dir)
                    .map_err(|err| Error::ExpandDataDirError(err, dir.to_string()))?;
                Ok(PathBuf::from(dir.to_string()))
            }
            None => dirs::data_dir()
                .map(|dir| dir.join(DEFAULT_DATA_DIR_NAME))
                .ok_or(Error::GetXdgDataDirError),
        }
    }

    /// Gets the message store file path.
    pub fn store_path(&self) -> Result<PathBuf> {
        let file = self.store_file.as_deref().unwrap_or(DEFAULT_STORE_FILE);
        Ok(self.data_dir()?.join(file))
    }

    /// Gets the server graph file path.
    pub fn graph_path(&self) -> Result<PathBuf> {
        let file = self.graph_file.as_deref().unwrap_or(DEFAULT_GRAPH_FILE);
        Ok(self.data_dir()?.join(file))
    }

    /// Opens the message store, falling back to an empty one if the
    /// file is missing or malformed.
    pub fn open_store(&self) -> Result<Store> {
        Ok(Store::open(self.store_path()?))
    }

    /// Opens the server graph, falling back to an empty one if the
    /// file is missing or malformed.
    pub fn open_graph(&self) -> Result<ServerGraph> {
        Ok(ServerGraph::open(self.graph_path()?))
    }
}
