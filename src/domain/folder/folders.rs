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

//! Folder paths module.
//!
//! This module contains the flat, display-ready listing of the folder
//! tree.

use serde::Serialize;
use std::ops;

/// Represents a folder with its readable path from the root folder,
/// for example `Inbox/Work/Projects`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FolderPath {
    pub id: String,
    #[serde(rename = "ruta")]
    pub path: String,
}

/// Represents the list of folder paths, in pre-order.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct FolderPaths(pub Vec<FolderPath>);

impl FolderPaths {
    /// Gets the path of the folder matching the given id.
    pub fn find(&self, id: &str) -> Option<&str> {
        self.iter()
            .find(|folder| folder.id == id)
            .map(|folder| folder.path.as_str())
    }
}

impl ops::Deref for FolderPaths {
    type Target = Vec<FolderPath>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for FolderPaths {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
