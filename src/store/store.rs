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

//! Message store module.
//!
//! This module contains the message store service. The store owns a
//! flat map of every message and the root of the folder tree, and
//! rewrites the whole aggregate to its file after every mutation.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::{persist, Folder, FolderPaths, Message, DEFAULT_ROOT_FOLDER};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PersistError(#[from] persist::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the on-disk form of the store.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(rename = "mensajes", default)]
    messages: Vec<Message>,
    #[serde(rename = "carpeta_raiz", default)]
    root: Option<Folder>,
}

#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "mensajes")]
    messages: Vec<&'a Message>,
    #[serde(rename = "carpeta_raiz")]
    root: &'a Folder,
}

/// Represents a message annotated with the folder it is filed in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MessageEntry {
    #[serde(flatten)]
    pub message: Message,
    #[serde(rename = "carpeta_id")]
    pub folder_id: Option<String>,
    #[serde(rename = "carpeta_ruta")]
    pub folder_path: Option<String>,
}

/// Represents a search match: the message and the path of the
/// folder it has been found in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "mensaje")]
    pub message: Message,
    #[serde(rename = "ruta")]
    pub path: String,
}

/// Represents the message store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Store {
    /// Represents the path of the store file.
    path: PathBuf,
    /// Represents every message ever added, by id.
    messages: HashMap<String, Message>,
    /// Represents the message ids in insertion order.
    order: Vec<String>,
    /// Represents the root of the folder tree.
    root: Folder,
}

impl Store {
    /// Builds an empty store bound to the given file, without
    /// touching the file system.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            messages: HashMap::new(),
            order: Vec::new(),
            root: Folder::new(DEFAULT_ROOT_FOLDER),
        }
    }

    /// Loads the store from the given file. A missing file gives an
    /// empty store, a malformed one gives an error.
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = Self::new(path);

        if let Some(snapshot) = persist::load::<Snapshot, _>(&store.path)? {
            for message in snapshot.messages {
                store.insert_message(message);
            }
            if let Some(root) = snapshot.root {
                store.root = root;
            }
        }

        debug!(
            "store {:?} opened with {} message(s) and {} folder(s)",
            store.path,
            store.order.len(),
            store.root.folder_count()
        );

        Ok(store)
    }

    /// Loads the store from the given file. Never fails: any error is
    /// logged and an empty store is returned instead.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::try_open(path).unwrap_or_else(|err| {
            warn!("cannot open store {:?}, starting empty: {}", path, err);
            Self::new(path)
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    /// Writes the whole store to its file.
    pub fn save(&self) -> Result<()> {
        let snapshot = SnapshotRef {
            messages: self.messages().collect(),
            root: &self.root,
        };
        persist::save(&self.path, &snapshot)?;
        Ok(())
    }

    // Replacing an existing message keeps its original position.
    fn insert_message(&mut self, message: Message) {
        if !self.messages.contains_key(&message.id) {
            self.order.push(message.id.clone());
        }
        self.messages.insert(message.id.clone(), message);
    }

    /// Adds the given message and files it in the folder matching the
    /// given id. Falls back to the root folder if no id is given or
    /// if it does not match any folder.
    pub fn add_message(&mut self, message: Message, folder_id: Option<&str>) -> Result<()> {
        let message_id = message.id.clone();
        self.insert_message(message);

        let folder = match folder_id.and_then(|id| self.root.find_by_id_mut(id)) {
            Some(folder) => folder,
            None => &mut self.root,
        };
        folder.messages.push(message_id.clone());
        info!("message {} filed in folder {}", message_id, folder.id);

        self.save()
    }

    /// Creates a folder under the folder matching the given parent
    /// id, or under the root folder if no id is given or if it does
    /// not match any folder. Returns `None` if the name is empty.
    pub fn create_folder(&mut self, name: &str, parent_id: Option<&str>) -> Result<Option<Folder>> {
        if name.is_empty() {
            debug!("skipping folder creation: empty name");
            return Ok(None);
        }

        let folder = Folder::new(name);
        let parent = match parent_id.and_then(|id| self.root.find_by_id_mut(id)) {
            Some(parent) => parent,
            None => &mut self.root,
        };
        info!("folder {} created in {}", folder.name, parent.name);
        parent.insert_child(folder.clone());

        self.save()?;
        Ok(Some(folder))
    }

    /// Moves the given message to the folder matching the given
    /// destination id.
    ///
    /// The destination is checked before the message is detached, so
    /// a failed move never leaves the message out of every folder.
    /// Returns `false` without any change if the destination does not
    /// exist or if the message is not filed anywhere.
    pub fn move_message(&mut self, message_id: &str, destination_id: &str) -> Result<bool> {
        if self.root.find_by_id(destination_id).is_none() {
            debug!("cannot move message {}: unknown folder {}", message_id, destination_id);
            return Ok(false);
        }

        if !self.root.remove_message(message_id) {
            debug!("cannot move message {}: not filed", message_id);
            return Ok(false);
        }

        if let Some(destination) = self.root.find_by_id_mut(destination_id) {
            destination.messages.push(message_id.to_owned());
        }
        info!("message {} moved to folder {}", message_id, destination_id);

        self.save()?;
        Ok(true)
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Iterates over every message, in insertion order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.order.iter().filter_map(|id| self.messages.get(id))
    }

    pub fn find_folder(&self, id: &str) -> Option<&Folder> {
        self.root.find_by_id(id)
    }

    pub fn find_folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.root.find_by_name(name)
    }

    /// Gets the folder the given message is filed in.
    pub fn owning_folder(&self, message_id: &str) -> Option<&Folder> {
        self.root.locate_owner(message_id)
    }

    pub fn list_folder_paths(&self) -> FolderPaths {
        self.root.list_paths()
    }

    /// Gets the readable path of the folder matching the given id.
    pub fn folder_path(&self, folder_id: &str) -> Option<String> {
        self.list_folder_paths().find(folder_id).map(String::from)
    }

    /// Lists every message in insertion order, annotated with the
    /// folder it is filed in.
    pub fn list_messages(&self) -> Vec<MessageEntry> {
        let paths = self.list_folder_paths();
        self.messages()
            .map(|message| {
                let folder = self.owning_folder(&message.id);
                MessageEntry {
                    message: message.clone(),
                    folder_id: folder.map(|folder| folder.id.clone()),
                    folder_path: folder
                        .and_then(|folder| paths.find(&folder.id))
                        .map(String::from),
                }
            })
            .collect()
    }

    /// Searches messages whose subject or sender contains the given
    /// term, ignoring case.
    ///
    /// Matches come in folder tree order: a folder's own messages
    /// before its children's, siblings in insertion order. There is
    /// no ranking.
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        self.root.walk(|folder, path| {
            let matches = folder
                .messages
                .iter()
                .filter_map(|id| self.messages.get(id))
                .filter(|message| message.matches(term));
            for message in matches {
                hits.push(SearchHit {
                    message: message.clone(),
                    path: path.to_owned(),
                });
            }
        });

        debug!("{} message(s) matching {:?}", hits.len(), term);
        trace!("search hits: {:#?}", hits);

        hits
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn open_missing_store() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("data.json"));

        assert_eq!(0, store.messages().count());
        assert_eq!(DEFAULT_ROOT_FOLDER, store.root().name);
        assert!(store.root().children.is_empty());
        assert!(!dir.path().join("data.json").exists());
    }

    #[test]
    fn open_malformed_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            Store::try_open(&path),
            Err(Error::PersistError(persist::Error::ParseFileError(..)))
        ));

        let store = Store::open(&path);
        assert_eq!(0, store.messages().count());
        assert_eq!(DEFAULT_ROOT_FOLDER, store.root().name);
    }

    #[test]
    fn open_store_without_root_folder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"mensajes": [{"id": "m1", "remitente": "a@x", "asunto": "Hi"}]}"#,
        )
        .unwrap();

        let store = Store::try_open(&path).unwrap();
        assert_eq!("Hi", store.message("m1").unwrap().subject);
        assert_eq!(DEFAULT_ROOT_FOLDER, store.root().name);
        assert_eq!(None, store.owning_folder("m1"));
    }

    #[test]
    fn add_message_falls_back_to_root() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));

        store
            .add_message(Message::new("a@x", "b@x", "Hi", "Body").with_id("m1"), None)
            .unwrap();
        store
            .add_message(
                Message::new("a@x", "b@x", "Hi", "Body").with_id("m2"),
                Some("unknown"),
            )
            .unwrap();

        assert_eq!(vec!["m1", "m2"], store.root().messages);
        assert!(dir.path().join("data.json").is_file());
    }

    #[test]
    fn replace_message_keeps_position() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));

        store
            .add_message(Message::new("a@x", "b@x", "First", "").with_id("m1"), None)
            .unwrap();
        store
            .add_message(Message::new("a@x", "b@x", "Second", "").with_id("m2"), None)
            .unwrap();
        store.insert_message(Message::new("a@x", "b@x", "Edited", "").with_id("m1"));

        assert_eq!(
            vec!["Edited", "Second"],
            store
                .messages()
                .map(|m| m.subject.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn create_nested_folders() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));

        let work = store.create_folder("Work", None).unwrap().unwrap();
        let projects = store
            .create_folder("Projects", Some(&work.id))
            .unwrap()
            .unwrap();
        store.create_folder("Misc", Some("unknown")).unwrap();

        assert_eq!(None, store.create_folder("", None).unwrap());
        assert_eq!(
            Some("Inbox/Work/Projects".to_owned()),
            store.folder_path(&projects.id)
        );
        assert_eq!(
            vec!["Inbox", "Inbox/Work", "Inbox/Work/Projects", "Inbox/Misc"],
            store
                .list_folder_paths()
                .iter()
                .map(|f| f.path.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn reopen_deep_folder_tree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = Store::new(&path);

        let mut parent_id = store.root().id.clone();
        for depth in 1..=70 {
            let folder = store
                .create_folder(&format!("Level {}", depth), Some(&parent_id))
                .unwrap()
                .unwrap();
            parent_id = folder.id;
        }
        store
            .add_message(
                Message::new("a@x", "b@x", "Deep", "").with_id("m1"),
                Some(&parent_id),
            )
            .unwrap();

        let reopened = Store::try_open(&path).unwrap();
        assert_eq!(store, reopened);
        assert_eq!(
            Some(parent_id.as_str()),
            reopened.owning_folder("m1").map(|f| f.id.as_str())
        );
        assert_eq!(71, reopened.list_folder_paths().len());
    }

    #[test]
    fn move_unfiled_message() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));
        let work = store.create_folder("Work", None).unwrap().unwrap();
        store.insert_message(Message::new("a@x", "b@x", "Hi", "").with_id("m1"));

        assert!(!store.move_message("m1", &work.id).unwrap());
        assert_eq!(None, store.owning_folder("m1"));
    }

    #[test]
    fn list_messages_with_folder() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));
        let work = store.create_folder("Work", None).unwrap().unwrap();

        store
            .add_message(Message::new("a@x", "b@x", "Hi", "").with_id("m1"), Some(&work.id))
            .unwrap();
        store.insert_message(Message::new("a@x", "b@x", "Unfiled", "").with_id("m2"));

        let entries = store.list_messages();
        assert_eq!(2, entries.len());
        assert_eq!(Some(work.id.clone()), entries[0].folder_id);
        assert_eq!(Some("Inbox/Work".to_owned()), entries[0].folder_path);
        assert_eq!(None, entries[1].folder_id);
        assert_eq!(None, entries[1].folder_path);
    }

    #[test]
    fn search_in_tree_order() {
        let dir = tempdir().unwrap();
        let mut store = Store::new(dir.path().join("data.json"));
        let work = store.create_folder("Work", None).unwrap().unwrap();
        let personal = store.create_folder("Personal", None).unwrap().unwrap();

        store
            .add_message(Message::new("boss@corp", "me@x", "Report", "").with_id("m1"), Some(&work.id))
            .unwrap();
        store
            .add_message(Message::new("mom@home", "me@x", "Dinner report", "").with_id("m2"), Some(&personal.id))
            .unwrap();
        store
            .add_message(Message::new("news@corp", "me@x", "Digest", "").with_id("m3"), None)
            .unwrap();
        store
            .add_message(Message::new("REPORTS@corp", "me@x", "Numbers", "report").with_id("m4"), None)
            .unwrap();

        let hits = store.search("RePoRt");
        assert_eq!(
            vec![
                ("m4", "Inbox"),
                ("m1", "Inbox/Work"),
                ("m2", "Inbox/Personal"),
            ],
            hits.iter()
                .map(|hit| (hit.message.id.as_str(), hit.path.as_str()))
                .collect::<Vec<_>>()
        );
        assert!(store.search("nothing").is_empty());
    }

    #[test]
    fn encode_store_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = Store::new(&path);
        store
            .add_message(Message::new("a@x", "b@x", "Hi", "Body").with_id("m1"), None)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!("a@x", json["mensajes"][0]["remitente"]);
        assert_eq!("Inbox", json["carpeta_raiz"]["nombre"]);
        assert_eq!("m1", json["carpeta_raiz"]["mensajes"][0]);
        assert!(json["carpeta_raiz"]["hijos"].as_array().unwrap().is_empty());

        let entry = serde_json::to_value(&store.list_messages()[0]).unwrap();
        assert_eq!("Hi", entry["asunto"]);
        assert_eq!("Inbox", entry["carpeta_ruta"]);

        let hit = serde_json::to_value(&store.search("hi")[0]).unwrap();
        assert_eq!("m1", hit["mensaje"]["id"]);
        assert_eq!("Inbox", hit["ruta"]);
    }
}
