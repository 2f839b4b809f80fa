//! Folder module.
//!
//! This module contains the representation of a folder and the
//! recursive operations of the folder tree. A folder exclusively owns
//! its children, and only references its messages by id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{new_id, FolderPath, FolderPaths};

/// Represents the folder hierarchy delimiter used in paths.
pub const FOLDER_PATH_DELIM: &str = "/";

/// Represents a folder node of the folder tree.
///
/// The serialized form uses the field names of the message store
/// file (`nombre`, `hijos`, `mensajes`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Represents the folder identifier.
    #[serde(default = "new_id")]
    pub id: String,
    /// Represents the folder name. Names are not unique.
    #[serde(rename = "nombre", default)]
    pub name: String,
    /// Represents the sub-folders, in insertion order.
    #[serde(rename = "hijos", default)]
    pub children: Vec<Folder>,
    /// Represents the ids of the messages filed in this folder, in
    /// insertion order.
    #[serde(rename = "mensajes", default)]
    pub messages: Vec<String>,
}

impl Folder {
    pub fn new<N: ToString>(name: N) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            children: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Replaces the generated identifier with the given one.
    pub fn with_id<I: ToString>(mut self, id: I) -> Self {
        self.id = id.to_string();
        self
    }

    /// Finds the first folder matching the given id, in pre-order.
    pub fn find_by_id(&self, id: &str) -> Option<&Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_id_mut(id))
    }

    /// Finds the first folder matching the given name, in pre-order:
    /// parents before children, earlier siblings before later ones.
    pub fn find_by_name(&self, name: &str) -> Option<&Folder> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_name(name))
    }

    /// Appends the given folder to the children. Names are not
    /// checked for uniqueness.
    pub fn insert_child(&mut self, folder: Folder) {
        self.children.push(folder);
    }

    /// Finds the folder whose message list contains the given
    /// message id.
    pub fn locate_owner(&self, message_id: &str) -> Option<&Folder> {
        if self.messages.iter().any(|id| id == message_id) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.locate_owner(message_id))
    }

    /// Removes the first occurrence of the given message id, checking
    /// the folder's own list before descending into its children.
    /// Returns `true` if an occurrence has been removed.
    pub fn remove_message(&mut self, message_id: &str) -> bool {
        if let Some(pos) = self.messages.iter().position(|id| id == message_id) {
            self.messages.remove(pos);
            return true;
        }
        self.children
            .iter_mut()
            .any(|child| child.remove_message(message_id))
    }

    /// Visits every folder of the tree in pre-order, together with
    /// its path from this folder (inclusive).
    pub fn walk<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a Folder, &str),
    {
        self.walk_from(None, &mut f)
    }

    fn walk_from<'a, F>(&'a self, parent_path: Option<&str>, f: &mut F)
    where
        F: FnMut(&'a Folder, &str),
    {
        let path = match parent_path {
            Some(parent_path) => format!("{}{}{}", parent_path, FOLDER_PATH_DELIM, self.name),
            None => self.name.clone(),
        };
        f(self, &path);
        for child in &self.children {
            child.walk_from(Some(&path), f);
        }
    }

    /// Lists every folder of the tree with its readable path, in
    /// pre-order.
    pub fn list_paths(&self) -> FolderPaths {
        let mut paths = FolderPaths::default();
        self.walk(|folder, path| {
            paths.push(FolderPath {
                id: folder.id.clone(),
                path: path.to_owned(),
            })
        });
        paths
    }

    /// Counts the folders of the tree, this one included.
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(Folder::folder_count).sum::<usize>()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // Inbox
    // ├── Work
    // │   └── Projects
    // └── Personal
    //     └── Work
    fn tree() -> Folder {
        let mut work = Folder::new("Work").with_id("work");
        work.insert_child(Folder::new("Projects").with_id("projects"));

        let mut personal = Folder::new("Personal").with_id("personal");
        personal.insert_child(Folder::new("Work").with_id("personal-work"));

        let mut root = Folder::new("Inbox").with_id("root");
        root.insert_child(work);
        root.insert_child(personal);
        root
    }

    #[test]
    fn find_folder_by_id() {
        let root = tree();

        for id in ["root", "work", "projects", "personal", "personal-work"] {
            assert_eq!(Some(id), root.find_by_id(id).map(|f| f.id.as_str()));
        }
        assert_eq!(None, root.find_by_id("unknown"));
    }

    #[test]
    fn find_folder_by_name_in_pre_order() {
        let root = tree();

        assert_eq!(
            Some("work"),
            root.find_by_name("Work").map(|f| f.id.as_str())
        );
        assert_eq!(
            Some("projects"),
            root.find_by_name("Projects").map(|f| f.id.as_str())
        );
        assert_eq!(None, root.find_by_name("work"));
    }

    #[test]
    fn insert_child_accepts_duplicate_names() {
        let mut root = tree();
        root.insert_child(Folder::new("Work").with_id("work-2"));

        assert_eq!(3, root.children.len());
        assert_eq!(
            Some("work"),
            root.find_by_name("Work").map(|f| f.id.as_str())
        );
        assert!(root.find_by_id("work-2").is_some());
        assert_eq!(6, root.folder_count());
    }

    #[test]
    fn locate_and_remove_message() {
        let mut root = tree();
        root.find_by_id_mut("projects")
            .unwrap()
            .messages
            .push("m1".into());

        assert_eq!(
            Some("projects"),
            root.locate_owner("m1").map(|f| f.id.as_str())
        );
        assert!(root.remove_message("m1"));
        assert_eq!(None, root.locate_owner("m1"));
        assert!(!root.remove_message("m1"));
    }

    #[test]
    fn remove_only_first_occurrence() {
        let mut root = tree();
        root.messages.push("m1".into());
        root.find_by_id_mut("personal")
            .unwrap()
            .messages
            .push("m1".into());

        assert!(root.remove_message("m1"));
        assert!(root.messages.is_empty());
        assert_eq!(
            Some("personal"),
            root.locate_owner("m1").map(|f| f.id.as_str())
        );
    }

    #[test]
    fn list_folder_paths_in_pre_order() {
        let paths = tree().list_paths();

        assert_eq!(
            vec![
                ("root", "Inbox"),
                ("work", "Inbox/Work"),
                ("projects", "Inbox/Work/Projects"),
                ("personal", "Inbox/Personal"),
                ("personal-work", "Inbox/Personal/Work"),
            ],
            paths
                .iter()
                .map(|p| (p.id.as_str(), p.path.as_str()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn decode_nested_folder_record() {
        let root: Folder = serde_json::from_value(json!({
            "id": "root",
            "nombre": "Inbox",
            "hijos": [{ "id": "work", "nombre": "Work", "mensajes": ["m1"] }],
        }))
        .unwrap();

        assert!(root.messages.is_empty());
        assert_eq!(vec!["m1".to_owned()], root.children[0].messages);
        assert!(root.children[0].children.is_empty());
    }
}
