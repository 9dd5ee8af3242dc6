//! In-memory filesystem used by unit tests that need exact byte counts or
//! injected failures.

use super::{EntryKind, FileSystem, Metadata};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Directory,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryFileSystem {
    nodes: Mutex<BTreeMap<String, Node>>,
    undeletable: Mutex<BTreeSet<String>>,
}

impl MemoryFileSystem {
    pub(crate) fn new() -> Self {
        let fs = Self::default();
        fs.add_dir("/");
        fs
    }

    pub(crate) fn add_dir(&self, path: &str) {
        self.nodes
            .lock()
            .unwrap()
            .insert(path.to_string(), Node::Directory);
    }

    pub(crate) fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.nodes
            .lock()
            .unwrap()
            .insert(path.to_string(), Node::File(contents.into()));
    }

    /// Makes every later `delete` of `path` fail.
    pub(crate) fn forbid_delete(&self, path: &str) {
        self.undeletable.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    fn is_child_of(candidate: &str, directory: &str) -> bool {
        Path::new(candidate)
            .parent()
            .is_some_and(|parent| parent == Path::new(directory))
            && candidate != directory
    }

    fn not_found(path: &str) -> Error {
        Error::new(ErrorKind::NotFound, format!("no such entry: {path}"))
    }
}

impl FileSystem for MemoryFileSystem {
    async fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::Directory) => Ok(nodes
                .keys()
                .filter(|candidate| Self::is_child_of(candidate, path))
                .filter_map(|candidate| Path::new(candidate).file_name())
                .map(|name| name.to_string_lossy().to_string())
                .collect()),
            Some(Node::File(_)) => Err(Error::new(ErrorKind::Other, "not a directory")),
            None => Err(Self::not_found(path)),
        }
    }

    async fn metadata(&self, path: &str) -> Result<Metadata> {
        let nodes = self.nodes.lock().unwrap();
        let (kind, len) = match nodes.get(path) {
            Some(Node::File(data)) => (EntryKind::File, data.len() as u64),
            Some(Node::Directory) => (EntryKind::Directory, 0),
            None => return Err(Self::not_found(path)),
        };

        Ok(Metadata {
            kind,
            len,
            allocated: None,
            created: None,
            modified: None,
            is_symlink: false,
        })
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.contains(path))
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        match self.nodes.lock().unwrap().get(path) {
            Some(node) => Ok(matches!(node, Node::Directory)),
            None => Err(Self::not_found(path)),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        if self.undeletable.lock().unwrap().contains(path) {
            return Err(Error::new(ErrorKind::PermissionDenied, "delete forbidden"));
        }

        let mut nodes = self.nodes.lock().unwrap();
        if nodes.remove(path).is_none() {
            return Err(Self::not_found(path));
        }
        nodes.retain(|candidate, _| !Path::new(candidate).starts_with(path));
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Directory) => Err(Error::new(ErrorKind::Other, "is a directory")),
            None => Err(Self::not_found(path)),
        }
    }
}
