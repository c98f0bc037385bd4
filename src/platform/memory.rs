/*
 * Copyright 2019-2021 Wren Powell
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use super::{AclFs, Identities};
use crate::acl::{acl_from_mode, check, AclKind, RawAcl};

/// A file in a `MemoryPlatform`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    owner: u32,
    directory: bool,
    access: RawAcl,
    default: RawAcl,
}

/// A group in a `MemoryPlatform`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    gid: u32,
    members: Vec<String>,
}

/// A `Platform` which keeps users, groups, and a file tree in memory.
///
/// Like the kernel, `set_acl` rejects structurally invalid ACLs with an `InvalidInput` error, and
/// rejects default ACLs on anything but a directory. Writes to specific paths can be made to fail
/// with [`deny_writes`] and listings with [`deny_listing`] to simulate permission errors.
///
/// Paths are used exactly as given and are not normalized. A path's parent directories do not
/// need to exist.
///
/// [`deny_writes`]: crate::platform::MemoryPlatform::deny_writes
/// [`deny_listing`]: crate::platform::MemoryPlatform::deny_listing
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    users: HashMap<String, u32>,
    homes: HashMap<String, PathBuf>,
    groups: HashMap<String, Group>,
    current: Option<String>,
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied: RefCell<HashSet<PathBuf>>,
    unlisted: RefCell<HashSet<PathBuf>>,
    writes: RefCell<Vec<(PathBuf, AclKind)>>,
}

impl MemoryPlatform {
    /// Create a new empty `MemoryPlatform`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with the given `name` and `uid`.
    pub fn with_user(mut self, name: &str, uid: u32) -> Self {
        self.users.insert(name.to_owned(), uid);
        self.homes
            .insert(name.to_owned(), PathBuf::from("/home").join(name));
        self
    }

    /// Add a group with the given `name`, `gid`, and supplementary `members`.
    pub fn with_group(mut self, name: &str, gid: u32, members: &[&str]) -> Self {
        self.groups.insert(
            name.to_owned(),
            Group {
                gid,
                members: members.iter().map(|member| member.to_string()).collect(),
            },
        );
        self
    }

    /// Act as the user with the given `name`.
    pub fn acting_as(mut self, name: &str) -> Self {
        self.current = Some(name.to_owned());
        self
    }

    /// Create a directory at `path` owned by `owner` with the permission bits in `mode`.
    pub fn add_dir(&self, path: impl AsRef<Path>, owner: &str, mode: u32) {
        self.add_node(path.as_ref(), owner, mode, true);
    }

    /// Create a regular file at `path` owned by `owner` with the permission bits in `mode`.
    pub fn add_file(&self, path: impl AsRef<Path>, owner: &str, mode: u32) {
        self.add_node(path.as_ref(), owner, mode, false);
    }

    fn add_node(&self, path: &Path, owner: &str, mode: u32, directory: bool) {
        let owner = self.users.get(owner).copied().unwrap_or(u32::MAX);
        self.nodes.borrow_mut().insert(
            path.to_owned(),
            Node {
                owner,
                directory,
                access: acl_from_mode(mode),
                default: RawAcl::new(),
            },
        );
    }

    /// Replace the ACL of the given `kind` on `path` without any validation.
    pub fn put_acl(&self, path: impl AsRef<Path>, kind: AclKind, acl: RawAcl) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(path.as_ref()) {
            match kind {
                AclKind::Access => node.access = acl,
                AclKind::Default => node.default = acl,
            }
        }
    }

    /// Make every future ACL write to `path` fail with `PermissionDenied`.
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        self.denied.borrow_mut().insert(path.as_ref().to_owned());
    }

    /// Make every future attempt to list the children of `path` fail with `PermissionDenied`.
    pub fn deny_listing(&self, path: impl AsRef<Path>) {
        self.unlisted.borrow_mut().insert(path.as_ref().to_owned());
    }

    /// Return the paths and kinds of every successful ACL write, in order.
    pub fn writes(&self) -> Vec<(PathBuf, AclKind)> {
        self.writes.borrow().clone()
    }

    fn node<T>(&self, path: &Path, read: impl FnOnce(&Node) -> T) -> io::Result<T> {
        self.nodes
            .borrow()
            .get(path)
            .map(read)
            .ok_or_else(|| not_found(path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("No such file or directory: {}", path.display()),
    )
}

impl Identities for MemoryPlatform {
    fn uid_by_name(&self, name: &str) -> Option<u32> {
        self.users.get(name).copied()
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        self.users
            .iter()
            .find(|(_, id)| **id == uid)
            .map(|(name, _)| name.clone())
    }

    fn gid_by_name(&self, name: &str) -> Option<u32> {
        self.groups.get(name).map(|group| group.gid)
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups
            .iter()
            .find(|(_, group)| group.gid == gid)
            .map(|(name, _)| name.clone())
    }

    fn group_members(&self, name: &str) -> Option<Vec<String>> {
        self.groups.get(name).map(|group| group.members.clone())
    }

    fn current_user(&self) -> Option<String> {
        self.current.clone()
    }

    fn home_dir(&self, name: &str) -> Option<PathBuf> {
        self.homes.get(name).cloned()
    }
}

impl AclFs for MemoryPlatform {
    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        self.node(path, |node| node.directory)
    }

    fn owner(&self, path: &Path) -> io::Result<u32> {
        self.node(path, |node| node.owner)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(path)? {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Not a directory: {}", path.display()),
            ));
        }
        if self.unlisted.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied",
            ));
        }
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|child| child.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn get_acl(&self, path: &Path, kind: AclKind) -> io::Result<RawAcl> {
        self.node(path, |node| match kind {
            AclKind::Access => node.access.clone(),
            AclKind::Default => node.default.clone(),
        })
    }

    fn set_acl(&self, path: &Path, kind: AclKind, acl: &RawAcl) -> io::Result<()> {
        if self.denied.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Operation not permitted",
            ));
        }

        let mut nodes = self.nodes.borrow_mut();
        let node = nodes.get_mut(path).ok_or_else(|| not_found(path))?;
        let invalid = io::Error::new(io::ErrorKind::InvalidInput, "Invalid argument");

        match kind {
            AclKind::Access => {
                if check(acl).is_some() {
                    return Err(invalid);
                }
                node.access = acl.clone();
            }
            AclKind::Default => {
                if !node.directory || (!acl.is_empty() && check(acl).is_some()) {
                    return Err(invalid);
                }
                node.default = acl.clone();
            }
        }

        self.writes.borrow_mut().push((path.to_owned(), kind));
        Ok(())
    }
}
