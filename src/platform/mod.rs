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

//! The operating system services this crate depends on.
//!
//! ACL operations in this crate never talk to the operating system directly. Instead, they go
//! through two traits:
//! - `Identities` maps user and group names to numeric IDs and back, and lists group members.
//! - `AclFs` reads file metadata and reads and writes raw ACLs.
//!
//! Any type which implements both is a `Platform`. `PosixPlatform` is backed by the real system
//! and requires the `posix` cargo feature. `MemoryPlatform` keeps a file tree, users, and groups
//! in memory and is useful for testing.

use std::io;
use std::path::{Path, PathBuf};

pub use self::memory::MemoryPlatform;
#[cfg(all(unix, feature = "posix"))]
pub use self::posix::PosixPlatform;

use crate::acl::{AclKind, RawAcl};
use crate::error::Identity;

mod memory;
#[cfg(all(unix, feature = "posix"))]
mod posix;

/// A directory of users and groups.
pub trait Identities {
    /// Return the UID of the user with the given `name`, if there is one.
    fn uid_by_name(&self, name: &str) -> Option<u32>;

    /// Return the name of the user with the given `uid`, if there is one.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Return the GID of the group with the given `name`, if there is one.
    fn gid_by_name(&self, name: &str) -> Option<u32>;

    /// Return the name of the group with the given `gid`, if there is one.
    fn group_name(&self, gid: u32) -> Option<String>;

    /// Return the names of the supplementary members of the group with the given `name`.
    ///
    /// This returns `None` if there is no such group.
    fn group_members(&self, name: &str) -> Option<Vec<String>>;

    /// Return the name of the user this process is acting as.
    fn current_user(&self) -> Option<String>;

    /// Return the home directory of the user with the given `name`, if it is known.
    fn home_dir(&self, name: &str) -> Option<PathBuf>;
}

/// A file system which supports POSIX ACLs.
pub trait AclFs {
    /// Return whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Return whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Return the UID of the user which owns `path`.
    fn owner(&self, path: &Path) -> io::Result<u32>;

    /// Return the paths of the children of the directory at `path` in listing order.
    ///
    /// Symbolic links are not included.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Read the ACL of the given `kind` from `path`.
    ///
    /// Reading the default ACL of a directory which has none returns an empty list.
    fn get_acl(&self, path: &Path, kind: AclKind) -> io::Result<RawAcl>;

    /// Replace the ACL of the given `kind` on `path` with `acl`.
    ///
    /// Writing an empty default ACL removes the default ACL.
    fn set_acl(&self, path: &Path, kind: AclKind, acl: &RawAcl) -> io::Result<()>;
}

/// The services required by ACL operations.
pub trait Platform: Identities + AclFs {}

impl<T: Identities + AclFs + ?Sized> Platform for T {}

/// Return the name of the user which owns `path`.
pub fn owner_name(platform: &(impl Platform + ?Sized), path: &Path) -> crate::Result<String> {
    let uid = platform.owner(path)?;
    platform
        .user_name(uid)
        .ok_or(crate::Error::IdentityResolution(Identity::Uid(uid)))
}

/// Return the name of the user this process is acting as.
pub fn current_user(platform: &(impl Platform + ?Sized)) -> crate::Result<String> {
    platform.current_user().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "The current user has no name.").into()
    })
}
