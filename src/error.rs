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

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error as DeriveError;

use crate::acl::AclError;

/// A user or group identity which could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A numeric user ID.
    Uid(u32),

    /// A numeric group ID.
    Gid(u32),

    /// A user name.
    UserName(String),

    /// A group name.
    GroupName(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Uid(uid) => write!(f, "user ID {}", uid),
            Identity::Gid(gid) => write!(f, "group ID {}", gid),
            Identity::UserName(name) => write!(f, "user \"{}\"", name),
            Identity::GroupName(name) => write!(f, "group \"{}\"", name),
        }
    }
}

/// The error type for ACL operations.
///
/// The `Display` implementation of each variant is a complete sentence which can be shown to the
/// user as-is.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// The user to share with does not exist.
    #[error("Username {user} is not a valid {site} user!")]
    UnknownUser { user: String, site: String },

    /// The invoking user does not own the path being shared.
    #[error("You do not own this file or directory. The current owner is {owner}. Only the owner can share it.")]
    NotOwner { owner: String },

    /// The path already has an ACL entry for the user.
    #[error("There is already some access control configured for {user}. Edit the existing entry instead of sharing again.")]
    AlreadyShared { user: String },

    /// A parent directory owned by someone else can't be traversed by the user.
    #[error("Share failed because the parent directory {} is not owned by you, and cannot be accessed by {user}. Please contact {owner} and request that they share this directory with {user}.", .parent.display())]
    UnreachableParent {
        parent: PathBuf,
        owner: String,
        user: String,
    },

    /// The operating system rejected an ACL and the ACL is structurally invalid.
    #[error("{error}")]
    InvalidAcl { path: PathBuf, error: AclError },

    /// The operating system rejected an ACL for a reason other than its structure.
    #[error("Could not apply the ACL to {}: {source}", .path.display())]
    OsAcl {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A user or group could not be mapped between its name and its numeric ID.
    #[error("Could not resolve {0}.")]
    IdentityResolution(Identity),

    /// The path does not exist.
    #[error("The path \"{}\" does not exist!", .0.display())]
    NotFound(PathBuf),

    /// A permission name was not one of "read", "write", or "execute".
    #[error("\"{0}\" is not a valid permission. Expected \"read\", \"write\", or \"execute\".")]
    InvalidPermission(String),

    /// A tag type name was not recognized.
    #[error("\"{0}\" is not a valid ACL entry type.")]
    InvalidTagType(String),

    /// A recursive operation failed on one or more paths.
    ///
    /// Paths which were updated successfully are not rolled back.
    #[error("{}", describe_failures(.failures))]
    PartialGrant { failures: Vec<(PathBuf, Error)> },

    /// The configuration could not be loaded.
    #[error("The configuration is invalid: {0}")]
    Config(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Summarize the paths that failed during a recursive operation.
fn describe_failures(failures: &[(PathBuf, Error)]) -> String {
    match failures {
        [] => String::from("No paths failed."),
        [(path, error)] => format!("Failed to update {}: {}", path.display(), error),
        [(path, error), rest @ ..] => format!(
            "Failed to update {} paths. The first was {}: {}",
            rest.len() + 1,
            path.display(),
            error
        ),
    }
}

/// The result type for ACL operations.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_parent_names_owner_and_path() {
        let error = Error::UnreachableParent {
            parent: PathBuf::from("/a"),
            owner: String::from("dana"),
            user: String::from("carol"),
        };
        let message = error.to_string();
        assert!(message.contains("/a"));
        assert!(message.contains("contact dana"));
        assert!(message.contains("cannot be accessed by carol"));
    }

    #[test]
    fn partial_grant_reports_count_and_first_failure() {
        let error = Error::PartialGrant {
            failures: vec![
                (PathBuf::from("/d/x"), Error::NotFound(PathBuf::from("/d/x"))),
                (PathBuf::from("/d/y"), Error::NotFound(PathBuf::from("/d/y"))),
            ],
        };
        let message = error.to_string();
        assert!(message.starts_with("Failed to update 2 paths."));
        assert!(message.contains("/d/x"));
    }
}
