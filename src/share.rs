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

//! Sharing files with other users.
//!
//! Giving someone access to a file takes more than adding an entry to the file's ACL: they also
//! need execute permission on every directory above it. [`share`] takes care of both, and
//! [`check_status`] answers whether a user can currently reach a path.
//!
//! [`share`]: crate::share::share
//! [`check_status`]: crate::share::check_status

use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::acl::{
    can_read_recursive, get_or_create, grant_path, AclSet, GrantReport, Permission, Perms, TagType,
};
use crate::platform::{current_user, owner_name, Platform};
use crate::{Config, Error, Result};

/// A request to share a path with another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareRequest<'a> {
    /// The file or directory to share.
    pub path: &'a Path,

    /// The name of the user to share it with.
    pub user: &'a str,

    /// Whether the user should be able to write to the path.
    pub editable: bool,

    /// Whether to share everything below the path as well.
    pub recursive: bool,

    /// Whether new files created below the path should be shared too.
    ///
    /// This only has an effect on directories.
    pub default: bool,
}

impl<'a> ShareRequest<'a> {
    /// A read-only, non-recursive request to share `path` with `user`.
    pub fn new(path: &'a Path, user: &'a str) -> Self {
        ShareRequest {
            path,
            user,
            editable: false,
            recursive: false,
            default: false,
        }
    }

    /// The permissions this request grants on the shared path.
    pub fn perms(&self) -> Perms {
        if self.editable {
            Perms::RWX
        } else {
            Perms::READ | Perms::EXECUTE
        }
    }
}

/// Share a path with another user.
///
/// This checks that the user exists, that the current user owns the path, and that the path does
/// not already have an ACL entry for the user. Then it walks the parent directories from the root
/// down. Parents the current user owns get a `user` entry granting the user execute permission.
/// Parents owned by anyone else must already let the user in, or this fails with
/// `Error::UnreachableParent`. Finally, the path itself is granted read and execute permission, plus
/// write permission if the request is editable.
///
/// Each step is written to the file system before the next one starts and nothing is rolled back,
/// so if this fails partway through, the parents visited so far keep their new entries.
pub fn share(
    platform: &(impl Platform + ?Sized),
    config: &Config,
    request: &ShareRequest<'_>,
) -> Result<GrantReport> {
    let path = request.path;
    let user = request.user;

    if platform.uid_by_name(user).is_none() {
        return Err(Error::UnknownUser {
            user: user.to_owned(),
            site: config.site_name.clone(),
        });
    }

    let me = current_user(platform)?;
    let owner = owner_name(platform, path)?;
    if owner != me {
        return Err(Error::NotOwner { owner });
    }

    let acl_set = AclSet::load(platform, path)?;
    if acl_set.find_entry(false, TagType::User, Some(user)).is_some() {
        return Err(Error::AlreadyShared {
            user: user.to_owned(),
        });
    }

    let mut parents = path
        .ancestors()
        .skip(1)
        .filter(|parent| !parent.as_os_str().is_empty())
        .collect::<Vec<_>>();
    parents.reverse();

    for parent in parents {
        let parent_owner = owner_name(platform, parent)?;
        let mut parent_acl = AclSet::load(platform, parent)?;

        if parent_owner == me {
            let entry = get_or_create(&mut parent_acl.acls, TagType::User, Some(user));
            if entry.execute {
                continue;
            }
            entry.execute = true;
            parent_acl.store(platform)?;
            debug!("Granted {} search access to {}", user, parent.display());
        } else if !parent_acl.can_access(platform, user, Permission::Execute)? {
            return Err(Error::UnreachableParent {
                parent: parent.to_owned(),
                owner: parent_owner,
                user: user.to_owned(),
            });
        }
    }

    let report = grant_path(
        platform,
        path,
        user,
        request.perms(),
        request.default,
        request.recursive,
    )?
    .into_result()?;

    info!(
        "Shared {} with {} ({} paths updated)",
        path.display(),
        user,
        report.updated.len()
    );
    Ok(report)
}

/// A message to show the user about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Whether the operation succeeded.
    pub success: bool,

    /// A sentence describing the outcome.
    pub text: String,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        StatusMessage {
            success: true,
            text: text.into(),
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        StatusMessage {
            success: false,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Share a path and describe the outcome.
///
/// Any error from [`share`] is turned into a failure message.
///
/// [`share`]: crate::share::share
pub fn share_message(
    platform: &(impl Platform + ?Sized),
    config: &Config,
    request: &ShareRequest<'_>,
) -> StatusMessage {
    match share(platform, config, request) {
        Ok(_) => StatusMessage::success("File successfully shared!"),
        Err(error) => {
            warn!("Sharing {} failed: {}", request.path.display(), error);
            StatusMessage::failure(error.to_string())
        }
    }
}

/// Describe whether `user` can read `path`, taking parent directories into account.
///
/// A path which does not exist or a user who does not exist is reported as a failure message
/// rather than an error.
pub fn check_status(
    platform: &(impl Platform + ?Sized),
    path: impl AsRef<Path>,
    user: &str,
) -> Result<StatusMessage> {
    let path = path.as_ref();

    if !platform.exists(path) {
        return Ok(StatusMessage::failure(
            Error::NotFound(path.to_owned()).to_string(),
        ));
    }
    if platform.uid_by_name(user).is_none() {
        return Ok(StatusMessage::failure(format!(
            "The user \"{}\" does not exist!",
            user
        )));
    }

    Ok(if can_read_recursive(platform, user, path)? {
        StatusMessage::success(format!("{} CAN access {}", user, path.display()))
    } else {
        StatusMessage::failure(format!("{} CANNOT access {}", user, path.display()))
    })
}
