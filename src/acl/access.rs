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

use std::path::Path;

use log::debug;

use super::entry::{Permission, TagType};
use super::set::AclSet;
use crate::error::Identity;
use crate::platform::{owner_name, Platform};
use crate::{Error, Result};

impl AclSet {
    /// Return whether `user` has `permission` on this path.
    ///
    /// Only the access ACL is considered, and parent directories are not. Access is granted if any
    /// one of these entries grants `permission`:
    /// - the `other` entry
    /// - a `user` entry naming `user`
    /// - a `group` entry for a group `user` is a member of
    /// - the `owner` entry, if `user` owns the path
    ///
    /// The mask entry does not restrict the permissions of other entries here.
    pub fn can_access(
        &self,
        platform: &(impl Platform + ?Sized),
        user: &str,
        permission: Permission,
    ) -> Result<bool> {
        for entry in &self.acls {
            if !entry.permission(permission) {
                continue;
            }

            let granted = match entry.tag_type {
                TagType::Other => true,
                TagType::User => entry.qualifier.as_deref() == Some(user),
                TagType::Group => match entry.qualifier.as_deref() {
                    Some(group) => platform
                        .group_members(group)
                        .ok_or_else(|| {
                            Error::IdentityResolution(Identity::GroupName(group.to_owned()))
                        })?
                        .iter()
                        .any(|member| member == user),
                    None => false,
                },
                TagType::Owner => owner_name(platform, &self.file_path)? == user,
                TagType::GroupOwner | TagType::Mask | TagType::Undefined => false,
            };

            if granted {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Return whether `user` can read `path`, taking parent directories into account.
///
/// Reading a file requires read permission on the file itself and execute (search) permission on
/// every directory above it. The file is checked first, then its parents from nearest to farthest,
/// and this returns `false` as soon as one check fails.
pub fn can_read_recursive(
    platform: &(impl Platform + ?Sized),
    user: &str,
    path: impl AsRef<Path>,
) -> Result<bool> {
    let path = path.as_ref();

    if !AclSet::load(platform, path)?.can_access(platform, user, Permission::Read)? {
        debug!("{} cannot read {}", user, path.display());
        return Ok(false);
    }

    for parent in path
        .ancestors()
        .skip(1)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        if !AclSet::load(platform, parent)?.can_access(platform, user, Permission::Execute)? {
            debug!("{} cannot search {}", user, parent.display());
            return Ok(false);
        }
    }

    Ok(true)
}
