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

use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::entry::{AclEntry, TagType};
use super::raw::Perms;
use super::set::AclSet;
use crate::platform::Platform;
use crate::{Error, Result};

/// Add a mask entry granting all permissions to `entries` if it doesn't already have one.
///
/// An existing mask entry is left as it is.
pub fn ensure_mask(entries: &mut Vec<AclEntry>) {
    if !entries.iter().any(|entry| entry.tag_type == TagType::Mask) {
        entries.push(AclEntry::with_perms(TagType::Mask, None, Perms::RWX));
    }
}

/// Return the entry with the given type and qualifier, adding one with no permissions if there is
/// none.
///
/// If a new `user` or `group` entry is added, a mask entry is added first if there isn't one, so
/// that the ACL stays valid.
pub fn get_or_create<'a>(
    entries: &'a mut Vec<AclEntry>,
    tag_type: TagType,
    qualifier: Option<&str>,
) -> &'a mut AclEntry {
    let qualifier = if tag_type.is_qualified() {
        qualifier
    } else {
        None
    };

    let index = match entries
        .iter()
        .position(|entry| entry.matches(tag_type, qualifier))
    {
        Some(index) => index,
        None => {
            if tag_type.is_qualified() {
                ensure_mask(entries);
            }
            entries.push(AclEntry::new(tag_type, qualifier));
            entries.len() - 1
        }
    };

    &mut entries[index]
}

/// Grant `perms` to `user` in `entries` without revoking any permissions they already have.
fn grant_entry(entries: &mut Vec<AclEntry>, user: &str, perms: Perms) {
    ensure_mask(entries);
    let entry = get_or_create(entries, TagType::User, Some(user));
    entry.set_perms(entry.perms() | perms);
}

impl AclSet {
    /// Grant `perms` to the user named `user`.
    ///
    /// This adds `perms` to the `user` entry for `user` in the access ACL, creating the entry if
    /// there is none. If `apply_to_default` is `true` and this is a directory, the same is done in
    /// the default ACL. A default ACL can't exist without owner, owning group, and other entries,
    /// so if the default ACL is empty, those entries are first copied from the access ACL.
    pub fn grant(&mut self, user: &str, perms: Perms, apply_to_default: bool) {
        grant_entry(&mut self.acls, user, perms);

        if !apply_to_default {
            return;
        }

        if let Some(default_acls) = &mut self.default_acls {
            if default_acls.is_empty() {
                default_acls.extend(
                    self.acls
                        .iter()
                        .filter(|entry| {
                            matches!(
                                entry.tag_type,
                                TagType::Owner | TagType::GroupOwner | TagType::Other
                            )
                        })
                        .cloned(),
                );
            }
            grant_entry(default_acls, user, perms);
        }
    }
}

/// The outcome of a recursive grant.
#[derive(Debug, Default)]
pub struct GrantReport {
    /// The paths whose ACLs were updated, in the order they were updated.
    pub updated: Vec<PathBuf>,

    /// The paths which could not be updated and why.
    ///
    /// A directory whose own ACLs were updated but whose children could not be listed appears
    /// here as well as in `updated`.
    pub failed: Vec<(PathBuf, Error)>,
}

impl GrantReport {
    /// Return `Err(Error::PartialGrant)` if any path failed, or this report otherwise.
    pub fn into_result(self) -> Result<Self> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            warn!(
                "{} paths were updated before {} failed",
                self.updated.len(),
                self.failed.len()
            );
            Err(Error::PartialGrant {
                failures: self.failed,
            })
        }
    }
}

/// Grant `perms` to `user` on the file or directory at `path`.
///
/// The ACLs of `path` are read, changed with [`AclSet::grant`], and written back. If `recursive`
/// is `true` and `path` is a directory, the same is done to each of its descendants, depth-first
/// and in listing order.
///
/// If `path` itself can't be updated, this returns its error. Otherwise, every descendant is
/// attempted even if some of them fail, and the failures are collected in the returned
/// [`GrantReport`]. A directory whose children can't be listed is recorded as failed after its
/// own ACLs have been updated. Nothing is rolled back.
///
/// [`AclSet::grant`]: crate::acl::AclSet::grant
/// [`GrantReport`]: crate::acl::GrantReport
pub fn grant_path(
    platform: &(impl Platform + ?Sized),
    path: impl AsRef<Path>,
    user: &str,
    perms: Perms,
    default: bool,
    recursive: bool,
) -> Result<GrantReport> {
    let mut report = GrantReport::default();
    grant_tree(
        platform,
        path.as_ref(),
        user,
        perms,
        default,
        recursive,
        &mut report,
    )?;
    Ok(report)
}

fn grant_tree(
    platform: &(impl Platform + ?Sized),
    path: &Path,
    user: &str,
    perms: Perms,
    default: bool,
    recursive: bool,
    report: &mut GrantReport,
) -> Result<()> {
    let mut acl_set = AclSet::load(platform, path)?;
    acl_set.grant(user, perms, default);
    acl_set.store(platform)?;
    debug!("Granted {:?} on {} to {}", perms, path.display(), user);
    report.updated.push(path.to_owned());

    if recursive && acl_set.is_dir() {
        let children = match platform.list_dir(path) {
            Ok(children) => children,
            Err(error) => {
                warn!("Failed to list {}: {}", path.display(), error);
                report.failed.push((path.to_owned(), error.into()));
                return Ok(());
            }
        };

        for child in children {
            if let Err(error) =
                grant_tree(platform, &child, user, perms, default, recursive, report)
            {
                warn!("Failed to grant access to {}: {}", child.display(), error);
                report.failed.push((child, error));
            }
        }
    }

    Ok(())
}

/// Read the ACLs of `path`, change them with `edit`, and write them back.
///
/// Nothing is written if `edit` returns an error.
pub fn edit_path<T>(
    platform: &(impl Platform + ?Sized),
    path: impl AsRef<Path>,
    edit: impl FnOnce(&mut AclSet) -> Result<T>,
) -> Result<T> {
    let mut acl_set = AclSet::load(platform, path)?;
    let value = edit(&mut acl_set)?;
    acl_set.store(platform)?;
    Ok(value)
}
