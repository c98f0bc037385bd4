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

use log::{debug, warn};

use super::entry::{AclEntry, TagType};
use super::raw::{AclKind, RawAcl, RawEntry, Tag};
use super::set::AclSet;
use super::validate::validate;
use crate::error::Identity;
use crate::platform::{Identities, Platform};
use crate::{Error, Result};

/// Convert a raw entry into an `AclEntry`, resolving its UID or GID to a name.
pub fn decode_entry(identities: &(impl Identities + ?Sized), raw: &RawEntry) -> Result<AclEntry> {
    let qualifier = match (raw.tag, raw.qualifier) {
        (Tag::User, Some(uid)) => Some(
            identities
                .user_name(uid)
                .ok_or(Error::IdentityResolution(Identity::Uid(uid)))?,
        ),
        (Tag::Group, Some(gid)) => Some(
            identities
                .group_name(gid)
                .ok_or(Error::IdentityResolution(Identity::Gid(gid)))?,
        ),
        _ => None,
    };

    Ok(AclEntry::with_perms(
        TagType::from(raw.tag),
        qualifier.as_deref(),
        raw.perms,
    ))
}

/// Convert an `AclEntry` into a raw entry, resolving its user or group name to an ID.
pub fn encode_entry(identities: &(impl Identities + ?Sized), entry: &AclEntry) -> Result<RawEntry> {
    let qualifier = match (entry.tag_type, entry.qualifier.as_deref()) {
        (TagType::User, Some(name)) => Some(
            identities
                .uid_by_name(name)
                .ok_or_else(|| Error::IdentityResolution(Identity::UserName(name.to_owned())))?,
        ),
        (TagType::Group, Some(name)) => Some(
            identities
                .gid_by_name(name)
                .ok_or_else(|| Error::IdentityResolution(Identity::GroupName(name.to_owned())))?,
        ),
        _ => None,
    };

    Ok(RawEntry {
        tag: Tag::from(entry.tag_type),
        qualifier,
        perms: entry.perms(),
    })
}

/// Convert a raw ACL into `AclEntry` values, preserving the order of the entries.
pub fn decode(identities: &(impl Identities + ?Sized), acl: &[RawEntry]) -> Result<Vec<AclEntry>> {
    acl.iter().map(|raw| decode_entry(identities, raw)).collect()
}

/// Convert `AclEntry` values into a raw ACL, preserving the order of the entries.
pub fn encode(identities: &(impl Identities + ?Sized), entries: &[AclEntry]) -> Result<RawAcl> {
    entries
        .iter()
        .map(|entry| encode_entry(identities, entry))
        .collect()
}

/// Write a raw ACL to `path`, explaining the failure if the operating system rejects it.
///
/// Errors from the operating system rarely say what is wrong with an ACL, so when a write fails,
/// this checks the structure of the ACL and returns `Error::InvalidAcl` if it finds a problem.
/// Otherwise, it returns the original error as `Error::OsAcl`.
pub fn apply_acl(
    platform: &(impl Platform + ?Sized),
    path: &Path,
    kind: AclKind,
    acl: &RawAcl,
) -> Result<()> {
    debug!("Writing {:?} ACL with {} entries to {}", kind, acl.len(), path.display());
    platform.set_acl(path, kind, acl).map_err(|source| {
        warn!("Failed to write {:?} ACL to {}: {}", kind, path.display(), source);
        match validate(platform, acl) {
            Some(error) => Error::InvalidAcl {
                path: path.to_owned(),
                error,
            },
            None => Error::OsAcl {
                path: path.to_owned(),
                source,
            },
        }
    })
}

impl AclSet {
    /// Read the ACLs of the file or directory at `path`.
    ///
    /// The default ACL is only read for directories. Files always have `default_acls` set to
    /// `None`, even on platforms which would report an empty default ACL for them.
    pub fn load(platform: &(impl Platform + ?Sized), path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading ACLs of {}", path.display());

        let default_acls = if platform.is_dir(path)? {
            let raw = platform.get_acl(path, AclKind::Default)?;
            Some(decode(platform, &raw)?)
        } else {
            None
        };
        let raw = platform.get_acl(path, AclKind::Access)?;

        Ok(AclSet {
            file_path: path.to_owned(),
            acls: decode(platform, &raw)?,
            default_acls,
        })
    }

    /// Write these ACLs back to `file_path`.
    ///
    /// The access ACL is written first. The default ACL is written afterwards, and only if the
    /// path is still a directory and `default_acls` is `Some`. These are two separate writes, so if
    /// the second one fails, the access ACL has already been changed.
    pub fn store(&self, platform: &(impl Platform + ?Sized)) -> Result<()> {
        let path = self.file_path.as_path();

        let access = encode(platform, &self.acls)?;
        apply_acl(platform, path, AclKind::Access, &access)?;

        if let Some(default_acls) = &self.default_acls {
            if platform.is_dir(path)? {
                let default = encode(platform, default_acls)?;
                apply_acl(platform, path, AclKind::Default, &default)?;
            }
        }

        Ok(())
    }
}
