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

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use exacl::{AclEntryKind, AclOption, Flag, Perm};
use log::debug;
use nix::unistd::geteuid;
use users::os::unix::{GroupExt, UserExt};
use users::{get_group_by_gid, get_group_by_name, get_user_by_name, get_user_by_uid};

use super::{AclFs, Identities};
use crate::acl::{AclKind, Perms, RawAcl, RawEntry, Tag};

/// A `Platform` backed by the local system.
///
/// Users and groups are looked up in the system user database, and ACLs are read and written with
/// `libacl` through the `exacl` crate. The current user is the effective user of this process.
///
/// Symbolic links are followed when a path is given directly, just like `exacl` follows them when
/// reading and writing ACLs. They are left out of directory listings, so recursive operations do
/// not follow links into other parts of the file system.
#[cfg_attr(docsrs, doc(cfg(all(unix, feature = "posix"))))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PosixPlatform;

impl PosixPlatform {
    /// Create a new `PosixPlatform`.
    pub fn new() -> Self {
        PosixPlatform
    }
}

impl Identities for PosixPlatform {
    fn uid_by_name(&self, name: &str) -> Option<u32> {
        get_user_by_name(name).map(|user| user.uid())
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        get_user_by_uid(uid).map(|user| user.name().to_string_lossy().into_owned())
    }

    fn gid_by_name(&self, name: &str) -> Option<u32> {
        get_group_by_name(name).map(|group| group.gid())
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        get_group_by_gid(gid).map(|group| group.name().to_string_lossy().into_owned())
    }

    fn group_members(&self, name: &str) -> Option<Vec<String>> {
        get_group_by_name(name).map(|group| {
            group
                .members()
                .iter()
                .map(|member| member.to_string_lossy().into_owned())
                .collect()
        })
    }

    fn current_user(&self) -> Option<String> {
        self.user_name(geteuid().as_raw())
    }

    fn home_dir(&self, name: &str) -> Option<PathBuf> {
        get_user_by_name(name).map(|user| user.home_dir().to_owned())
    }
}

/// Parse the qualifier of an `exacl` entry, which is either a numeric ID or a name.
fn parse_id(name: &str, lookup: impl FnOnce(&str) -> Option<u32>) -> io::Result<u32> {
    match name.parse() {
        Ok(id) => Ok(id),
        Err(_) => lookup(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("The ACL names an unknown user or group: {}", name),
            )
        }),
    }
}

/// Convert an `exacl` entry into a `RawEntry`.
///
/// If the `name` of a user or group entry is empty, that means it represents the file owner.
fn from_exacl(entry: &exacl::AclEntry) -> io::Result<RawEntry> {
    let (tag, qualifier) = match entry.kind {
        AclEntryKind::User if entry.name.is_empty() => (Tag::UserObj, None),
        AclEntryKind::User => (
            Tag::User,
            Some(parse_id(&entry.name, |name| {
                get_user_by_name(name).map(|user| user.uid())
            })?),
        ),
        AclEntryKind::Group if entry.name.is_empty() => (Tag::GroupObj, None),
        AclEntryKind::Group => (
            Tag::Group,
            Some(parse_id(&entry.name, |name| {
                get_group_by_name(name).map(|group| group.gid())
            })?),
        ),
        AclEntryKind::Mask => (Tag::Mask, None),
        AclEntryKind::Other => (Tag::Other, None),
        _ => (Tag::Undefined, None),
    };

    let mut perms = Perms::empty();
    perms.set(Perms::READ, entry.perms.contains(Perm::READ));
    perms.set(Perms::WRITE, entry.perms.contains(Perm::WRITE));
    perms.set(Perms::EXECUTE, entry.perms.contains(Perm::EXECUTE));

    Ok(RawEntry {
        tag,
        qualifier,
        perms,
    })
}

/// Convert a `RawEntry` into an `exacl` entry with the given `flags`.
fn to_exacl(entry: &RawEntry, flags: Flag) -> io::Result<exacl::AclEntry> {
    let (kind, name) = match (entry.tag, entry.qualifier) {
        (Tag::UserObj, _) => (AclEntryKind::User, String::new()),
        (Tag::User, Some(uid)) => (AclEntryKind::User, uid.to_string()),
        (Tag::GroupObj, _) => (AclEntryKind::Group, String::new()),
        (Tag::Group, Some(gid)) => (AclEntryKind::Group, gid.to_string()),
        (Tag::Mask, _) => (AclEntryKind::Mask, String::new()),
        (Tag::Other, _) => (AclEntryKind::Other, String::new()),
        (Tag::User, None) | (Tag::Group, None) | (Tag::Undefined, _) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "This ACL entry can't be written.",
            ))
        }
    };

    let mut perms = Perm::empty();
    perms.set(Perm::READ, entry.perms.contains(Perms::READ));
    perms.set(Perm::WRITE, entry.perms.contains(Perms::WRITE));
    perms.set(Perm::EXECUTE, entry.perms.contains(Perms::EXECUTE));

    Ok(exacl::AclEntry {
        kind,
        name,
        perms,
        flags,
        allow: true,
    })
}

impl AclFs for PosixPlatform {
    fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }

    fn owner(&self, path: &Path) -> io::Result<u32> {
        Ok(fs::metadata(path)?.uid())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_symlink() {
                debug!("Skipping symbolic link {}", entry.path().display());
                continue;
            }
            children.push(entry.path());
        }
        Ok(children)
    }

    fn get_acl(&self, path: &Path, kind: AclKind) -> io::Result<RawAcl> {
        let option = match kind {
            AclKind::Access => AclOption::ACCESS_ACL,
            AclKind::Default => AclOption::DEFAULT_ACL,
        };
        exacl::getfacl(path, option)?
            .iter()
            .map(from_exacl)
            .collect()
    }

    fn set_acl(&self, path: &Path, kind: AclKind, acl: &RawAcl) -> io::Result<()> {
        let (option, flags) = match kind {
            AclKind::Access => (AclOption::ACCESS_ACL, Flag::empty()),
            AclKind::Default => (AclOption::DEFAULT_ACL, Flag::DEFAULT),
        };
        let entries = acl
            .iter()
            .map(|entry| to_exacl(entry, flags))
            .collect::<io::Result<Vec<_>>>()?;
        exacl::setfacl(&[path], &entries, option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_entries_have_empty_names() -> io::Result<()> {
        let entry = to_exacl(&RawEntry::new(Tag::UserObj, Perms::RWX), Flag::empty())?;
        assert!(matches!(entry.kind, AclEntryKind::User));
        assert!(entry.name.is_empty());
        assert_eq!(from_exacl(&entry)?, RawEntry::new(Tag::UserObj, Perms::RWX));
        Ok(())
    }

    #[test]
    fn numeric_qualifiers_round_trip() -> io::Result<()> {
        let raw = RawEntry::qualified(Tag::Group, 4321, Perms::READ | Perms::EXECUTE);
        let entry = to_exacl(&raw, Flag::DEFAULT)?;
        assert_eq!(entry.name, "4321");
        assert!(entry.flags.contains(Flag::DEFAULT));
        assert_eq!(from_exacl(&entry)?, raw);
        Ok(())
    }

    #[test]
    fn undefined_entries_cannot_be_written() {
        assert!(to_exacl(&RawEntry::new(Tag::Undefined, Perms::empty()), Flag::empty()).is_err());
    }
}
