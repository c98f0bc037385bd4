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

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::entry::{AclEntry, Permission, TagType};

/// All of the ACL entries for a single path.
///
/// This is the form in which ACLs are handed to presentation layers. When serialized, a file has
/// `"default_acls": null` while a directory with no default ACL has `"default_acls": []`.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AclSet {
    /// The path these entries were read from.
    pub file_path: PathBuf,

    /// The access ACL.
    pub acls: Vec<AclEntry>,

    /// The default ACL.
    ///
    /// This is `None` for anything but a directory.
    pub default_acls: Option<Vec<AclEntry>>,
}

impl AclSet {
    /// Whether this set was read from a directory.
    pub fn is_dir(&self) -> bool {
        self.default_acls.is_some()
    }

    /// The entries of the access ACL, or of the default ACL if `default` is `true`.
    ///
    /// For a file, the default ACL is always empty.
    pub fn entries(&self, default: bool) -> &[AclEntry] {
        if default {
            self.default_acls.as_deref().unwrap_or(&[])
        } else {
            &self.acls
        }
    }

    /// A mutable reference to the access ACL, or to the default ACL if `default` is `true`.
    ///
    /// This returns `None` when asking for the default ACL of a file.
    pub fn entries_mut(&mut self, default: bool) -> Option<&mut Vec<AclEntry>> {
        if default {
            self.default_acls.as_mut()
        } else {
            Some(&mut self.acls)
        }
    }

    /// Return the first entry with the given type and qualifier.
    ///
    /// If `qualifier` is `None`, any entry of the given type matches.
    pub fn find_entry(
        &self,
        default: bool,
        tag_type: TagType,
        qualifier: Option<&str>,
    ) -> Option<&AclEntry> {
        self.entries(default).iter().find(|entry| {
            entry.tag_type == tag_type
                && (qualifier.is_none() || entry.qualifier.as_deref() == qualifier)
        })
    }

    /// A mutable version of [`find_entry`].
    ///
    /// [`find_entry`]: crate::acl::AclSet::find_entry
    pub fn find_entry_mut(
        &mut self,
        default: bool,
        tag_type: TagType,
        qualifier: Option<&str>,
    ) -> Option<&mut AclEntry> {
        self.entries_mut(default)?.iter_mut().find(|entry| {
            entry.tag_type == tag_type
                && (qualifier.is_none() || entry.qualifier.as_deref() == qualifier)
        })
    }

    /// The entries which name a user or group, along with their index in the ACL.
    ///
    /// These are the entries a user is able to edit or remove.
    pub fn qualified_entries(&self, default: bool) -> impl Iterator<Item = (usize, &AclEntry)> {
        self.entries(default)
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.tag_type.is_qualified())
    }

    /// Remove and return the entry at `index`.
    ///
    /// This returns `None` if there is no such entry.
    pub fn remove_entry(&mut self, default: bool, index: usize) -> Option<AclEntry> {
        let entries = self.entries_mut(default)?;
        if index < entries.len() {
            Some(entries.remove(index))
        } else {
            None
        }
    }

    /// Grant or revoke a single `permission` on an existing entry.
    ///
    /// This returns `false` if there is no matching entry.
    pub fn set_entry_permission(
        &mut self,
        default: bool,
        tag_type: TagType,
        qualifier: Option<&str>,
        permission: Permission,
        value: bool,
    ) -> bool {
        match self.find_entry_mut(default, tag_type, qualifier) {
            Some(entry) => {
                entry.set_permission(permission, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::Perms;

    fn directory() -> AclSet {
        AclSet {
            file_path: PathBuf::from("/srv/project"),
            acls: vec![
                AclEntry::with_perms(TagType::Owner, None, Perms::RWX),
                AclEntry::with_perms(TagType::User, Some("bob"), Perms::READ),
                AclEntry::with_perms(TagType::GroupOwner, None, Perms::READ),
                AclEntry::with_perms(TagType::Mask, None, Perms::RWX),
                AclEntry::with_perms(TagType::Other, None, Perms::empty()),
            ],
            default_acls: Some(Vec::new()),
        }
    }

    #[test]
    fn only_named_entries_are_editable() {
        let set = directory();
        let editable = set.qualified_entries(false).collect::<Vec<_>>();
        assert_eq!(editable.len(), 1);
        assert_eq!(editable[0].0, 1);
    }

    #[test]
    fn set_entry_permission_changes_one_bit() {
        let mut set = directory();
        assert!(set.set_entry_permission(false, TagType::User, Some("bob"), Permission::Write, true));
        let entry = set.find_entry(false, TagType::User, Some("bob")).unwrap();
        assert_eq!(entry.perms(), Perms::READ | Perms::WRITE);
        assert!(!set.set_entry_permission(true, TagType::User, Some("bob"), Permission::Write, true));
    }

    #[test]
    fn removing_out_of_range_index_does_nothing() {
        let mut set = directory();
        assert_eq!(set.remove_entry(false, 10), None);
        assert_eq!(set.remove_entry(true, 0), None);
        assert_eq!(set.acls.len(), 5);
    }

    #[test]
    fn file_has_no_default_entries() {
        let mut set = directory();
        set.default_acls = None;
        assert!(!set.is_dir());
        assert!(set.entries(true).is_empty());
        assert!(set.entries_mut(true).is_none());
    }
}
