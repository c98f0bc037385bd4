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

use std::collections::HashSet;
use std::fmt;

use super::codec::decode_entry;
use super::entry::AclEntry;
use super::raw::{RawEntry, Tag};
use crate::platform::Identities;

/// The reason an ACL is structurally invalid.
///
/// These correspond to the error codes returned by `acl_check(3)`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AclErrorKind {
    /// An entry which may only appear once appears more than once.
    Multiple,

    /// Two entries name the same user or the same group.
    Duplicate,

    /// A required entry is missing.
    Missing,

    /// An entry has an invalid type.
    InvalidEntry,
}

impl fmt::Display for AclErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AclErrorKind::Multiple => "Multiple entries",
            AclErrorKind::Duplicate => "Duplicate entries",
            AclErrorKind::Missing => "Missing or wrong entry",
            AclErrorKind::InvalidEntry => "Invalid entry type",
        })
    }
}

/// A diagnostic explaining why an ACL is invalid.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AclError {
    /// The reason the ACL is invalid.
    pub kind: AclErrorKind,

    /// The index and contents of the offending entry, if it could be determined.
    pub entry: Option<(usize, AclEntry)>,
}

impl fmt::Display for AclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some((_, entry)) => write!(f, "{}: {}", self.kind, entry),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for AclError {}

/// Check the structure of a raw ACL.
///
/// This returns the first problem found and the index of the entry which caused it. Problems which
/// can only be detected after every entry has been seen, such as a missing entry, are reported with
/// an index equal to the number of entries.
///
/// An ACL is valid if it has exactly one owner, owning group, and other entry, no two entries for
/// the same user or group, and a mask entry if it has any named user or group entries.
pub fn check(acl: &[RawEntry]) -> Option<(AclErrorKind, usize)> {
    let mut seen = HashSet::new();
    let mut users = HashSet::new();
    let mut groups = HashSet::new();

    for (index, entry) in acl.iter().enumerate() {
        match (entry.tag, entry.qualifier) {
            (Tag::User, Some(uid)) => {
                if !users.insert(uid) {
                    return Some((AclErrorKind::Duplicate, index));
                }
            }
            (Tag::Group, Some(gid)) => {
                if !groups.insert(gid) {
                    return Some((AclErrorKind::Duplicate, index));
                }
            }
            (Tag::User, None) | (Tag::Group, None) | (Tag::Undefined, _) => {
                return Some((AclErrorKind::InvalidEntry, index));
            }
            (tag, _) => {
                if !seen.insert(tag) {
                    return Some((AclErrorKind::Multiple, index));
                }
            }
        }
    }

    let has_required = [Tag::UserObj, Tag::GroupObj, Tag::Other]
        .iter()
        .all(|tag| seen.contains(tag));
    let needs_mask = !(users.is_empty() && groups.is_empty());

    if !has_required || (needs_mask && !seen.contains(&Tag::Mask)) {
        return Some((AclErrorKind::Missing, acl.len()));
    }

    None
}

/// Explain why a raw ACL is invalid, or return `None` if it is valid.
///
/// The offending entry is included in the diagnostic when its index is in range and its qualifier
/// can be resolved to a name.
pub fn validate(identities: &(impl Identities + ?Sized), acl: &[RawEntry]) -> Option<AclError> {
    let (kind, index) = check(acl)?;
    let entry = acl
        .get(index)
        .and_then(|raw| decode_entry(identities, raw).ok())
        .map(|entry| (index, entry));
    Some(AclError { kind, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{acl_from_mode, Perms};

    fn base() -> Vec<RawEntry> {
        acl_from_mode(0o750)
    }

    #[test]
    fn minimal_acl_is_valid() {
        assert_eq!(check(&base()), None);
    }

    #[test]
    fn second_owner_entry_is_multiple() {
        let mut acl = base();
        acl.push(RawEntry::new(Tag::UserObj, Perms::READ));
        assert_eq!(check(&acl), Some((AclErrorKind::Multiple, 3)));
    }

    #[test]
    fn repeated_user_is_duplicate() {
        let mut acl = base();
        acl.push(RawEntry::new(Tag::Mask, Perms::RWX));
        acl.push(RawEntry::qualified(Tag::User, 1001, Perms::READ));
        acl.push(RawEntry::qualified(Tag::User, 1001, Perms::WRITE));
        assert_eq!(check(&acl), Some((AclErrorKind::Duplicate, 5)));
    }

    #[test]
    fn same_id_as_user_and_group_is_not_duplicate() {
        let mut acl = base();
        acl.push(RawEntry::new(Tag::Mask, Perms::RWX));
        acl.push(RawEntry::qualified(Tag::User, 1001, Perms::READ));
        acl.push(RawEntry::qualified(Tag::Group, 1001, Perms::READ));
        assert_eq!(check(&acl), None);
    }

    #[test]
    fn mask_without_named_entries_is_valid() {
        let mut acl = base();
        acl.push(RawEntry::new(Tag::Mask, Perms::READ));
        assert_eq!(check(&acl), None);
    }

    #[test]
    fn named_entry_without_mask_is_missing() {
        let mut acl = base();
        acl.push(RawEntry::qualified(Tag::Group, 50, Perms::READ));
        assert_eq!(check(&acl), Some((AclErrorKind::Missing, 4)));
    }

    #[test]
    fn missing_other_is_missing() {
        let acl = base()[..2].to_vec();
        assert_eq!(check(&acl), Some((AclErrorKind::Missing, 2)));
    }

    #[test]
    fn undefined_tag_is_invalid_entry() {
        let mut acl = base();
        acl.insert(1, RawEntry::new(Tag::Undefined, Perms::empty()));
        assert_eq!(check(&acl), Some((AclErrorKind::InvalidEntry, 1)));
    }

    #[test]
    fn diagnostic_omits_entry_when_index_out_of_range() {
        let acl = base()[..2].to_vec();
        let platform = crate::platform::MemoryPlatform::new();
        let error = validate(&platform, &acl).unwrap();
        assert_eq!(error.entry, None);
        assert_eq!(error.to_string(), "Missing or wrong entry");
    }
}
