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

use bitflags::bitflags;

/// The tag of an entry in a raw ACL.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Tag {
    /// The user that owns the file.
    UserObj,

    /// The user with the UID in the entry's qualifier.
    User,

    /// The group that owns the file.
    GroupObj,

    /// The group with the GID in the entry's qualifier.
    Group,

    /// The ACL mask.
    Mask,

    /// Everyone else.
    Other,

    /// An entry the operating system could not classify.
    Undefined,
}

bitflags! {
    /// The permission bits of a raw ACL entry.
    ///
    /// These have the same values as the POSIX `ACL_READ`, `ACL_WRITE`, and `ACL_EXECUTE` bits.
    pub struct Perms: u32 {
        const READ = 0b100;
        const WRITE = 0b010;
        const EXECUTE = 0b001;
        const RWX = Self::READ.bits | Self::WRITE.bits | Self::EXECUTE.bits;
    }
}

/// An entry in an ACL as the operating system represents it.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct RawEntry {
    /// The tag of this entry.
    pub tag: Tag,

    /// The UID or GID this entry applies to, for `Tag::User` and `Tag::Group` entries.
    pub qualifier: Option<u32>,

    /// The permissions granted by this entry.
    pub perms: Perms,
}

impl RawEntry {
    /// Create an entry with no qualifier.
    pub fn new(tag: Tag, perms: Perms) -> Self {
        RawEntry {
            tag,
            qualifier: None,
            perms,
        }
    }

    /// Create an entry which applies to the user or group with the given ID.
    pub fn qualified(tag: Tag, id: u32, perms: Perms) -> Self {
        RawEntry {
            tag,
            qualifier: Some(id),
            perms,
        }
    }
}

/// An ordered list of ACL entries as the operating system represents it.
pub type RawAcl = Vec<RawEntry>;

/// Build the minimal ACL equivalent to the permission bits of a file `mode`.
pub fn acl_from_mode(mode: u32) -> RawAcl {
    vec![
        RawEntry::new(Tag::UserObj, Perms::from_bits_truncate((mode & 0o700) >> 6)),
        RawEntry::new(Tag::GroupObj, Perms::from_bits_truncate((mode & 0o070) >> 3)),
        RawEntry::new(Tag::Other, Perms::from_bits_truncate(mode & 0o007)),
    ]
}

/// Which of a path's two ACLs an operation applies to.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AclKind {
    /// The access ACL, which defines the current access permissions.
    Access,

    /// The default ACL, which defines the permissions inherited by new children of a directory.
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_splits_into_owner_group_other() {
        let acl = acl_from_mode(0o751);
        assert_eq!(
            acl,
            vec![
                RawEntry::new(Tag::UserObj, Perms::RWX),
                RawEntry::new(Tag::GroupObj, Perms::READ | Perms::EXECUTE),
                RawEntry::new(Tag::Other, Perms::EXECUTE),
            ]
        );
    }
}
