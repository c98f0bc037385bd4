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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::raw::{Perms, Tag};
use crate::Error;

/// The type of an [`AclEntry`].
///
/// These serialize to the lowercase names used by presentation layers, such as `"group_owner"`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    /// A named user.
    User,

    /// A named group.
    Group,

    /// Everyone else.
    Other,

    /// The user that owns the file.
    Owner,

    /// The group that owns the file.
    GroupOwner,

    /// The ACL mask.
    Mask,

    /// An entry the operating system could not classify.
    Undefined,
}

impl TagType {
    /// Whether entries of this type name a user or group in their qualifier.
    pub fn is_qualified(self) -> bool {
        matches!(self, TagType::User | TagType::Group)
    }

    /// The name of this tag type as it is serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            TagType::User => "user",
            TagType::Group => "group",
            TagType::Other => "other",
            TagType::Owner => "owner",
            TagType::GroupOwner => "group_owner",
            TagType::Mask => "mask",
            TagType::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TagType::User),
            "group" => Ok(TagType::Group),
            "other" => Ok(TagType::Other),
            "owner" => Ok(TagType::Owner),
            "group_owner" => Ok(TagType::GroupOwner),
            "mask" => Ok(TagType::Mask),
            "undefined" => Ok(TagType::Undefined),
            _ => Err(Error::InvalidTagType(s.to_owned())),
        }
    }
}

impl From<Tag> for TagType {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::UserObj => TagType::Owner,
            Tag::User => TagType::User,
            Tag::GroupObj => TagType::GroupOwner,
            Tag::Group => TagType::Group,
            Tag::Mask => TagType::Mask,
            Tag::Other => TagType::Other,
            Tag::Undefined => TagType::Undefined,
        }
    }
}

impl From<TagType> for Tag {
    fn from(tag_type: TagType) -> Self {
        match tag_type {
            TagType::Owner => Tag::UserObj,
            TagType::User => Tag::User,
            TagType::GroupOwner => Tag::GroupObj,
            TagType::Group => Tag::Group,
            TagType::Mask => Tag::Mask,
            TagType::Other => Tag::Other,
            TagType::Undefined => Tag::Undefined,
        }
    }
}

/// One of the three permissions an ACL entry can grant.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Permission {
    Read,
    Write,
    Execute,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Execute => "execute",
        })
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "execute" => Ok(Permission::Execute),
            _ => Err(Error::InvalidPermission(s.to_owned())),
        }
    }
}

/// A single entry in an ACL, with users and groups identified by name.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct AclEntry {
    /// The type of this entry.
    pub tag_type: TagType,

    /// The user or group name.
    ///
    /// Only `user` and `group` entries have a qualifier.
    pub qualifier: Option<String>,

    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl AclEntry {
    /// Create an entry of the given type which grants no permissions.
    ///
    /// The `qualifier` is discarded unless `tag_type` is `user` or `group`.
    pub fn new(tag_type: TagType, qualifier: Option<&str>) -> Self {
        AclEntry {
            tag_type,
            qualifier: if tag_type.is_qualified() {
                qualifier.map(str::to_owned)
            } else {
                None
            },
            read: false,
            write: false,
            execute: false,
        }
    }

    /// Create an entry granting the given raw `perms`.
    pub fn with_perms(tag_type: TagType, qualifier: Option<&str>, perms: Perms) -> Self {
        let mut entry = Self::new(tag_type, qualifier);
        entry.set_perms(perms);
        entry
    }

    /// Return whether this entry grants `permission`.
    pub fn permission(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => self.read,
            Permission::Write => self.write,
            Permission::Execute => self.execute,
        }
    }

    /// Grant or revoke `permission`.
    pub fn set_permission(&mut self, permission: Permission, value: bool) {
        match permission {
            Permission::Read => self.read = value,
            Permission::Write => self.write = value,
            Permission::Execute => self.execute = value,
        }
    }

    /// The permissions granted by this entry as raw bits.
    pub fn perms(&self) -> Perms {
        let mut perms = Perms::empty();
        perms.set(Perms::READ, self.read);
        perms.set(Perms::WRITE, self.write);
        perms.set(Perms::EXECUTE, self.execute);
        perms
    }

    /// Replace the permissions of this entry with the given raw bits.
    pub fn set_perms(&mut self, perms: Perms) {
        self.read = perms.contains(Perms::READ);
        self.write = perms.contains(Perms::WRITE);
        self.execute = perms.contains(Perms::EXECUTE);
    }

    /// Whether this entry has the given type and qualifier.
    pub fn matches(&self, tag_type: TagType, qualifier: Option<&str>) -> bool {
        self.tag_type == tag_type && self.qualifier.as_deref() == qualifier
    }
}

/// Entries are formatted the way `getfacl` prints them, such as `user:alice:r-x`.
impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}{}{}",
            self.tag_type,
            self.qualifier.as_deref().unwrap_or(""),
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
        )
    }
}
