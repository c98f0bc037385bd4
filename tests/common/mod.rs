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

#![allow(dead_code)]

use acl_share::acl::{AclEntry, AclSet, TagType};
use acl_share::platform::MemoryPlatform;

/// The UID of the user the fixtures act as.
pub const ALICE: u32 = 1000;

/// The UID of a user who is a member of the `staff` group.
pub const BOB: u32 = 1001;

/// The UID of the user files are usually shared with.
pub const CAROL: u32 = 1002;

/// The UID of a third party who owns some directories.
pub const DAVE: u32 = 1003;

/// A platform with a few users and a `staff` group, acting as `alice`.
pub fn platform() -> MemoryPlatform {
    MemoryPlatform::new()
        .with_user("root", 0)
        .with_user("alice", ALICE)
        .with_user("bob", BOB)
        .with_user("carol", CAROL)
        .with_user("dave", DAVE)
        .with_group("root", 0, &[])
        .with_group("staff", 100, &["bob"])
        .acting_as("alice")
}

/// A platform with the tree `/`, `/a`, `/a/b`, and `/a/b/file`.
///
/// The root directory is owned by `root` and can be searched by anyone. Everything else is owned
/// by `alice` and private.
pub fn private_tree() -> MemoryPlatform {
    let platform = platform();
    platform.add_dir("/", "root", 0o755);
    platform.add_dir("/a", "alice", 0o700);
    platform.add_dir("/a/b", "alice", 0o700);
    platform.add_file("/a/b/file", "alice", 0o600);
    platform
}

/// Return the access ACL entry for `user` in `acl_set`, if there is one.
pub fn user_entry<'a>(acl_set: &'a AclSet, user: &str) -> Option<&'a AclEntry> {
    acl_set.find_entry(false, TagType::User, Some(user))
}
