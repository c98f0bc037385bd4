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

//! Reading, checking, evaluating, and changing POSIX ACLs.
//!
//! The operating system represents an ACL as an ordered list of `RawEntry` values which identify
//! users and groups by numeric ID. This module converts those into an `AclSet`, which holds both
//! the access ACL and the default ACL of a path with users and groups identified by name. An
//! `AclSet` is always read fresh with `AclSet::load` and written back whole with `AclSet::store`.
//!
//! # Validity
//!
//! A valid ACL has exactly one `owner`, `group_owner`, and `other` entry, at most one entry per
//! named user or group, and a `mask` entry whenever it has any named entries. When the operating
//! system rejects an ACL, `validate` is used to explain why.

pub use self::access::can_read_recursive;
pub use self::codec::{apply_acl, decode, decode_entry, encode, encode_entry};
pub use self::entry::{AclEntry, Permission, TagType};
pub use self::mutate::{edit_path, ensure_mask, get_or_create, grant_path, GrantReport};
pub use self::raw::{acl_from_mode, AclKind, Perms, RawAcl, RawEntry, Tag};
pub use self::set::AclSet;
pub use self::validate::{check, validate, AclError, AclErrorKind};

mod access;
mod codec;
mod entry;
mod mutate;
mod raw;
mod set;
mod validate;
