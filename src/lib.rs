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

//! `acl-share` is a library for inspecting, editing, and sharing files through POSIX access control
//! lists.
//!
//! This crate provides the pieces needed to let the owner of a file on a shared file system give
//! other users access to it:
//! - `AclSet` holds the access ACL and default ACL of a path in a form which is easy to display,
//! edit, and serialize.
//! - `AclSet::can_access` and `can_read_recursive` answer whether a user can read, write, or
//! search a path, with or without taking parent directories into account.
//! - `grant_path` and the editing methods on `AclSet` change ACLs and keep them valid.
//! - `share` grants a user access to a path and fixes up the parent directories so they can
//! actually reach it.
//!
//! All of these go through a `Platform`, which provides user and group lookups and raw ACL reads
//! and writes. `PosixPlatform` uses the real system, and `MemoryPlatform` keeps everything in
//! memory.
//!
//! # Examples
//! ```
//! use std::path::Path;
//! use acl_share::platform::MemoryPlatform;
//! use acl_share::share::{share, ShareRequest};
//! use acl_share::acl::{AclSet, TagType};
//! use acl_share::Config;
//!
//! fn main() -> acl_share::Result<()> {
//!     let platform = MemoryPlatform::new()
//!         .with_user("root", 0)
//!         .with_user("alice", 1000)
//!         .with_user("carol", 1002)
//!         .acting_as("alice");
//!     platform.add_dir("/", "root", 0o755);
//!     platform.add_dir("/home", "root", 0o755);
//!     platform.add_dir("/home/alice", "alice", 0o700);
//!     platform.add_file("/home/alice/notes.txt", "alice", 0o600);
//!
//!     // Give carol read access to the file and search access to `/home/alice`.
//!     let path = Path::new("/home/alice/notes.txt");
//!     share(&platform, &Config::default(), &ShareRequest::new(path, "carol"))?;
//!
//!     let acl_set = AclSet::load(&platform, path)?;
//!     let entry = acl_set.find_entry(false, TagType::User, Some("carol")).unwrap();
//!     assert!(entry.read && entry.execute && !entry.write);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! Some functionality is gated behind cargo features:
//!
//! Type | Cargo Feature
//! --- | ---
//! `PosixPlatform` | `posix`
//! The `acl-share` binary | `cli`

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use config::Config;
pub use error::{Error, Identity, Result};

pub mod acl;
mod config;
mod error;
pub mod platform;
pub mod share;
