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

#![cfg(all(unix, feature = "posix"))]

use std::fs::{self, File};
use std::os::unix::fs::{symlink, MetadataExt};

use tempfile::tempdir;

use acl_share::platform::{AclFs, Identities, PosixPlatform};

#[test]
fn reports_file_metadata() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("notes");
    File::create(&file_path)?;

    assert!(platform.exists(temp_dir.path()));
    assert!(platform.exists(&file_path));
    assert!(!platform.exists(&temp_dir.path().join("missing")));
    assert!(platform.is_dir(temp_dir.path())?);
    assert!(!platform.is_dir(&file_path)?);
    assert_eq!(platform.owner(&file_path)?, fs::metadata(&file_path)?.uid());
    Ok(())
}

#[test]
fn symlinked_directory_is_a_directory() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let temp_dir = tempdir()?;
    let target = temp_dir.path().join("target");
    let link = temp_dir.path().join("link");
    fs::create_dir(&target)?;
    symlink(&target, &link)?;

    assert!(platform.exists(&link));
    assert!(platform.is_dir(&target)?);
    assert!(platform.is_dir(&link)?);
    Ok(())
}

#[test]
fn listing_skips_symlinks() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let outside = tempdir()?;
    let temp_dir = tempdir()?;
    File::create(temp_dir.path().join("notes"))?;
    symlink(outside.path(), temp_dir.path().join("elsewhere"))?;
    symlink(temp_dir.path().join("notes"), temp_dir.path().join("alias"))?;

    assert_eq!(
        platform.list_dir(temp_dir.path())?,
        vec![temp_dir.path().join("notes")]
    );
    Ok(())
}

#[test]
fn dangling_symlink_does_not_exist() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let temp_dir = tempdir()?;
    let link = temp_dir.path().join("dangling");
    symlink(temp_dir.path().join("missing"), &link)?;

    assert!(!platform.exists(&link));
    Ok(())
}

#[test]
fn lists_direct_children() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let temp_dir = tempdir()?;
    fs::create_dir_all(temp_dir.path().join("a/nested"))?;
    File::create(temp_dir.path().join("b"))?;

    let mut children = platform.list_dir(temp_dir.path())?;
    children.sort();

    assert_eq!(
        children,
        vec![temp_dir.path().join("a"), temp_dir.path().join("b")]
    );
    Ok(())
}

#[test]
fn owner_of_new_file_has_a_name() -> anyhow::Result<()> {
    let platform = PosixPlatform::new();
    let temp_dir = tempdir()?;
    let uid = platform.owner(temp_dir.path())?;

    if let Some(name) = platform.user_name(uid) {
        assert_eq!(platform.uid_by_name(&name), Some(uid));
    }
    Ok(())
}
