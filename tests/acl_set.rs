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

use std::io::Write;

use maplit::hashset;
use tempfile::NamedTempFile;

use acl_share::acl::{
    edit_path, AclEntry, AclErrorKind, AclKind, AclSet, Permission, Perms, TagType,
};
use acl_share::{Config, Error};
use common::{platform, user_entry};

mod common;

#[test]
fn stored_acls_load_unchanged() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_dir("/shared", "alice", 0o750);
    let mut acl_set = AclSet::load(&platform, "/shared")?;
    acl_set.grant("carol", Perms::READ | Perms::EXECUTE, true);
    acl_set
        .acls
        .push(AclEntry::with_perms(TagType::Group, Some("staff"), Perms::READ));

    acl_set.store(&platform)?;
    let loaded = AclSet::load(&platform, "/shared")?;

    assert_eq!(loaded, acl_set);
    Ok(())
}

#[test]
fn files_have_no_default_acl() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_dir("/shared", "alice", 0o755);
    platform.add_file("/shared/notes", "alice", 0o644);

    assert_eq!(AclSet::load(&platform, "/shared")?.default_acls, Some(Vec::new()));
    assert_eq!(AclSet::load(&platform, "/shared/notes")?.default_acls, None);
    Ok(())
}

#[test]
fn serialized_default_acls_distinguish_files_from_directories() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_dir("/shared", "alice", 0o755);
    platform.add_file("/shared/notes", "alice", 0o644);

    let dir = serde_json::to_value(AclSet::load(&platform, "/shared")?)?;
    let file = serde_json::to_value(AclSet::load(&platform, "/shared/notes")?)?;

    assert_eq!(dir["default_acls"], serde_json::json!([]));
    assert_eq!(file["default_acls"], serde_json::Value::Null);
    assert_eq!(
        file["acls"][0],
        serde_json::json!({
            "tag_type": "owner",
            "qualifier": null,
            "read": true,
            "write": true,
            "execute": false,
        })
    );

    let parsed: AclSet = serde_json::from_value(file)?;
    assert_eq!(parsed.default_acls, None);
    Ok(())
}

#[test]
fn edit_changes_one_permission() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_file("/notes", "alice", 0o600);
    edit_path(&platform, "/notes", |acl_set| {
        acl_set.grant("carol", Perms::READ, false);
        Ok(())
    })?;

    let changed = edit_path(&platform, "/notes", |acl_set| {
        Ok(acl_set.set_entry_permission(
            false,
            TagType::User,
            Some("carol"),
            Permission::Write,
            true,
        ))
    })?;

    assert!(changed);
    let notes = AclSet::load(&platform, "/notes")?;
    assert_eq!(
        user_entry(&notes, "carol").map(ToString::to_string),
        Some(String::from("user:carol:rw-"))
    );
    Ok(())
}

#[test]
fn failed_edit_writes_nothing() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_file("/notes", "alice", 0o600);

    let result = edit_path(&platform, "/notes", |acl_set| {
        acl_set.acls.clear();
        Err::<(), _>(Error::InvalidPermission(String::from("delete")))
    });

    assert!(matches!(result, Err(Error::InvalidPermission(_))));
    assert!(platform.writes().is_empty());
    assert_eq!(AclSet::load(&platform, "/notes")?.acls.len(), 3);
    Ok(())
}

#[test]
fn removing_required_entry_is_explained() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_file("/notes", "alice", 0o600);

    let result = edit_path(&platform, "/notes", |acl_set| {
        Ok(acl_set.remove_entry(false, 2))
    });

    match result {
        Err(Error::InvalidAcl { path, error }) => {
            assert_eq!(path.to_str(), Some("/notes"));
            assert_eq!(error.kind, AclErrorKind::Missing);
            assert_eq!(error.to_string(), "Missing or wrong entry");
        }
        other => panic!("Expected InvalidAcl, got {:?}", other),
    }
    assert!(platform.writes().is_empty());
    Ok(())
}

#[test]
fn removing_named_entry_keeps_mask() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_file("/notes", "alice", 0o600);
    edit_path(&platform, "/notes", |acl_set| {
        acl_set.grant("carol", Perms::READ, false);
        acl_set.grant("bob", Perms::READ, false);
        Ok(())
    })?;

    edit_path(&platform, "/notes", |acl_set| {
        let index = acl_set
            .qualified_entries(false)
            .find(|(_, entry)| entry.qualifier.as_deref() == Some("carol"))
            .map(|(index, _)| index);
        Ok(index.and_then(|index| acl_set.remove_entry(false, index)))
    })?;

    let notes = AclSet::load(&platform, "/notes")?;
    let tags = notes
        .acls
        .iter()
        .map(|entry| entry.tag_type)
        .collect::<std::collections::HashSet<_>>();
    assert_eq!(
        tags,
        hashset! {
            TagType::Owner,
            TagType::GroupOwner,
            TagType::Other,
            TagType::Mask,
            TagType::User,
        }
    );
    assert!(user_entry(&notes, "carol").is_none());
    assert!(user_entry(&notes, "bob").is_some());
    Ok(())
}

#[test]
fn writes_follow_access_then_default() -> anyhow::Result<()> {
    let platform = platform();
    platform.add_dir("/shared", "alice", 0o700);
    platform.add_file("/shared/notes", "alice", 0o600);

    AclSet::load(&platform, "/shared")?.store(&platform)?;
    AclSet::load(&platform, "/shared/notes")?.store(&platform)?;

    assert_eq!(
        platform
            .writes()
            .into_iter()
            .map(|(path, kind)| (path.to_string_lossy().into_owned(), kind))
            .collect::<Vec<_>>(),
        vec![
            (String::from("/shared"), AclKind::Access),
            (String::from("/shared"), AclKind::Default),
            (String::from("/shared/notes"), AclKind::Access),
        ]
    );
    Ok(())
}

#[test]
fn config_file_fills_in_defaults() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(br#"{ "site_name": "Cluster" }"#)?;

    let config = Config::from_file(file.path())?;

    assert_eq!(config.site_name, "Cluster");
    assert_eq!(config.start_dir, Config::default().start_dir);
    Ok(())
}

#[test]
fn malformed_config_file_errs() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"site_name = \"Cluster\"")?;

    assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn start_dir_uses_current_user() {
    let platform = platform();

    assert_eq!(
        Config::default().current_start_dir(&platform),
        Some(std::path::PathBuf::from("/home/alice"))
    );
}
