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

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform::Identities;

/// The configuration for sharing and status checks.
///
/// This is constructed once when a program starts and passed to the operations which need it. It
/// can be read from a JSON file with [`Config::from_file`]; missing fields take their default
/// values.
///
/// [`Config::from_file`]: crate::Config::from_file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// The name of the system users log in to, used in messages about unknown users.
    ///
    /// The default value is `"system"`.
    pub site_name: String,

    /// The directory to start in when no path is given.
    ///
    /// The placeholders `{user}` and `{home}` are replaced with the current user's name and home
    /// directory, for example `"/scratch/users/{user}"`.
    ///
    /// The default value is `"{home}"`.
    pub start_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            site_name: String::from("system"),
            start_dir: String::from("{home}"),
        }
    }
}

impl Config {
    /// Read a config from the JSON file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Return `start_dir` with its placeholders filled in for `user` and their `home` directory.
    pub fn start_dir_for(&self, user: &str, home: &Path) -> PathBuf {
        PathBuf::from(
            self.start_dir
                .replace("{user}", user)
                .replace("{home}", &home.to_string_lossy()),
        )
    }

    /// Return `start_dir` for the current user, or `None` if the user or their home directory is
    /// unknown.
    pub fn current_start_dir(&self, identities: &(impl Identities + ?Sized)) -> Option<PathBuf> {
        let user = identities.current_user()?;
        let home = identities.home_dir(&user)?;
        Some(self.start_dir_for(&user, &home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_replaced() {
        let config = Config {
            start_dir: String::from("/vast/scratch/users/{user}"),
            ..Config::default()
        };
        assert_eq!(
            config.start_dir_for("alice", Path::new("/home/alice")),
            PathBuf::from("/vast/scratch/users/alice")
        );
        assert_eq!(
            Config::default().start_dir_for("alice", Path::new("/home/alice")),
            PathBuf::from("/home/alice")
        );
    }

    #[test]
    fn missing_fields_use_defaults() -> anyhow::Result<()> {
        let config: Config = serde_json::from_str(r#"{ "site_name": "Milton" }"#)?;
        assert_eq!(config.site_name, "Milton");
        assert_eq!(config.start_dir, "{home}");
        Ok(())
    }
}
