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

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use acl_share::acl::{edit_path, AclEntry, AclSet, Permission, TagType};
use acl_share::platform::PosixPlatform;
use acl_share::share::{check_status, share_message, ShareRequest, StatusMessage};
use acl_share::Config;

#[derive(Parser)]
#[command(name = "acl-share")]
#[command(about = "Inspect, edit, and share files using POSIX ACLs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path of a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set the logging level (error, warn, info, debug)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ACLs of a file or directory
    Show {
        /// The file or directory, defaulting to the configured start directory
        path: Option<PathBuf>,

        /// Print the ACLs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a user can read a file or directory
    Status {
        /// The user to check
        user: String,

        /// The file or directory, defaulting to the configured start directory
        path: Option<PathBuf>,
    },

    /// Share a file or directory with another user
    Share {
        /// The user to share with
        user: String,

        /// The file or directory, defaulting to the configured start directory
        path: Option<PathBuf>,

        /// Let the user write to it as well
        #[arg(short, long)]
        editable: bool,

        /// Share everything inside the directory as well
        #[arg(short, long)]
        recursive: bool,

        /// Share files created inside the directory in the future
        #[arg(short, long)]
        default: bool,
    },

    /// Grant or revoke one permission on an existing user or group entry
    Set {
        /// The file or directory to edit
        path: PathBuf,

        /// The entry type: user or group
        #[arg(short, long, default_value = "user")]
        tag: String,

        /// The user or group name of the entry
        #[arg(short, long)]
        qualifier: String,

        /// The permission to change: read, write, or execute
        #[arg(short, long)]
        permission: String,

        /// Revoke the permission instead of granting it
        #[arg(long)]
        revoke: bool,

        /// Edit the default ACL instead of the access ACL
        #[arg(short, long)]
        default: bool,
    },

    /// Remove an entry by its index, as shown by `show`
    Remove {
        /// The file or directory to edit
        path: PathBuf,

        /// The index of the entry to remove
        index: usize,

        /// Remove from the default ACL instead of the access ACL
        #[arg(short, long)]
        default: bool,
    },
}

/// Print one ACL in the format used by `getfacl`, with indices.
fn print_entries(title: &str, entries: &[AclEntry]) {
    println!("# {}", title);
    for (index, entry) in entries.iter().enumerate() {
        println!("{:>3}  {}", index, entry);
    }
}

fn print_status(status: &StatusMessage) -> ExitCode {
    if status.success {
        println!("{}", status);
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", status);
        ExitCode::FAILURE
    }
}

/// Return `path`, or the configured start directory if it is `None`.
fn resolve_path(
    path: Option<PathBuf>,
    config: &Config,
    platform: &PosixPlatform,
) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => config
            .current_start_dir(platform)
            .ok_or_else(|| anyhow!("No path was given and the start directory is unknown.")),
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Could not read {}", path.display()))?,
        None => Config::default(),
    };
    let platform = PosixPlatform::new();

    match cli.command {
        Commands::Show { path, json } => {
            let path = resolve_path(path, &config, &platform)?;
            let acl_set = AclSet::load(&platform, &path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&acl_set)?);
            } else {
                println!("# file: {}", acl_set.file_path.display());
                print_entries("access", &acl_set.acls);
                if let Some(default_acls) = &acl_set.default_acls {
                    print_entries("default", default_acls);
                }
            }
        }
        Commands::Status { user, path } => {
            let path = resolve_path(path, &config, &platform)?;
            return Ok(print_status(&check_status(&platform, &path, &user)?));
        }
        Commands::Share {
            user,
            path,
            editable,
            recursive,
            default,
        } => {
            let path = resolve_path(path, &config, &platform)?;
            let request = ShareRequest {
                path: &path,
                user: &user,
                editable,
                recursive,
                default,
            };
            return Ok(print_status(&share_message(&platform, &config, &request)));
        }
        Commands::Set {
            path,
            tag,
            qualifier,
            permission,
            revoke,
            default,
        } => {
            let tag_type = tag.parse::<TagType>()?;
            let permission = permission.parse::<Permission>()?;
            edit_path(&platform, &path, |acl_set| {
                if acl_set.set_entry_permission(
                    default,
                    tag_type,
                    Some(qualifier.as_str()),
                    permission,
                    !revoke,
                ) {
                    Ok(())
                } else {
                    Err(no_such_entry(&path))
                }
            })?;
        }
        Commands::Remove {
            path,
            index,
            default,
        } => {
            edit_path(&platform, &path, |acl_set| {
                acl_set
                    .remove_entry(default, index)
                    .map(|_| ())
                    .ok_or_else(|| no_such_entry(&path))
            })?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn no_such_entry(path: &Path) -> acl_share::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} has no such ACL entry.", path.display()),
    )
    .into()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}
