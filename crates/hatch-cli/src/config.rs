//! Configuration loading for the attach client.
//!
//! Configuration flags are peeled off the front of the argument list and
//! handed to `ortho_config`; clap parses whatever follows.

use std::ffi::{OsStr, OsString};

use hatch_config::Config;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in step with the fields of [`hatch_config::Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--console-endpoint",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the client.
    ///
    /// Configuration flags must appear before any other argument; later
    /// occurrences are left for clap, which rejects them.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let Some(stripped) = text.strip_prefix("--") else {
        return FlagAction::Skip;
    };
    let (name, inline_value) = match stripped.split_once('=') {
        Some((name, _)) => (name, true),
        None => (stripped, false),
    };
    if CONFIG_CLI_FLAGS
        .iter()
        .any(|flag| flag.strip_prefix("--") == Some(name))
    {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

/// Arguments destined for the loader, and where the clap arguments begin.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut iter = args.iter();
    let Some(program) = iter.next() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_start = 1usize;
    while let Some(argument) = iter.next() {
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                command_start += 1;
                if needs_value && let Some(value) = iter.next() {
                    config_arguments.push(value.clone());
                    command_start += 1;
                }
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}

/// Rebuilds the argument list clap should see: the program name and
/// everything after the configuration flags.
pub(crate) fn cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.iter()
        .take(1)
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}
