// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources.
//!
//! Each source yields a [`ConfigLayer`]; [`crate::load_config`] merges them
//! in ascending [`Precedence`] order so the environment always wins over the
//! config file, which wins over built-in defaults.
//!
//! Environment variables:
//!
//! | Variable                              | Maps to                        |
//! |---------------------------------------|--------------------------------|
//! | `CLASP_DATABASE_URL`                  | `database.url`                 |
//! | `CLASP_DATABASE_MAX_CONNECTIONS`      | `database.max_connections`     |
//! | `CLASP_DATABASE_CONNECT_TIMEOUT_SECS` | `database.connect_timeout_secs`|
//! | `CLASP_IDP_BASE_URL`                  | `idp.base_url`                 |
//! | `CLASP_IDP_TOKEN`                     | admin credential (direct)      |
//! | `CLASP_IDP_TOKEN_FILE`                | admin credential (file path)   |
//! | `CLASP_IDP_TIMEOUT_SECS`              | `idp.timeout_secs`             |
//! | `CLASP_SYNC_FAIL_ON_PARTIAL`          | `sync.fail_on_partial`         |
//! | `CLASP_LOG_LEVEL`                     | `logging.level`                |
//! | `CLASP_LOG_FORMAT`                    | `logging.format`               |

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::layer::ConfigLayer;
use crate::secret::SecretString;
use crate::sections::database::DatabaseConfigLayer;
use crate::sections::idp::{CredentialSource, IdpConfigLayer};
use crate::sections::logging::{LogFormat, LoggingConfigLayer};
use crate::sections::sync::SyncConfigLayer;

/// Default system-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/clasp/clasp.toml";

/// Merge order. Higher values overwrite lower ones key by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// A provider of one configuration layer.
pub trait ConfigSource {
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ConfigLayer>;
	/// Human-readable description for startup logging.
	fn describe(&self) -> String;
}

// ============================================================================
// Defaults
// ============================================================================

/// Lowest-precedence source. Defaults live in each section's `finalize`, so
/// this layer is empty; it exists so the source list always has a floor.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer> {
		Ok(ConfigLayer::default())
	}

	fn describe(&self) -> String {
		"built-in defaults".to_string()
	}
}

// ============================================================================
// TOML file
// ============================================================================

/// Reads a `ConfigLayer` from a TOML file.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that must exist, e.g. one named with `--config`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// A file that is silently skipped when absent.
	pub fn optional(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// The conventional system location, loaded only if present.
	pub fn system() -> Self {
		Self::optional(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ConfigLayer> {
		let raw = match fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(source) if source.kind() == io::ErrorKind::NotFound && !self.required => {
				return Ok(ConfigLayer::default());
			}
			Err(source) => {
				return Err(ConfigError::FileRead {
					path: self.path.clone(),
					source,
				});
			}
		};
		toml::from_str(&raw).map_err(|source| ConfigError::TomlParse {
			path: self.path.clone(),
			source,
		})
	}

	fn describe(&self) -> String {
		format!("config file {}", self.path.display())
	}
}

// ============================================================================
// Environment
// ============================================================================

/// Reads a `ConfigLayer` from `CLASP_*` environment variables.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer> {
		let database = DatabaseConfigLayer {
			url: env_var("CLASP_DATABASE_URL"),
			max_connections: env_u32("CLASP_DATABASE_MAX_CONNECTIONS")?,
			connect_timeout_secs: env_u64("CLASP_DATABASE_CONNECT_TIMEOUT_SECS")?,
		};
		let idp = IdpConfigLayer {
			base_url: env_var("CLASP_IDP_BASE_URL"),
			// The credential itself is picked up by `credential_from_env`.
			token_file: None,
			timeout_secs: env_u64("CLASP_IDP_TIMEOUT_SECS")?,
		};
		let sync = SyncConfigLayer {
			fail_on_partial: env_bool("CLASP_SYNC_FAIL_ON_PARTIAL")?,
		};
		let logging = LoggingConfigLayer {
			level: env_var("CLASP_LOG_LEVEL"),
			format: env_log_format("CLASP_LOG_FORMAT")?,
		};
		Ok(ConfigLayer {
			database: Some(database),
			idp: Some(idp),
			sync: Some(sync),
			logging: Some(logging),
		})
	}

	fn describe(&self) -> String {
		"environment (CLASP_*)".to_string()
	}
}

/// Reads the admin credential from the environment. `CLASP_IDP_TOKEN_FILE`
/// wins over `CLASP_IDP_TOKEN` so file-mounted secrets cannot be shadowed by
/// a stale inline token.
pub fn credential_from_env() -> Option<CredentialSource> {
	credential_from_vars(
		env_var("CLASP_IDP_TOKEN_FILE"),
		env_var("CLASP_IDP_TOKEN"),
	)
}

fn credential_from_vars(
	token_file: Option<String>,
	token: Option<String>,
) -> Option<CredentialSource> {
	if let Some(path) = token_file {
		return Some(CredentialSource::TokenFile(PathBuf::from(path)));
	}
	token.map(|value| CredentialSource::Token(SecretString::new(value)))
}

/// Returns the variable's value, treating unset and blank as equivalent.
fn env_var(key: &str) -> Option<String> {
	std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_bool(key: &str) -> Result<Option<bool>> {
	env_var(key).map(|raw| parse_bool(key, &raw)).transpose()
}

fn env_u32(key: &str) -> Result<Option<u32>> {
	env_var(key).map(|raw| parse_u32(key, &raw)).transpose()
}

fn env_u64(key: &str) -> Result<Option<u64>> {
	env_var(key).map(|raw| parse_u64(key, &raw)).transpose()
}

fn env_log_format(key: &str) -> Result<Option<LogFormat>> {
	env_var(key).map(|raw| parse_log_format(key, &raw)).transpose()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("expected a boolean, got {raw:?}"),
		}),
	}
}

fn parse_u32(key: &str, raw: &str) -> Result<u32> {
	raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
		key: key.to_string(),
		message: format!("expected an unsigned integer, got {raw:?}"),
	})
}

fn parse_u64(key: &str, raw: &str) -> Result<u64> {
	raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
		key: key.to_string(),
		message: format!("expected an unsigned integer, got {raw:?}"),
	})
}

fn parse_log_format(key: &str, raw: &str) -> Result<LogFormat> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"pretty" => Ok(LogFormat::Pretty),
		"json" => Ok(LogFormat::Json),
		_ => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("expected \"pretty\" or \"json\", got {raw:?}"),
		}),
	}
}

// ============================================================================
// Tests
// ============================================================================
