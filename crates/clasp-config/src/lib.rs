// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the clasp claims synchronizer.
//!
//! Configuration is assembled from an ordered set of sources, later
//! precedence winning key by key:
//!
//! 1. Built-in defaults (`Precedence::Defaults`)
//! 2. TOML config file (`Precedence::ConfigFile`), either the system file at
//!    `/etc/clasp/clasp.toml` or a path given on the command line
//! 3. `CLASP_*` environment variables (`Precedence::Environment`)
//!
//! The IdP admin credential is deliberately excluded from the TOML surface:
//! it is supplied as `CLASP_IDP_TOKEN`, as a file via `CLASP_IDP_TOKEN_FILE`,
//! or as a `token_file` path in the `[idp]` section, and carried as a
//! [`CredentialSource`] until the moment it is needed.
//!
//! ```no_run
//! fn main() -> Result<(), clasp_config::ConfigError> {
//!     let config = clasp_config::load_config()?;
//!     println!("users database at {}", config.database.url);
//!     Ok(())
//! }
//! ```

pub mod error;
mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

use tracing::debug;

pub use error::{ConfigError, Result};
pub use layer::ConfigLayer;
pub use secret::{read_secret_file, SecretError, SecretString};
pub use sections::database::DatabaseConfig;
pub use sections::idp::{CredentialSource, IdpConfig};
pub use sections::logging::{LogFormat, LoggingConfig};
pub use sections::sync::SyncConfig;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
	pub database: DatabaseConfig,
	pub idp: IdpConfig,
	pub sync: SyncConfig,
	pub logging: LoggingConfig,
}

/// Loads configuration from the default source chain: built-in defaults,
/// the system config file if present, then the environment.
pub fn load_config() -> Result<Config> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Loads configuration with an explicit config file that must exist.
pub fn load_config_with_file(path: impl Into<std::path::PathBuf>) -> Result<Config> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(path)),
		Box::new(EnvSource),
	])
}

/// Merges the given sources in precedence order and finalizes the result.
/// The admin credential is read from the environment here; sources only
/// carry non-secret values.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<Config> {
	sources.sort_by_key(|source| source.precedence());

	let mut merged = ConfigLayer::default();
	for source in &sources {
		let layer = source.load()?;
		debug!(source = %source.describe(), "loaded configuration layer");
		merged.merge(layer);
	}

	finalize(merged, sources::credential_from_env())
}

fn finalize(layer: ConfigLayer, credential: Option<CredentialSource>) -> Result<Config> {
	let database = layer.database.unwrap_or_default().finalize()?;
	let idp = layer.idp.unwrap_or_default().finalize(credential)?;
	let sync = layer.sync.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	debug!(
		database_url = %database.url,
		idp_base_url = %idp.base_url,
		credential = %idp.credential,
		fail_on_partial = sync.fail_on_partial,
		"configuration finalized"
	);

	Ok(Config {
		database,
		idp,
		sync,
		logging,
	})
}
