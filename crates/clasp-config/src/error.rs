// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::secret::SecretError;

#[derive(Debug, Error)]
pub enum ConfigError {
	/// A required key was neither set in the config file nor the environment.
	#[error("missing required configuration value: {key}")]
	MissingValue { key: String },

	/// A key was present but could not be parsed into its expected type.
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("configuration validation failed: {0}")]
	Validation(String),

	#[error(transparent)]
	Secret(#[from] SecretError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
