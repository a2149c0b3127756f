// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider configuration section.
//!
//! The admin credential is never written in the config file. It arrives
//! either directly through the environment (`CLASP_IDP_TOKEN`) or as a path
//! to a token file (`CLASP_IDP_TOKEN_FILE` or `[idp] token_file`), and the
//! chosen source is recorded as a [`CredentialSource`] so startup logging can
//! say where the credential came from without ever printing it.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::layer::merge_option;
use crate::secret::{read_secret_file, SecretString};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the IdP admin credential comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
	/// Token material passed directly, e.g. via `CLASP_IDP_TOKEN`.
	Token(SecretString),
	/// Path to a file holding the token, read at resolution time.
	TokenFile(PathBuf),
}

impl CredentialSource {
	/// Produces the token itself. File-backed credentials are read here, at
	/// startup, so a bad path fails the run before any claims call is made.
	pub fn resolve(&self) -> Result<SecretString> {
		match self {
			CredentialSource::Token(token) => {
				if token.is_empty() {
					return Err(ConfigError::Validation(
						"idp token must not be empty".to_string(),
					));
				}
				Ok(token.clone())
			}
			CredentialSource::TokenFile(path) => Ok(read_secret_file(path)?),
		}
	}
}

impl fmt::Display for CredentialSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CredentialSource::Token(_) => f.write_str("environment token"),
			CredentialSource::TokenFile(path) => write!(f, "token file {}", path.display()),
		}
	}
}

/// Finalized identity provider settings.
#[derive(Debug, Clone)]
pub struct IdpConfig {
	/// Base URL of the IdP admin API, without a trailing slash.
	pub base_url: String,
	pub credential: CredentialSource,
	pub timeout_secs: u64,
}

/// Mergeable layer for the `[idp]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdpConfigLayer {
	pub base_url: Option<String>,
	pub token_file: Option<PathBuf>,
	pub timeout_secs: Option<u64>,
}

impl IdpConfigLayer {
	pub fn merge(&mut self, other: IdpConfigLayer) {
		merge_option(&mut self.base_url, other.base_url);
		merge_option(&mut self.token_file, other.token_file);
		merge_option(&mut self.timeout_secs, other.timeout_secs);
	}

	/// Finalizes the section. `credential` carries an environment-supplied
	/// credential, which wins over a `token_file` from the config file.
	pub fn finalize(self, credential: Option<CredentialSource>) -> Result<IdpConfig> {
		let base_url = self.base_url.ok_or_else(|| ConfigError::MissingValue {
			key: "idp.base_url".to_string(),
		})?;
		if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
			return Err(ConfigError::InvalidValue {
				key: "idp.base_url".to_string(),
				message: "must start with http:// or https://".to_string(),
			});
		}
		let base_url = base_url.trim_end_matches('/').to_string();

		let credential = credential
			.or(self.token_file.map(CredentialSource::TokenFile))
			.ok_or_else(|| ConfigError::MissingValue {
				key: "idp.token".to_string(),
			})?;

		Ok(IdpConfig {
			base_url,
			credential,
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
		})
	}
}
