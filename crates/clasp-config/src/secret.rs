// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret string handling for credential material.
//!
//! [`SecretString`] wraps sensitive values (IdP admin tokens) so they never
//! leak through `Debug`, `Display`, serialization, or log output. The inner
//! value is zeroized on drop and is only reachable through an explicit
//! [`SecretString::expose`] call at the point of use.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

const REDACTED: &str = "[REDACTED]";

/// Errors raised while loading secret material from disk.
#[derive(Debug, Error)]
pub enum SecretError {
	#[error("failed to read secret file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file {path} is empty")]
	EmptyFile { path: PathBuf },
}

/// A string whose value is redacted everywhere except [`SecretString::expose`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(value: impl Into<String>) -> Self {
		Self { inner: value.into() }
	}

	/// Returns the underlying secret. Call sites should keep the borrow as
	/// short-lived as possible and never format the result into messages.
	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({REDACTED})")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl Eq for SecretString {}

/// Serializes to the redaction marker, never the secret itself.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

/// Reads a secret from `path`, stripping a single trailing newline.
///
/// The trailing-newline rule matches how secret managers and `echo` write
/// token files; interior whitespace is preserved untouched.
pub fn read_secret_file(path: &Path) -> Result<SecretString, SecretError> {
	let raw = fs::read_to_string(path).map_err(|source| SecretError::FileRead {
		path: path.to_path_buf(),
		source,
	})?;
	let value = raw.strip_suffix('\n').unwrap_or(&raw);
	let value = value.strip_suffix('\r').unwrap_or(value);
	if value.is_empty() {
		return Err(SecretError::EmptyFile {
			path: path.to_path_buf(),
		});
	}
	Ok(SecretString::new(value))
}

// ============================================================================
// Tests
// ============================================================================
