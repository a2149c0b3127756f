// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::Deserialize;

use crate::layer::merge_option;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Pretty,
	Json,
}

/// Finalized logging settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Default filter directive, overridden by `RUST_LOG` when set.
	pub level: String,
	pub format: LogFormat,
}

/// Mergeable layer for the `[logging]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		merge_option(&mut self.level, other.level);
		merge_option(&mut self.format, other.format);
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
			format: self.format.unwrap_or(LogFormat::Pretty),
		}
	}
}
