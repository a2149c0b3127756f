// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Build information and version utilities for clasp.

shadow_rs::shadow!(build);

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
pub const PLATFORM: &str = env!("CLASP_PLATFORM");

/// Build information captured at compile time.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	pub git_sha: &'static str,
	pub build_timestamp: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	#[allow(clippy::const_is_empty)]
	pub const fn current() -> Self {
		Self {
			version: build::PKG_VERSION,
			git_sha: if build::SHORT_COMMIT.is_empty() {
				"unknown"
			} else {
				build::SHORT_COMMIT
			},
			build_timestamp: build::BUILD_TIME,
			platform: PLATFORM,
		}
	}
}

/// Format version info for display.
pub fn format_version_info() -> String {
	let info = BuildInfo::current();

	format!(
		"clasp version: {}\n\
         Git SHA:       {}\n\
         Built at:      {}\n\
         Platform:      {}",
		info.version, info.git_sha, info.build_timestamp, info.platform,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_info_names_the_binary() {
		let output = format_version_info();
		assert!(output.starts_with("clasp version: "));
		assert!(output.contains("Platform:"));
	}

	#[test]
	fn git_sha_is_never_empty() {
		assert!(!BuildInfo::current().git_sha.is_empty());
	}
}
