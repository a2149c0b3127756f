// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Synchronizer behavior section.

use serde::Deserialize;

use crate::layer::merge_option;

/// Finalized synchronizer settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
	/// When true, a pass that completes with per-user failures exits with
	/// status 2 instead of 0. Defaults to false: a completed pass reports
	/// its failures but still counts as a successful run.
	pub fail_on_partial: bool,
}

/// Mergeable layer for the `[sync]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfigLayer {
	pub fail_on_partial: Option<bool>,
}

impl SyncConfigLayer {
	pub fn merge(&mut self, other: SyncConfigLayer) {
		merge_option(&mut self.fail_on_partial, other.fail_on_partial);
	}

	pub fn finalize(self) -> SyncConfig {
		SyncConfig {
			fail_on_partial: self.fail_on_partial.unwrap_or(false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_lenient() {
		assert!(!SyncConfigLayer::default().finalize().fail_on_partial);
	}

	#[test]
	fn merge_prefers_other() {
		let mut base = SyncConfigLayer {
			fail_on_partial: Some(false),
		};
		base.merge(SyncConfigLayer {
			fail_on_partial: Some(true),
		});
		assert_eq!(base.fail_on_partial, Some(true));
	}
}
