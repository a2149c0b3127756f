// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mergeable configuration layers.
//!
//! Every source produces a [`ConfigLayer`] holding only the values it knows
//! about. Layers merge in precedence order, later values winning key by key,
//! and the merged result finalizes into a [`crate::Config`].

use serde::Deserialize;

use crate::sections::database::DatabaseConfigLayer;
use crate::sections::idp::IdpConfigLayer;
use crate::sections::logging::LoggingConfigLayer;
use crate::sections::sync::SyncConfigLayer;

/// Replaces `dst` when `src` carries a value.
pub(crate) fn merge_option<T>(dst: &mut Option<T>, src: Option<T>) {
	if src.is_some() {
		*dst = src;
	}
}

/// One source's worth of configuration, all fields optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	pub database: Option<DatabaseConfigLayer>,
	pub idp: Option<IdpConfigLayer>,
	pub sync: Option<SyncConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	pub fn merge(&mut self, other: ConfigLayer) {
		match (&mut self.database, other.database) {
			(Some(dst), Some(src)) => dst.merge(src),
			(dst @ None, src @ Some(_)) => *dst = src,
			_ => {}
		}
		match (&mut self.idp, other.idp) {
			(Some(dst), Some(src)) => dst.merge(src),
			(dst @ None, src @ Some(_)) => *dst = src,
			_ => {}
		}
		match (&mut self.sync, other.sync) {
			(Some(dst), Some(src)) => dst.merge(src),
			(dst @ None, src @ Some(_)) => *dst = src,
			_ => {}
		}
		match (&mut self.logging, other.logging) {
			(Some(dst), Some(src)) => dst.merge(src),
			(dst @ None, src @ Some(_)) => *dst = src,
			_ => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_overlays_section_fields() {
		let mut base: ConfigLayer = toml::from_str(
			r#"
			[database]
			url = "sqlite:base.db"
			max_connections = 4

			[sync]
			fail_on_partial = false
			"#,
		)
		.unwrap();

		let overlay: ConfigLayer = toml::from_str(
			r#"
			[database]
			url = "sqlite:overlay.db"

			[sync]
			fail_on_partial = true
			"#,
		)
		.unwrap();

		base.merge(overlay);

		let database = base.database.unwrap();
		assert_eq!(database.url.as_deref(), Some("sqlite:overlay.db"));
		assert_eq!(database.max_connections, Some(4));
		assert_eq!(base.sync.unwrap().fail_on_partial, Some(true));
	}

	#[test]
	fn merge_adopts_missing_sections() {
		let mut base = ConfigLayer::default();
		let overlay: ConfigLayer = toml::from_str(
			r#"
			[idp]
			base_url = "https://idp.example.com"
			"#,
		)
		.unwrap();

		base.merge(overlay);
		assert!(base.idp.is_some());
		assert!(base.database.is_none());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let result: std::result::Result<ConfigLayer, _> = toml::from_str(
			r#"
			[idp]
			base_url = "https://idp.example.com"
			tokne_file = "/run/secrets/idp-token"
			"#,
		);
		assert!(result.is_err());
	}
}
