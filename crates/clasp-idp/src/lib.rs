// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider admin client for clasp.
//!
//! This crate speaks the one administrative operation the synchronizer
//! needs: setting a user's custom claims. The operation is exposed behind
//! the [`ClaimsStore`] trait so the sync core can run against a mock, with
//! [`HttpClaimsClient`] as the production implementation.
//!
//! # Wire format
//!
//! ```text
//! PUT {base_url}/admin/v1/users/{subject_id}/claims
//! Authorization: Bearer <admin token>
//! Content-Type: application/json
//!
//! {"roles": ["admin", "editor"], "currentRole": "admin"}
//! ```
//!
//! Any 2xx response counts as success. Error responses are reduced to an
//! [`IdpError::Api`] carrying the status code and the most specific message
//! the body offers.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use clasp_config::SecretString;
//! use clasp_idp::{ClaimsStore, CustomClaims, HttpClaimsClient, IdpClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClaimsClient::new(IdpClientConfig {
//!     base_url: "https://idp.example.com".to_string(),
//!     token: SecretString::new("tok_admin"),
//!     timeout: Duration::from_secs(30),
//! });
//!
//! let claims = CustomClaims {
//!     roles: vec!["admin".to_string()],
//!     current_role: "admin".to_string(),
//! };
//! client.set_custom_claims("user-123", &claims).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - The admin token is wrapped in [`SecretString`] and only exposed while
//!   writing the `Authorization` header.
//! - Tracing instrumentation records subject ids, never claims contents or
//!   credentials.

use std::time::Duration;

use async_trait::async_trait;
use clasp_config::SecretString;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

const USER_AGENT: &str = concat!("clasp/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur while talking to the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdpError {
	/// The HTTP request failed before producing a response (network error,
	/// timeout, TLS failure).
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// The identity provider answered with a non-success status.
	#[error("identity provider returned {status}: {message}")]
	Api { status: u16, message: String },

	/// The configured base URL cannot host the claims endpoint.
	#[error("invalid base URL {url}: {message}")]
	InvalidBaseUrl { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, IdpError>;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the HTTP claims client.
#[derive(Debug, Clone)]
pub struct IdpClientConfig {
	/// Base URL of the admin API, with or without a trailing slash.
	pub base_url: String,
	/// Admin bearer token (wrapped to prevent logging).
	pub token: SecretString,
	/// Per-request timeout.
	pub timeout: Duration,
}

// =============================================================================
// Claims payload
// =============================================================================

/// The custom-claims object attached to a user, serialized as
/// `{"roles": [...], "currentRole": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomClaims {
	pub roles: Vec<String>,
	pub current_role: String,
}

// =============================================================================
// ClaimsStore trait
// =============================================================================

/// Write access to per-user custom claims.
#[async_trait]
pub trait ClaimsStore: Send + Sync {
	/// Replaces `subject_id`'s custom claims with `claims`.
	async fn set_custom_claims(&self, subject_id: &str, claims: &CustomClaims) -> Result<()>;
}

// =============================================================================
// HTTP client
// =============================================================================

/// Reqwest-backed [`ClaimsStore`].
#[derive(Debug, Clone)]
pub struct HttpClaimsClient {
	config: IdpClientConfig,
	http_client: reqwest::Client,
}

impl HttpClaimsClient {
	/// Create a new claims client with the given configuration.
	///
	/// # Panics
	///
	/// Panics if the HTTP client cannot be built (should never happen in practice).
	#[tracing::instrument(skip_all, name = "HttpClaimsClient::new")]
	pub fn new(config: IdpClientConfig) -> Self {
		let http_client = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			.timeout(config.timeout)
			.build()
			.expect("failed to build HTTP client");

		Self {
			config,
			http_client,
		}
	}
}

#[async_trait]
impl ClaimsStore for HttpClaimsClient {
	#[tracing::instrument(
		skip(self, claims),
		name = "HttpClaimsClient::set_custom_claims",
		fields(subject_id = %subject_id)
	)]
	async fn set_custom_claims(&self, subject_id: &str, claims: &CustomClaims) -> Result<()> {
		let url = claims_url(&self.config.base_url, subject_id)?;

		let response = self
			.http_client
			.put(url)
			.header("Authorization", format!("Bearer {}", self.config.token.expose()))
			.json(claims)
			.send()
			.await?;

		let status = response.status();
		if status.is_success() {
			tracing::debug!("claims accepted");
			return Ok(());
		}

		let body = response.text().await.unwrap_or_default();
		Err(IdpError::Api {
			status: status.as_u16(),
			message: parse_error_message(status, &body),
		})
	}
}

/// Builds the claims endpoint URL for a subject.
///
/// The subject id is appended as a single path segment, so ids containing
/// `/`, spaces, or other reserved characters are percent-encoded rather than
/// splitting the path. Base URLs may carry a path prefix and a trailing
/// slash; both are handled.
fn claims_url(base_url: &str, subject_id: &str) -> Result<Url> {
	let mut url = Url::parse(base_url).map_err(|e| IdpError::InvalidBaseUrl {
		url: base_url.to_string(),
		message: e.to_string(),
	})?;
	{
		let mut segments = url
			.path_segments_mut()
			.map_err(|()| IdpError::InvalidBaseUrl {
				url: base_url.to_string(),
				message: "cannot be a base URL".to_string(),
			})?;
		segments.pop_if_empty();
		segments.extend(["admin", "v1", "users", subject_id, "claims"]);
	}
	Ok(url)
}

/// Extracts the most specific error message from a response body.
///
/// Recognized shapes, in order: `{"error": {"message": ...}}`,
/// `{"error": "..."}`, `{"message": "..."}`. Falls back to the raw body,
/// then to the status code's canonical reason.
fn parse_error_message(status: StatusCode, body: &str) -> String {
	if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
		if let Some(message) = value
			.get("error")
			.and_then(|e| e.get("message"))
			.and_then(|m| m.as_str())
		{
			return message.to_string();
		}
		if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
			return message.to_string();
		}
		if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
			return message.to_string();
		}
	}

	let trimmed = body.trim();
	if !trimmed.is_empty() {
		return trimmed.to_string();
	}
	status
		.canonical_reason()
		.unwrap_or("unknown error")
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn claims_serialize_with_camel_case_current_role() {
		let claims = CustomClaims {
			roles: vec!["admin".to_string(), "editor".to_string()],
			current_role: "admin".to_string(),
		};

		let value = serde_json::to_value(&claims).unwrap();
		assert_eq!(
			value,
			serde_json::json!({
				"roles": ["admin", "editor"],
				"currentRole": "admin"
			})
		);
	}

	#[test]
	fn claims_deserialize_from_camel_case() {
		let claims: CustomClaims =
			serde_json::from_str(r#"{"roles": ["viewer"], "currentRole": "viewer"}"#).unwrap();
		assert_eq!(claims.roles, vec!["viewer"]);
		assert_eq!(claims.current_role, "viewer");
	}

	#[test]
	fn claims_url_joins_plain_base() {
		let url = claims_url("https://idp.example.com", "user-123").unwrap();
		assert_eq!(
			url.as_str(),
			"https://idp.example.com/admin/v1/users/user-123/claims"
		);
	}

	#[test]
	fn claims_url_tolerates_trailing_slash() {
		let url = claims_url("https://idp.example.com/", "user-123").unwrap();
		assert_eq!(
			url.as_str(),
			"https://idp.example.com/admin/v1/users/user-123/claims"
		);
	}

	#[test]
	fn claims_url_keeps_base_path_prefix() {
		let url = claims_url("https://idp.example.com/tenant-a/", "user-123").unwrap();
		assert_eq!(
			url.as_str(),
			"https://idp.example.com/tenant-a/admin/v1/users/user-123/claims"
		);
	}

	#[test]
	fn claims_url_encodes_reserved_characters() {
		let url = claims_url("https://idp.example.com", "user/..?x=1").unwrap();
		assert_eq!(
			url.as_str(),
			"https://idp.example.com/admin/v1/users/user%2F..%3Fx=1/claims"
		);
	}

	#[test]
	fn claims_url_rejects_unparseable_base() {
		let err = claims_url("not a url", "user-123").unwrap_err();
		assert!(matches!(err, IdpError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn claims_url_rejects_cannot_be_a_base() {
		let err = claims_url("mailto:ops@example.com", "user-123").unwrap_err();
		assert!(matches!(err, IdpError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn parse_error_message_reads_nested_error_message() {
		let body = r#"{"error": {"code": 429, "message": "quota exceeded"}}"#;
		assert_eq!(
			parse_error_message(StatusCode::TOO_MANY_REQUESTS, body),
			"quota exceeded"
		);
	}

	#[test]
	fn parse_error_message_reads_string_error() {
		let body = r#"{"error": "user not found"}"#;
		assert_eq!(
			parse_error_message(StatusCode::NOT_FOUND, body),
			"user not found"
		);
	}

	#[test]
	fn parse_error_message_reads_top_level_message() {
		let body = r#"{"message": "claims payload too large"}"#;
		assert_eq!(
			parse_error_message(StatusCode::BAD_REQUEST, body),
			"claims payload too large"
		);
	}

	#[test]
	fn parse_error_message_falls_back_to_raw_body() {
		assert_eq!(
			parse_error_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
			"upstream exploded"
		);
	}

	#[test]
	fn parse_error_message_falls_back_to_status_text() {
		assert_eq!(
			parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "  "),
			"Service Unavailable"
		);
	}

	#[test]
	fn api_error_display_includes_status_and_message() {
		let err = IdpError::Api {
			status: 429,
			message: "quota exceeded".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"identity provider returned 429: quota exceeded"
		);
	}

	#[test]
	fn token_is_not_logged() {
		let client = HttpClaimsClient::new(IdpClientConfig {
			base_url: "https://idp.example.com".to_string(),
			token: SecretString::new("tok_supersecret"),
			timeout: Duration::from_secs(5),
		});

		let debug_output = format!("{client:?}");
		assert!(!debug_output.contains("tok_supersecret"));
		assert!(debug_output.contains("[REDACTED]"));
	}
}
