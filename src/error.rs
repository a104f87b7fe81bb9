//! Failures surfaced by the backend gateway.

use thiserror::Error;

/// A request that did not yield a usable payload.
///
/// Every variant is rendered inline by the panel that issued the request;
/// none of them clears the committed diagram.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
	/// The request never produced a response (offline, CORS, aborted).
	#[error("network error: {message}")]
	Network {
		/// Transport error text.
		message: String,
	},
	/// The server answered with a non-success status.
	#[error("server returned {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// `detail` from the body, or the body itself.
		message: String,
	},
	/// The body could not be decoded into the expected shape.
	#[error("malformed response: {message}")]
	Malformed {
		/// Decoder error text.
		message: String,
	},
}

impl ApiError {
	/// Shorthand for [`ApiError::Network`].
	pub fn network(message: impl Into<String>) -> Self {
		Self::Network {
			message: message.into(),
		}
	}

	/// Shorthand for [`ApiError::Malformed`].
	pub fn malformed(message: impl Into<String>) -> Self {
		Self::Malformed {
			message: message.into(),
		}
	}

	/// Builds a status error, preferring the FastAPI `detail` field of `body`.
	pub fn from_status(status: u16, body: &str) -> Self {
		let message = serde_json::from_str::<serde_json::Value>(body)
			.ok()
			.and_then(|v| match v.get("detail") {
				Some(serde_json::Value::String(s)) => Some(s.clone()),
				Some(other) if !other.is_null() => Some(other.to_string()),
				_ => None,
			})
			.unwrap_or_else(|| {
				let trimmed = body.trim();
				if trimmed.is_empty() {
					"request failed".to_string()
				} else {
					trimmed.to_string()
				}
			});
		Self::Status { status, message }
	}

	/// Text suitable for an inline failure message.
	pub fn message(&self) -> &str {
		match self {
			Self::Network { message } | Self::Status { message, .. } | Self::Malformed { message } => {
				message
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_error_uses_detail_field() {
		let err = ApiError::from_status(400, r#"{"detail":"Only read queries are allowed."}"#);
		assert_eq!(
			err,
			ApiError::Status {
				status: 400,
				message: "Only read queries are allowed.".into()
			}
		);
		assert_eq!(err.message(), "Only read queries are allowed.");
	}

	#[test]
	fn status_error_falls_back_to_body_text() {
		let err = ApiError::from_status(502, "Bad Gateway\n");
		assert_eq!(err.message(), "Bad Gateway");
		let err = ApiError::from_status(500, "");
		assert_eq!(err.message(), "request failed");
	}

	#[test]
	fn display_includes_status() {
		let err = ApiError::from_status(404, r#"{"detail":"not found"}"#);
		assert_eq!(err.to_string(), "server returned 404: not found");
	}
}
