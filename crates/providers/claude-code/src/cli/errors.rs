//! Classification of failed CLI runs.

use crate::core::SdkError;

/// Lower-case fragments the CLI prints when it has no usable login.
const AUTH_MARKERS: &[&str] = &[
    "not logged in",
    "please run /login",
    "invalid api key",
    "authentication_error",
    "authentication failed",
    "oauth token has expired",
    "unauthorized",
];

pub fn is_auth_failure(text: &str) -> bool {
    let lower = text.to_lowercase();
    AUTH_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Error for a run that exited unsuccessfully before producing a result.
pub fn exit_error(stderr: String, exit_code: Option<i32>) -> SdkError {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return SdkError::Process {
            message: "Claude Code CLI exited without a result".to_string(),
            exit_code,
            stderr: None,
        };
    }
    let message = trimmed.to_string();
    if is_auth_failure(&message) {
        SdkError::Authentication {
            message,
            exit_code,
            stderr: Some(stderr),
        }
    } else {
        SdkError::Process {
            message,
            exit_code,
            stderr: Some(stderr),
        }
    }
}

/// Error for a `result` event that reported failure.
pub fn result_error(message: String) -> SdkError {
    if is_auth_failure(&message) {
        SdkError::Authentication {
            message,
            exit_code: None,
            stderr: None,
        }
    } else {
        SdkError::Upstream { message }
    }
}
