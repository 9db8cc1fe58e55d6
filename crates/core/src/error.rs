use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// The model does not expose the requested operation.
    #[error("{operation} is not supported by this model")]
    Unsupported { operation: &'static str },
    /// The CLI has no usable login.
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    #[error("timeout")]
    Timeout,
    #[error("process error: {message}")]
    Process {
        message: String,
        /// Exit code of the child process, when it exited.
        exit_code: Option<i32>,
        /// Raw stderr of the child process, when it wrote any.
        stderr: Option<String>,
    },
    #[error("upstream error: {message}")]
    Upstream { message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Child process details carried by process-level errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMetadata {
    pub exit_code: Option<i32>,
    pub stderr: Option<String>,
}

impl SdkError {
    pub fn unsupported(operation: &'static str) -> Self {
        SdkError::Unsupported { operation }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, SdkError::Unsupported { .. })
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, SdkError::Authentication { .. })
    }

    pub fn is_timeout_error(&self) -> bool {
        matches!(self, SdkError::Timeout)
    }

    /// Exit code and stderr, for errors raised by a child process.
    pub fn metadata(&self) -> Option<ErrorMetadata> {
        match self {
            SdkError::Process {
                exit_code, stderr, ..
            }
            | SdkError::Authentication {
                exit_code, stderr, ..
            } => Some(ErrorMetadata {
                exit_code: *exit_code,
                stderr: stderr.clone(),
            }),
            _ => None,
        }
    }

    /// Format error details for display at a tool boundary.
    pub fn format_details(&self) -> String {
        match self {
            SdkError::Process {
                message,
                exit_code: Some(code),
                ..
            } => format!("process error (exit code {code}): {message}"),
            SdkError::Authentication {
                message,
                exit_code: Some(code),
                ..
            } => format!("authentication failed (exit code {code}): {message}"),
            other => other.to_string(),
        }
    }
}
