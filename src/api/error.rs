use thiserror::Error;

/// Everything that can go wrong talking to the emissions backend.
///
/// No variant is retried. Callers surface the message and leave the page
/// usable so the user can trigger the action again.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, broken pipe, and so on.
    #[error("could not reach {url}: {message}")]
    Transport { url: String, message: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    /// A 2xx response whose JSON body carries an `error` field.
    #[error("backend error: {0}")]
    Backend(String),

    /// The body was not the JSON shape the endpoint documents.
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Missing or malformed input caught before any request was sent.
    #[error("invalid input: {0}")]
    Input(String),
}

impl ApiError {
    /// HTTP status for [`ApiError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short stable name used in the request log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Backend(_) => "backend",
            Self::Decode { .. } => "decode",
            Self::Input(_) => "input",
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_includes_detail() {
        let err = ApiError::Status {
            status: 500,
            detail: Some("boom".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500 (boom)");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn status_error_message_without_detail() {
        let err = ApiError::Status {
            status: 404,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(ApiError::Backend("x".into()).kind(), "backend");
        assert_eq!(ApiError::Input("x".into()).kind(), "input");
        assert_eq!(ApiError::Backend("x".into()).status(), None);
    }
}
