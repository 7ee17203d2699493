use thiserror::Error;

/// Everything that can end a generation request.
///
/// Every variant is terminal for the submission that raised it, nothing in
/// the engine retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Missing or empty input, detected before any network call
    #[error("{0}")]
    Validation(String),

    #[error("API key not found")]
    CredentialMissing,

    #[error("Billing account selection failed or was cancelled.")]
    CredentialSelectionCancelled,

    #[error("Your API key is invalid or has expired. Please select a paid API key again.")]
    CredentialInvalidOrExpired,

    #[error("Model refused to generate image: {0}")]
    ModelRefused(String),

    #[error("No candidates returned from model.")]
    NoCandidates,

    #[error("No image data found in response.")]
    NoImageReturned,

    #[error("Video generation finished without a result")]
    NoVideoReturned,

    #[error("Failed to fetch video: {0}")]
    VideoFetchFailed(String),

    #[error("Video generation failed: {0}")]
    VideoGenerationFailed(String),

    #[error("Operation still running after {attempts} polls")]
    PollLimitExceeded { attempts: u32 },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Non-success answer from the generative API
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        /// Structured status string, e.g. `NOT_FOUND` or `PERMISSION_DENIED`
        code: Option<String>,
        message: String,
    },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl GenerationError {
    /// Heuristic fallback for upstream errors without a usable structured code.
    pub const ENTITY_NOT_FOUND: &'static str = "Requested entity was not found";

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the upstream service rejected the credential itself.
    ///
    /// The structured code wins when present. The message match is a
    /// heuristic: the service answers an unusable paid key with a
    /// not-found error that carries no dedicated code.
    /// A rejected key becomes `CredentialInvalidOrExpired`, anything else
    /// is returned unchanged.
    pub fn classify_credential(self) -> Self {
        if self.rejects_credential() {
            Self::CredentialInvalidOrExpired
        } else {
            self
        }
    }

    pub fn rejects_credential(&self) -> bool {
        match self {
            Self::CredentialInvalidOrExpired => true,
            Self::Api {
                status,
                code,
                message,
            } => {
                matches!(*status, 401 | 403)
                    || matches!(
                        code.as_deref(),
                        Some("UNAUTHENTICATED" | "PERMISSION_DENIED")
                    )
                    || message.contains(Self::ENTITY_NOT_FOUND)
            }
            Self::VideoGenerationFailed(message) | Self::Transport(message) => {
                message.contains(Self::ENTITY_NOT_FOUND)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedPayload(value.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn api(status: u16, code: Option<&str>, message: &str) -> GenerationError {
        GenerationError::Api {
            status,
            code: code.map(Into::into),
            message: message.into(),
        }
    }

    #[test]
    fn structured_codes_reject_credential() {
        assert!(api(403, None, "forbidden").rejects_credential());
        assert!(api(400, Some("UNAUTHENTICATED"), "bad key").rejects_credential());
        assert!(!api(400, Some("INVALID_ARGUMENT"), "bad prompt").rejects_credential());
    }

    #[test]
    fn entity_not_found_message_rejects_credential() {
        assert!(api(404, Some("NOT_FOUND"), "Requested entity was not found.").rejects_credential());
        assert!(!api(404, Some("NOT_FOUND"), "models/foo is not found").rejects_credential());
        assert!(!GenerationError::NoCandidates.rejects_credential());
    }

    #[test]
    fn classify_only_touches_rejections() {
        assert_eq!(
            api(404, Some("NOT_FOUND"), "Requested entity was not found.").classify_credential(),
            GenerationError::CredentialInvalidOrExpired
        );
        let bad_prompt = api(400, Some("INVALID_ARGUMENT"), "bad prompt");
        assert_eq!(bad_prompt.clone().classify_credential(), bad_prompt);
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            GenerationError::ModelRefused("unsafe content".into()).to_string(),
            "Model refused to generate image: unsafe content"
        );
        assert_eq!(
            GenerationError::VideoFetchFailed("Not Found".into()).to_string(),
            "Failed to fetch video: Not Found"
        );
    }
}
