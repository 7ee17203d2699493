use bytes::Bytes;
use reqwest::StatusCode;

use crate::{BoxFuture, GenerationError, credential::Credential};

pub mod gemini;
pub use gemini::{
    GeminiBackend,
    gemini_api::{GenerateContentRequest, GenerateContentResponse, Operation, PredictVideoRequest},
};

/// Opaque name of a long-running backend job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationHandle(pub String);

/// Raw answer of the final video download, status not yet checked.
#[derive(Debug, Clone)]
pub struct FetchedVideo {
    pub status: StatusCode,
    pub mime_type: Option<String>,
    pub body: Bytes,
}

/// The external generative service.
///
/// Each call is a single round trip. Implementations never retry.
pub trait GenerationBackend: Send + Sync {
    fn generate_content<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
        body: &'a GenerateContentRequest,
    ) -> BoxFuture<'a, Result<GenerateContentResponse, GenerationError>>;

    fn start_video<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
        body: &'a PredictVideoRequest,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>>;

    fn get_operation<'a>(
        &'a self,
        credential: &'a Credential,
        handle: &'a OperationHandle,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>>;

    fn fetch_video<'a>(
        &'a self,
        credential: &'a Credential,
        uri: &'a str,
    ) -> BoxFuture<'a, Result<FetchedVideo, GenerationError>>;
}
