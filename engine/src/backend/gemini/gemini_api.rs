//! Wire types and raw calls for the generative language REST API.
//!
//! Only the fields the engine reads or writes are modelled, everything
//! else in a response is ignored.

use bytes::Bytes;
use log::debug;
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    GenerationError,
    backend::{FetchedVideo, OperationHandle},
    request::{AspectRatio, ImageSize, VideoAspectRatio, VideoResolution},
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    /// base64 without a data URI prefix
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub image_size: ImageSize,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// absent when the candidate was blocked
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictVideoRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    pub image: VideoImage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: VideoAspectRatio,
    pub resolution: VideoResolution,
}

/// Snapshot of a long-running job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<ApiStatus>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

impl Operation {
    pub fn handle(&self) -> OperationHandle {
        OperationHandle(self.name.clone())
    }

    pub fn result_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .iter()
            .find_map(|s| s.video.as_ref()?.uri.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

/// `google.rpc.Status`, used both for HTTP errors and failed operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<ApiStatus> for GenerationError {
    fn from(value: ApiStatus) -> Self {
        GenerationError::Api {
            status: value.code,
            code: value.status,
            message: value.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiStatus,
}

/// Turns a non-success body into a classified error, using the structured
/// envelope when the body has one.
pub fn api_error(status: StatusCode, body: &str) -> GenerationError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => GenerationError::Api {
            status: status.as_u16(),
            code: error.status,
            message: error.message,
        },
        Err(_) => GenerationError::Api {
            status: status.as_u16(),
            code: None,
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            },
        },
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, GenerationError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &text));
    }
    Ok(serde_json::from_str(&text)?)
}

pub async fn generate_content(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    body: &GenerateContentRequest,
) -> Result<GenerateContentResponse, GenerationError> {
    let url = format!("{base_url}/models/{model}:generateContent");
    debug!("POST {url}");

    let resp = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await?;

    read_json(resp).await
}

/// Starts a video job and returns the first operation snapshot.
pub async fn predict_long_running(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    body: &PredictVideoRequest,
) -> Result<Operation, GenerationError> {
    let url = format!("{base_url}/models/{model}:predictLongRunning");
    debug!("POST {url}");

    let resp = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await?;

    read_json(resp).await
}

pub async fn get_operation(
    client: &Client,
    base_url: &str,
    handle: &OperationHandle,
    api_key: &str,
) -> Result<Operation, GenerationError> {
    let url = format!("{base_url}/{}", handle.0);
    debug!("GET {url}");

    let resp = client
        .get(url)
        .header("x-goog-api-key", api_key)
        .send()
        .await?;

    read_json(resp).await
}

/// Downloads a finished video. The status is handed back unchecked.
pub async fn fetch_video(
    client: &Client,
    uri: &str,
    api_key: &str,
) -> Result<FetchedVideo, GenerationError> {
    let resp = client.get(uri).query(&[("key", api_key)]).send().await?;
    let status = resp.status();
    let mime_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Bytes = resp.bytes().await?;

    Ok(FetchedVideo {
        status,
        mime_type,
        body,
    })
}
