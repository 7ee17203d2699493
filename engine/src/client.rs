use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    GenerationError,
    backend::{
        GenerateContentRequest, GenerateContentResponse, GenerationBackend, Operation,
        PredictVideoRequest,
        gemini::gemini_api::{
            Content, DEFAULT_BASE_URL, GenerationConfig, ImageConfig, Part, VideoImage,
            VideoInstance, VideoParameters,
        },
    },
    credential::Credential,
    media::{self, MediaAsset},
    request::{MockupRequest, ProImageRequest, VideoRequest},
};

/// Model ids per request kind, plus where to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSet {
    pub base_url: String,
    pub mockup: String,
    pub pro: String,
    pub video: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            mockup: "gemini-2.5-flash-image".into(),
            pro: "gemini-3-pro-image-preview".into(),
            video: "veo-3.1-fast-generate-preview".into(),
        }
    }
}

pub struct GenerationClient<B> {
    backend: B,
    models: ModelSet,
}

impl<B: GenerationBackend> GenerationClient<B> {
    pub fn new(backend: B, models: ModelSet) -> Self {
        Self { backend, models }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Composites the logo onto a product photo. One round trip.
    pub async fn generate_mockup(
        &self,
        credential: &Credential,
        req: &MockupRequest,
    ) -> Result<MediaAsset, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::inline(&req.image.mime_type, &req.image.base64),
                    Part::text(&req.instructions),
                ],
            }],
            generation_config: None,
        };

        let response = self
            .backend
            .generate_content(credential, &self.models.mockup, &body)
            .await?;
        decode_image_response(response)
    }

    /// High resolution text-to-image. `credential` must be the elevated one.
    pub async fn generate_pro_image(
        &self,
        credential: &Credential,
        req: &ProImageRequest,
    ) -> Result<MediaAsset, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(&req.instructions)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".into(), "IMAGE".into()],
                image_config: Some(ImageConfig {
                    image_size: req.size,
                    aspect_ratio: req.aspect_ratio,
                }),
            }),
        };

        let response = self
            .backend
            .generate_content(credential, &self.models.pro, &body)
            .await?;
        decode_image_response(response)
    }

    /// Submits a video job. The returned operation still has to be polled.
    pub async fn start_video(
        &self,
        credential: &Credential,
        req: &VideoRequest,
    ) -> Result<Operation, GenerationError> {
        let body = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: req.motion_prompt().to_string(),
                image: VideoImage {
                    bytes_base64_encoded: req.image.base64.clone(),
                    mime_type: req.image.mime_type.clone(),
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: req.aspect_ratio,
                resolution: req.resolution,
            },
        };

        let operation = self
            .backend
            .start_video(credential, &self.models.video, &body)
            .await?;
        debug!("Started video operation {}", operation.name);
        Ok(operation)
    }
}

/// Picks the image out of a response, or explains why there is none.
pub fn decode_image_response(
    response: GenerateContentResponse,
) -> Result<MediaAsset, GenerationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            warn!("Prompt blocked: {reason}");
        }
        return Err(GenerationError::NoCandidates);
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    if let Some(inline) = parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| !d.data.is_empty())
    {
        let mime = if inline.mime_type.is_empty() {
            "image/png"
        } else {
            inline.mime_type.as_str()
        };
        return media::decode_inline(&inline.data, mime);
    }

    if let Some(text) = parts
        .into_iter()
        .filter_map(|p| p.text)
        .find(|t| !t.trim().is_empty())
    {
        return Err(GenerationError::ModelRefused(text));
    }

    if let Some(reason) = candidate.finish_reason {
        warn!("Candidate finished without image: {reason}");
    }
    Err(GenerationError::NoImageReturned)
}
