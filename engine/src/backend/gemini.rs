use log::debug;

use crate::{
    BoxFuture, GenerationError,
    backend::{FetchedVideo, GenerationBackend, OperationHandle},
    credential::Credential,
};

pub mod gemini_api;
use gemini_api::{GenerateContentRequest, GenerateContentResponse, Operation, PredictVideoRequest};

#[derive(Clone)]
pub struct GeminiBackend {
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GeminiBackend {
    fn default() -> Self {
        Self::new(gemini_api::DEFAULT_BASE_URL)
    }
}

impl GenerationBackend for GeminiBackend {
    fn generate_content<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
        body: &'a GenerateContentRequest,
    ) -> BoxFuture<'a, Result<GenerateContentResponse, GenerationError>> {
        Box::pin(async move {
            let response = gemini_api::generate_content(
                &self.client,
                &self.base_url,
                model,
                credential.expose(),
                body,
            )
            .await?;
            debug!(
                "{model} answered with {} candidate(s)",
                response.candidates.len()
            );
            Ok(response)
        })
    }

    fn start_video<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
        body: &'a PredictVideoRequest,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>> {
        Box::pin(gemini_api::predict_long_running(
            &self.client,
            &self.base_url,
            model,
            credential.expose(),
            body,
        ))
    }

    fn get_operation<'a>(
        &'a self,
        credential: &'a Credential,
        handle: &'a OperationHandle,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>> {
        Box::pin(gemini_api::get_operation(
            &self.client,
            &self.base_url,
            handle,
            credential.expose(),
        ))
    }

    fn fetch_video<'a>(
        &'a self,
        credential: &'a Credential,
        uri: &'a str,
    ) -> BoxFuture<'a, Result<FetchedVideo, GenerationError>> {
        Box::pin(gemini_api::fetch_video(&self.client, uri, credential.expose()))
    }
}
