//! Scripted backend and credential host for unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use bytes::Bytes;
use reqwest::StatusCode;

use crate::{
    BoxFuture, GenerationError,
    backend::{
        FetchedVideo, GenerateContentRequest, GenerateContentResponse, GenerationBackend,
        Operation, OperationHandle, PredictVideoRequest,
        gemini::gemini_api::{
            Candidate, Content, GenerateVideoResponse, GeneratedSample, OperationResponse, Part,
            VideoRef,
        },
    },
    credential::{Credential, CredentialHost},
};

/// 10x10 png
pub(crate) const TINY_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAoAAAAKCAYAAACNMs+9AAAAFUlEQVR42mNkYPhfz0AEYBxVSF+FAP5FDvcfRYWgAAAAAElFTkSuQmCC";

pub(crate) const VIDEO_URI: &str = "https://files.example/video.mp4";

pub(crate) fn image_response(base64: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts: vec![Part::inline("image/png", base64)],
            }),
            finish_reason: Some("STOP".into()),
        }],
        prompt_feedback: None,
    }
}

pub(crate) fn text_response(text: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts: vec![Part::text(text)],
            }),
            finish_reason: Some("STOP".into()),
        }],
        prompt_feedback: None,
    }
}

pub(crate) fn running_operation() -> Operation {
    Operation {
        name: "models/veo/operations/op1".into(),
        ..Default::default()
    }
}

pub(crate) fn finished_operation() -> Operation {
    Operation {
        name: "models/veo/operations/op1".into(),
        done: true,
        error: None,
        response: Some(OperationResponse {
            generate_video_response: Some(GenerateVideoResponse {
                generated_samples: vec![GeneratedSample {
                    video: Some(VideoRef {
                        uri: Some(VIDEO_URI.into()),
                    }),
                }],
            }),
        }),
    }
}

#[derive(Default)]
pub(crate) struct StubBackend {
    content: Mutex<VecDeque<(Duration, Result<GenerateContentResponse, GenerationError>)>>,
    content_calls: Mutex<Vec<(String, String)>>,
    start: Mutex<Option<Result<Operation, GenerationError>>>,
    start_calls: AtomicUsize,
    polls: Mutex<VecDeque<Result<Operation, GenerationError>>>,
    poll_calls: AtomicUsize,
    fetch: Mutex<Option<(StatusCode, &'static [u8])>>,
    fetched: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn with_content(self, response: GenerateContentResponse) -> Self {
        self.with_delayed_content(Duration::ZERO, Ok(response))
    }

    pub fn with_delayed_content(
        self,
        delay: Duration,
        response: Result<GenerateContentResponse, GenerationError>,
    ) -> Self {
        self.content.lock().unwrap().push_back((delay, response));
        self
    }

    pub fn with_start(self, result: Result<Operation, GenerationError>) -> Self {
        *self.start.lock().unwrap() = Some(result);
        self
    }

    pub fn with_polls(self, polls: impl IntoIterator<Item = Operation>) -> Self {
        self.polls.lock().unwrap().extend(polls.into_iter().map(Ok));
        self
    }

    pub fn with_poll_error(self, err: GenerationError) -> Self {
        self.polls.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn with_fetch(self, status: StatusCode, body: &'static [u8]) -> Self {
        *self.fetch.lock().unwrap() = Some((status, body));
        self
    }

    /// (model, serialized body) per `generate_content` call
    pub fn content_calls(&self) -> Vec<(String, String)> {
        self.content_calls.lock().unwrap().clone()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn fetched_uris(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.content_calls.lock().unwrap().len() + self.start_calls() + self.poll_calls()
    }
}

impl GenerationBackend for StubBackend {
    fn generate_content<'a>(
        &'a self,
        _credential: &'a Credential,
        model: &'a str,
        body: &'a GenerateContentRequest,
    ) -> BoxFuture<'a, Result<GenerateContentResponse, GenerationError>> {
        self.content_calls
            .lock()
            .unwrap()
            .push((model.to_string(), serde_json::to_string(body).unwrap()));
        let (delay, response) = self.content.lock().unwrap().pop_front().unwrap_or((
            Duration::ZERO,
            Err(GenerationError::Transport("no scripted response".into())),
        ));

        Box::pin(async move {
            tokio::time::sleep(delay).await;
            response
        })
    }

    fn start_video<'a>(
        &'a self,
        _credential: &'a Credential,
        _model: &'a str,
        _body: &'a PredictVideoRequest,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .start
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(running_operation()));
        Box::pin(async move { result })
    }

    fn get_operation<'a>(
        &'a self,
        _credential: &'a Credential,
        _handle: &'a OperationHandle,
    ) -> BoxFuture<'a, Result<Operation, GenerationError>> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.polls.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GenerationError::Transport("no scripted poll".into()))
        });
        Box::pin(async move { result })
    }

    fn fetch_video<'a>(
        &'a self,
        _credential: &'a Credential,
        uri: &'a str,
    ) -> BoxFuture<'a, Result<FetchedVideo, GenerationError>> {
        self.fetched.lock().unwrap().push(uri.to_string());
        let (status, body) = self
            .fetch
            .lock()
            .unwrap()
            .unwrap_or((StatusCode::OK, &b"video"[..]));
        Box::pin(async move {
            Ok(FetchedVideo {
                status,
                mime_type: Some("video/mp4".into()),
                body: Bytes::from_static(body),
            })
        })
    }
}

/// Credential host that answers every prompt the same way.
pub(crate) struct ScriptedHost {
    answer: Option<&'static str>,
    delay: Duration,
    selected: Mutex<Option<Credential>>,
    prompts: AtomicUsize,
}

impl ScriptedHost {
    /// `None` cancels every prompt.
    pub fn answering(answer: Option<&'static str>) -> Self {
        Self {
            answer,
            delay: Duration::ZERO,
            selected: Mutex::new(None),
            prompts: AtomicUsize::new(0),
        }
    }

    /// Answers only after `delay`, like a user taking their time.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl CredentialHost for ScriptedHost {
    fn selected_key(&self) -> Option<Credential> {
        self.selected.lock().unwrap().clone()
    }

    fn select_key(&self) -> BoxFuture<'_, Result<Credential, GenerationError>> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let result = match self.answer {
            Some(key) => {
                let key = Credential::new(key);
                *self.selected.lock().unwrap() = Some(key.clone());
                Ok(key)
            }
            None => Err(GenerationError::CredentialSelectionCancelled),
        };
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            result
        })
    }

    fn forget_selection(&self) {
        *self.selected.lock().unwrap() = None;
    }
}
