use std::time::Duration;

use async_stream::try_stream;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tokio_stream::Stream;

use crate::{
    GenerationError,
    backend::{GenerationBackend, Operation},
    credential::Credential,
    media::MediaAsset,
};

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// How long-running operations are polled.
///
/// The interval is fixed, there is no jitter or backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    pub interval_secs: u64,
    /// `None` polls until the operation reports done
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: Some(120),
        }
    }
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The operation is not done, the poller is about to wait and ask again
    Running { attempt: u32 },
    Done(MediaAsset),
}

/// Drives `initial` to completion and downloads the resulting video.
///
/// Yields one `Running` per poll and a final `Done`. The stream ends with
/// an error if a poll fails, the operation reports an error, the attempt
/// bound is hit or the download is not successful.
pub fn poll_operation<'a, B: GenerationBackend + ?Sized>(
    backend: &'a B,
    credential: &'a Credential,
    initial: Operation,
    policy: PollPolicy,
) -> impl Stream<Item = Result<PollEvent, GenerationError>> + Send + 'a {
    try_stream! {
        let handle = initial.handle();
        let mut operation = initial;
        let mut attempt = 0u32;

        while !operation.done {
            if policy.max_attempts.is_some_and(|max| attempt >= max) {
                warn!("Giving up on {} after {attempt} polls", handle.0);
                Err(GenerationError::PollLimitExceeded { attempts: attempt })?;
            }

            attempt += 1;
            yield PollEvent::Running { attempt };

            sleep(policy.interval()).await;
            operation = backend.get_operation(credential, &handle).await?;
            debug!("Poll {attempt} of {}: done={}", handle.0, operation.done);
        }

        if let Some(status) = operation.error.take() {
            Err(GenerationError::from(status))?;
        }

        let uri = operation
            .result_uri()
            .ok_or(GenerationError::NoVideoReturned)?
            .to_string();
        info!("Operation {} finished, downloading result", handle.0);

        let fetched = backend.fetch_video(credential, &uri).await?;
        if !fetched.status.is_success() {
            Err(GenerationError::VideoFetchFailed(fetched.status.to_string()))?;
        }

        let mime_type = fetched
            .mime_type
            .filter(|m| m.starts_with("video/"))
            .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
        yield PollEvent::Done(MediaAsset::new(fetched.body, mime_type));
    }
}

/// Maps a failure of the video flow onto the user-facing taxonomy.
///
/// Errors that already name their cause pass through. A rejected
/// credential becomes `CredentialInvalidOrExpired`, anything else is
/// surfaced with its raw message.
pub fn classify_video_failure(err: GenerationError) -> GenerationError {
    use GenerationError::*;
    match err {
        Validation(_)
        | CredentialMissing
        | CredentialSelectionCancelled
        | CredentialInvalidOrExpired
        | VideoFetchFailed(_)
        | VideoGenerationFailed(_)
        | PollLimitExceeded { .. }
        | NoVideoReturned => err,
        err if err.rejects_credential() => CredentialInvalidOrExpired,
        Api { message, .. } => VideoGenerationFailed(message),
        err => VideoGenerationFailed(err.to_string()),
    }
}
