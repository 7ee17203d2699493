use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_stream::StreamExt;

use crate::{
    GenerationError,
    backend::GenerationBackend,
    client::GenerationClient,
    credential::{Credential, CredentialResolver},
    media::MediaAsset,
    poller::{PollEvent, PollPolicy, classify_video_failure, poll_operation},
    request::{GenerationRequest, Slot, VideoRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedAsset {
    Image(MediaAsset),
    Video(MediaAsset),
}

impl GeneratedAsset {
    pub fn media(&self) -> &MediaAsset {
        match self {
            GeneratedAsset::Image(m) | GeneratedAsset::Video(m) => m,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingCredential,
    Submitted,
    Polling {
        attempt: u32,
    },
    Succeeded(GeneratedAsset),
    Failed(GenerationError),
}

impl RequestState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitted | Self::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Message to show for a failed request.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

/// What a slot currently shows, tagged with the submission that wrote it.
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    pub token: u64,
    pub state: RequestState,
}

/// Drives user-initiated requests through their states.
///
/// Each slot publishes its state on a `watch` channel. Every `submit` takes
/// a fresh token for its slot and only writes while that token is the
/// newest, so a slower earlier submission can never overwrite a later one.
/// Nothing is queued or cancelled: superseded calls still run to the end.
pub struct Orchestrator<B> {
    credentials: CredentialResolver,
    client: GenerationClient<B>,
    poll: PollPolicy,
    image: watch::Sender<SlotState>,
    video: watch::Sender<SlotState>,
}

impl<B: GenerationBackend> Orchestrator<B> {
    pub fn new(credentials: CredentialResolver, client: GenerationClient<B>, poll: PollPolicy) -> Self {
        Self {
            credentials,
            client,
            poll,
            image: watch::Sender::new(SlotState::default()),
            video: watch::Sender::new(SlotState::default()),
        }
    }

    fn sender(&self, slot: Slot) -> &watch::Sender<SlotState> {
        match slot {
            Slot::Image => &self.image,
            Slot::Video => &self.video,
        }
    }

    pub fn state(&self, slot: Slot) -> RequestState {
        self.sender(slot).borrow().state.clone()
    }

    pub fn subscribe(&self, slot: Slot) -> watch::Receiver<SlotState> {
        self.sender(slot).subscribe()
    }

    /// Back to `Idle`. Results of calls still in flight are discarded.
    pub fn reset(&self, slot: Slot) {
        self.begin(slot);
    }

    fn begin(&self, slot: Slot) -> u64 {
        let mut token = 0;
        self.sender(slot).send_modify(|s| {
            s.token += 1;
            s.state = RequestState::Idle;
            token = s.token;
        });
        token
    }

    fn publish(&self, slot: Slot, token: u64, state: RequestState) {
        let written = self.sender(slot).send_if_modified(|s| {
            if s.token != token {
                return false;
            }
            s.state = state;
            true
        });

        if !written {
            debug!("Dropping state of superseded {slot} request #{token}");
        }
    }

    /// Runs one request to a terminal state. The outcome is published on the
    /// request's slot.
    pub async fn submit(&self, request: impl Into<GenerationRequest>) {
        let request = request.into();
        let slot = request.slot();
        let token = self.begin(slot);
        info!("{slot} request #{token} submitted");

        let state = match self.drive(slot, token, &request).await {
            Ok(asset) => {
                info!("{slot} request #{token} succeeded");
                RequestState::Succeeded(asset)
            }
            Err(err) => {
                warn!("{slot} request #{token} failed: {err}");
                if err == GenerationError::CredentialInvalidOrExpired {
                    self.credentials.invalidate_elevated();
                }
                RequestState::Failed(err)
            }
        };
        self.publish(slot, token, state);
    }

    async fn drive(
        &self,
        slot: Slot,
        token: u64,
        request: &GenerationRequest,
    ) -> Result<GeneratedAsset, GenerationError> {
        request.validate()?;

        let credential = if request.needs_elevated_credential() {
            if self.credentials.will_prompt() {
                self.publish(slot, token, RequestState::AwaitingCredential);
            }
            self.credentials.ensure_elevated().await?
        } else {
            self.credentials.resolve_basic()?
        };

        self.publish(slot, token, RequestState::Submitted);
        match request {
            GenerationRequest::Mockup(req) => self
                .client
                .generate_mockup(&credential, req)
                .await
                .map(GeneratedAsset::Image),
            GenerationRequest::Pro(req) => self
                .client
                .generate_pro_image(&credential, req)
                .await
                .map(GeneratedAsset::Image)
                .map_err(GenerationError::classify_credential),
            GenerationRequest::Video(req) => self
                .generate_video(slot, token, &credential, req)
                .await
                .map(GeneratedAsset::Video)
                .map_err(classify_video_failure),
        }
    }

    async fn generate_video(
        &self,
        slot: Slot,
        token: u64,
        credential: &Credential,
        req: &VideoRequest,
    ) -> Result<MediaAsset, GenerationError> {
        let operation = self.client.start_video(credential, req).await?;
        let events = poll_operation(self.client.backend(), credential, operation, self.poll.clone());
        tokio::pin!(events);

        while let Some(event) = events.try_next().await? {
            match event {
                PollEvent::Running { attempt } => {
                    self.publish(slot, token, RequestState::Polling { attempt })
                }
                PollEvent::Done(asset) => return Ok(asset),
            }
        }
        Err(GenerationError::NoVideoReturned)
    }
}
