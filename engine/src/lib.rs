use std::pin::Pin;

pub mod backend;
pub mod client;
pub mod credential;
pub mod media;
pub mod orchestrator;
pub mod poller;
pub mod request;

mod error;
pub use error::GenerationError;

#[cfg(test)]
mod stub;

pub use backend::{GeminiBackend, GenerationBackend};
pub use client::{GenerationClient, ModelSet};
pub use credential::{Credential, CredentialHost, CredentialResolver};
pub use media::MediaAsset;
pub use orchestrator::{GeneratedAsset, Orchestrator, RequestState, SlotState};
pub use poller::PollPolicy;
pub use request::{GenerationRequest, Slot};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
