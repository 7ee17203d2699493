use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use color_eyre::{Result, eyre::eyre};
use engine::{
    CredentialResolver, GeminiBackend, GenerationBackend, GenerationClient, GenerationRequest,
    Orchestrator, RequestState,
};
use log::info;

use crate::{Config, download::save_asset, host::TerminalKeySelector};

/// Wires the Gemini backend and the terminal key prompt together.
///
/// Without `prompt_for_paid` paid requests go out with the basic key.
pub fn build_orchestrator(config: &Config, prompt_for_paid: bool) -> Orchestrator<GeminiBackend> {
    let mut credentials = CredentialResolver::new(config.basic_credential());
    if prompt_for_paid {
        credentials =
            credentials.with_host(Arc::new(TerminalKeySelector::new(config.paid_credential())));
    }
    let backend = GeminiBackend::new(config.models.base_url.clone());
    Orchestrator::new(
        credentials,
        GenerationClient::new(backend, config.models.clone()),
        config.poll.clone(),
    )
}

/// One progress line per state worth telling the user about.
pub fn describe(state: &RequestState) -> Option<String> {
    match state {
        RequestState::Idle => None,
        RequestState::AwaitingCredential => Some("Waiting for a paid API key...".into()),
        RequestState::Submitted => Some("Request sent, generating...".into()),
        RequestState::Polling { attempt } => {
            Some(format!("Video still rendering (check {attempt})..."))
        }
        RequestState::Succeeded(_) => Some("Done.".into()),
        RequestState::Failed(err) => Some(format!("Failed: {err}")),
    }
}

/// Submits `request`, prints its progress and saves the result into `out_dir`.
pub async fn execute<B: GenerationBackend>(
    orchestrator: &Orchestrator<B>,
    request: GenerationRequest,
    out_dir: &Path,
) -> Result<PathBuf> {
    let slot = request.slot();
    let mut updates = orchestrator.subscribe(slot);

    let report = async {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().state.clone();
            if let Some(line) = describe(&state) {
                eprintln!("{line}");
            }
            if state.is_terminal() {
                break;
            }
        }
    };
    tokio::join!(orchestrator.submit(request), report);

    match orchestrator.state(slot) {
        RequestState::Succeeded(asset) => {
            let path = save_asset(out_dir, &asset)?;
            info!("Saved {} bytes to {}", asset.media().bytes.len(), path.display());
            Ok(path)
        }
        RequestState::Failed(err) => Err(err.into()),
        other => Err(eyre!("Request ended in unexpected state {other:?}")),
    }
}
