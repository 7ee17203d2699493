use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use engine::{BoxFuture, Credential, CredentialHost, GenerationError};
use indoc::indoc;
use log::{info, warn};
use parking_lot::Mutex;

type Ask = Arc<dyn Fn() -> io::Result<String> + Send + Sync>;

/// Asks for the paid key on the terminal.
///
/// A key from the config counts as already selected. An empty answer, a
/// closed stdin or a failed read cancels the selection.
pub struct TerminalKeySelector {
    selected: Mutex<Option<Credential>>,
    ask: Ask,
}

impl TerminalKeySelector {
    pub fn new(preselected: Option<Credential>) -> Self {
        Self::with_prompt(preselected, ask_on_terminal)
    }

    pub fn with_prompt(
        preselected: Option<Credential>,
        ask: impl Fn() -> io::Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            selected: Mutex::new(preselected),
            ask: Arc::new(ask),
        }
    }
}

const PROMPT: &str = indoc! {"
    This request needs an API key from a billing enabled project.
    Paste it here, or press enter to cancel: "};

fn ask_on_terminal() -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(PROMPT.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

impl CredentialHost for TerminalKeySelector {
    fn selected_key(&self) -> Option<Credential> {
        self.selected.lock().clone()
    }

    fn select_key(&self) -> BoxFuture<'_, Result<Credential, GenerationError>> {
        let ask = self.ask.clone();
        Box::pin(async move {
            let answer = tokio::task::spawn_blocking(move || ask())
                .await
                .map_err(|_| GenerationError::CredentialSelectionCancelled)?
                .map_err(|e| {
                    warn!("Couldn't read key: {e}");
                    GenerationError::CredentialSelectionCancelled
                })?;

            let key = Credential::non_empty(answer.trim())
                .ok_or(GenerationError::CredentialSelectionCancelled)?;
            info!("Paid key selected");
            *self.selected.lock() = Some(key.clone());
            Ok(key)
        })
    }

    fn forget_selection(&self) {
        *self.selected.lock() = None;
    }
}
