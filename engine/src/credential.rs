use std::{fmt, sync::Arc};

use log::{info, warn};

use crate::{BoxFuture, GenerationError};

/// An API key. `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `None` for blank keys, so empty config values count as missing.
    pub fn non_empty(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let key = key.trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(****)")
    }
}

/// Environment capability that lets the user pick a paid (elevated) key.
pub trait CredentialHost: Send + Sync {
    /// The elevated key chosen earlier, if there is one.
    fn selected_key(&self) -> Option<Credential>;

    /// Asks the user to choose a key.
    fn select_key(&self) -> BoxFuture<'_, Result<Credential, GenerationError>>;

    /// Drops the current choice, the next elevated request prompts again.
    fn forget_selection(&self);
}

#[derive(Clone, Default)]
pub struct CredentialResolver {
    basic: Option<Credential>,
    host: Option<Arc<dyn CredentialHost>>,
}

impl CredentialResolver {
    pub fn new(basic: Option<Credential>) -> Self {
        Self { basic, host: None }
    }

    pub fn with_host(mut self, host: Arc<dyn CredentialHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn resolve_basic(&self) -> Result<Credential, GenerationError> {
        self.basic.clone().ok_or(GenerationError::CredentialMissing)
    }

    /// Whether `ensure_elevated` would ask the user.
    pub fn will_prompt(&self) -> bool {
        self.host
            .as_ref()
            .is_some_and(|host| host.selected_key().is_none())
    }

    /// Makes sure an elevated key is selected and returns it.
    ///
    /// Without a host there is nothing to select and the basic key is used.
    /// With a host that already has a selection this does not prompt.
    pub async fn ensure_elevated(&self) -> Result<Credential, GenerationError> {
        let Some(host) = &self.host else {
            return self.resolve_basic();
        };

        if let Some(key) = host.selected_key() {
            return Ok(key);
        }

        info!("No paid API key selected, asking the user");
        host.select_key().await.map_err(|e| {
            warn!("Key selection failed: {e}");
            GenerationError::CredentialSelectionCancelled
        })
    }

    pub fn invalidate_elevated(&self) {
        if let Some(host) = &self.host {
            host.forget_selection();
        }
    }
}
