use std::sync::{Arc, RwLock};

/// Holder for the bearer token of one agent run.
///
/// Every run creates its own context, so tools of concurrent runs never see
/// each other's token. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CredentialContext {
    slot: Arc<RwLock<Option<String>>>,
}

impl CredentialContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `token` until the returned scope is released or dropped.
    #[must_use = "the credential is cleared as soon as the scope is dropped"]
    pub fn set(&self, token: impl Into<String>) -> CredentialScope {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
        CredentialScope {
            context: self.clone(),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn clear(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Clears its context when dropped, on every exit path of the run.
#[derive(Debug)]
pub struct CredentialScope {
    context: CredentialContext,
}

impl CredentialScope {
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for CredentialScope {
    fn drop(&mut self) {
        self.context.clear();
    }
}
