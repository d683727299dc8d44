use std::collections::HashMap;
use std::time::Duration;

/// Per-namespace hot-cache policy for the external-backend store.
///
/// When `cache` is `true`, values fetched from the external backend are
/// also held in an in-process map so repeat reads avoid the round trip.
/// `expiry` bounds how long a cached entry stays fresh; `None` means it
/// never ages out on its own (a write still invalidates it).
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceConfig {
    pub cache: bool,
    pub expiry: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct NamespacePolicy {
    configs: HashMap<String, NamespaceConfig>,
}

impl NamespacePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: impl Into<String>, config: NamespaceConfig) -> Self {
        self.configs.insert(namespace.into(), config);
        self
    }

    pub fn for_namespace(&self, namespace: &str) -> NamespaceConfig {
        self.configs.get(namespace).copied().unwrap_or_default()
    }
}
