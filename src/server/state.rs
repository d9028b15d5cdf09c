//! Server application state shared across handlers

use crate::config::Config;
use crate::provider::{AnthropicClient, GenerationClient};
use crate::store::ConversationStore;
use std::sync::Arc;

/// Shared state for the server: the conversation store and the generation
/// client, both injected so tests can swap in mocks.
#[derive(Clone)]
pub struct ServerAppState {
    pub store: Arc<ConversationStore>,
    pub client: Arc<dyn GenerationClient>,
}

impl ServerAppState {
    /// Production wiring: real Anthropic client, store rooted at the
    /// configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            store: Arc::new(ConversationStore::new(config.data_dir.clone())),
            client: Arc::new(AnthropicClient::new(config)),
        }
    }

    /// Explicit wiring, used by tests to inject mocks
    pub fn with_parts(store: Arc<ConversationStore>, client: Arc<dyn GenerationClient>) -> Self {
        Self { store, client }
    }
}
