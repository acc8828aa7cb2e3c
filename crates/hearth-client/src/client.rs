//! Chat client facade
//!
//! [`ChatClient`] wires the session gate, credential actions, composer and
//! live feed to one identity provider, document store and surface.

use std::sync::{Arc, Mutex, MutexGuard};

use hearth_core::{AuthUser, DocumentStore, IdentityProvider};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::composer::{MessageComposer, PendingWrite};
use crate::config::ClientConfig;
use crate::credentials::{CredentialActions, CredentialForm};
use crate::error::ClientResult;
use crate::feed::LiveFeed;
use crate::names::DisplayNameCache;
use crate::session::SessionGate;
use crate::surface::{ChatSurface, FormLayout, FormMode};

/// Running session gate task
struct GateTask {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// A chat client bound to one backend and one surface
pub struct ChatClient {
    config: Arc<ClientConfig>,
    identity: Arc<dyn IdentityProvider>,
    surface: Arc<dyn ChatSurface>,
    credentials: CredentialActions,
    composer: MessageComposer,
    feed: LiveFeed,
    gate: Arc<SessionGate>,
    form_mode: Mutex<FormMode>,
    gate_task: Mutex<Option<GateTask>>,
}

impl ChatClient {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        surface: Arc<dyn ChatSurface>,
        config: ClientConfig,
    ) -> Self {
        let config = Arc::new(config);
        let feed = LiveFeed::new(Arc::clone(&store), Arc::clone(&surface), Arc::clone(&config));
        let gate = Arc::new(SessionGate::new(Arc::clone(&surface), feed.clone()));
        let credentials = CredentialActions::new(
            Arc::clone(&identity),
            Arc::clone(&store),
            Arc::clone(&surface),
            Arc::clone(&config),
        );
        let composer = MessageComposer::new(Arc::clone(&identity), store, Arc::clone(&config));

        Self {
            config,
            identity,
            surface,
            credentials,
            composer,
            feed,
            gate,
            form_mode: Mutex::new(FormMode::Login),
            gate_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Draw the login form and start following auth state
    ///
    /// Calling `start` again while running has no effect.
    pub fn start(&self) {
        let mut gate_task = lock(&self.gate_task);
        if gate_task.as_ref().is_some_and(|g| !g.task.is_finished()) {
            debug!("Chat client already started");
            return;
        }

        self.surface
            .set_form_layout(FormLayout::new(self.form_mode(), self.config.resolves_names()));

        let cancel = CancellationToken::new();
        let gate = Arc::clone(&self.gate);
        let states = self.identity.auth_state();
        let token = cancel.clone();
        let task = tokio::spawn(async move { gate.run(states, token).await });
        *gate_task = Some(GateTask { cancel, task });
    }

    /// Stop following auth state and cancel the live feed
    pub async fn shutdown(&self) {
        let gate_task = lock(&self.gate_task).take();
        if let Some(GateTask { cancel, task }) = gate_task {
            cancel.cancel();
            if let Err(e) = task.await {
                warn!(error = %e, "Session gate task failed");
            }
        }
    }

    /// Current credential form mode
    pub fn form_mode(&self) -> FormMode {
        *lock(&self.form_mode)
    }

    /// Switch the credential form between login and signup
    pub fn toggle_form_mode(&self) -> FormMode {
        let mode = {
            let mut mode = lock(&self.form_mode);
            *mode = mode.toggled();
            *mode
        };
        self.surface
            .set_form_layout(FormLayout::new(mode, self.config.resolves_names()));
        mode
    }

    /// Submit the credential form in the current mode
    pub async fn submit(&self, form: &mut CredentialForm) -> ClientResult<AuthUser> {
        match self.form_mode() {
            FormMode::Login => self.login(form).await,
            FormMode::Signup => self.signup(form).await,
        }
    }

    pub async fn login(&self, form: &mut CredentialForm) -> ClientResult<AuthUser> {
        self.credentials.login(form).await
    }

    pub async fn signup(&self, form: &CredentialForm) -> ClientResult<AuthUser> {
        self.credentials.signup(form).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.credentials.logout().await
    }

    /// Send the composer input; see [`MessageComposer::send`]
    pub fn send(&self, input: &mut String) -> ClientResult<Option<PendingWrite>> {
        self.composer.send(input)
    }

    /// The signed-in account, if any
    pub fn current_user(&self) -> Option<AuthUser> {
        self.identity.current_user()
    }

    pub fn session(&self) -> &SessionGate {
        &self.gate
    }

    pub fn names(&self) -> Arc<tokio::sync::Mutex<DisplayNameCache>> {
        self.feed.names()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_backend::{MemoryDocumentStore, MemoryIdentityProvider};

    use crate::surface::RecordingSurface;

    fn new_client(config: ClientConfig) -> (ChatClient, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::new());
        let client = ChatClient::new(
            Arc::new(MemoryIdentityProvider::new()),
            Arc::new(MemoryDocumentStore::new()),
            surface.clone(),
            config,
        );
        (client, surface)
    }

    #[tokio::test]
    async fn test_toggle_form_mode() {
        let (client, surface) = new_client(ClientConfig::default());
        assert_eq!(client.form_mode(), FormMode::Login);

        assert_eq!(client.toggle_form_mode(), FormMode::Signup);
        let form = surface.snapshot().form.unwrap();
        assert!(form.display_name_visible);
        assert_eq!(form.submit_label, "Sign Up");

        assert_eq!(client.toggle_form_mode(), FormMode::Login);
        let form = surface.snapshot().form.unwrap();
        assert!(!form.display_name_visible);
        assert_eq!(form.submit_label, "Login");
    }

    #[tokio::test]
    async fn test_plain_variant_never_shows_display_name() {
        let (client, surface) = new_client(ClientConfig::plain());
        client.toggle_form_mode();
        assert!(!surface.snapshot().form.unwrap().display_name_visible);
    }

    #[tokio::test]
    async fn test_start_draws_form_and_is_idempotent() {
        let (client, surface) = new_client(ClientConfig::default());
        client.start();
        client.start();

        assert_eq!(
            surface.snapshot().form,
            Some(FormLayout::new(FormMode::Login, true))
        );
        client.shutdown().await;
        assert!(!client.session().is_feed_live());
    }
}
