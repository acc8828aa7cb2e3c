//! Credential actions: login, signup, logout
//!
//! Every failure is shown to the user as an alert on the surface and
//! returned to the caller. Nothing is retried.

use std::sync::Arc;

use hearth_core::{AuthUser, DocId, DocumentStore, IdentityProvider, ProfileRecord, Write};
use tracing::{error, info, warn};

use crate::config::{ClientConfig, Variant};
use crate::error::{ClientError, ClientResult};
use crate::surface::ChatSurface;

/// Alert for a login (or plain signup) with a blank field
pub const MISSING_CREDENTIALS: &str = "Email and password are required.";

/// Alert for a named signup with a blank field
pub const MISSING_SIGNUP_FIELDS: &str = "Email, password, and display name are required.";

/// Alert after a successful signup
pub const SIGNUP_SUCCEEDED: &str = "Account created! You can now log in.";

/// Contents of the credential form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl CredentialForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// Forwards the credential form to the identity provider
pub struct CredentialActions {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    surface: Arc<dyn ChatSurface>,
    config: Arc<ClientConfig>,
}

impl CredentialActions {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        surface: Arc<dyn ChatSurface>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            identity,
            store,
            surface,
            config,
        }
    }

    /// Sign in with the form's email and password
    ///
    /// Success clears the email and password fields.
    pub async fn login(&self, form: &mut CredentialForm) -> ClientResult<AuthUser> {
        let result = self.try_login(form).await;
        if result.is_ok() {
            form.email.clear();
            form.password.clear();
        }
        self.alert_on_error(result)
    }

    async fn try_login(&self, form: &CredentialForm) -> ClientResult<AuthUser> {
        if form.email.is_empty() || form.password.is_empty() {
            return Err(ClientError::Validation(MISSING_CREDENTIALS));
        }

        let user = self.identity.sign_in(&form.email, &form.password).await?;
        info!(uid = %user.uid, "Logged in");
        Ok(user)
    }

    /// Create an account from the form
    ///
    /// The new account is signed in by the provider. In the named variant
    /// a profile carrying the display name is written under the new uid.
    pub async fn signup(&self, form: &CredentialForm) -> ClientResult<AuthUser> {
        let result = match self.config.variant {
            Variant::Named => self.signup_named(form).await,
            Variant::Plain => self.signup_plain(form).await,
        };
        let user = self.alert_on_error(result)?;
        self.surface.alert(SIGNUP_SUCCEEDED);
        Ok(user)
    }

    async fn signup_plain(&self, form: &CredentialForm) -> ClientResult<AuthUser> {
        if form.email.is_empty() || form.password.is_empty() {
            return Err(ClientError::Validation(MISSING_CREDENTIALS));
        }

        let user = self.identity.create_account(&form.email, &form.password).await?;
        info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    async fn signup_named(&self, form: &CredentialForm) -> ClientResult<AuthUser> {
        let email = form.email.trim();
        let display_name = form.display_name.trim();
        if email.is_empty() || form.password.is_empty() || display_name.is_empty() {
            return Err(ClientError::Validation(MISSING_SIGNUP_FIELDS));
        }

        let user = self
            .identity
            .create_account(email, &form.password)
            .await
            .map_err(|e| ClientError::Signup {
                message: e.to_string(),
                orphaned: None,
            })?;

        if let Err(e) = self.write_profile(&user, display_name).await {
            // Account creation is not rolled back
            warn!(uid = %user.uid, error = %e, "Profile write failed; account has no profile");
            return Err(ClientError::Signup {
                message: e.to_string(),
                orphaned: Some(user.uid),
            });
        }

        info!(uid = %user.uid, display_name, "Account created");
        Ok(user)
    }

    async fn write_profile(&self, user: &AuthUser, display_name: &str) -> ClientResult<()> {
        let profile = ProfileRecord::new(user.email.clone(), display_name);
        let write = Write::from_record(&profile)?;
        self.store
            .set(
                &self.config.collections.users,
                &DocId::new(user.uid.as_str()),
                write,
            )
            .await?;
        Ok(())
    }

    /// Sign the current account out
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self.identity.sign_out().await.map_err(ClientError::from);
        self.alert_on_error(result)?;
        info!("Logged out");
        Ok(())
    }

    fn alert_on_error<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            if !matches!(e, ClientError::Validation(_)) {
                error!(error = %e, "Credential action failed");
            }
            self.surface.alert(&e.to_string());
        }
        result
    }
}
