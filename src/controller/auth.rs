//! Login, registration and logout flows

use super::AppController;
use crate::model::AuthMode;

impl AppController {
    /// Resolve the persisted session against the backend at startup. A dead
    /// token clears the session; a network failure keeps it for later.
    pub async fn restore_session(&self) {
        let user = self.model.api.who_am_i().await;
        self.model.set_user(user).await;
    }

    pub(crate) async fn submit_auth_form(&self) {
        let Some((mode, username, password)) = self.model.take_auth_credentials().await else {
            return;
        };

        let controller = self.clone();
        tokio::spawn(async move {
            let result = match mode {
                AuthMode::Login => controller.model.api.login(&username, &password).await,
                AuthMode::Register => controller.model.api.register(&username, &password).await,
            };

            match result {
                Ok(user) => {
                    // Some backends return only a token; ask who we are then.
                    let user = match user {
                        Some(user) => Some(user),
                        None => controller.model.api.who_am_i().await,
                    };
                    tracing::info!(username = %username, "authenticated");
                    controller.model.set_user(user).await;
                    controller.model.auth_form_finish(true).await;
                    controller.load_index().await;
                }
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "authentication failed");
                    controller.model.auth_form_finish(false).await;
                    controller.model.set_error(Self::format_error(&e)).await;
                }
            }
        });
    }

    pub(crate) async fn logout(&self) {
        self.player.reset().await;
        self.model.api.logout().await;
        self.model.set_user(None).await;
        self.load_index().await;
    }
}
