use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use twilight_http::Client as HttpClient;
use twilight_model::application::command::Command;
use twilight_model::channel::message::Embed;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker, InteractionMarker, UserMarker};

use feroxbot_common::traits::api::{DirectMessageApi, InteractionApi};

use crate::Error;

/// [`InteractionApi`] and [`DirectMessageApi`] backed by the twilight HTTP
/// client.
#[derive(Clone)]
pub struct TwilightInteractionApi {
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
}

impl TwilightInteractionApi {
    pub fn new(http: Arc<HttpClient>, application_id: Id<ApplicationMarker>) -> Self {
        Self { http, application_id }
    }
}

#[async_trait]
impl InteractionApi for TwilightInteractionApi {
    async fn create_response(
        &self,
        interaction_id: Id<InteractionMarker>,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<(), Error> {
        self.http
            .interaction(self.application_id)
            .create_response(interaction_id, token, response)
            .await
            .map_err(|e| Error::Platform(format!("Error creating interaction response: {e}")))?;
        Ok(())
    }

    async fn update_response(&self, token: &str, data: &InteractionResponseData) -> Result<(), Error> {
        let client = self.http.interaction(self.application_id);
        let mut request = client.update_response(token);
        if let Some(content) = data.content.as_deref() {
            request = request.content(Some(content));
        }
        if let Some(embeds) = data.embeds.as_deref() {
            request = request.embeds(Some(embeds));
        }
        if let Some(components) = data.components.as_deref() {
            request = request.components(Some(components));
        }
        request
            .await
            .map_err(|e| Error::Platform(format!("Error editing interaction response: {e}")))?;
        Ok(())
    }

    async fn delete_response(&self, token: &str) -> Result<(), Error> {
        self.http
            .interaction(self.application_id)
            .delete_response(token)
            .await
            .map_err(|e| Error::Platform(format!("Error deleting interaction response: {e}")))?;
        Ok(())
    }

    async fn set_commands(
        &self,
        commands: &[Command],
        guild_id: Option<Id<GuildMarker>>,
    ) -> Result<usize, Error> {
        let client = self.http.interaction(self.application_id);
        let response = match guild_id {
            Some(guild_id) => client.set_guild_commands(guild_id, commands).await,
            None => client.set_global_commands(commands).await,
        }
        .map_err(|e| Error::Platform(format!("Failed to register slash commands: {e}")))?;

        let registered = response
            .models()
            .await
            .map_err(|e| Error::Platform(format!("Failed to read registered commands: {e}")))?;
        debug!("Platform now lists {} commands", registered.len());
        Ok(registered.len())
    }
}

#[async_trait]
impl DirectMessageApi for TwilightInteractionApi {
    async fn send_direct_embeds(&self, user_id: Id<UserMarker>, embeds: &[Embed]) -> Result<(), Error> {
        let channel = self
            .http
            .create_private_channel(user_id)
            .await
            .map_err(|e| Error::Platform(format!("Error opening DM channel: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error reading DM channel: {e}")))?;

        self.http
            .create_message(channel.id)
            .embeds(embeds)
            .await
            .map_err(|e| Error::Platform(format!("Error sending direct message: {e:?}")))?;
        Ok(())
    }
}
