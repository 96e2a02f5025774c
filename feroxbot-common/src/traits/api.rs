use std::time::Duration;

use async_trait::async_trait;
use twilight_model::application::command::Command;
use twilight_model::channel::message::Embed;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, InteractionMarker, UserMarker};

use crate::error::Error;

/// Outbound half of the chat platform: interaction responses and bulk
/// command registration.
#[async_trait]
pub trait InteractionApi: Send + Sync {
    async fn create_response(
        &self,
        interaction_id: Id<InteractionMarker>,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<(), Error>;

    async fn update_response(&self, token: &str, data: &InteractionResponseData) -> Result<(), Error>;

    async fn delete_response(&self, token: &str) -> Result<(), Error>;

    /// Replaces the command catalog, globally or for a single guild.
    /// Returns how many commands the platform now has registered.
    async fn set_commands(
        &self,
        commands: &[Command],
        guild_id: Option<Id<GuildMarker>>,
    ) -> Result<usize, Error>;
}

/// Messages sent outside of an interaction.
#[async_trait]
pub trait DirectMessageApi: Send + Sync {
    async fn send_direct_embeds(&self, user_id: Id<UserMarker>, embeds: &[Embed]) -> Result<(), Error>;
}

/// What the connected client currently knows about itself.
pub trait ClientStatus: Send + Sync {
    fn guild_count(&self) -> usize;
    /// Sum of the member counts of every cached guild.
    fn member_count(&self) -> u64;
    fn uptime(&self) -> Duration;
}
