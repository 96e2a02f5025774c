use std::sync::Arc;

use feroxbot_common::models::BotSettings;
use feroxbot_common::traits::api::ClientStatus;
use feroxbot_common::traits::repository_traits::{
    GameStatsRepository, RegistrationCodeRepository, StatsRepository, UserSettingsRepository,
};

use crate::services::collector::ComponentCollector;
use crate::services::command_registry::CommandRegistry;
use crate::services::identity::IdentityResolver;
use crate::services::responder::Responder;

/// Long-lived collaborators command handlers may use.
#[derive(Clone)]
pub struct BotServices {
    pub identity: Arc<IdentityResolver>,
    pub stats: Arc<dyn StatsRepository>,
    pub codes: Arc<dyn RegistrationCodeRepository>,
    pub games: Arc<dyn GameStatsRepository>,
    pub user_settings: Arc<dyn UserSettingsRepository>,
    pub client: Arc<dyn ClientStatus>,
    pub settings: BotSettings,
}

/// Everything a handler gets besides the event itself, so handlers take one
/// argument instead of many and tests can swap pieces out.
#[derive(Clone)]
pub struct CommandContext {
    pub responder: Responder,
    pub collector: ComponentCollector,
    pub registry: Arc<CommandRegistry>,
    pub services: BotServices,
}

impl CommandContext {
    pub fn new(
        responder: Responder,
        collector: ComponentCollector,
        registry: Arc<CommandRegistry>,
        services: BotServices,
    ) -> Self {
        Self {
            responder,
            collector,
            registry,
            services,
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.services.settings
    }
}
