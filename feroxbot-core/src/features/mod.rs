// File: feroxbot-core/src/features/mod.rs

pub mod dm_stats;
pub mod presence;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use twilight_gateway::MessageSender;

use feroxbot_common::models::BotSettings;
use feroxbot_common::traits::api::DirectMessageApi;

use crate::Error;
use crate::services::command_context::BotServices;

/// What a feature gets to work with once the gateway is ready.
#[derive(Clone)]
pub struct FeatureContext {
    /// Filled in by the runtime once the shards exist.
    pub shard_senders: Vec<MessageSender>,
    pub services: BotServices,
    pub messenger: Arc<dyn DirectMessageApi>,
}

impl FeatureContext {
    pub fn new(services: BotServices, messenger: Arc<dyn DirectMessageApi>) -> Self {
        Self {
            shard_senders: Vec::new(),
            services,
            messenger,
        }
    }
}

/// A background behavior started once the bot is connected.
#[async_trait]
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;
    async fn start(&self, ctx: &FeatureContext) -> Result<(), Error>;
}

pub type FeatureFactory = fn(&BotSettings) -> Result<Arc<dyn Feature>, Error>;

pub fn builtin_features() -> Vec<FeatureFactory> {
    vec![dm_stats::create, presence::create]
}

#[derive(Default)]
pub struct FeatureRegistry {
    features: Vec<Arc<dyn Feature>>,
}

impl FeatureRegistry {
    /// Builds every feature; ones that fail are logged and left out.
    pub fn load_all(factories: &[FeatureFactory], settings: &BotSettings) -> Self {
        let mut features = Vec::new();
        for factory in factories {
            match factory(settings) {
                Ok(feature) => features.push(feature),
                Err(e) => error!("Failed to load feature: {}", e),
            }
        }
        info!("Loaded {} of {} features", features.len(), factories.len());
        Self { features }
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Starts every feature. Returns how many started cleanly.
    pub async fn start_all(&self, ctx: &FeatureContext) -> usize {
        let mut started = 0;
        for feature in &self.features {
            match feature.start(ctx).await {
                Ok(()) => {
                    info!("Started feature '{}'", feature.name());
                    started += 1;
                }
                Err(e) => error!("Error while starting feature '{}': {}", feature.name(), e),
            }
        }
        started
    }
}
