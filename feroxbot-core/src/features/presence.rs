use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use twilight_model::gateway::payload::outgoing::UpdatePresence;
use twilight_model::gateway::presence::{ActivityType, MinimalActivity, Status};

use feroxbot_common::models::BotSettings;

use crate::Error;
use crate::features::{Feature, FeatureContext};

/// Shows a streaming activity on every shard.
pub struct PresenceFeature {
    name: String,
    url: Option<String>,
}

pub fn create(settings: &BotSettings) -> Result<Arc<dyn Feature>, Error> {
    let name = settings
        .presence_name
        .clone()
        .ok_or_else(|| Error::CommandLoad("presence feature needs PRESENCE_NAME".into()))?;
    Ok(Arc::new(PresenceFeature {
        name,
        url: settings.presence_url.clone(),
    }))
}

impl PresenceFeature {
    pub fn update(&self) -> Result<UpdatePresence, Error> {
        let activity = MinimalActivity {
            kind: ActivityType::Streaming,
            name: self.name.clone(),
            url: self.url.clone(),
        };
        UpdatePresence::new(vec![activity.into()], false, None, Status::Online)
            .map_err(|e| Error::Platform(format!("invalid presence: {e}")))
    }
}

#[async_trait]
impl Feature for PresenceFeature {
    fn name(&self) -> &str {
        "presence"
    }

    async fn start(&self, ctx: &FeatureContext) -> Result<(), Error> {
        let update = self.update()?;
        for sender in &ctx.shard_senders {
            if let Err(e) = sender.command(&update) {
                warn!("Failed to send presence update to a shard: {e:?}");
            }
        }
        Ok(())
    }
}
