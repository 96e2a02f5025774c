use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;

use crate::Error;
use crate::features::{FeatureContext, FeatureRegistry};
use crate::platforms::discord::conversions::to_interaction_event;
use crate::services::router::InteractionRouter;

/// State every shard runner shares.
struct ShardShared {
    router: Arc<InteractionRouter>,
    features: Arc<FeatureRegistry>,
    feature_ctx: FeatureContext,
    features_started: AtomicBool,
    cache: Arc<DefaultInMemoryCache>,
}

/// Reads events from one shard until it closes:
///   - updates the in-memory cache
///   - starts features on the first READY of any shard
///   - dispatches each interaction on its own task
async fn shard_runner(mut shard: Shard, shared: Arc<ShardShared>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
                continue;
            }
        };
        shared.cache.update(&event);

        match event {
            Event::Ready(ready) => {
                let data: &ReadyPayload = &ready;
                info!("Shard {shard_id} => READY as {} (ID={})", data.user.name, data.user.id);

                if !shared.features_started.swap(true, Ordering::AcqRel) {
                    let shared = Arc::clone(&shared);
                    tokio::spawn(async move {
                        let started = shared.features.start_all(&shared.feature_ctx).await;
                        info!("Started {started} features");
                    });
                }
            }
            Event::InteractionCreate(create) => {
                let Some(interaction) = to_interaction_event(&create.0) else {
                    debug!("Shard {shard_id} => interaction {} without an author", create.0.id);
                    continue;
                };
                let router = Arc::clone(&shared.router);
                tokio::spawn(async move {
                    let outcome = router.dispatch(interaction).await;
                    trace!("Dispatch finished => {outcome:?}");
                });
            }
            other => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Cache the shard runners fill and `/info` reads.
pub fn gateway_cache() -> DefaultInMemoryCache {
    DefaultInMemoryCache::builder()
        .resource_types(ResourceType::GUILD | ResourceType::CHANNEL | ResourceType::USER_CURRENT)
        .build()
}

/// Gateway connection: owns the shards and their runner tasks.
pub struct DiscordRuntime {
    token: String,
    http: Arc<HttpClient>,
    cache: Arc<DefaultInMemoryCache>,
    router: Arc<InteractionRouter>,
    features: Arc<FeatureRegistry>,
    feature_ctx: FeatureContext,
    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,
}

impl DiscordRuntime {
    pub fn new(
        token: String,
        http: Arc<HttpClient>,
        cache: Arc<DefaultInMemoryCache>,
        router: Arc<InteractionRouter>,
        features: Arc<FeatureRegistry>,
        feature_ctx: FeatureContext,
    ) -> Self {
        Self {
            token,
            http,
            cache,
            router,
            features,
            feature_ctx,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.shard_tasks.is_empty()
    }

    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.is_connected() {
            info!("(DiscordRuntime) Already connected => skipping");
            return Ok(());
        }

        let config = Config::new(self.token.clone(), Intents::GUILDS);
        let shards: Vec<Shard> = gateway::create_recommended(&self.http, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?
            .collect();

        self.shard_senders = shards.iter().map(Shard::sender).collect();
        let shared = Arc::new(ShardShared {
            router: Arc::clone(&self.router),
            features: Arc::clone(&self.features),
            feature_ctx: FeatureContext {
                shard_senders: self.shard_senders.clone(),
                ..self.feature_ctx.clone()
            },
            features_started: AtomicBool::new(false),
            cache: Arc::clone(&self.cache),
        });

        for shard in shards {
            let shared = Arc::clone(&shared);
            self.shard_tasks.push(tokio::spawn(shard_runner(shard, shared)));
        }

        info!("(DiscordRuntime) Connected with {} shards", self.shard_tasks.len());
        Ok(())
    }

    /// Closes every shard and waits for the runners to finish.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();
        info!("(DiscordRuntime) Disconnected");
        Ok(())
    }
}
