// Fakes and builders shared by the integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use twilight_model::application::command::Command;
use twilight_model::channel::message::Embed;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, InteractionMarker, UserMarker};

use feroxbot_common::models::{
    BotSettings, CommandOption, GameStats, InteractionEvent, InteractionPayload, PlayerStats,
    RegistrationCode, Statistic, UserSettings,
};
use feroxbot_common::traits::api::{ClientStatus, DirectMessageApi, InteractionApi};
use feroxbot_common::traits::repository_traits::{
    GameStatsRepository, RegistrationCodeRepository, StatsRepository, UserSettingsRepository,
};
use feroxbot_core::features::FeatureContext;
use feroxbot_core::services::{
    BotServices, CommandContext, CommandFactory, CommandRegistry, ComponentCollector,
    IdentityResolver, InteractionRouter, Responder,
};
use feroxbot_core::{Error, HttpClient, HttpResponse};

pub const PLAYER_UUID: &str = "abcd1234-abcd-1234-abcd-1234abcd1234";
pub const PLAYER_NAME: &str = "Foo";
pub const INVOKER: u64 = 4242;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create {
        kind: InteractionResponseType,
        data: Option<InteractionResponseData>,
    },
    Update(InteractionResponseData),
    Delete(String),
    SetCommands {
        names: Vec<String>,
        guild: Option<Id<GuildMarker>>,
    },
    DirectMessage {
        user: Id<UserMarker>,
        embeds: Vec<Embed>,
    },
}

impl ApiCall {
    /// Description of the first embed carried by this call, if any.
    pub fn description(&self) -> Option<String> {
        let data = match self {
            ApiCall::Create { data, .. } => data.as_ref()?,
            ApiCall::Update(data) => data,
            _ => return None,
        };
        first_embed(data).and_then(|e| e.description.clone())
    }

    pub fn data(&self) -> Option<&InteractionResponseData> {
        match self {
            ApiCall::Create { data, .. } => data.as_ref(),
            ApiCall::Update(data) => Some(data),
            _ => None,
        }
    }
}

pub fn first_embed(data: &InteractionResponseData) -> Option<&Embed> {
    data.embeds.as_ref().and_then(|e| e.first())
}

/// Records every outbound platform call.
#[derive(Default)]
pub struct RecordingApi {
    pub calls: Mutex<Vec<ApiCall>>,
    pub fail_creates: bool,
}

impl RecordingApi {
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ApiCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn push(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InteractionApi for RecordingApi {
    async fn create_response(
        &self,
        _interaction_id: Id<InteractionMarker>,
        _token: &str,
        response: &InteractionResponse,
    ) -> Result<(), Error> {
        if self.fail_creates {
            return Err(Error::Platform("Unknown interaction".into()));
        }
        self.push(ApiCall::Create {
            kind: response.kind,
            data: response.data.clone(),
        });
        Ok(())
    }

    async fn update_response(&self, _token: &str, data: &InteractionResponseData) -> Result<(), Error> {
        self.push(ApiCall::Update(data.clone()));
        Ok(())
    }

    async fn delete_response(&self, token: &str) -> Result<(), Error> {
        self.push(ApiCall::Delete(token.to_string()));
        Ok(())
    }

    async fn set_commands(
        &self,
        commands: &[Command],
        guild_id: Option<Id<GuildMarker>>,
    ) -> Result<usize, Error> {
        self.push(ApiCall::SetCommands {
            names: commands.iter().map(|c| c.name.clone()).collect(),
            guild: guild_id,
        });
        Ok(commands.len())
    }
}

#[async_trait]
impl DirectMessageApi for RecordingApi {
    async fn send_direct_embeds(&self, user_id: Id<UserMarker>, embeds: &[Embed]) -> Result<(), Error> {
        self.push(ApiCall::DirectMessage {
            user: user_id,
            embeds: embeds.to_vec(),
        });
        Ok(())
    }
}

/// Identity service that knows exactly one player.
pub struct SinglePlayerHttp;

#[async_trait]
impl HttpClient for SinglePlayerHttp {
    async fn get(&self, url: String, _headers: HashMap<String, String>) -> Result<HttpResponse, Error> {
        let known = url.ends_with(&format!("/{PLAYER_NAME}"))
            || url.ends_with(&PLAYER_UUID.replace('-', ""));
        if known {
            Ok(HttpResponse {
                status: 200,
                body: format!(
                    r#"{{"id":"{}","name":"{}"}}"#,
                    PLAYER_UUID.replace('-', ""),
                    PLAYER_NAME
                ),
            })
        } else {
            Ok(HttpResponse { status: 404, body: String::new() })
        }
    }
}

#[derive(Default)]
pub struct MemoryStatsRepository {
    pub rows: DashMap<String, PlayerStats>,
    pub games: DashMap<String, i64>,
    /// Makes every write fail, as a lost database connection would.
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl StatsRepository for MemoryStatsRepository {
    async fn get_by_uuid(&self, uuid: &str) -> Result<Option<PlayerStats>, Error> {
        Ok(self.rows.get(uuid).map(|r| r.clone()))
    }

    async fn get_by_discord_id(&self, discord_id: &str) -> Result<Option<PlayerStats>, Error> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.discord_id.as_deref() == Some(discord_id))
            .map(|r| r.clone()))
    }

    async fn set_discord_id(&self, uuid: &str, discord_id: Option<&str>) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Platform("connection to the database was lost".into()));
        }
        let mut row = self
            .rows
            .get_mut(uuid)
            .ok_or_else(|| Error::NotFound(uuid.to_string()))?;
        row.discord_id = discord_id.map(str::to_string);
        Ok(())
    }

    async fn count_games_played(&self, uuid: &str) -> Result<i64, Error> {
        Ok(self.games.get(uuid).map(|g| *g).unwrap_or(0))
    }

    async fn top_by(&self, statistic: Statistic, limit: i64) -> Result<Vec<PlayerStats>, Error> {
        let mut rows: Vec<PlayerStats> = self.rows.iter().map(|r| r.clone()).collect();
        rows.sort_by(|a, b| {
            b.statistic(statistic)
                .cmp(&a.statistic(statistic))
                .then(a.created_at.cmp(&b.created_at))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryGameRepository {
    pub games: Mutex<Vec<GameStats>>,
}

impl MemoryGameRepository {
    pub fn push(&self, game: GameStats) {
        self.games.lock().unwrap().push(game);
    }

    fn newest_first(&self) -> Vec<GameStats> {
        let mut games = self.games.lock().unwrap().clone();
        games.sort_by(|a, b| b.id.cmp(&a.id));
        games
    }
}

#[async_trait]
impl GameStatsRepository for MemoryGameRepository {
    async fn get_game(&self, id: i64) -> Result<Option<GameStats>, Error> {
        Ok(self.games.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn recent_games(&self, limit: i64) -> Result<Vec<GameStats>, Error> {
        Ok(self.newest_first().into_iter().take(limit as usize).collect())
    }

    async fn games_with_player(&self, uuid: &str, limit: i64) -> Result<Vec<GameStats>, Error> {
        Ok(self
            .newest_first()
            .into_iter()
            .filter(|g| g.players().any(|p| p == uuid))
            .take(limit as usize)
            .collect())
    }

    async fn latest_game(&self) -> Result<Option<GameStats>, Error> {
        Ok(self.newest_first().into_iter().next())
    }

    async fn count_games(&self) -> Result<i64, Error> {
        Ok(self.games.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct MemoryUserSettingsRepository {
    pub rows: DashMap<String, UserSettings>,
}

#[async_trait]
impl UserSettingsRepository for MemoryUserSettingsRepository {
    async fn get(&self, discord_id: &str) -> Result<Option<UserSettings>, Error> {
        Ok(self.rows.get(discord_id).map(|r| r.clone()))
    }

    async fn set_dm_stats(&self, discord_id: &str, enabled: bool) -> Result<(), Error> {
        self.rows
            .entry(discord_id.to_string())
            .or_insert_with(|| UserSettings::defaults(discord_id))
            .dm_stats = enabled;
        Ok(())
    }
}

/// Client that has been in two guilds with 42 members for an hour.
pub struct FixedClientStatus;

impl ClientStatus for FixedClientStatus {
    fn guild_count(&self) -> usize {
        2
    }

    fn member_count(&self) -> u64 {
        42
    }

    fn uptime(&self) -> Duration {
        Duration::from_secs(3600)
    }
}

pub struct MemoryCodeRepository {
    pub codes: DashMap<String, RegistrationCode>,
    pub now: Mutex<DateTime<Utc>>,
}

impl Default for MemoryCodeRepository {
    fn default() -> Self {
        Self {
            codes: DashMap::new(),
            now: Mutex::new(Utc::now()),
        }
    }
}

#[async_trait]
impl RegistrationCodeRepository for MemoryCodeRepository {
    async fn get_code(&self, code: &str) -> Result<Option<RegistrationCode>, Error> {
        Ok(self.codes.get(code).map(|c| c.clone()))
    }

    async fn delete_code(&self, code: &str) -> Result<(), Error> {
        self.codes.remove(code);
        Ok(())
    }

    async fn database_now(&self) -> Result<DateTime<Utc>, Error> {
        Ok(*self.now.lock().unwrap())
    }
}

pub fn player(discord_id: Option<&str>) -> PlayerStats {
    PlayerStats {
        uuid: PLAYER_UUID.to_string(),
        discord_id: discord_id.map(str::to_string),
        kills: 10,
        deaths: 5,
        wins: 2,
        losses: 1,
        arrows_shot: 4,
        arrows_hit: 2,
        nexuses_broken: 0,
        playtime_ms: 3_600_000,
        created_at: Utc::now(),
    }
}

/// A game between the known player (red) and `blue`.
pub fn game(id: i64, blue: &[&str]) -> GameStats {
    GameStats {
        id,
        winner: "Red".into(),
        map: "Canyon".into(),
        duration_ms: 900_000,
        total_kills: 12,
        total_deaths: 8,
        total_arrows_shot: 40,
        total_arrows_hit: 10,
        blocks_placed: 100,
        blocks_broken: 50,
        team_red: vec![PLAYER_UUID.to_string()],
        team_blue: blue.iter().map(|b| b.to_string()).collect(),
        created_at: Utc::now(),
    }
}

pub fn settings() -> BotSettings {
    BotSettings {
        server_ip: Some("play.ferox.test".into()),
        invite_link: Some("https://discord.com/oauth2/authorize?client_id=1".into()),
        ..Default::default()
    }
}

/// Everything a test needs to drive the router and inspect side effects.
pub struct Harness {
    pub api: Arc<RecordingApi>,
    pub stats: Arc<MemoryStatsRepository>,
    pub codes: Arc<MemoryCodeRepository>,
    pub games: Arc<MemoryGameRepository>,
    pub user_settings: Arc<MemoryUserSettingsRepository>,
    pub router: Arc<InteractionRouter>,
}

impl Harness {
    pub fn new(factories: &[CommandFactory]) -> Self {
        Self::with_api(factories, RecordingApi::default())
    }

    pub fn with_api(factories: &[CommandFactory], api: RecordingApi) -> Self {
        let api = Arc::new(api);
        let stats = Arc::new(MemoryStatsRepository::default());
        let codes = Arc::new(MemoryCodeRepository::default());
        let games = Arc::new(MemoryGameRepository::default());
        let user_settings = Arc::new(MemoryUserSettingsRepository::default());
        let settings = settings();

        let registry = Arc::new(CommandRegistry::load_all(factories, &settings));
        let services = BotServices {
            identity: Arc::new(IdentityResolver::new(Arc::new(SinglePlayerHttp))),
            stats: stats.clone(),
            codes: codes.clone(),
            games: games.clone(),
            user_settings: user_settings.clone(),
            client: Arc::new(FixedClientStatus),
            settings: settings.clone(),
        };
        let context = CommandContext::new(
            Responder::new(api.clone(), settings.bot_name.clone()),
            ComponentCollector::new(),
            registry,
            services,
        );

        Self {
            api,
            stats,
            codes,
            games,
            user_settings,
            router: Arc::new(InteractionRouter::new(context)),
        }
    }

    pub fn responder(&self) -> &Responder {
        &self.router.context().responder
    }

    pub fn feature_context(&self) -> FeatureContext {
        FeatureContext::new(self.router.context().services.clone(), self.api.clone())
    }
}

fn next_interaction_id() -> Id<InteractionMarker> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(1_000);
    Id::new(NEXT.fetch_add(1, Ordering::Relaxed))
}

/// A command invoked in a direct message.
pub fn dm_command(name: &str, options: Vec<CommandOption>) -> InteractionEvent {
    InteractionEvent::new(
        next_interaction_id(),
        "token",
        Id::new(INVOKER),
        "tester",
        InteractionPayload::Command {
            name: name.to_string(),
            options,
        },
    )
}

/// A command invoked in a guild channel where the bot has `permissions`.
pub fn guild_command(name: &str, options: Vec<CommandOption>, permissions: Permissions) -> InteractionEvent {
    dm_command(name, options).in_guild(Id::new(1), Id::new(2), permissions)
}

pub fn button_press(custom_id: String, user: u64) -> InteractionEvent {
    menu_pick(custom_id, user, Vec::new())
}

/// A select menu interaction carrying the picked `values`.
pub fn menu_pick(custom_id: String, user: u64, values: Vec<String>) -> InteractionEvent {
    InteractionEvent::new(
        next_interaction_id(),
        "component-token",
        Id::new(user),
        "tester",
        InteractionPayload::Component {
            custom_id,
            message_id: None,
            values,
        },
    )
}
