use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Per-player statistics row from the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Dashed identity-service identifier.
    pub uuid: String,
    pub discord_id: Option<String>,
    pub kills: i64,
    pub deaths: i64,
    pub wins: i64,
    pub losses: i64,
    pub arrows_shot: i64,
    pub arrows_hit: i64,
    pub nexuses_broken: i64,
    /// Milliseconds.
    pub playtime_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl PlayerStats {
    pub fn kill_death_ratio(&self) -> String {
        ratio(self.kills, self.deaths)
    }

    pub fn win_loss_ratio(&self) -> String {
        ratio(self.wins, self.losses)
    }

    pub fn bow_accuracy(&self) -> String {
        accuracy(self.arrows_hit, self.arrows_shot)
    }

    /// Raw value of one leaderboard statistic.
    pub fn statistic(&self, statistic: Statistic) -> i64 {
        match statistic {
            Statistic::Kills => self.kills,
            Statistic::Deaths => self.deaths,
            Statistic::Wins => self.wins,
            Statistic::Losses => self.losses,
            Statistic::NexusesBroken => self.nexuses_broken,
            Statistic::ArrowsShot => self.arrows_shot,
            Statistic::ArrowsHit => self.arrows_hit,
            Statistic::Playtime => self.playtime_ms,
        }
    }
}

/// `a / b` with two decimals; a zero denominator yields `a` itself.
pub fn ratio(a: i64, b: i64) -> String {
    if b == 0 {
        return format!("{a}.00");
    }
    format!("{:.2}", a as f64 / b as f64)
}

/// Hit percentage, rounded. Nobody shooting counts as perfect aim.
pub fn accuracy(hit: i64, shot: i64) -> String {
    if shot == 0 {
        return "100%".to_string();
    }
    let pct = (hit as f64 / shot as f64) * 100.0;
    format!("{}%", pct.round() as i64)
}

/// Player statistics that have a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Kills,
    Deaths,
    Wins,
    Losses,
    NexusesBroken,
    ArrowsShot,
    ArrowsHit,
    Playtime,
}

impl Statistic {
    pub const ALL: [Statistic; 8] = [
        Statistic::Kills,
        Statistic::Deaths,
        Statistic::Wins,
        Statistic::Losses,
        Statistic::NexusesBroken,
        Statistic::ArrowsShot,
        Statistic::ArrowsHit,
        Statistic::Playtime,
    ];

    /// Option value used by the slash command, also the column name.
    pub fn key(self) -> &'static str {
        match self {
            Statistic::Kills => "kills",
            Statistic::Deaths => "deaths",
            Statistic::Wins => "wins",
            Statistic::Losses => "loses",
            Statistic::NexusesBroken => "nexusesbroken",
            Statistic::ArrowsShot => "arrowsshot",
            Statistic::ArrowsHit => "arrowshit",
            Statistic::Playtime => "playtime",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Kills => "Kills",
            Statistic::Deaths => "Deaths",
            Statistic::Wins => "Wins",
            Statistic::Losses => "Losses",
            Statistic::NexusesBroken => "Nexuses broken",
            Statistic::ArrowsShot => "Arrows shot",
            Statistic::ArrowsHit => "Arrows hit",
            Statistic::Playtime => "Playtime",
        }
    }
}

impl FromStr for Statistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.key() == s)
            .ok_or_else(|| Error::Parse(format!("Unknown statistic '{s}'")))
    }
}

/// One finished game as recorded by the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub id: i64,
    pub winner: String,
    pub map: String,
    /// Milliseconds.
    pub duration_ms: i64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_arrows_shot: i64,
    pub total_arrows_hit: i64,
    pub blocks_placed: i64,
    pub blocks_broken: i64,
    /// Player ids, in the same form as [`PlayerStats::uuid`].
    pub team_red: Vec<String>,
    pub team_blue: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl GameStats {
    pub fn kill_death_ratio(&self) -> String {
        ratio(self.total_kills, self.total_deaths)
    }

    pub fn bow_accuracy(&self) -> String {
        accuracy(self.total_arrows_hit, self.total_arrows_shot)
    }

    /// Every participant, red team first.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.team_red.iter().chain(&self.team_blue).map(String::as_str)
    }
}

/// Per-user preferences. A user without a stored row has the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub discord_id: String,
    /// Receive a direct message with the statistics of every finished game.
    pub dm_stats: bool,
}

impl UserSettings {
    pub fn defaults(discord_id: impl Into<String>) -> Self {
        Self {
            discord_id: discord_id.into(),
            dm_stats: false,
        }
    }
}

/// Short-lived token a player obtains in game to link their account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationCode {
    pub code: String,
    pub uuid: String,
    pub created_at: DateTime<Utc>,
}
