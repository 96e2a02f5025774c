// File: feroxbot-common/src/models/mod.rs
pub mod command;
pub mod config;
pub mod interaction;
pub mod message;
pub mod stats;

pub use command::{CommandDefinition, CommandStatus};
pub use config::BotSettings;
pub use interaction::{CommandOption, InteractionEvent, InteractionPayload, OptionValue};
pub use message::{DEFAULT_COLOR, MessageStyle, ReplyMethod, ReplyOptions};
pub use stats::{GameStats, PlayerStats, RegistrationCode, Statistic, UserSettings};
