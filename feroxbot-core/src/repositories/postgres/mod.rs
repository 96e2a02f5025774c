pub mod game_stats;
pub mod registration_codes;
pub mod stats;
pub mod user_settings;

pub use game_stats::PostgresGameStatsRepository;
pub use registration_codes::PostgresRegistrationCodeRepository;
pub use stats::PostgresStatsRepository;
pub use user_settings::PostgresUserSettingsRepository;
