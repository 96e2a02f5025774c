pub mod game_summary;
pub mod slashcommands;
