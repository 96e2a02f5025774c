pub mod api;
pub mod conversions;
pub mod runtime;
pub mod status;

pub use api::TwilightInteractionApi;
pub use runtime::{DiscordRuntime, gateway_cache};
pub use status::CachedClientStatus;
