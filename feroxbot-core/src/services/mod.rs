// File: src/services/mod.rs

pub mod collector;
pub mod command_context;
pub mod command_registry;
pub mod cooldown;
pub mod discord;
pub mod identity;
pub mod responder;
pub mod router;

pub use collector::ComponentCollector;
pub use command_context::{BotServices, CommandContext};
pub use command_registry::{CommandFactory, CommandHandler, CommandRegistry, RegisteredCommand};
pub use cooldown::{CooldownCheck, CooldownTracker};
pub use identity::IdentityResolver;
pub use responder::Responder;
pub use router::{DispatchOutcome, InteractionRouter};
