use async_trait::async_trait;

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, MessageStyle, ReplyOptions,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::responder::text;

pub fn create(settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let server_ip = settings
        .server_ip
        .clone()
        .ok_or_else(|| Error::CommandLoad("/ip needs SERVER_IP to be set".into()))?;
    let definition =
        CommandDefinition::new("ip", "Get the server ip", CommandStatus::Enabled).cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, IpCommand { server_ip }))
}

pub struct IpCommand {
    server_ip: String,
}

#[async_trait]
impl CommandHandler for IpCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        ctx.responder
            .reply(
                event,
                text(format!("The server ip is: `{}`", self.server_ip)),
                ReplyOptions::styled(MessageStyle::Success),
            )
            .await
    }
}
