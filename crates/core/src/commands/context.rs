use super::{argument_set::ArgumentSet, CommandSender};
use crate::commands::error::{CommandResult, InternalError, RuntimeError};
use crate::config::PluginConfig;
use crate::hologram::HologramManager;
use crate::host::{Position, ServerHost, SessionHandle};
use crate::plugin::Message;
use frostgui_text::{ColorCode, TextComponent, TextComponentBuilder};

/// The plugin state a command runs against.
pub struct CommandTarget<'a> {
    pub host: &'a mut dyn ServerHost,
    pub config: &'a PluginConfig,
    pub holograms: &'a mut HologramManager,
    /// Work the plugin picks up once the command returns.
    pub messages: &'a mut Vec<Message>,
}

pub struct ExecutionContext<'a> {
    pub host: &'a mut dyn ServerHost,
    pub config: &'a PluginConfig,
    pub holograms: &'a mut HologramManager,
    messages: &'a mut Vec<Message>,
    sender: CommandSender,
    arguments: ArgumentSet,
}

impl<'a> ExecutionContext<'a> {
    pub(super) fn new(target: CommandTarget<'a>, sender: CommandSender, arguments: ArgumentSet) -> Self {
        Self {
            host: target.host,
            config: target.config,
            holograms: target.holograms,
            messages: target.messages,
            sender,
            arguments,
        }
    }

    pub fn args(&self) -> &ArgumentSet {
        &self.arguments
    }

    pub fn sender(&self) -> CommandSender {
        self.sender
    }

    pub fn send_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn reply_component(&mut self, message: TextComponent) -> CommandResult<()> {
        match self.sender {
            CommandSender::Player(session) => self.host.send_message(session, message),
            CommandSender::Console => println!("{}", message.to_plain_text()),
        }
        Ok(())
    }

    /// Sends `message` with its `&` color codes applied.
    pub fn reply_legacy(&mut self, message: &str) -> CommandResult<()> {
        self.reply_component(TextComponent::legacy(message))
    }

    /// Like [`Self::reply_legacy`], led by the configured message prefix.
    pub fn reply_prefixed(&mut self, message: &str) -> CommandResult<()> {
        let message = format!("{}{}", self.config.messages.prefix, message);
        self.reply_legacy(&message)
    }

    pub fn error(&mut self, message: &str) -> CommandResult<()> {
        match self.sender {
            CommandSender::Player(_) => {
                let message = TextComponentBuilder::new(message.to_string())
                    .color_code(ColorCode::Red)
                    .finish();
                self.reply_component(message)?;
            }
            CommandSender::Console => {
                eprintln!("Error: {}", message);
            }
        }
        Ok(())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        match self.sender {
            CommandSender::Player(session) => self.host.has_permission(session, permission),
            CommandSender::Console => true,
        }
    }

    pub fn require_permission(&mut self, permission: &str) -> CommandResult<()> {
        if !self.has_permission(permission) {
            return Err(RuntimeError::PermissionDenied {
                permission: permission.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn player(&self) -> CommandResult<SessionHandle> {
        match self.sender {
            CommandSender::Player(session) => Ok(session),
            CommandSender::Console => Err(RuntimeError::PlayerOnly.into()),
        }
    }

    pub fn player_position(&self) -> CommandResult<Position> {
        let session = self.player()?;
        self.host.session_position(session).ok_or_else(|| {
            InternalError::MissingSessionPosition {
                session: session.0,
            }
            .into()
        })
    }
}
