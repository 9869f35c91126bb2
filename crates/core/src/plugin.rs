use crate::commands::{CommandSender, CommandTarget, InternalError, COMMAND_REGISTRY};
use crate::config::{ConfigError, PluginConfig};
use crate::hologram::{HologramManager, HOLOGRAM_TAG};
use crate::host::{EntityHandle, ServerHost, SessionHandle};
use crate::tab_list::TabListTask;
use crate::welcome::{self, JoinMessage};
use anyhow::Context;
use frostgui_text::TextComponent;
use std::fs;
use std::mem;
use std::path::PathBuf;
use tracing::{error, info, trace};

pub const CONFIG_FILE: &str = "config.toml";
pub const HOLOGRAMS_FILE: &str = "holograms.yml";

/// Work a command hands back to the plugin, run once the command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Sent when someone runs `/frostgui reload`. The sender is told how it
    /// went.
    Reload(CommandSender),
}

/// Something happening to an entity that the host lets the plugin veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    /// A player changing an armor stand's equipment.
    Manipulate,
    Interact,
    Damage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Allow,
    Cancel,
}

/// The plugin, running on top of a host server.
pub struct FrostGui<H: ServerHost> {
    host: H,
    data_dir: PathBuf,
    config: PluginConfig,
    holograms: HologramManager,
    tab_list: Option<TabListTask>,
    messages: Vec<Message>,
    enabled: bool,
}

impl<H: ServerHost> FrostGui<H> {
    pub fn enable(mut host: H, data_dir: impl Into<PathBuf>) -> anyhow::Result<FrostGui<H>> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let config = PluginConfig::load(&data_dir.join(CONFIG_FILE))
            .context("Failed to load the configuration")?;

        if config.settings.enable_welcome_messages {
            info!("Welcome messages have been enabled!");
        }

        let tab_list = if config.tab_list.enabled {
            info!("Tab list customization has been enabled!");
            Some(TabListTask::start(&mut host, &config.tab_list))
        } else {
            None
        };

        let mut holograms = HologramManager::load(
            data_dir.join(HOLOGRAMS_FILE),
            &host,
            config.holograms.line_spacing,
        );
        if config.holograms.enabled {
            holograms.show_all(&mut host);
            info!("Holograms have been enabled and loaded!");
        }

        info!("FrostGUI has been enabled!");
        Ok(FrostGui {
            host,
            data_dir,
            config,
            holograms,
            tab_list,
            messages: Vec::new(),
            enabled: true,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn holograms(&self) -> &HologramManager {
        &self.holograms
    }

    pub fn tab_list(&self) -> Option<&TabListTask> {
        self.tab_list.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Advances one game tick.
    pub fn tick(&mut self) {
        if let Some(task) = &mut self.tab_list {
            task.tick(&mut self.host, &self.config.tab_list);
        }
    }

    pub fn handle_player_join(&mut self, session: SessionHandle) -> JoinMessage {
        if !self.enabled || !self.config.settings.enable_welcome_messages {
            return JoinMessage::Default;
        }
        welcome::greet(&mut self.host, &self.config, session)
    }

    /// Hologram markers can't be changed, used or hurt.
    pub fn handle_entity_event(&self, entity: EntityHandle, event: EntityEvent) -> EventOutcome {
        match self.host.entity_tag(entity, HOLOGRAM_TAG) {
            Some(id) => {
                trace!("Cancelled {:?} on marker of hologram '{}'", event, id);
                EventOutcome::Cancel
            }
            None => EventOutcome::Allow,
        }
    }

    pub fn dispatch_command(
        &mut self,
        sender: CommandSender,
        command_line: &str,
    ) -> Result<(), InternalError> {
        let target = CommandTarget {
            host: &mut self.host,
            config: &self.config,
            holograms: &mut self.holograms,
            messages: &mut self.messages,
        };
        let result = COMMAND_REGISTRY.execute(target, sender, command_line);
        if let Err(err) = &result {
            error!("Command '{}' failed: {}", command_line, err);
        }
        self.handle_messages();
        result
    }

    pub fn complete(&self, sender: CommandSender, command_line: &str) -> Vec<String> {
        COMMAND_REGISTRY.complete(&self.host, &self.holograms, sender, command_line)
    }

    /// Re-reads the configuration. On failure the current one stays in use.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let config = PluginConfig::load(&self.data_dir.join(CONFIG_FILE))?;

        self.holograms
            .set_line_spacing(&mut self.host, config.holograms.line_spacing);
        self.tab_list = if config.tab_list.enabled {
            Some(TabListTask::start(&mut self.host, &config.tab_list))
        } else {
            None
        };
        self.config = config;

        info!("Configuration reloaded");
        Ok(())
    }

    /// Stops the tab list, takes every hologram out of the world and saves
    /// them. Only the first call does anything.
    pub fn disable(&mut self) {
        if !mem::replace(&mut self.enabled, false) {
            return;
        }
        self.tab_list = None;
        self.holograms.shutdown(&mut self.host);
        info!("All holograms have been saved and removed!");
        info!("FrostGUI has been disabled!");
    }

    fn handle_messages(&mut self) {
        for message in mem::take(&mut self.messages) {
            match message {
                Message::Reload(sender) => {
                    let reply = match self.reload() {
                        Ok(()) => format!("{}Configuration reloaded!", self.config.messages.prefix),
                        Err(err) => {
                            error!("Could not reload the configuration: {}", err);
                            format!("&cCould not reload the configuration: {}", err)
                        }
                    };
                    self.reply(sender, TextComponent::legacy(&reply));
                }
            }
        }
    }

    fn reply(&mut self, sender: CommandSender, message: TextComponent) {
        match sender {
            CommandSender::Player(session) => self.host.send_message(session, message),
            CommandSender::Console => println!("{}", message.to_plain_text()),
        }
    }
}

impl<H: ServerHost> Drop for FrostGui<H> {
    fn drop(&mut self) {
        self.disable();
    }
}
