//! Messages sent when a player joins.

use crate::config::PluginConfig;
use crate::host::{SessionHandle, SessionHost};
use crate::tab_list;
use frostgui_text::TextComponent;
use tracing::{debug, warn};

/// What the server should print in place of its own "joined the game" line.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinMessage {
    /// Leave the server's line untouched.
    Default,
    Custom(TextComponent),
    /// Print nothing.
    Suppressed,
}

/// Greets a player who just joined: picks the join line, broadcasts the
/// first-join message, sends the personal welcome and applies the tab list.
pub fn greet<S: SessionHost + ?Sized>(
    host: &mut S,
    config: &PluginConfig,
    session: SessionHandle,
) -> JoinMessage {
    let Some(name) = host.session_name(session) else {
        warn!("Join event for unknown session {:?}", session);
        return JoinMessage::Default;
    };
    let welcome = &config.welcome;
    let fill = |template: &str| template.replace("{player_name}", &name);

    let join_message = if welcome.broadcast_join {
        let message = format!("{}{}", config.messages.prefix, fill(&welcome.join_message));
        JoinMessage::Custom(TextComponent::legacy(&message))
    } else {
        JoinMessage::Suppressed
    };

    if !host.has_played_before(session) && welcome.first_join_enabled {
        debug!("{} joined for the first time", name);
        if welcome.first_join_broadcast {
            host.broadcast_message(TextComponent::legacy(&fill(&welcome.first_join_message)));
        }
    }

    if welcome.chat_welcome_enabled {
        let message = fill(&welcome.chat_welcome_message);
        let message = if welcome.chat_welcome_colorful {
            TextComponent::legacy(&message)
        } else {
            TextComponent::from(message)
        };
        host.send_message(session, message);
    }

    if config.tab_list.enabled {
        let (header, footer) = tab_list::header_footer(&config.tab_list);
        host.set_header_footer(session, &header, &footer);
    }

    join_message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, Position};
    use crate::permissions::PermissionSet;

    fn join(host: &mut HeadlessHost, name: &str) -> SessionHandle {
        host.connect(name, Position::new("spawn", 0.0, 64.0, 0.0), PermissionSet::new())
    }

    #[test]
    fn first_join() {
        let mut host = HeadlessHost::new();
        let config = PluginConfig::default();
        let steve = join(&mut host, "Steve");

        let JoinMessage::Custom(message) = greet(&mut host, &config, steve) else {
            panic!("expected a custom join message");
        };
        assert_eq!(message.to_plain_text(), "[FrostGUI] Steve has joined the server!");
        assert_eq!(
            host.broadcasts()[0].to_plain_text(),
            "Welcome Steve to the server for the first time!"
        );
        assert_eq!(
            host.take_messages(steve),
            [
                "Welcome Steve to the server for the first time!",
                "Welcome back, Steve! Enjoy your stay.",
            ]
        );
        let header = host.session(steve).unwrap().header.clone().unwrap();
        assert_eq!(header.to_plain_text(), "FrostCraft Development Server");
    }

    #[test]
    fn returning_player_gets_no_broadcast() {
        let mut host = HeadlessHost::new();
        let config = PluginConfig::default();
        let first = join(&mut host, "Alex");
        host.disconnect(first);
        let alex = join(&mut host, "Alex");

        greet(&mut host, &config, alex);
        assert!(host.broadcasts().is_empty());
        assert_eq!(host.take_messages(alex), ["Welcome back, Alex! Enjoy your stay."]);
    }

    #[test]
    fn plain_welcome_and_suppressed_join() {
        let mut host = HeadlessHost::new();
        let mut config = PluginConfig::default();
        config.welcome.broadcast_join = false;
        config.welcome.first_join_enabled = false;
        config.welcome.chat_welcome_colorful = false;
        config.tab_list.enabled = false;
        let steve = join(&mut host, "Steve");

        assert_eq!(greet(&mut host, &config, steve), JoinMessage::Suppressed);
        assert_eq!(
            host.take_messages(steve),
            ["&7Welcome back, &bSteve&7! Enjoy your stay."]
        );
        assert!(host.session(steve).unwrap().header.is_none());
    }
}
