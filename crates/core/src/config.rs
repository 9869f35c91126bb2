use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use toml_edit::{table, value, DocumentMut, Item, Table};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] io::Error),
    #[error("config file is not valid toml: {0}")]
    Syntax(#[from] toml_edit::TomlError),
    #[error("invalid config value: {0}")]
    Schema(#[from] toml::de::Error),
}

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, table: &mut Table);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, table: &mut Table) {
                    table.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, i64, bool, f64);

/// Returns the table `name`, replacing whatever non-table value was there.
fn section<'a>(doc: &'a mut DocumentMut, name: &str) -> &'a mut Table {
    let item = doc.entry(name).or_insert_with(table);
    if !item.is_table() {
        *item = table();
    }
    match item {
        Item::Table(section) => section,
        _ => unreachable!("section was just replaced with a table"),
    }
}

/// Generates one struct per config section plus the `PluginConfig` holding
/// them. Keys are written kebab-case; missing keys are added to the file
/// with their defaults.
macro_rules! gen_config {
    (
        $(
            [$section:ident: $section_ty:ident] {
                $( $name:ident: $type:ty = $default:expr ),* $(,)?
            }
        )*
    ) => {
        $(
            #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
            #[serde(rename_all = "kebab-case")]
            pub struct $section_ty {
                $( pub $name: $type, )*
            }

            impl Default for $section_ty {
                fn default() -> Self {
                    Self {
                        $( $name: $default, )*
                    }
                }
            }

            impl $section_ty {
                fn fix_config(doc: &mut DocumentMut) {
                    let table = section(doc, &stringify!($section).replace('_', "-"));
                    $(
                        <$type as ConfigSerializeDefault>::fix_config(
                            $default,
                            &stringify!($name).replace('_', "-"),
                            table,
                        );
                    )*
                }
            }
        )*

        #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
        #[serde(rename_all = "kebab-case")]
        pub struct PluginConfig {
            $( pub $section: $section_ty, )*
        }

        impl PluginConfig {
            fn fix_config(doc: &mut DocumentMut) {
                $( $section_ty::fix_config(doc); )*
            }
        }
    };
}

gen_config! {
    [settings: SettingsConfig] {
        enable_welcome_messages: bool = true,
    }
    [welcome: WelcomeConfig] {
        broadcast_join: bool = true,
        join_message: String = "&a{player_name} &fhas joined the server!".to_string(),
        first_join_enabled: bool = true,
        first_join_broadcast: bool = true,
        first_join_message: String =
            "&b&lWelcome &f{player_name} &b&lto the server for the first time!".to_string(),
        chat_welcome_enabled: bool = true,
        chat_welcome_colorful: bool = true,
        chat_welcome_message: String =
            "&7Welcome back, &b{player_name}&7! Enjoy your stay.".to_string(),
    }
    [tab_list: TabListConfig] {
        enabled: bool = true,
        header: String = "&b&lFrostCraft Development Server".to_string(),
        footer: String = "&7Have a great time on our server!".to_string(),
        update_interval: i64 = 30,
    }
    [holograms: HologramsConfig] {
        enabled: bool = true,
        line_spacing: f64 = 0.25,
    }
    [discord: DiscordConfig] {
        enabled: bool = true,
        link: String = "https://discord.gg/yourserver".to_string(),
        message: String = "&a&lJoin our Discord server: &b{link}".to_string(),
    }
    [messages: MessagesConfig] {
        prefix: String = "&b&l[FrostGUI] &r".to_string(),
        no_permission: String = "&cYou do not have permission to use this command.".to_string(),
    }
}

impl PluginConfig {
    /// Reads `path`, writing back any missing keys with their defaults.
    /// A missing file is created.
    pub fn load(path: &Path) -> Result<PluginConfig, ConfigError> {
        let str = match fs::read_to_string(path) {
            Ok(str) => str,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        let mut doc = str.parse::<DocumentMut>()?;

        PluginConfig::fix_config(&mut doc);

        let patched = doc.to_string();
        if str != patched {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &patched)?;
        }

        Ok(toml::from_str(&patched)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = PluginConfig::load(&path).unwrap();
        assert_eq!(config, PluginConfig::default());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[tab-list]"));
        assert!(written.contains("update-interval = 30"));
        assert!(written.contains("line-spacing = 0.25"));
    }

    #[test]
    fn keeps_user_values_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "# my server\n[tab-list]\nheader = \"&cCustom\" # shiny\nupdate-interval = 5\n",
        )
        .unwrap();

        let config = PluginConfig::load(&path).unwrap();
        assert_eq!(config.tab_list.header, "&cCustom");
        assert_eq!(config.tab_list.update_interval, 5);
        assert!(config.tab_list.enabled);
        assert_eq!(config.holograms.line_spacing, 0.25);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# my server"));
        assert!(written.contains("# shiny"));
        assert!(written.contains("[discord]"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[holograms]\nline-spacing = \"wide\"\n").unwrap();
        assert!(matches!(
            PluginConfig::load(&path),
            Err(ConfigError::Schema(_))
        ));
    }

    #[test]
    fn bad_syntax_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[holograms\n").unwrap();
        assert!(matches!(
            PluginConfig::load(&path),
            Err(ConfigError::Syntax(_))
        ));
    }
}
