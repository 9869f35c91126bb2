#![deny(rust_2018_idioms)]

pub mod commands;
pub mod config;
pub mod hologram;
pub mod host;
pub mod permissions;
mod plugin;
pub mod tab_list;
pub mod welcome;

pub use plugin::{CONFIG_FILE, EntityEvent, EventOutcome, FrostGui, HOLOGRAMS_FILE, Message};
