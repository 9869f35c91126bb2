//! The seams between the plugin and the game server hosting it.
//!
//! Everything the plugin does to the world or to connected players goes
//! through [`WorldHost`] and [`SessionHost`]. The plugin itself never owns a
//! world or a network connection.

mod headless;

pub use headless::{HeadlessHost, Marker, SessionState};

use frostgui_text::TextComponent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loaded world, as handed out by [`WorldHost::resolve_world`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldHandle(pub u32);

/// A spawned entity. Handles may outlive the entity they point to; use
/// [`WorldHost::is_live`] before assuming otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// A connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(pub u128);

/// A point in a named world. The world is looked up by name whenever it is
/// needed, so a position can refer to a world that isn't loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Position {
        Position {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.world,
            round_half_up(self.x),
            round_half_up(self.y),
            round_half_up(self.z)
        )
    }
}

fn round_half_up(val: f64) -> i64 {
    (val + 0.5).floor() as i64
}

bitflags::bitflags! {
    /// Entity properties requested for a marker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MarkerFlags: u8 {
        const INVISIBLE = 0x01;
        const NO_GRAVITY = 0x02;
        const SMALL = 0x04;
        const MARKER = 0x08;
        const INVULNERABLE = 0x10;
        const NO_COLLISION = 0x20;
        const NAME_VISIBLE = 0x40;
    }
}

/// What to spawn: an armor-stand-like marker whose only visible part is its
/// custom name.
#[derive(Debug, Clone)]
pub struct MarkerSpec {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub label: TextComponent,
    pub flags: MarkerFlags,
}

pub trait WorldHost {
    fn resolve_world(&self, name: &str) -> Option<WorldHandle>;

    fn spawn_marker(&mut self, world: WorldHandle, spec: &MarkerSpec) -> EntityHandle;

    /// Attaches a persistent string tag to an entity.
    fn tag_entity(&mut self, entity: EntityHandle, key: &str, value: &str);

    fn entity_tag(&self, entity: EntityHandle, key: &str) -> Option<String>;

    /// Removes an entity from its world. Despawning a dead entity does nothing.
    fn despawn_entity(&mut self, entity: EntityHandle);

    fn is_live(&self, entity: EntityHandle) -> bool;
}

pub trait SessionHost {
    fn online_sessions(&self) -> Vec<SessionHandle>;

    fn session_name(&self, session: SessionHandle) -> Option<String>;

    fn session_position(&self, session: SessionHandle) -> Option<Position>;

    fn teleport(&mut self, session: SessionHandle, position: &Position);

    fn has_permission(&self, session: SessionHandle, node: &str) -> bool;

    fn has_played_before(&self, session: SessionHandle) -> bool;

    fn send_message(&mut self, session: SessionHandle, message: TextComponent);

    fn broadcast_message(&mut self, message: TextComponent);

    fn set_header_footer(
        &mut self,
        session: SessionHandle,
        header: &TextComponent,
        footer: &TextComponent,
    );
}

/// A full host: both a world and a set of sessions.
pub trait ServerHost: WorldHost + SessionHost {}

impl<T: WorldHost + SessionHost + ?Sized> ServerHost for T {}
