use super::{
    EntityHandle, MarkerFlags, MarkerSpec, Position, SessionHandle, SessionHost, WorldHandle,
    WorldHost,
};
use crate::permissions::PermissionSet;
use frostgui_text::TextComponent;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A spawned marker entity.
#[derive(Debug, Clone)]
pub struct Marker {
    pub world: WorldHandle,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub label: TextComponent,
    pub flags: MarkerFlags,
    pub tags: FxHashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub name: String,
    pub position: Position,
    pub permissions: PermissionSet,
    pub played_before: bool,
    pub header: Option<TextComponent>,
    pub footer: Option<TextComponent>,
    pub messages: Vec<TextComponent>,
}

/// A host that keeps its worlds, entities and players in memory. It backs
/// the standalone runner, where the only "player" input is the console.
#[derive(Default)]
pub struct HeadlessHost {
    worlds: IndexMap<String, WorldHandle>,
    next_world: u32,
    entities: BTreeMap<EntityHandle, Marker>,
    next_entity: u64,
    sessions: IndexMap<SessionHandle, SessionState>,
    next_session: u128,
    known_players: FxHashSet<String>,
    broadcasts: Vec<TextComponent>,
}

impl HeadlessHost {
    pub fn new() -> HeadlessHost {
        Default::default()
    }

    pub fn with_worlds<'a>(names: impl IntoIterator<Item = &'a str>) -> HeadlessHost {
        let mut host = HeadlessHost::new();
        for name in names {
            host.load_world(name);
        }
        host
    }

    pub fn load_world(&mut self, name: &str) -> WorldHandle {
        if let Some(handle) = self.worlds.get(name) {
            return *handle;
        }
        let handle = WorldHandle(self.next_world);
        self.next_world += 1;
        self.worlds.insert(name.to_string(), handle);
        info!("Loaded world {}", name);
        handle
    }

    /// Unloads a world along with every entity in it.
    pub fn unload_world(&mut self, name: &str) -> bool {
        let Some(handle) = self.worlds.shift_remove(name) else {
            return false;
        };
        self.entities.retain(|_, marker| marker.world != handle);
        info!("Unloaded world {}", name);
        true
    }

    pub fn world_name(&self, world: WorldHandle) -> Option<&str> {
        self.worlds
            .iter()
            .find(|(_, handle)| **handle == world)
            .map(|(name, _)| name.as_str())
    }

    pub fn connect(
        &mut self,
        name: &str,
        position: Position,
        permissions: PermissionSet,
    ) -> SessionHandle {
        let session = SessionHandle(self.next_session);
        self.next_session += 1;
        let played_before = !self.known_players.insert(name.to_string());
        self.sessions.insert(
            session,
            SessionState {
                name: name.to_string(),
                position,
                permissions,
                played_before,
                header: None,
                footer: None,
                messages: Vec::new(),
            },
        );
        session
    }

    pub fn disconnect(&mut self, session: SessionHandle) -> Option<SessionState> {
        self.sessions.shift_remove(&session)
    }

    pub fn session(&self, session: SessionHandle) -> Option<&SessionState> {
        self.sessions.get(&session)
    }

    /// Drains the messages delivered to `session`, as plain text.
    pub fn take_messages(&mut self, session: SessionHandle) -> Vec<String> {
        self.sessions
            .get_mut(&session)
            .map(|state| {
                state
                    .messages
                    .drain(..)
                    .map(|message| message.to_plain_text())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn broadcasts(&self) -> &[TextComponent] {
        &self.broadcasts
    }

    pub fn markers(&self) -> impl Iterator<Item = (EntityHandle, &Marker)> {
        self.entities.iter().map(|(handle, marker)| (*handle, marker))
    }

    pub fn marker(&self, entity: EntityHandle) -> Option<&Marker> {
        self.entities.get(&entity)
    }

    /// Removes an entity behind the plugin's back, like a `/kill` would.
    pub fn kill(&mut self, entity: EntityHandle) -> bool {
        self.entities.remove(&entity).is_some()
    }
}

impl WorldHost for HeadlessHost {
    fn resolve_world(&self, name: &str) -> Option<WorldHandle> {
        self.worlds.get(name).copied()
    }

    fn spawn_marker(&mut self, world: WorldHandle, spec: &MarkerSpec) -> EntityHandle {
        let entity = EntityHandle(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(
            entity,
            Marker {
                world,
                x: spec.x,
                y: spec.y,
                z: spec.z,
                label: spec.label.clone(),
                flags: spec.flags,
                tags: FxHashMap::default(),
            },
        );
        debug!(
            "Spawned marker {:?} at ({}, {}, {}) named {}",
            entity,
            spec.x,
            spec.y,
            spec.z,
            spec.label.encode_json()
        );
        entity
    }

    fn tag_entity(&mut self, entity: EntityHandle, key: &str, value: &str) {
        if let Some(marker) = self.entities.get_mut(&entity) {
            marker.tags.insert(key.to_string(), value.to_string());
        }
    }

    fn entity_tag(&self, entity: EntityHandle, key: &str) -> Option<String> {
        self.entities.get(&entity)?.tags.get(key).cloned()
    }

    fn despawn_entity(&mut self, entity: EntityHandle) {
        if self.entities.remove(&entity).is_some() {
            debug!("Despawned marker {:?}", entity);
        }
    }

    fn is_live(&self, entity: EntityHandle) -> bool {
        self.entities.contains_key(&entity)
    }
}

impl SessionHost for HeadlessHost {
    fn online_sessions(&self) -> Vec<SessionHandle> {
        self.sessions.keys().copied().collect()
    }

    fn session_name(&self, session: SessionHandle) -> Option<String> {
        self.sessions.get(&session).map(|state| state.name.clone())
    }

    fn session_position(&self, session: SessionHandle) -> Option<Position> {
        self.sessions.get(&session).map(|state| state.position.clone())
    }

    fn teleport(&mut self, session: SessionHandle, position: &Position) {
        if let Some(state) = self.sessions.get_mut(&session) {
            state.position = position.clone();
        }
    }

    fn has_permission(&self, session: SessionHandle, node: &str) -> bool {
        self.sessions
            .get(&session)
            .is_some_and(|state| state.permissions.has(node))
    }

    fn has_played_before(&self, session: SessionHandle) -> bool {
        self.sessions
            .get(&session)
            .is_some_and(|state| state.played_before)
    }

    fn send_message(&mut self, session: SessionHandle, message: TextComponent) {
        if let Some(state) = self.sessions.get_mut(&session) {
            debug!("[-> {}] {}", state.name, message.to_plain_text());
            state.messages.push(message);
        }
    }

    fn broadcast_message(&mut self, message: TextComponent) {
        info!("[Broadcast] {}", message.to_plain_text());
        for state in self.sessions.values_mut() {
            state.messages.push(message.clone());
        }
        self.broadcasts.push(message);
    }

    fn set_header_footer(
        &mut self,
        session: SessionHandle,
        header: &TextComponent,
        footer: &TextComponent,
    ) {
        if let Some(state) = self.sessions.get_mut(&session) {
            state.header = Some(header.clone());
            state.footer = Some(footer.clone());
        }
    }
}
