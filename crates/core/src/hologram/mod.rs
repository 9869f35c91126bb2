//! Floating multi-line text built from invisible marker entities.

mod manager;
pub mod storage;

pub use manager::HologramManager;

use crate::host::{EntityHandle, MarkerFlags, MarkerSpec, Position, WorldHost};
use frostgui_text::TextComponent;
use thiserror::Error;
use tracing::{debug, warn};

/// Tag key put on every marker entity, valued with the owning hologram id.
pub const HOLOGRAM_TAG: &str = "frostgui_hologram";

pub const DEFAULT_LINE_SPACING: f64 = 0.25;

#[derive(Debug, Error, PartialEq)]
pub enum HologramError {
    #[error("No hologram found with ID '{0}'.")]
    NotFound(String),
    #[error("A hologram with ID '{0}' already exists.")]
    AlreadyExists(String),
    #[error("Invalid line index. The hologram has {len} lines (1-{len}).")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("World '{0}' is not loaded")]
    WorldUnavailable(String),
}

/// A plain copy of a hologram's state, detached from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct HologramSnapshot {
    pub id: String,
    pub position: Position,
    pub lines: Vec<String>,
    pub visible: bool,
}

/// A named stack of text lines anchored at a position. Line 0 is at the
/// anchor, each following line `line_spacing` lower.
///
/// While visible the hologram owns exactly one marker per line. Any change to
/// the lines or the position while visible despawns every marker and spawns
/// them again.
#[derive(Debug)]
pub struct Hologram {
    id: String,
    position: Position,
    lines: Vec<String>,
    markers: Vec<EntityHandle>,
    visible: bool,
    line_spacing: f64,
}

impl Hologram {
    pub fn new(id: impl Into<String>, position: Position, lines: Vec<String>) -> Hologram {
        Hologram {
            id: id.into(),
            position,
            lines,
            markers: Vec::new(),
            visible: false,
            line_spacing: DEFAULT_LINE_SPACING,
        }
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Hologram {
        self.line_spacing = line_spacing;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn markers(&self) -> &[EntityHandle] {
        &self.markers
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn line_spacing(&self) -> f64 {
        self.line_spacing
    }

    pub fn snapshot(&self) -> HologramSnapshot {
        HologramSnapshot {
            id: self.id.clone(),
            position: self.position.clone(),
            lines: self.lines.clone(),
            visible: self.visible,
        }
    }

    /// Spawns one marker per line. Does nothing if already visible.
    pub fn show<W: WorldHost + ?Sized>(&mut self, world: &mut W) -> Result<(), HologramError> {
        if self.visible {
            return Ok(());
        }

        // Stale markers from an interrupted render
        self.remove(world);

        let Some(world_handle) = world.resolve_world(&self.position.world) else {
            return Err(HologramError::WorldUnavailable(self.position.world.clone()));
        };

        for (i, line) in self.lines.iter().enumerate() {
            let spec = MarkerSpec {
                x: self.position.x,
                y: self.position.y - i as f64 * self.line_spacing,
                z: self.position.z,
                label: TextComponent::legacy(line),
                flags: MarkerFlags::all(),
            };
            let entity = world.spawn_marker(world_handle, &spec);
            world.tag_entity(entity, HOLOGRAM_TAG, &self.id);
            self.markers.push(entity);
        }

        debug!("Showing hologram '{}' ({} lines)", self.id, self.lines.len());
        self.visible = true;
        Ok(())
    }

    /// Despawns every marker that is still alive. Calling this on a hidden
    /// hologram does nothing.
    pub fn remove<W: WorldHost + ?Sized>(&mut self, world: &mut W) {
        for entity in self.markers.drain(..) {
            if world.is_live(entity) {
                world.despawn_entity(entity);
            }
        }
        self.visible = false;
    }

    pub fn update_lines<W: WorldHost + ?Sized>(&mut self, world: &mut W, lines: Vec<String>) {
        self.lines = lines;
        self.rerender(world);
    }

    pub fn update_location<W: WorldHost + ?Sized>(&mut self, world: &mut W, position: Position) {
        self.position = position;
        self.rerender(world);
    }

    pub fn add_line<W: WorldHost + ?Sized>(&mut self, world: &mut W, text: impl Into<String>) {
        self.lines.push(text.into());
        self.rerender(world);
    }

    /// Removes the zero-based line `index`. Out of range leaves the
    /// hologram untouched.
    pub fn remove_line<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        index: usize,
    ) -> Result<(), HologramError> {
        self.check_index(index)?;
        self.lines.remove(index);
        self.rerender(world);
        Ok(())
    }

    /// Replaces the zero-based line `index`.
    pub fn set_line<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), HologramError> {
        self.check_index(index)?;
        self.lines[index] = text.into();
        self.rerender(world);
        Ok(())
    }

    pub fn set_line_spacing<W: WorldHost + ?Sized>(&mut self, world: &mut W, line_spacing: f64) {
        if self.line_spacing != line_spacing {
            self.line_spacing = line_spacing;
            self.rerender(world);
        }
    }

    fn check_index(&self, index: usize) -> Result<(), HologramError> {
        if index >= self.lines.len() {
            return Err(HologramError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }

    fn rerender<W: WorldHost + ?Sized>(&mut self, world: &mut W) {
        if !self.visible {
            return;
        }
        self.remove(world);
        if let Err(err) = self.show(world) {
            warn!("Could not re-render hologram '{}': {}", self.id, err);
        }
    }
}

impl Drop for Hologram {
    fn drop(&mut self) {
        if !self.markers.is_empty() {
            warn!(
                "Hologram '{}' dropped with {} markers still spawned",
                self.id,
                self.markers.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    fn hologram(lines: &[&str]) -> Hologram {
        Hologram::new(
            "welcome",
            Position::new("spawn", 0.0, 64.0, 0.0),
            lines.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn marker_ys(host: &HeadlessHost, hologram: &Hologram) -> Vec<f64> {
        hologram
            .markers()
            .iter()
            .map(|m| host.marker(*m).unwrap().y)
            .collect()
    }

    #[test]
    fn show_spawns_one_marker_per_line() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["&aHello", "World"]);
        holo.show(&mut host).unwrap();

        assert!(holo.is_visible());
        assert_eq!(marker_ys(&host, &holo), vec![64.0, 63.75]);
        let first = host.marker(holo.markers()[0]).unwrap();
        assert_eq!(first.label.to_plain_text(), "Hello");
        assert_eq!(first.flags, MarkerFlags::all());
        assert_eq!(first.tags.get(HOLOGRAM_TAG).map(String::as_str), Some("welcome"));
        holo.remove(&mut host);
    }

    #[test]
    fn show_twice_spawns_once() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a", "b", "c"]);
        holo.show(&mut host).unwrap();
        holo.show(&mut host).unwrap();
        assert_eq!(holo.markers().len(), 3);
        assert_eq!(host.markers().count(), 3);
        holo.remove(&mut host);
    }

    #[test]
    fn remove_twice_is_fine() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a", "b"]);
        holo.show(&mut host).unwrap();
        holo.remove(&mut host);
        holo.remove(&mut host);
        assert!(!holo.is_visible());
        assert!(holo.markers().is_empty());
        assert_eq!(host.markers().count(), 0);
    }

    #[test]
    fn remove_tolerates_dead_markers() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a", "b"]);
        holo.show(&mut host).unwrap();
        assert!(host.kill(holo.markers()[0]));
        holo.remove(&mut host);
        assert_eq!(host.markers().count(), 0);
    }

    #[test]
    fn show_in_unloaded_world() {
        let mut host = HeadlessHost::with_worlds(["other"]);
        let mut holo = hologram(&["a"]);
        assert_eq!(
            holo.show(&mut host),
            Err(HologramError::WorldUnavailable("spawn".into()))
        );
        assert!(!holo.is_visible());
        assert_eq!(host.markers().count(), 0);
    }

    #[test]
    fn remove_line_out_of_range() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a", "b"]);
        assert_eq!(
            holo.remove_line(&mut host, 2),
            Err(HologramError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(holo.lines(), ["a", "b"]);
        holo.remove_line(&mut host, 0).unwrap();
        assert_eq!(holo.lines(), ["b"]);
    }

    #[test]
    fn mutations_rerender_visible_holograms() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a"]);
        holo.show(&mut host).unwrap();

        holo.add_line(&mut host, "b");
        assert_eq!(holo.markers().len(), 2);

        holo.update_location(&mut host, Position::new("spawn", 5.0, 70.0, 5.0));
        assert_eq!(marker_ys(&host, &holo), vec![70.0, 69.75]);

        holo.set_line_spacing(&mut host, 0.5);
        assert_eq!(marker_ys(&host, &holo), vec![70.0, 69.5]);

        holo.update_lines(&mut host, Vec::new());
        assert!(holo.is_visible());
        assert!(holo.markers().is_empty());
        assert_eq!(host.markers().count(), 0);
    }

    #[test]
    fn hidden_mutations_spawn_nothing() {
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut holo = hologram(&["a"]);
        holo.add_line(&mut host, "b");
        holo.set_line(&mut host, 1, "c").unwrap();
        assert_eq!(holo.lines(), ["a", "c"]);
        assert_eq!(host.markers().count(), 0);
    }
}
