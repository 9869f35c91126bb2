use super::storage::{HologramRecord, HologramStore};
use super::{Hologram, HologramError, HologramSnapshot};
use crate::host::{Position, WorldHost};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Every hologram known to the plugin, keyed by id, backed by
/// `holograms.yml`. Each mutation is written to disk before returning.
///
/// A failed write is logged and otherwise ignored: the in-memory state stays
/// authoritative and the next successful write brings the file back in line.
pub struct HologramManager {
    holograms: FxHashMap<String, Hologram>,
    store: HologramStore,
    line_spacing: f64,
}

impl HologramManager {
    /// Loads the store at `path`. Records whose world isn't loaded are
    /// skipped but kept in the file.
    pub fn load<W: WorldHost + ?Sized>(
        path: impl Into<PathBuf>,
        world: &W,
        line_spacing: f64,
    ) -> HologramManager {
        let path = path.into();
        let store = match HologramStore::open(&path) {
            Ok(store) => store,
            Err(err) => {
                error!("Could not load {}: {}", path.display(), err);
                set_aside(path)
            }
        };

        let mut holograms = FxHashMap::default();
        for (id, record) in store.records() {
            if world.resolve_world(&record.world).is_none() {
                warn!(
                    "Skipping hologram '{}' as world '{}' is not loaded",
                    id, record.world
                );
                continue;
            }
            let hologram = Hologram::new(id, record.position(), record.lines.clone())
                .with_line_spacing(line_spacing);
            holograms.insert(id.to_string(), hologram);
        }
        info!("Loaded {} holograms", holograms.len());

        HologramManager {
            holograms,
            store,
            line_spacing,
        }
    }

    /// Registers a new, hidden hologram. Showing it is up to the caller.
    pub fn create(
        &mut self,
        id: &str,
        position: Position,
        lines: Vec<String>,
    ) -> Result<&mut Hologram, HologramError> {
        if self.holograms.contains_key(id) {
            return Err(HologramError::AlreadyExists(id.to_string()));
        }

        let hologram = Hologram::new(id, position, lines).with_line_spacing(self.line_spacing);
        self.store.put(id, HologramRecord::from(&hologram));
        self.flush();
        info!("Created hologram '{}'", id);
        Ok(self.holograms.entry(id.to_string()).or_insert(hologram))
    }

    pub fn get(&self, id: &str) -> Option<&Hologram> {
        self.holograms.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.holograms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.holograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holograms.is_empty()
    }

    pub fn line_spacing(&self) -> f64 {
        self.line_spacing
    }

    /// Despawns and forgets a hologram. Returns false if there was none.
    pub fn remove<W: WorldHost + ?Sized>(&mut self, world: &mut W, id: &str) -> bool {
        let Some(mut hologram) = self.holograms.remove(id) else {
            return false;
        };
        hologram.remove(world);
        self.store.delete(id);
        self.flush();
        info!("Removed hologram '{}'", id);
        true
    }

    pub fn list_all(&self) -> BTreeMap<String, HologramSnapshot> {
        self.holograms
            .iter()
            .map(|(id, hologram)| (id.clone(), hologram.snapshot()))
            .collect()
    }

    /// Sorted ids.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.holograms.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn show<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.show(world)
    }

    /// Shows every hologram. One failing doesn't stop the rest.
    pub fn show_all<W: WorldHost + ?Sized>(&mut self, world: &mut W) {
        for hologram in self.holograms.values_mut() {
            if let Err(err) = hologram.show(world) {
                warn!("Could not show hologram '{}': {}", hologram.id(), err);
            }
        }
    }

    pub fn remove_all<W: WorldHost + ?Sized>(&mut self, world: &mut W) {
        for hologram in self.holograms.values_mut() {
            hologram.remove(world);
        }
    }

    pub fn add_line<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
        text: impl Into<String>,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.add_line(world, text);
        self.persist(id);
        Ok(())
    }

    /// `index` is zero-based.
    pub fn remove_line<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
        index: usize,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.remove_line(world, index)?;
        self.persist(id);
        Ok(())
    }

    /// `index` is zero-based.
    pub fn set_line<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.set_line(world, index, text)?;
        self.persist(id);
        Ok(())
    }

    pub fn update_lines<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
        lines: Vec<String>,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.update_lines(world, lines);
        self.persist(id);
        Ok(())
    }

    pub fn move_to<W: WorldHost + ?Sized>(
        &mut self,
        world: &mut W,
        id: &str,
        position: Position,
    ) -> Result<(), HologramError> {
        self.get_mut(id)?.update_location(world, position);
        self.persist(id);
        Ok(())
    }

    /// Applies a new line spacing to every hologram, re-rendering the
    /// visible ones.
    pub fn set_line_spacing<W: WorldHost + ?Sized>(&mut self, world: &mut W, line_spacing: f64) {
        self.line_spacing = line_spacing;
        for hologram in self.holograms.values_mut() {
            hologram.set_line_spacing(world, line_spacing);
        }
    }

    /// Rewrites the whole store from memory. Records that never parsed are
    /// the only ones kept from the old file.
    pub fn save_all(&mut self) {
        self.store.clear_readable();
        let mut ids: Vec<&String> = self.holograms.keys().collect();
        ids.sort();
        for id in ids {
            self.store
                .put(id, HologramRecord::from(&self.holograms[id]));
        }
        self.flush();
    }

    /// Despawns everything, writes a final checkpoint and empties the
    /// registry.
    pub fn shutdown<W: WorldHost + ?Sized>(&mut self, world: &mut W) {
        self.remove_all(world);
        self.save_all();
        self.holograms.clear();
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Hologram, HologramError> {
        self.holograms
            .get_mut(id)
            .ok_or_else(|| HologramError::NotFound(id.to_string()))
    }

    fn persist(&mut self, id: &str) {
        if let Some(hologram) = self.holograms.get(id) {
            self.store.put(id, HologramRecord::from(hologram));
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.store.save() {
            error!("Could not save {}: {}", self.store.path().display(), err);
        }
    }
}

/// Moves an unreadable store out of the way so the next write can't destroy
/// it. If that fails too, nothing gets written at all.
fn set_aside(path: PathBuf) -> HologramStore {
    let mut backup = path.clone().into_os_string();
    backup.push(".broken");
    let backup = PathBuf::from(backup);
    match fs::rename(&path, &backup) {
        Ok(()) => {
            warn!(
                "Moved {} to {}, starting without holograms",
                path.display(),
                backup.display()
            );
            HologramStore::empty(path)
        }
        Err(err) => {
            error!(
                "Could not move {} aside ({}), hologram changes won't be saved",
                path.display(),
                err
            );
            HologramStore::read_only(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn spawn(x: f64, y: f64, z: f64) -> Position {
        Position::new("spawn", x, y, z)
    }

    #[test]
    fn create_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(dir.path().join("holograms.yml"), &host, 0.25);

        let created = manager
            .create("welcome", spawn(1.0, 2.0, 3.0), lines(&["Hello", "World"]))
            .unwrap();
        assert!(!created.is_visible());

        let hologram = manager.get("welcome").unwrap();
        assert_eq!(hologram.lines(), ["Hello", "World"]);
        assert_eq!(hologram.position(), &spawn(1.0, 2.0, 3.0));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(dir.path().join("holograms.yml"), &host, 0.25);
        manager
            .create("a", spawn(0.0, 0.0, 0.0), lines(&["first"]))
            .unwrap();

        let err = manager
            .create("a", spawn(9.0, 9.0, 9.0), lines(&["second"]))
            .unwrap_err();
        assert_eq!(err, HologramError::AlreadyExists("a".into()));
        assert_eq!(manager.get("a").unwrap().lines(), ["first"]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn remove_despawns_and_deletes_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        manager
            .create("a", spawn(0.0, 0.0, 0.0), lines(&["x", "y"]))
            .unwrap();
        manager.show(&mut host, "a").unwrap();
        assert_eq!(host.markers().count(), 2);

        assert!(manager.remove(&mut host, "a"));
        assert!(!manager.remove(&mut host, "a"));
        assert_eq!(host.markers().count(), 0);
        assert!(HologramStore::open(&path).unwrap().get("a").is_none());
    }

    #[test]
    fn mutations_are_saved_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        manager
            .create("a", spawn(0.0, 0.0, 0.0), lines(&["one"]))
            .unwrap();

        manager.add_line(&mut host, "a", "two").unwrap();
        manager.set_line(&mut host, "a", 0, "uno").unwrap();
        manager.move_to(&mut host, "a", spawn(4.0, 5.0, 6.0)).unwrap();

        let record = HologramStore::open(&path).unwrap().get("a").cloned().unwrap();
        assert_eq!(record.lines, ["uno", "two"]);
        assert_eq!(record.position(), spawn(4.0, 5.0, 6.0));

        assert_eq!(
            manager.remove_line(&mut host, "a", 5),
            Err(HologramError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            manager.add_line(&mut host, "missing", "x"),
            Err(HologramError::NotFound("missing".into()))
        );
    }

    #[test]
    fn spacing_and_replaced_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        manager.create("a", spawn(0.0, 10.0, 0.0), lines(&["x"])).unwrap();
        manager.show(&mut host, "a").unwrap();

        manager
            .update_lines(&mut host, "a", lines(&["one", "two"]))
            .unwrap();
        manager.set_line_spacing(&mut host, 1.0);
        assert_eq!(manager.line_spacing(), 1.0);

        let mut ys: Vec<f64> = host.markers().map(|(_, marker)| marker.y).collect();
        ys.sort_by(f64::total_cmp);
        assert_eq!(ys, [9.0, 10.0]);
        assert_eq!(
            HologramStore::open(&path).unwrap().get("a").unwrap().lines,
            ["one", "two"]
        );
        manager.remove_all(&mut host);
    }

    #[test]
    fn list_all_is_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(dir.path().join("holograms.yml"), &host, 0.25);
        manager.create("b", spawn(0.0, 0.0, 0.0), lines(&["b"])).unwrap();
        manager.create("a", spawn(0.0, 0.0, 0.0), lines(&["a"])).unwrap();

        let mut listed = manager.list_all();
        assert_eq!(listed.keys().collect::<Vec<_>>(), ["a", "b"]);
        listed.remove("a");
        listed.get_mut("b").unwrap().lines.push("changed".into());
        assert!(manager.contains("a"));
        assert_eq!(manager.get("b").unwrap().lines(), ["b"]);
        assert_eq!(manager.ids(), ["a", "b"]);
    }

    #[test]
    fn load_skips_unloaded_worlds_and_keeps_their_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        fs::write(
            &path,
            "holograms:\n  here:\n    world: spawn\n    x: 0\n    y: 0\n    z: 0\n    lines: [a]\n  gone:\n    world: nether\n    x: 1\n    y: 2\n    z: 3\n    lines: [b]\n",
        )
        .unwrap();

        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        assert!(manager.contains("here"));
        assert!(!manager.contains("gone"));

        // Writes for other holograms leave the skipped record alone
        manager.create("new", spawn(0.0, 0.0, 0.0), lines(&["c"])).unwrap();
        manager.remove(&mut host, "here");
        let store = HologramStore::open(&path).unwrap();
        assert_eq!(store.get("gone").unwrap().lines, ["b"]);
        assert!(store.get("new").is_some());
    }

    #[test]
    fn bad_record_does_not_cost_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        fs::write(
            &path,
            "holograms:\n  good:\n    world: spawn\n    x: 1\n    y: 2\n    z: 3\n    lines: [kept]\n  bad:\n    world: spawn\n    x: oops\n    lines: [b]\n",
        )
        .unwrap();

        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        assert!(manager.contains("good"));
        assert!(!manager.contains("bad"));

        manager.create("new", spawn(0.0, 0.0, 0.0), lines(&["x"])).unwrap();
        let file = fs::read_to_string(&path).unwrap();
        assert!(file.contains("good:"));
        assert!(file.contains("oops"));
        assert_eq!(
            HologramStore::open(&path).unwrap().get("good").unwrap().lines,
            ["kept"]
        );

        manager.shutdown(&mut host);
        let store = HologramStore::open(&path).unwrap();
        assert!(store.contains("bad"));
        assert!(store.get("good").is_some());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn save_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        let mut host = HeadlessHost::with_worlds(["spawn", "nether"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        manager
            .create("a", spawn(1.0, 2.0, 3.0), lines(&["&ahello", "world"]))
            .unwrap();
        manager
            .create("b", Position::new("nether", 0.5, 0.0, -0.5), Vec::new())
            .unwrap();
        manager.show_all(&mut host);
        manager.shutdown(&mut host);
        assert!(manager.is_empty());
        assert_eq!(host.markers().count(), 0);

        let reloaded = HologramManager::load(&path, &host, 0.25);
        assert_eq!(reloaded.len(), 2);
        let a = reloaded.get("a").unwrap();
        assert_eq!(a.lines(), ["&ahello", "world"]);
        assert_eq!(a.position(), &spawn(1.0, 2.0, 3.0));
        assert!(reloaded.get("b").unwrap().lines().is_empty());
    }

    #[test]
    fn show_all_keeps_going_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = HeadlessHost::with_worlds(["spawn", "nether"]);
        let mut manager = HologramManager::load(dir.path().join("holograms.yml"), &host, 0.25);
        manager.create("a", spawn(0.0, 0.0, 0.0), lines(&["a"])).unwrap();
        manager
            .create("b", Position::new("nether", 0.0, 0.0, 0.0), lines(&["b"]))
            .unwrap();
        host.unload_world("nether");

        manager.show_all(&mut host);
        assert!(manager.get("a").unwrap().is_visible());
        assert!(!manager.get("b").unwrap().is_visible());
        manager.remove_all(&mut host);
    }

    #[test]
    fn unreadable_store_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        fs::write(&path, "holograms: [broken").unwrap();
        let host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);
        assert!(manager.is_empty());

        manager.create("a", spawn(0.0, 0.0, 0.0), lines(&["a"])).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("holograms.yml.broken")).unwrap(),
            "holograms: [broken"
        );
        assert!(HologramStore::open(&path).unwrap().get("a").is_some());
    }

    #[test]
    fn write_failure_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holograms.yml");
        let mut host = HeadlessHost::with_worlds(["spawn"]);
        let mut manager = HologramManager::load(&path, &host, 0.25);

        // A directory in the way makes every write fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        manager.create("a", spawn(0.0, 0.0, 0.0), lines(&["one"])).unwrap();
        manager.add_line(&mut host, "a", "two").unwrap();
        manager.create("b", spawn(0.0, 0.0, 0.0), lines(&["b"])).unwrap();
        assert!(manager.remove(&mut host, "b"));
        assert_eq!(manager.get("a").unwrap().lines(), ["one", "two"]);
        assert!(!manager.contains("b"));
        assert!(path.is_dir());

        fs::remove_dir(&path).unwrap();
        manager.save_all();
        let store = HologramStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap().lines, ["one", "two"]);
        assert!(!store.contains("b"));
    }
}
