#![allow(dead_code)]

use frostgui_core::commands::CommandSender;
use frostgui_core::host::{HeadlessHost, Position, SessionHandle};
use frostgui_core::permissions::{self, PermissionSet};
use frostgui_core::{FrostGui, CONFIG_FILE, HOLOGRAMS_FILE};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const WORLDS: [&str; 2] = ["world", "world_nether"];

/// A plugin running on a headless host, with its data directory in a temp
/// dir. The plugin is dropped (and so disabled) before the directory goes.
pub struct TestServer {
    pub plugin: FrostGui<HeadlessHost>,
    pub dir: TempDir,
}

impl TestServer {
    pub fn new() -> TestServer {
        TestServer::with_files(None, None)
    }

    pub fn with_files(config: Option<&str>, holograms: Option<&str>) -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        if let Some(config) = config {
            fs::write(dir.path().join(CONFIG_FILE), config).unwrap();
        }
        if let Some(holograms) = holograms {
            fs::write(dir.path().join(HOLOGRAMS_FILE), holograms).unwrap();
        }
        TestServer::start(dir, &WORLDS)
    }

    fn start(dir: TempDir, worlds: &[&str]) -> TestServer {
        let host = HeadlessHost::with_worlds(worlds.iter().copied());
        let plugin = FrostGui::enable(host, dir.path()).unwrap();
        TestServer { plugin, dir }
    }

    /// Disables the plugin and enables a fresh one on the same data
    /// directory, with only `worlds` loaded.
    pub fn restart_with_worlds(self, worlds: &[&str]) -> TestServer {
        let TestServer { plugin, dir } = self;
        drop(plugin);
        TestServer::start(dir, worlds)
    }

    pub fn restart(self) -> TestServer {
        self.restart_with_worlds(&WORLDS)
    }

    pub fn host(&self) -> &HeadlessHost {
        self.plugin.host()
    }

    pub fn holograms_path(&self) -> PathBuf {
        self.dir.path().join(HOLOGRAMS_FILE)
    }

    pub fn holograms_file(&self) -> String {
        fs::read_to_string(self.holograms_path()).unwrap()
    }

    pub fn write_config(&self, config: &str) {
        fs::write(self.dir.path().join(CONFIG_FILE), config).unwrap();
    }

    pub fn connect(&mut self, name: &str, position: Position, permissions: PermissionSet) -> SessionHandle {
        self.plugin.host_mut().connect(name, position, permissions)
    }

    /// A player allowed to use `/hologram`, standing in `world`.
    pub fn builder(&mut self, name: &str) -> SessionHandle {
        let mut granted = PermissionSet::new();
        granted.grant(permissions::HOLOGRAM);
        self.connect(name, Position::new("world", 10.4, 65.0, -3.6), granted)
    }

    pub fn admin(&mut self, name: &str) -> SessionHandle {
        self.connect(name, Position::new("world", 0.0, 64.0, 0.0), PermissionSet::all())
    }

    pub fn guest(&mut self, name: &str) -> SessionHandle {
        self.connect(name, Position::new("world", 0.0, 64.0, 0.0), PermissionSet::new())
    }

    /// Runs a command as `session` and returns what it was told.
    pub fn run(&mut self, session: SessionHandle, command: &str) -> Vec<String> {
        self.plugin
            .dispatch_command(CommandSender::Player(session), command)
            .unwrap();
        self.plugin.host_mut().take_messages(session)
    }

    pub fn complete(&self, session: SessionHandle, line: &str) -> Vec<String> {
        self.plugin.complete(CommandSender::Player(session), line)
    }

    /// Labels of the markers currently spawned for hologram `id`, top first.
    pub fn labels(&self, id: &str) -> Vec<String> {
        let hologram = self.plugin.holograms().get(id).unwrap();
        hologram
            .markers()
            .iter()
            .map(|marker| self.host().marker(*marker).unwrap().label.to_plain_text())
            .collect()
    }
}
