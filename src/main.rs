use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use frostgui_core::commands::CommandSender;
use frostgui_core::host::{HeadlessHost, Position};
use frostgui_core::permissions::PermissionSet;
use frostgui_core::welcome::JoinMessage;
use frostgui_core::FrostGui;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(50);

/// Runs FrostGUI on a headless server driven from the console.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding config.toml and holograms.yml.
    #[arg(long, default_value = "plugins/FrostGUI")]
    data_dir: PathBuf,

    /// World to load. Can be given more than once.
    #[arg(long = "world", default_value = "world")]
    worlds: Vec<String>,
}

enum Message {
    /// A line typed into the console.
    Console(String),
    /// Sent on ctrl-c.
    Shutdown,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    let logfile = tracing_appender::rolling::daily("./logs", "frostgui.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("FROSTGUI_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::new();
        error!("{}\n{:?}", panic_info, backtrace);
    }));

    let args = Args::parse();
    let host = HeadlessHost::with_worlds(args.worlds.iter().map(String::as_str));
    let mut plugin = FrostGui::enable(host, &args.data_dir)?;

    let (sender, receiver) = mpsc::channel();
    let ctrl_handler_sender = sender.clone();
    ctrlc::set_handler(move || {
        let _ = ctrl_handler_sender.send(Message::Shutdown);
    })
    .context("There was an error setting the ctrlc handler")?;

    thread::spawn(move || {
        for line in io::stdin().lines().map_while(Result::ok) {
            if sender.send(Message::Console(line)).is_err() {
                break;
            }
        }
    });

    let spawn_world = args.worlds.first().cloned().unwrap_or_default();
    info!("Console ready. Try `hologram list`, `join <name>` or `stop`");
    let mut next_tick = Instant::now();
    'running: loop {
        while let Ok(message) = receiver.try_recv() {
            match message {
                Message::Shutdown => break 'running,
                Message::Console(line) => {
                    if !handle_console_line(&mut plugin, &spawn_world, line.trim()) {
                        break 'running;
                    }
                }
            }
        }

        plugin.tick();

        next_tick += TICK;
        match next_tick.checked_duration_since(Instant::now()) {
            Some(wait) => thread::sleep(wait),
            None => next_tick = Instant::now(),
        }
    }

    info!("Stopping...");
    plugin.disable();
    Ok(())
}

/// Returns false once the server should stop.
fn handle_console_line(plugin: &mut FrostGui<HeadlessHost>, spawn_world: &str, line: &str) -> bool {
    if line == "stop" {
        return false;
    }

    if let Some(name) = line.strip_prefix("join ") {
        let session = plugin.host_mut().connect(
            name.trim(),
            Position::new(spawn_world, 0.5, 64.0, 0.5),
            PermissionSet::new(),
        );
        match plugin.handle_player_join(session) {
            JoinMessage::Custom(message) => info!("{}", message.to_plain_text()),
            JoinMessage::Default => info!("{} joined the game", name.trim()),
            JoinMessage::Suppressed => {}
        }
        return true;
    }

    // Already logged by the plugin
    let _ = plugin.dispatch_command(CommandSender::Console, line);
    true
}
