//! Periodic refresh of the player list header and footer.

use crate::config::TabListConfig;
use crate::host::SessionHost;
use frostgui_text::TextComponent;
use tracing::debug;

pub const TICKS_PER_SECOND: u64 = 20;

/// Ticks between starting the task and its first scheduled refresh.
const START_DELAY: u64 = 20;

pub fn header_footer(config: &TabListConfig) -> (TextComponent, TextComponent) {
    (
        TextComponent::legacy(&config.header),
        TextComponent::legacy(&config.footer),
    )
}

/// Sets the header and footer for everyone online. Does nothing while the
/// tab list is disabled.
pub fn refresh<S: SessionHost + ?Sized>(host: &mut S, config: &TabListConfig) {
    if !config.enabled {
        return;
    }
    let (header, footer) = header_footer(config);
    let sessions = host.online_sessions();
    debug!("Refreshing tab list for {} players", sessions.len());
    for session in sessions {
        host.set_header_footer(session, &header, &footer);
    }
}

/// Counts game ticks and refreshes the tab list every `update-interval`
/// seconds.
#[derive(Debug)]
pub struct TabListTask {
    period: u64,
    countdown: u64,
}

impl TabListTask {
    /// Refreshes once right away and schedules the rest.
    pub fn start<S: SessionHost + ?Sized>(host: &mut S, config: &TabListConfig) -> TabListTask {
        refresh(host, config);
        let seconds = u64::try_from(config.update_interval).unwrap_or(0);
        TabListTask {
            period: seconds.saturating_mul(TICKS_PER_SECOND).max(1),
            countdown: START_DELAY,
        }
    }

    /// Ticks between two refreshes.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Advances one tick. Returns whether a refresh ran.
    pub fn tick<S: SessionHost + ?Sized>(&mut self, host: &mut S, config: &TabListConfig) -> bool {
        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }
        self.countdown = self.period;
        refresh(host, config);
        true
    }
}
