mod general;
mod hologram;

use crate::commands::registry::CommandRegistry;

pub fn register_commands(registry: &mut CommandRegistry) {
    hologram::register_commands(registry);
    general::register_commands(registry);
}
