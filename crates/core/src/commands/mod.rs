mod argument;
mod argument_parser;
mod argument_set;
mod autocomplete;
mod builtin;
mod context;
mod error;
mod executor;
mod node;
mod parser;
mod registry;
mod usage;
mod value;

pub use context::CommandTarget;
pub use error::{CommandError, InternalError, RuntimeError};
pub use registry::CommandRegistry;

use crate::host::SessionHandle;
use once_cell::sync::Lazy;

pub static COMMAND_REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| {
    let mut registry = CommandRegistry::new();
    builtin::register_commands(&mut registry);
    registry
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSender {
    Player(SessionHandle),
    Console,
}
