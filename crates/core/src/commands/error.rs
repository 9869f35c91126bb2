use crate::hologram::HologramError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Permission denied: {permission}")]
    PermissionDenied { permission: String },
    #[error("This command can only be used by players.")]
    PlayerOnly,
    #[error(transparent)]
    Hologram(#[from] HologramError),
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error(
        "Internal error: Argument '{name}' not found in ArgumentSet (command registration bug)"
    )]
    MissingArgument { name: String },
    #[error("Internal error: Argument '{name}' has wrong type, expected {expected} (command registration bug)")]
    WrongArgumentType { name: String, expected: String },
    #[error("Internal error: Session {session} has no position (host state bug)")]
    MissingSessionPosition { session: u128 },
    #[error("Internal error (bug): {message}")]
    Message { message: String },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CommandError {
    pub fn internal(message: impl Into<String>) -> Self {
        CommandError::Internal(InternalError::Message {
            message: message.into(),
        })
    }
}

impl From<HologramError> for CommandError {
    fn from(err: HologramError) -> Self {
        CommandError::Runtime(err.into())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

pub(crate) trait UnwrapRuntimeError<T> {
    fn unwrap_runtime(self) -> Result<T, InternalError>;
}

impl<T> UnwrapRuntimeError<T> for CommandResult<T> {
    fn unwrap_runtime(self) -> Result<T, InternalError> {
        self.map_err(|err| match err {
            CommandError::Runtime(err) => InternalError::Message {
                message: format!("Runtime Error: {}", err),
            },
            CommandError::Internal(err) => err,
        })
    }
}
