use crate::commands::{
    argument_set::ArgumentSet,
    context::{CommandTarget, ExecutionContext},
    error::{CommandError, CommandResult, InternalError, RuntimeError, UnwrapRuntimeError},
    node::CommandNode,
    parser::{self, ParseResult},
    registry::CommandRegistry,
    usage, CommandSender,
};
use tracing::debug;

impl CommandRegistry {
    /// Runs one command line, with or without its leading `/`. User mistakes
    /// are reported to the sender; only bugs come back as errors.
    pub fn execute(
        &self,
        target: CommandTarget<'_>,
        sender: CommandSender,
        command_line: &str,
    ) -> Result<(), InternalError> {
        let command_line = command_line.trim();
        let command_line = command_line.strip_prefix('/').unwrap_or(command_line);
        if command_line.is_empty() {
            return Ok(());
        }

        let parse_result = parser::parse(self.get_root(), command_line);

        match parse_result {
            ParseResult::Success {
                node,
                arguments,
                path,
            } => {
                let mut ctx = ExecutionContext::new(target, sender, ArgumentSet::new(arguments));
                match Self::execute_impl(&mut ctx, node, &path) {
                    Ok(()) => Ok(()),
                    Err(CommandError::Runtime(RuntimeError::PermissionDenied { permission })) => {
                        debug!("{:?} lacks permission {}", sender, permission);
                        let message = ctx.config.messages.no_permission.clone();
                        ctx.reply_prefixed(&message).unwrap_runtime()?;
                        Ok(())
                    }
                    Err(CommandError::Runtime(err)) => {
                        ctx.error(&err.to_string()).unwrap_runtime()?;
                        Ok(())
                    }
                    Err(CommandError::Internal(err)) => Err(err),
                }
            }

            ParseResult::Partial { path, .. } => {
                Self::handle_parse_error(target, sender, &path, "Not enough arguments")
            }
            ParseResult::TooManyArguments {
                path, remaining, ..
            } => {
                let message = format!("Too many arguments: {remaining}");
                Self::handle_parse_error(target, sender, &path, &message)
            }
            ParseResult::InvalidArgument {
                path, remaining, ..
            } => {
                let message = format!("Invalid argument: {remaining}");
                Self::handle_parse_error(target, sender, &path, &message)
            }

            ParseResult::NothingMatched { .. } => {
                let mut ctx = ExecutionContext::new(target, sender, ArgumentSet::empty());
                ctx.error("Command not found!").unwrap_runtime()?;
                Ok(())
            }
        }
    }

    fn execute_impl(
        ctx: &mut ExecutionContext<'_>,
        node: &CommandNode,
        path: &[&CommandNode],
    ) -> CommandResult<()> {
        let Some(executor) = node.executor else {
            return Err(CommandError::internal(
                "Node must have executor to be parsed successfully",
            ));
        };

        for node in path {
            for permission in &node.permissions {
                ctx.require_permission(permission)?;
            }
        }

        executor(ctx)
    }

    /// Reports a malformed command. Senders lacking a permission on the
    /// matched path get the no-permission message instead of the usage.
    fn handle_parse_error(
        target: CommandTarget<'_>,
        sender: CommandSender,
        path: &[&CommandNode],
        error_message: &str,
    ) -> Result<(), InternalError> {
        let mut ctx = ExecutionContext::new(target, sender, ArgumentSet::empty());

        let permitted = path
            .iter()
            .flat_map(|node| &node.permissions)
            .all(|permission| ctx.has_permission(permission));
        if !permitted {
            let message = ctx.config.messages.no_permission.clone();
            return ctx.reply_prefixed(&message).unwrap_runtime();
        }

        ctx.error(error_message).unwrap_runtime()?;

        let usage = usage::generate_usage(path);
        ctx.reply_legacy(&format!("&6Usage: &e{}", usage))
            .unwrap_runtime()?;

        Ok(())
    }
}
