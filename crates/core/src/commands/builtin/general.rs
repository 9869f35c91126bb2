use crate::commands::error::CommandResult;
use crate::commands::{context::ExecutionContext, node::CommandNode, registry::CommandRegistry};
use crate::permissions;
use crate::plugin::Message;

static SUPPORT_MESSAGE: &str = "&b&l[FrostGUI Support] &aJoin Frostline's discord for plugin support! &b&nhttps://discord.gg/FGUEEj6k7k";

fn exec_about(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    ctx.reply_legacy(&format!("&b⚡ FrostGUI &7v{}", env!("CARGO_PKG_VERSION")))?;
    ctx.reply_legacy("&7A customizable welcome message plugin")?;
    if ctx.has_permission(permissions::ADMIN) {
        ctx.reply_legacy("&7Use /frostgui reload to reload the configuration")?;
    }
    Ok(())
}

fn exec_discord(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let discord = &ctx.config.discord;
    if !discord.enabled {
        return ctx.reply_prefixed("&cThe Discord feature is currently disabled.");
    }
    let message = discord.message.replace("{link}", &discord.link);
    ctx.reply_prefixed(&message)
}

pub(super) fn register_commands(registry: &mut CommandRegistry) {
    registry.register(
        CommandNode::literal("frostgui").executes(exec_about).then(
            CommandNode::literal("reload")
                .require_permission(permissions::ADMIN)
                .executes(|ctx| {
                    // The reply comes from the plugin once the reload has run
                    let sender = ctx.sender();
                    ctx.send_message(Message::Reload(sender));
                    Ok(())
                }),
        ),
    );

    registry.register(CommandNode::literal("discord").executes(exec_discord));

    registry.register(
        CommandNode::literal("support")
            .require_permission(permissions::ADMIN)
            .executes(|ctx| ctx.reply_legacy(SUPPORT_MESSAGE)),
    );
}
