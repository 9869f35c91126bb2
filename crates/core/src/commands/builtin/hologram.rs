use crate::commands::error::CommandResult;
use crate::commands::{
    argument::ArgumentType, context::ExecutionContext, node::CommandNode, registry::CommandRegistry,
};
use crate::hologram::HologramError;
use crate::permissions;
use frostgui_text::{ColorCode, TextComponentBuilder};
use tracing::warn;

static HELP: &[(&str, &str)] = &[
    ("/hologram create <id> <text>", "Create a new hologram"),
    ("/hologram remove <id>", "Remove a hologram"),
    ("/hologram list", "List all holograms"),
    ("/hologram tp <id>", "Teleport to a hologram"),
    ("/hologram addline <id> <text>", "Add a line to a hologram"),
    ("/hologram removeline <id> <line_number>", "Remove a line"),
    ("/hologram edit <id> <line_number> <new_text>", "Edit a line"),
    ("/hologram move <id>", "Move hologram to your location"),
    ("/hologram info <id>", "Show hologram information"),
];

fn exec_help(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    ctx.reply_legacy("&a=== Hologram Commands ===")?;
    for (usage, description) in HELP {
        ctx.reply_legacy(&format!("&b{} &7- {}", usage, description))?;
    }
    Ok(())
}

/// Turns a 1-based line number into an index into `id`'s lines.
fn line_index(ctx: &ExecutionContext<'_>, id: &str, line: i32) -> CommandResult<usize> {
    let hologram = ctx
        .holograms
        .get(id)
        .ok_or_else(|| HologramError::NotFound(id.to_string()))?;
    let len = hologram.lines().len();
    match usize::try_from(line) {
        Ok(line) if (1..=len).contains(&line) => Ok(line - 1),
        _ => Err(HologramError::IndexOutOfRange {
            index: line.max(0) as usize,
            len,
        }
        .into()),
    }
}

fn exec_create(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let text = ctx.args().get_greedy("text")?;
    let position = ctx.player_position()?;

    let hologram = ctx.holograms.create(&id, position, vec![text])?;
    if let Err(err) = hologram.show(&mut *ctx.host) {
        warn!("Created hologram '{}' but could not show it: {}", id, err);
    }
    ctx.reply_legacy(&format!("&aHologram '{}' created successfully.", id))
}

fn exec_remove(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    if !ctx.holograms.remove(&mut *ctx.host, &id) {
        return Err(HologramError::NotFound(id).into());
    }
    ctx.reply_legacy(&format!("&aHologram '{}' removed successfully.", id))
}

fn exec_list(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let holograms = ctx.holograms.list_all();
    if holograms.is_empty() {
        return ctx.reply_legacy("&eThere are no holograms.");
    }

    ctx.reply_legacy("&aList of holograms:")?;
    for (id, hologram) in holograms {
        ctx.reply_legacy(&format!(
            "&b- {} &7({}) &e{} line(s)",
            id,
            hologram.position,
            hologram.lines.len()
        ))?;
    }
    Ok(())
}

fn exec_teleport(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let session = ctx.player()?;
    let position = ctx
        .holograms
        .get(&id)
        .ok_or_else(|| HologramError::NotFound(id.clone()))?
        .position()
        .clone();

    ctx.host.teleport(session, &position);
    ctx.reply_legacy(&format!("&aTeleported to hologram '{}'.", id))
}

fn exec_addline(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let text = ctx.args().get_greedy("text")?;
    ctx.holograms.add_line(&mut *ctx.host, &id, text)?;
    ctx.reply_legacy(&format!("&aAdded line to hologram '{}'.", id))
}

fn exec_removeline(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let line = ctx.args().get_integer("line")?;
    let index = line_index(ctx, &id, line)?;

    ctx.holograms.remove_line(&mut *ctx.host, &id, index)?;
    ctx.reply_legacy(&format!(
        "&aRemoved line {} from hologram '{}'.",
        index + 1,
        id
    ))
}

fn exec_edit(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let line = ctx.args().get_integer("line")?;
    let text = ctx.args().get_greedy("text")?;
    let index = line_index(ctx, &id, line)?;

    ctx.holograms.set_line(&mut *ctx.host, &id, index, text)?;
    ctx.reply_legacy(&format!("&aUpdated line {} of hologram '{}'.", index + 1, id))
}

fn exec_move(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let position = ctx.player_position()?;
    ctx.holograms.move_to(&mut *ctx.host, &id, position)?;
    ctx.reply_legacy(&format!("&aMoved hologram '{}' to your location.", id))
}

fn exec_info(ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
    let id = ctx.args().get_string("id")?;
    let hologram = ctx
        .holograms
        .get(&id)
        .ok_or_else(|| HologramError::NotFound(id.clone()))?
        .snapshot();

    ctx.reply_legacy(&format!("&aInformation for hologram '{}':", id))?;
    ctx.reply_legacy(&format!("&eLocation: &7{}", hologram.position))?;
    ctx.reply_legacy(&format!("&eLines ({}):", hologram.lines.len()))?;
    for (i, line) in hologram.lines.into_iter().enumerate() {
        // Lines are shown with their color codes spelled out
        let message = TextComponentBuilder::new(format!("  {}: ", i + 1))
            .color_code(ColorCode::Aqua)
            .extra(vec![TextComponentBuilder::new(line)
                .color_code(ColorCode::White)
                .finish()])
            .finish();
        ctx.reply_component(message)?;
    }
    Ok(())
}

fn hologram_id() -> CommandNode {
    CommandNode::argument("id", ArgumentType::hologram_id())
}

fn line_number() -> CommandNode {
    CommandNode::argument("line", ArgumentType::integer(i32::MIN, i32::MAX))
}

fn text() -> CommandNode {
    CommandNode::argument("text", ArgumentType::greedy_string())
}

pub(super) fn register_commands(registry: &mut CommandRegistry) {
    registry.register(
        CommandNode::literal("hologram")
            .require_permission(permissions::HOLOGRAM)
            .executes(exec_help)
            .then(CommandNode::literal("create").then(
                CommandNode::argument("id", ArgumentType::string()).then(text().executes(exec_create)),
            ))
            .then(CommandNode::literal("remove").then(hologram_id().executes(exec_remove)))
            .then(CommandNode::literal("list").executes(exec_list))
            .then(
                CommandNode::literal("teleport")
                    .alias("tp")
                    .then(hologram_id().executes(exec_teleport)),
            )
            .then(
                CommandNode::literal("addline")
                    .then(hologram_id().then(text().executes(exec_addline))),
            )
            .then(
                CommandNode::literal("removeline")
                    .then(hologram_id().then(line_number().executes(exec_removeline))),
            )
            .then(
                CommandNode::literal("edit")
                    .then(hologram_id().then(line_number().then(text().executes(exec_edit)))),
            )
            .then(CommandNode::literal("move").then(hologram_id().executes(exec_move)))
            .then(CommandNode::literal("info").then(hologram_id().executes(exec_info)))
            .then(CommandNode::literal("help").executes(exec_help)),
    );
}
