use super::{argument::ArgumentType, node::CommandNode, node::NodeType};
use itertools::Itertools;

/// `/hologram edit <id> <line> <text...>`: the matched path followed by
/// whatever can still come after it. Alternatives are joined with `|`,
/// wrapped in `[]` when the path is already runnable and `()` otherwise.
pub fn generate_usage(path: &[&CommandNode]) -> String {
    let mut parts = Vec::new();

    for node in path.iter().skip(1) {
        parts.push(get_display_name(node));
    }

    let Some(current_node) = path.last() else {
        return "/".to_string();
    };

    let suffix = build_usage_suffix(current_node);
    if !suffix.is_empty() {
        parts.push(suffix);
    }

    format!("/{}", parts.join(" "))
}

fn build_usage_suffix(node: &CommandNode) -> String {
    if node.children.is_empty() {
        return String::new();
    }

    let alternatives = node
        .children
        .iter()
        .map(|child| {
            let name = get_display_name(child);
            let suffix = build_usage_suffix(child);
            if suffix.is_empty() {
                name
            } else {
                format!("{} {}", name, suffix)
            }
        })
        .unique()
        .collect_vec();

    let joined = alternatives.join(" | ");
    if node.has_executor() {
        format!("[{}]", joined)
    } else if alternatives.len() > 1 {
        format!("({})", joined)
    } else {
        joined
    }
}

fn get_display_name(node: &CommandNode) -> String {
    match &node.node_type {
        NodeType::Root => unreachable!(),
        NodeType::Literal { name, .. } => name.clone(),
        NodeType::Argument {
            name,
            arg_type: ArgumentType::GreedyString,
        } => format!("<{}...>", name),
        NodeType::Argument { name, .. } => format!("<{}>", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{context::ExecutionContext, error::CommandResult};

    fn noop(_: &mut ExecutionContext<'_>) -> CommandResult<()> {
        Ok(())
    }

    #[test]
    fn usage_of_nested_arguments() {
        let edit = CommandNode::literal("edit").then(
            CommandNode::argument("id", ArgumentType::hologram_id()).then(
                CommandNode::argument("line", ArgumentType::integer(1, 10)).then(
                    CommandNode::argument("text", ArgumentType::greedy_string()).executes(noop),
                ),
            ),
        );
        let hologram = CommandNode::literal("hologram")
            .executes(noop)
            .then(edit)
            .then(CommandNode::literal("list").executes(noop));
        let root = CommandNode::root().then(hologram);

        let hologram = &root.children[0];
        let edit = &hologram.children[0];
        assert_eq!(
            generate_usage(&[&root, hologram, edit]),
            "/hologram edit <id> <line> <text...>"
        );
        assert_eq!(
            generate_usage(&[&root, hologram]),
            "/hologram [edit <id> <line> <text...> | list]"
        );
    }

    #[test]
    fn required_alternatives_use_parens() {
        let root = CommandNode::root().then(
            CommandNode::literal("frostgui")
                .then(CommandNode::literal("reload").executes(noop))
                .then(CommandNode::literal("info").executes(noop)),
        );
        let frostgui = &root.children[0];
        assert_eq!(
            generate_usage(&[&root, frostgui]),
            "/frostgui (reload | info)"
        );
    }
}
