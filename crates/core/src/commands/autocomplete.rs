use super::{
    argument::ArgumentType,
    node::{CommandNode, NodeType},
    parser,
    registry::CommandRegistry,
    CommandSender,
};
use crate::hologram::HologramManager;
use crate::host::SessionHost;

impl CommandRegistry {
    /// Suggestions for the last token of `line`: literal names, aliases and
    /// hologram ids starting with it, ignoring case. Nodes the sender lacks a
    /// permission for are neither walked into nor suggested.
    pub fn complete(
        &self,
        host: &dyn SessionHost,
        holograms: &HologramManager,
        sender: CommandSender,
        line: &str,
    ) -> Vec<String> {
        let line = line.trim_start();
        let line = line.strip_prefix('/').unwrap_or(line);

        let partial_len: usize = line
            .chars()
            .rev()
            .take_while(|c| !c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        let (mut prefix, partial) = line.split_at(line.len() - partial_len);

        let permitted = |node: &CommandNode| match sender {
            CommandSender::Console => true,
            CommandSender::Player(session) => node
                .permissions
                .iter()
                .all(|permission| host.has_permission(session, permission)),
        };

        let mut node = self.get_root();
        let mut arguments = Vec::new();
        while !prefix.trim().is_empty() {
            match parser::parse_next(node, &mut arguments, &mut prefix) {
                Some(next) if permitted(next) => node = next,
                _ => return Vec::new(),
            }
        }

        let partial = partial.to_lowercase();
        let mut suggestions = Vec::new();
        for child in node.children.iter().filter(|child| permitted(*child)) {
            match &child.node_type {
                NodeType::Root => {}
                NodeType::Literal { name, aliases } => {
                    suggestions.push(name.clone());
                    suggestions.extend(aliases.iter().cloned());
                }
                NodeType::Argument {
                    arg_type: ArgumentType::HologramId,
                    ..
                } => suggestions.extend(holograms.ids()),
                NodeType::Argument { .. } => {}
            }
        }
        suggestions.retain(|suggestion| suggestion.to_lowercase().starts_with(&partial));
        suggestions
    }
}
