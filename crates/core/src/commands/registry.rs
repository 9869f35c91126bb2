use super::node::CommandNode;

pub struct CommandRegistry {
    root: CommandNode,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            root: CommandNode::root(),
        }
    }

    pub fn register(&mut self, command: CommandNode) {
        self.root.children.push(command);
    }

    pub fn get_root(&self) -> &CommandNode {
        &self.root
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
