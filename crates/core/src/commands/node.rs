use crate::commands::{argument::ArgumentType, context::ExecutionContext, error::CommandResult};

pub type Executor = fn(&mut ExecutionContext<'_>) -> CommandResult<()>;

#[derive(Clone)]
pub struct CommandNode {
    pub(super) node_type: NodeType,
    pub(super) children: Vec<CommandNode>,
    pub(super) executor: Option<Executor>,
    pub(super) permissions: Vec<String>,
}

#[derive(Clone)]
pub enum NodeType {
    Root,
    Literal {
        name: String,
        aliases: Vec<String>,
    },
    Argument {
        name: String,
        arg_type: ArgumentType,
    },
}

impl CommandNode {
    fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            children: Vec::new(),
            executor: None,
            permissions: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(NodeType::Root)
    }

    pub fn literal(name: impl Into<String>) -> Self {
        Self::new(NodeType::Literal {
            name: name.into(),
            aliases: Vec::new(),
        })
    }

    pub fn argument(name: impl Into<String>, arg_type: impl Into<ArgumentType>) -> Self {
        Self::new(NodeType::Argument {
            name: name.into(),
            arg_type: arg_type.into(),
        })
    }

    pub fn then(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn executes(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let NodeType::Literal { aliases, .. } = &mut self.node_type else {
            panic!("Can not create alias for non-literal command nodes")
        };
        aliases.push(alias.into());
        self
    }

    pub fn require_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub(super) fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Whether `token` is this literal's name or one of its aliases.
    pub(super) fn matches_literal(&self, token: &str) -> bool {
        match &self.node_type {
            NodeType::Literal { name, aliases } => {
                name.eq_ignore_ascii_case(token)
                    || aliases.iter().any(|alias| alias.eq_ignore_ascii_case(token))
            }
            _ => false,
        }
    }
}
