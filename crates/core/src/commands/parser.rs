use crate::commands::{
    argument_parser,
    node::{CommandNode, NodeType},
    value::Value,
};

pub enum ParseResult<'a> {
    Success {
        node: &'a CommandNode,
        arguments: Vec<(String, Value)>,
        path: Vec<&'a CommandNode>,
    },
    Partial {
        node: &'a CommandNode,
        arguments: Vec<(String, Value)>,
        path: Vec<&'a CommandNode>,
    },
    TooManyArguments {
        node: &'a CommandNode,
        arguments: Vec<(String, Value)>,
        path: Vec<&'a CommandNode>,
        remaining: String,
    },
    InvalidArgument {
        node: &'a CommandNode,
        arguments: Vec<(String, Value)>,
        path: Vec<&'a CommandNode>,
        remaining: String,
    },
    NothingMatched {
        root: &'a CommandNode,
    },
}

pub(super) fn parse<'a>(root: &'a CommandNode, input: &str) -> ParseResult<'a> {
    let mut remaining_input = input;
    let mut path: Vec<&'a CommandNode> = vec![root];
    let mut arguments: Vec<(String, Value)> = Vec::new();

    let mut final_node = root;
    while let Some(next) = parse_next(final_node, &mut arguments, &mut remaining_input) {
        path.push(next);
        final_node = next;
    }

    if matches!(final_node.node_type, NodeType::Root) {
        return ParseResult::NothingMatched { root: final_node };
    }

    let remainder = remaining_input.trim_start();

    if !remainder.is_empty() {
        if final_node.has_executor() && final_node.children.is_empty() {
            ParseResult::TooManyArguments {
                node: final_node,
                arguments,
                path,
                remaining: remainder.to_string(),
            }
        } else {
            ParseResult::InvalidArgument {
                node: final_node,
                arguments,
                path,
                remaining: remainder.to_string(),
            }
        }
    } else if final_node.has_executor() {
        ParseResult::Success {
            node: final_node,
            arguments,
            path,
        }
    } else {
        ParseResult::Partial {
            node: final_node,
            arguments,
            path,
        }
    }
}

/// Finds the first child of `current` accepting the next input and consumes
/// it. Literals match case-insensitively.
pub(super) fn parse_next<'a>(
    current: &'a CommandNode,
    arguments: &mut Vec<(String, Value)>,
    remaining_input: &mut &str,
) -> Option<&'a CommandNode> {
    let input = *remaining_input;
    for child in &current.children {
        match &child.node_type {
            NodeType::Root => continue,

            NodeType::Literal { .. } => {
                let Some((token, rest)) = argument_parser::consume_token(input) else {
                    continue;
                };

                if child.matches_literal(token) {
                    *remaining_input = rest;
                    return Some(child);
                }
            }

            NodeType::Argument { name, arg_type } => {
                if let Ok((value, rest)) = arg_type.parse(input) {
                    arguments.push((name.clone(), value));
                    *remaining_input = rest;
                    return Some(child);
                }
            }
        }
    }

    None
}
