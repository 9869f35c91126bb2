//! Dot separated permission nodes with `*` wildcards, e.g. `frostgui.*`.

/// Use of `/hologram` and all of its subcommands.
pub const HOLOGRAM: &str = "frostgui.hologram";
/// `/frostgui reload` and `/support`.
pub const ADMIN: &str = "frostgui.admin";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug, Clone)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn parse(name: &str, value: bool) -> PermissionNode {
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_owned()),
            })
            .collect();
        PermissionNode { path, value }
    }

    fn matches(&self, name: &str) -> bool {
        let mut segments = name.split('.');
        for expected in &self.path {
            match (expected, segments.next()) {
                (PathSegment::WildCard, _) => return true,
                (PathSegment::Named(expected), Some(segment)) if expected == segment => {}
                _ => return false,
            }
        }
        segments.next().is_none()
    }
}

/// The permissions granted (or explicitly revoked) for one player. Nodes are
/// checked in insertion order and the first match decides.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    nodes: Vec<PermissionNode>,
}

impl PermissionSet {
    pub fn new() -> PermissionSet {
        Default::default()
    }

    /// Grants everything.
    pub fn all() -> PermissionSet {
        let mut set = PermissionSet::new();
        set.grant("*");
        set
    }

    pub fn grant(&mut self, name: &str) -> &mut Self {
        self.nodes.push(PermissionNode::parse(name, true));
        self
    }

    pub fn revoke(&mut self, name: &str) -> &mut Self {
        self.nodes.push(PermissionNode::parse(name, false));
        self
    }

    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        self.nodes
            .iter()
            .find(|node| node.matches(name))
            .map(|node| node.value)
    }

    /// Unknown nodes are denied.
    pub fn has(&self, name: &str) -> bool {
        self.get_node_val(name).unwrap_or(false)
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        for name in iter {
            set.grant(name);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_wildcard() {
        let set: PermissionSet = ["frostgui.hologram", "admin.*"].into_iter().collect();
        assert!(set.has("frostgui.hologram"));
        assert!(!set.has("frostgui.admin"));
        assert!(set.has("admin.anything.goes"));
        assert!(!set.has("frostgui"));
    }

    #[test]
    fn first_match_wins() {
        let mut set = PermissionSet::new();
        set.revoke("frostgui.admin").grant("frostgui.*");
        assert!(!set.has("frostgui.admin"));
        assert!(set.has("frostgui.hologram"));
        assert_eq!(set.get_node_val("other.node"), None);
    }

    #[test]
    fn star_grants_everything() {
        assert!(PermissionSet::all().has("frostgui.admin"));
    }
}
