//! The tree a successful parse produces.

use ptree::TreeItem;
use std::borrow::Cow;
use std::io;

/// One node of the parse tree: a named syntactic construct, optionally carrying literal text
/// (set on leaves built from a matched token) and an arbitrary caller-assigned id, with its
/// children in the order the grammar matched them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub name: String,
    pub text: String,
    pub id: String,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            id: String::new(),
            children: Vec::new(),
        }
    }

    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            id: String::new(),
            children: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    pub fn add_child(&mut self, child: AstNode) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn remove_children(&mut self) -> &mut Self {
        self.children.clear();
        self
    }

    /// Replace the first child satisfying `predicate` with `replacement`, returning whether a
    /// child was replaced.
    pub fn replace_child<F: Fn(&AstNode) -> bool>(
        &mut self,
        predicate: F,
        replacement: AstNode,
    ) -> bool {
        if let Some(slot) = self.children.iter_mut().find(|c| predicate(c)) {
            *slot = replacement;
            true
        } else {
            false
        }
    }

    pub fn get_child(&self, name: &str) -> Option<&AstNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Whether this node or any descendant is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.children.iter().any(|c| c.contains(name))
    }

    /// Depth-first search for the first node (this one or a descendant) satisfying
    /// `predicate`.
    pub fn find_tree<F: Fn(&AstNode) -> bool>(&self, predicate: &F) -> Option<&AstNode> {
        if predicate(self) {
            Some(self)
        } else {
            self.children.iter().find_map(|c| c.find_tree(predicate))
        }
    }

    /// Every node (this one or a descendant) satisfying `predicate`, in document order.
    pub fn list_tree<F: Fn(&AstNode) -> bool>(&self, predicate: &F) -> Vec<&AstNode> {
        let mut found = Vec::new();
        self.walk_tree(&mut found, predicate);
        found
    }

    fn walk_tree<'a, F: Fn(&AstNode) -> bool>(&'a self, out: &mut Vec<&'a AstNode>, predicate: &F) {
        if predicate(self) {
            out.push(self);
        }
        for child in &self.children {
            child.walk_tree(out, predicate);
        }
    }

    pub fn print(&self) -> io::Result<()> {
        ptree::print_tree(self)
    }
}

impl TreeItem for AstNode {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &ptree::Style) -> io::Result<()> {
        if self.text.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} '{}'", self.name, self.text)
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}
