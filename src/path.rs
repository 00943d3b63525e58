//! The parser's current position in the grammar graph: an ordered trail of nodes visited, each
//! optionally carrying the token that was matched against it, plus the lexical environment
//! stack that trail implies.

use crate::grammar::{Grammar, NodeId, NodeKind};
use crate::lexeme::Token;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) struct PathElement {
    pub(crate) node: NodeId,
    pub(crate) token: Option<Token>,
}

/// One entry per `RuleStart`/`RuleEnd` the path has pushed, in lockstep with
/// [Path::elements]: `Some(scope)` is a still-open rule scope, `None` marks where a `RuleEnd`
/// closed one. [Path::get_env_var] walks this from the top, skipping closed markers, which is
/// what lets a lookup see through a closed sibling scope to an enclosing one that is still
/// open.
type EnvMarker = Option<RefCell<HashMap<String, String>>>;

pub(crate) struct Path {
    grammar: Rc<Grammar>,
    elements: Vec<PathElement>,
    env_stack: Vec<EnvMarker>,
}

impl Path {
    pub(crate) fn new(grammar: Rc<Grammar>, root: NodeId) -> Self {
        let mut path = Self {
            grammar,
            elements: Vec::new(),
            env_stack: Vec::new(),
        };
        path.push(root, None);
        path
    }

    pub(crate) fn grammar(&self) -> &Rc<Grammar> {
        &self.grammar
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub(crate) fn tail(&self) -> Option<NodeId> {
        self.elements.last().map(|e| e.node)
    }

    pub(crate) fn tail_token(&self) -> Option<&Token> {
        self.elements.last().and_then(|e| e.token.as_ref())
    }

    pub(crate) fn get_env_var(&self, name: &str) -> Option<String> {
        for marker in self.env_stack.iter().rev() {
            if let Some(scope) = marker {
                if let Some(value) = scope.borrow().get(name) {
                    return Some(value.clone());
                }
            }
        }
        None
    }

    fn nearest_open_scope(&self) -> Option<&RefCell<HashMap<String, String>>> {
        self.env_stack.iter().rev().find_map(|m| m.as_ref())
    }

    /// Visit `node`, recording the token matched against it (if any). Opens or closes a
    /// lexical scope for `RuleStart`/`RuleEnd` nodes, and applies an env-changing
    /// [TokenNode](crate::grammar::NodeKind::TokenNode)'s hook against the nearest open scope.
    pub(crate) fn push(&mut self, node: NodeId, token: Option<Token>) {
        enum Action {
            OpenScope(HashMap<String, String>),
            CloseScope,
            ApplyEnvChange(Rc<dyn crate::grammar::EnvChange>),
            None,
        }
        let action = match &self.grammar.node(node).kind {
            NodeKind::RuleStart { rule, .. } => Action::OpenScope(rule.env_vars()),
            NodeKind::RuleEnd { .. } => Action::CloseScope,
            NodeKind::TokenNode {
                env_change: Some(ec),
                ..
            } => Action::ApplyEnvChange(ec.clone()),
            _ => Action::None,
        };
        match action {
            Action::OpenScope(vars) => self.env_stack.push(Some(RefCell::new(vars))),
            Action::CloseScope => self.env_stack.push(None),
            Action::ApplyEnvChange(ec) => {
                if let Some(tok) = &token {
                    if let Some(scope) = self.nearest_open_scope() {
                        ec.change_env(&mut scope.borrow_mut(), tok);
                    }
                }
            }
            Action::None => {}
        }
        self.elements.push(PathElement { node, token });
    }

    /// Undo the most recent [Path::push]. `RuleStart`/`RuleEnd` nodes pop one environment
    /// marker; an env-changing `TokenNode` runs its hook again against the nearest open scope
    /// (the same call made on the way in — see [crate::grammar::EnvChange]).
    pub(crate) fn pop(&mut self) -> Option<PathElement> {
        let element = self.elements.pop()?;
        enum Action {
            PopScope,
            ApplyEnvChange(Rc<dyn crate::grammar::EnvChange>),
            None,
        }
        let action = match &self.grammar.node(element.node).kind {
            NodeKind::RuleStart { .. } | NodeKind::RuleEnd { .. } => Action::PopScope,
            NodeKind::TokenNode {
                env_change: Some(ec),
                ..
            } => Action::ApplyEnvChange(ec.clone()),
            _ => Action::None,
        };
        match action {
            Action::PopScope => {
                self.env_stack.pop();
            }
            Action::ApplyEnvChange(ec) => {
                if let Some(tok) = &element.token {
                    if let Some(scope) = self.nearest_open_scope() {
                        ec.change_env(&mut scope.borrow_mut(), tok);
                    }
                }
            }
            Action::None => {}
        }
        Some(element)
    }

    /// Attach `token` to the current tail, which must be an unmatched `TokenNode` just pushed
    /// with `token: None`. Runs the same env-change hook [Path::push] would have run had the
    /// token been known at push time.
    pub(crate) fn attach_token(&mut self, token: Token) {
        let node = self
            .elements
            .last()
            .expect("attach_token called on an empty path")
            .node;
        if let NodeKind::TokenNode {
            env_change: Some(ec),
            ..
        } = &self.grammar.node(node).kind
        {
            let ec = ec.clone();
            if let Some(scope) = self.nearest_open_scope() {
                ec.change_env(&mut scope.borrow_mut(), &token);
            }
        }
        self.elements.last_mut().unwrap().token = Some(token);
    }
}
