//! The grammar graph: an arena of nodes describing a language, addressed by [NodeId] and built
//! with the combinator functions in this module.
//!
//! A grammar is a directed graph with four kinds of node: [Rule]-backed [RuleStart]/[RuleEnd]
//! pairs, leaf [TokenNode]s matching one input token, and pure [Technical] connectors that
//! contribute no AST material. Grammar authors never touch nodes directly; they implement
//! [Rule] and wire sub-graphs together with [sequence], [zero_to_one], [zero_to_many],
//! [one_to_many] and [connect], each working over `(entry, exit)` socket pairs.
//!
//! A [RuleStart]'s successors are computed lazily, the first time they're asked for, by
//! calling back into [Rule::expand]. This is what lets a recursive grammar be expressed
//! without building an infinite graph up front: each reference to a rule (including a
//! recursive self-reference) allocates a fresh [RuleStart]/[RuleEnd] pair via [rule_node],
//! independently expanded when the parser actually reaches it.

use crate::error::SuccessorError;
use crate::lexeme::{Token, TokenType, TokenTypeId};
use crate::Context;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// An opaque index into a [Grammar]'s node arena.
pub type NodeId = usize;

/// A reusable fragment of the grammar, implemented once and referenced wherever the language
/// needs it (including recursively). `expand` is called at most once per [RuleStart] instance,
/// the first time the parser asks for its successors.
pub trait Rule {
    /// A human-readable name, used as the resulting [crate::AstNode]'s name and in
    /// diagnostics.
    fn name(&self) -> &'static str;

    /// Wire a sub-graph between `entry` and `exit` using [connect] and the combinators in this
    /// module. Returning [SuccessorError] rejects this reference to the rule outright (for
    /// example, a rule only valid in a particular [Context]).
    fn expand(
        &self,
        grammar: &Grammar,
        entry: NodeId,
        exit: NodeId,
        ctx: &Context,
    ) -> Result<(), SuccessorError>;

    /// Environment variables this rule's scope starts with, visible to descendant expansions
    /// through [Context::get_env_var] until the matching [RuleEnd] is reached. Most rules
    /// don't need any.
    fn env_vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Post-process the [crate::AstNode] built for this rule once its [RuleEnd] is reached.
    /// The default keeps the node unchanged.
    fn transform(&self, node: crate::AstNode) -> crate::AstNode {
        node
    }
}

/// Mutates a lexically-scoped environment map in response to a matched token.
///
/// The same `change_env` call is made both when the owning [TokenNode] is first matched
/// (moving forward through the grammar) and again when it is undone during backtracking — the
/// reference behaviour this crate preserves rather than adding a separate undo hook. An
/// implementation meant to be reversible on backtrack should be self-inverse, e.g. toggling a
/// flag.
pub trait EnvChange {
    fn change_env(&self, env: &mut HashMap<String, String>, token: &Token);
}

pub(crate) enum NodeKind {
    RuleStart {
        rule: Rc<dyn Rule>,
        end: NodeId,
        expanded: Cell<bool>,
    },
    RuleEnd {
        rule: Rc<dyn Rule>,
    },
    TokenNode {
        token_type: TokenTypeId,
        id: Option<String>,
        env_change: Option<Rc<dyn EnvChange>>,
    },
    Technical,
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) successors: Vec<NodeId>,
}

/// The arena owning every node of a language's grammar graph, plus the [TokenType] registry the
/// grammar's [TokenNode]s reference by [TokenTypeId].
///
/// Every mutating method takes `&self`: nodes are added behind a `RefCell` so that lazy
/// [Rule::expand] calls, which happen while the parser is mid-walk holding only a shared
/// reference to the grammar, can still grow the arena. A single `Grammar` is not `Sync`; share
/// it across parses on the same thread only when those parses don't run interleaved.
pub struct Grammar {
    nodes: RefCell<Vec<NodeData>>,
    token_types: RefCell<Vec<Rc<TokenType>>>,
    token_types_by_id: RefCell<HashMap<TokenTypeId, Rc<TokenType>>>,
    token_type_names: RefCell<HashMap<String, TokenTypeId>>,
    root: Cell<Option<NodeId>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
            token_types: RefCell::new(Vec::new()),
            token_types_by_id: RefCell::new(HashMap::new()),
            token_type_names: RefCell::new(HashMap::new()),
            root: Cell::new(None),
        }
    }

    /// Register a [TokenType] under a name so grammar rules can look up its id with
    /// [Grammar::token_type_id]. Returns the assigned [TokenTypeId].
    pub fn add_token_type(&self, token_type: TokenType, name: impl Into<String>) -> TokenTypeId {
        let id = token_type.id();
        let rc = Rc::new(token_type);
        self.token_types.borrow_mut().push(rc.clone());
        self.token_types_by_id.borrow_mut().insert(id, rc);
        self.token_type_names.borrow_mut().insert(name.into(), id);
        id
    }

    pub fn token_type_id(&self, name: &str) -> Option<TokenTypeId> {
        self.token_type_names.borrow().get(name).copied()
    }

    /// Every registered token type, in registration order, for building the [crate::Lexer].
    pub fn token_types(&self) -> Vec<Rc<TokenType>> {
        self.token_types.borrow().clone()
    }

    pub(crate) fn token_type_by_id(&self, id: TokenTypeId) -> Option<Rc<TokenType>> {
        self.token_types_by_id.borrow().get(&id).cloned()
    }

    /// Set the entry node the parser starts every walk from.
    pub fn set_root(&self, root: NodeId) {
        self.root.set(Some(root));
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    pub(crate) fn node(&self, id: NodeId) -> Ref<'_, NodeData> {
        Ref::map(self.nodes.borrow(), |nodes| &nodes[id])
    }

    fn push_node(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            kind,
            successors: Vec::new(),
        });
        nodes.len() - 1
    }

    fn add_successor(&self, from: NodeId, to: NodeId) {
        self.nodes.borrow_mut()[from].successors.push(to);
    }

    /// Successors of `node`, expanding it first if it is a not-yet-expanded [RuleStart].
    ///
    /// A [SuccessorError] raised by [Rule::expand] propagates out of this call and must be
    /// treated by the caller as "no successors here" — it never reaches [crate::Error].
    pub(crate) fn get_successors(
        &self,
        node: NodeId,
        ctx: &Context,
    ) -> Result<Vec<NodeId>, SuccessorError> {
        let pending = match &self.node(node).kind {
            NodeKind::RuleStart { rule, end, expanded } if !expanded.get() => {
                Some((rule.clone(), *end))
            }
            _ => None,
        };
        if let Some((rule, end)) = pending {
            rule.expand(self, node, end, ctx)?;
            if let NodeKind::RuleStart { expanded, .. } = &self.node(node).kind {
                expanded.set(true);
            }
        }
        Ok(self.node(node).successors.clone())
    }
}

/// A pure connector node contributing no AST material; combinators use these as the shared
/// entry/exit sockets of a composite fragment.
pub fn connector(grammar: &Grammar) -> NodeId {
    grammar.push_node(NodeKind::Technical)
}

/// Append `to` to `from`'s successor list. Declaration order is significant: when a node has
/// more than one successor, the parser tries them in the order they were connected.
pub fn connect(grammar: &Grammar, from: NodeId, to: NodeId) {
    grammar.add_successor(from, to);
}

/// A leaf node matching one token of type `token_type`. `id` becomes the resulting AST leaf's
/// id, if set.
pub fn token_node(
    grammar: &Grammar,
    token_type: TokenTypeId,
    id: Option<String>,
) -> (NodeId, NodeId) {
    let node = grammar.push_node(NodeKind::TokenNode {
        token_type,
        id,
        env_change: None,
    });
    (node, node)
}

/// A leaf node matching one token of type `token_type`, additionally applying `env_change` to
/// the nearest enclosing lexical scope whenever it is matched or unmatched.
pub fn env_changing_token_node(
    grammar: &Grammar,
    token_type: TokenTypeId,
    id: Option<String>,
    env_change: Rc<dyn EnvChange>,
) -> (NodeId, NodeId) {
    let node = grammar.push_node(NodeKind::TokenNode {
        token_type,
        id,
        env_change: Some(env_change),
    });
    (node, node)
}

/// Reference `rule` at this point in the graph. Allocates a fresh `RuleStart`/`RuleEnd` pair;
/// `rule`'s `expand` is invoked lazily against this specific pair the first time the parser
/// asks for the `RuleStart`'s successors, so a recursive reference to the same `Rule` produces
/// an independent subgraph rather than an infinite one up front.
pub fn rule_node(grammar: &Grammar, rule: Rc<dyn Rule>) -> (NodeId, NodeId) {
    let end = grammar.push_node(NodeKind::RuleEnd { rule: rule.clone() });
    let start = grammar.push_node(NodeKind::RuleStart {
        rule,
        end,
        expanded: Cell::new(false),
    });
    (start, end)
}

/// `start -> e1 -> e2 -> ... -> en -> end`. An empty sequence connects `start` directly to
/// `end`.
pub fn sequence(grammar: &Grammar, elements: &[(NodeId, NodeId)]) -> (NodeId, NodeId) {
    let start = connector(grammar);
    let end = connector(grammar);
    let mut tail = start;
    for &(entry, exit) in elements {
        connect(grammar, tail, entry);
        tail = exit;
    }
    connect(grammar, tail, end);
    (start, end)
}

/// `start -> e -> end` and `start -> end`, `e` tried first (greedy: prefer matching the
/// optional element over skipping it).
pub fn zero_to_one(grammar: &Grammar, element: (NodeId, NodeId)) -> (NodeId, NodeId) {
    let start = connector(grammar);
    let end = connector(grammar);
    connect(grammar, start, element.0);
    connect(grammar, element.1, end);
    connect(grammar, start, end);
    (start, end)
}

/// `start -> e -> start` (repeat) and `start -> end` (stop), repeat tried first.
pub fn zero_to_many(grammar: &Grammar, element: (NodeId, NodeId)) -> (NodeId, NodeId) {
    let start = connector(grammar);
    let end = connector(grammar);
    connect(grammar, start, element.0);
    connect(grammar, element.1, start);
    connect(grammar, start, end);
    (start, end)
}

/// `e.entry -> e -> e.entry` (repeat) and `e -> end` (stop), repeat tried first. At least one
/// occurrence of `e` is required, so the entry socket is `e`'s own entry rather than a fresh
/// connector.
pub fn one_to_many(grammar: &Grammar, element: (NodeId, NodeId)) -> (NodeId, NodeId) {
    let end = connector(grammar);
    connect(grammar, element.1, element.0);
    connect(grammar, element.1, end);
    (element.0, end)
}
