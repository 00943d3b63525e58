//! The backtracking graph-walker that turns a token stream into an [AstNode] tree.
//!
//! [Parser::parse] drives three moving parts in lockstep: a [Lexer] pulling tokens on demand, a
//! [Path] recording the trail of grammar nodes visited so far, and a LIFO pushback buffer of
//! tokens that have been read from the lexer but not yet consumed by the path (a token goes back
//! onto this buffer whenever backtracking un-matches the node it was attached to).

use crate::ast::AstNode;
use crate::context::Context;
use crate::error::{Error, InternalError, ParseError};
use crate::grammar::{Grammar, NodeId, NodeKind};
use crate::lexeme::Token;
use crate::lexer::Lexer;
use crate::path::{Path, PathElement};
use crate::util::Log;
use crate::InputStream;
use once_cell::unsync::OnceCell;
use std::rc::Rc;

/// Builds a [Lexer] from a [Grammar]'s registered token types and walks the grammar graph
/// against the resulting token stream, backtracking over alternatives as needed.
pub struct Parser {
    grammar: Rc<Grammar>,
    lexer: Lexer,
    debug: OnceCell<Log<&'static str>>,
}

impl Parser {
    /// Build a parser for `grammar`, which must already have its root set via
    /// [Grammar::set_root].
    pub fn new(grammar: Grammar) -> Self {
        let grammar = Rc::new(grammar);
        let lexer = Lexer::new(grammar.token_types());
        Self {
            grammar,
            lexer,
            debug: OnceCell::new(),
        }
    }

    /// Assign a debug trace level, printed to stdout under `cfg(debug_assertions)` as the walk
    /// backtracks and finishes. May only be called once per parser.
    pub fn set_log(&mut self, log_label: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log_label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn enable_line_comments(&mut self, start: impl Into<String>) -> &mut Self {
        self.lexer.enable_line_comments(start);
        self
    }

    pub fn enable_block_comments(
        &mut self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> &mut Self {
        self.lexer.enable_block_comments(start, end);
        self
    }

    pub fn parse_string(&mut self, text: &str) -> Result<AstNode, Error> {
        let mut stream = crate::input::StringStream::new(text);
        self.parse(&mut stream)
    }

    pub fn parse_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<AstNode, Error> {
        let mut stream = crate::input::FileStream::open(path)
            .map_err(|e| InternalError::new("FileStream", e.to_string()))?;
        self.parse(&mut stream)
    }

    /// Walk `stream` against this parser's grammar, producing an [AstNode] tree.
    ///
    /// Every token the lexer hands back is tried against the path's current tail
    /// ([Parser::find_next_matching_node]); a mismatch triggers backtracking
    /// ([Parser::find_next_sibling]) to the nearest untried alternative. Once the lexer is
    /// exhausted the remaining path is closed out with [Parser::find_path_to_end], which accepts
    /// only if every node on the way to the grammar's exit tolerates being skipped.
    pub fn parse(&mut self, stream: &mut dyn InputStream) -> Result<AstNode, Error> {
        self.lexer.reset();
        let root = self.grammar.root().ok_or_else(|| {
            Error::from(InternalError::new(
                "Grammar",
                "no root node set; call Grammar::set_root before parsing",
            ))
        })?;
        let mut path = Path::new(self.grammar.clone(), root);
        let mut token_buffer: Vec<Token> = Vec::new();

        loop {
            if token_buffer.is_empty() {
                if let Some(token) = self.lexer.next_token(stream)? {
                    token_buffer.push(token);
                }
            }

            match token_buffer.last().cloned() {
                None => {
                    if self.find_path_to_end(&mut path) {
                        break;
                    }
                    if !self.find_next_sibling(&mut path, &mut token_buffer) {
                        return Err(self.parse_error(None).into());
                    }
                }
                Some(token) => {
                    if self.find_next_matching_node(&token, &mut path) {
                        token_buffer.pop();
                    } else {
                        #[cfg(debug_assertions)]
                        self.trace_backtrack(&token);
                        if !self.find_next_sibling(&mut path, &mut token_buffer) {
                            return Err(self.parse_error(Some(&token)).into());
                        }
                    }
                }
            }
        }

        #[cfg(debug_assertions)]
        {
            let debug = self.debug.get().copied().unwrap_or(Log::None);
            if debug.order() >= Log::Success(()).order() {
                println!("[{}; parse success]", debug);
            }
        }
        Ok(self.create_ast(&path))
    }

    #[cfg(debug_assertions)]
    fn trace_backtrack(&self, token: &Token) {
        let debug = self.debug.get().copied().unwrap_or(Log::None);
        if debug.order() >= Log::Verbose(()).order() {
            println!(
                "[{}; backtrack]: '{}' at line {}, column {}",
                debug, token.text, token.start_line, token.start_column
            );
        }
    }

    fn parse_error(&self, token: Option<&Token>) -> ParseError {
        match token {
            Some(t) => ParseError::new(t.start_line, t.start_column, t.text.clone()),
            None => {
                let pos = self.lexer.position();
                ParseError::new(pos.line, pos.column, "")
            }
        }
    }

    fn is_token_node(&self, node: NodeId) -> bool {
        matches!(self.grammar.node(node).kind, NodeKind::TokenNode { .. })
    }

    /// Pure-forward search: can the path be driven from its current tail to a terminal node
    /// (one with no successors) without consuming any more tokens? Descends through every
    /// non-token successor, skipping `TokenNode`s since they require a token this call doesn't
    /// have. Leaves `path` unchanged on failure.
    fn find_path_to_end(&self, path: &mut Path) -> bool {
        let node = match path.tail() {
            Some(n) => n,
            None => return false,
        };
        let ctx = Context::new(&self.grammar, path, None);
        let successors = match self.grammar.get_successors(node, &ctx) {
            Ok(s) => s,
            Err(_) => return false,
        };
        if successors.is_empty() {
            return true;
        }
        for succ in successors {
            if self.is_token_node(succ) {
                continue;
            }
            path.push(succ, None);
            if self.find_path_to_end(path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Pure-forward search: does some route from the path's current tail reach a `TokenNode`
    /// matching `token` without consuming any other token along the way? Descends through every
    /// successor, pushing it onto `path`; when the just-pushed tail is itself the `TokenNode` in
    /// question, it's tested directly rather than recursed into (a `TokenNode` has no grammar
    /// successors of its own to explore until matched). Leaves `path` unchanged on failure.
    fn find_next_matching_node(&self, token: &Token, path: &mut Path) -> bool {
        let node = path
            .tail()
            .expect("path is never empty while a parse is in progress");

        // An already-matched TokenNode (its token is attached from an earlier step) is not a
        // candidate to re-test; fall through and explore what comes after it instead.
        let unmatched_token_type = match &self.grammar.node(node).kind {
            NodeKind::TokenNode { token_type, .. } if path.tail_token().is_none() => {
                Some(*token_type)
            }
            _ => None,
        };
        if let Some(token_type) = unmatched_token_type {
            if token.has_type(token_type) {
                path.attach_token(token.clone());
                return true;
            }
            return false;
        }

        let ctx = Context::new(&self.grammar, path, Some(token));
        let successors = match self.grammar.get_successors(node, &ctx) {
            Ok(s) => s,
            Err(_) => return false,
        };
        for succ in successors {
            path.push(succ, None);
            if self.find_next_matching_node(token, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Try the next untried alternative at the path's current tail's parent. Pops the tail,
    /// recomputes the parent's successor list (now that more of the path's environment may have
    /// changed), finds where the popped node sat in it, and pushes whichever successor follows.
    /// If the popped node carried a matched token, that token is no longer consumed by anything
    /// once the sibling takes its place, so it goes back onto `token_buffer` to be re-read.
    /// Restores the popped node exactly as it was and reports failure if none remains.
    fn goto_next_sibling(&self, path: &mut Path, token_buffer: &mut Vec<Token>) -> bool {
        let popped = match path.pop() {
            Some(e) => e,
            None => return false,
        };
        let parent = match path.tail() {
            Some(n) => n,
            None => {
                path.push(popped.node, popped.token);
                return false;
            }
        };
        let ctx = Context::new(&self.grammar, path, popped.token.as_ref());
        let successors = match self.grammar.get_successors(parent, &ctx) {
            Ok(s) => s,
            Err(_) => {
                path.push(popped.node, popped.token);
                return false;
            }
        };
        match successors.iter().position(|&n| n == popped.node) {
            Some(idx) if idx + 1 < successors.len() => {
                if let Some(token) = popped.token {
                    token_buffer.push(token);
                }
                path.push(successors[idx + 1], None);
                true
            }
            _ => {
                path.push(popped.node, popped.token);
                false
            }
        }
    }

    /// Backtrack one decision at a time until an untried sibling is found or the path runs out
    /// of room to shrink. Each level that [Parser::goto_next_sibling] can't resolve is popped
    /// for real; any token that pop frees up goes back onto `token_buffer` since it's no longer
    /// consumed. On total failure every popped node and returned token is restored, in reverse
    /// order, leaving both `path` and `token_buffer` exactly as they were.
    fn find_next_sibling(&self, path: &mut Path, token_buffer: &mut Vec<Token>) -> bool {
        let mut removed: Vec<(NodeId, Option<Token>)> = Vec::new();
        loop {
            if self.goto_next_sibling(path, token_buffer) {
                return true;
            }
            if path.len() < 2 {
                for (node, token) in removed.into_iter().rev() {
                    if token.is_some() {
                        token_buffer.pop();
                    }
                    path.push(node, token);
                }
                return false;
            }
            let popped = path.pop().expect("length checked above");
            if let Some(token) = popped.token.clone() {
                token_buffer.push(token);
            }
            removed.push((popped.node, popped.token));
        }
    }

    /// Walk the finished path in order, building an [AstNode] tree: a `RuleStart` opens a fresh
    /// node, its matching `RuleEnd` runs the rule's [crate::Rule::transform] and attaches the
    /// result as a child of the enclosing node, and a matched `TokenNode` becomes a leaf.
    /// `Technical` connectors contribute nothing.
    fn create_ast(&self, path: &Path) -> AstNode {
        let mut stack: Vec<AstNode> = vec![AstNode::new("root")];
        for element in path.elements() {
            self.fold_ast_element(element, &mut stack);
        }
        let mut wrapper = stack.pop().expect("root wrapper always present");
        wrapper
            .children
            .pop()
            .expect("a successful parse produces exactly one top-level AST node")
    }

    fn fold_ast_element(&self, element: &PathElement, stack: &mut Vec<AstNode>) {
        match &self.grammar.node(element.node).kind {
            NodeKind::RuleStart { rule, .. } => {
                stack.push(AstNode::new(rule.name()));
            }
            NodeKind::RuleEnd { rule } => {
                let finished = stack.pop().expect("RuleEnd without a matching RuleStart");
                let original_id = finished.id.clone();
                let mut transformed = rule.transform(finished);
                transformed.set_id(original_id);
                stack
                    .last_mut()
                    .expect("RuleEnd always has an enclosing node on the stack")
                    .add_child(transformed);
            }
            NodeKind::TokenNode { id, .. } => {
                if let Some(token) = &element.token {
                    let mut leaf = AstNode::leaf("token", token.text.clone());
                    if let Some(id) = id {
                        leaf.set_id(id.clone());
                    }
                    stack
                        .last_mut()
                        .expect("a token node always has an enclosing rule")
                        .add_child(leaf);
                }
            }
            NodeKind::Technical => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{connect, rule_node, sequence, token_node, zero_to_one};
    use crate::lexeme::TokenType;
    use crate::SuccessorError;
    use std::collections::HashMap;

    struct Assignment;
    impl crate::Rule for Assignment {
        fn name(&self) -> &'static str {
            "assignment"
        }
        fn expand(
            &self,
            grammar: &Grammar,
            entry: NodeId,
            exit: NodeId,
            _ctx: &Context,
        ) -> Result<(), SuccessorError> {
            let kw_let = grammar.token_type_id("let").unwrap();
            let ident = grammar.token_type_id("ident").unwrap();
            let eq = grammar.token_type_id("eq").unwrap();
            let number = grammar.token_type_id("number").unwrap();
            let semi = grammar.token_type_id("semi").unwrap();
            let seq = sequence(
                grammar,
                &[
                    token_node(grammar, kw_let, None),
                    token_node(grammar, ident, Some("target".to_string())),
                    token_node(grammar, eq, None),
                    token_node(grammar, number, Some("value".to_string())),
                    token_node(grammar, semi, None),
                ],
            );
            connect(grammar, entry, seq.0);
            connect(grammar, seq.1, exit);
            Ok(())
        }
    }

    fn assignment_grammar() -> Grammar {
        let grammar = Grammar::new();
        grammar.add_token_type(TokenType::keyword("let", false), "let");
        grammar.add_token_type(TokenType::word(r"[a-zA-Z][a-zA-Z0-9]*").unwrap(), "ident");
        grammar.add_token_type(TokenType::keyword("=", false), "eq");
        grammar.add_token_type(TokenType::word(r"[0-9]+").unwrap(), "number");
        grammar.add_token_type(TokenType::keyword(";", false), "semi");
        let root = rule_node(&grammar, Rc::new(Assignment));
        grammar.set_root(root.0);
        grammar
    }

    #[test]
    fn parses_a_matching_sequence_into_named_children() {
        let mut parser = Parser::new(assignment_grammar());
        let ast = parser.parse_string("let x = 42 ;").unwrap();
        assert_eq!(ast.name, "assignment");
        assert_eq!(ast.children.len(), 5);
        assert_eq!(
            ast.get_child("token").map(|n| n.text.as_str()),
            Some("let")
        );
    }

    #[test]
    fn reports_position_of_first_unmatched_token() {
        let mut parser = Parser::new(assignment_grammar());
        let err = parser.parse_string("let 1 = x ;").unwrap_err();
        match err {
            Error::Parse(e) => {
                assert_eq!(e.token_text, "1");
                assert_eq!(e.column, 4);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    struct OptionalPrefix;
    impl crate::Rule for OptionalPrefix {
        fn name(&self) -> &'static str {
            "maybe_minus_number"
        }
        fn expand(
            &self,
            grammar: &Grammar,
            entry: NodeId,
            exit: NodeId,
            _ctx: &Context,
        ) -> Result<(), SuccessorError> {
            let minus = grammar.token_type_id("minus").unwrap();
            let number = grammar.token_type_id("number").unwrap();
            let seq = sequence(
                grammar,
                &[
                    zero_to_one(grammar, token_node(grammar, minus, None)),
                    token_node(grammar, number, None),
                ],
            );
            connect(grammar, entry, seq.0);
            connect(grammar, seq.1, exit);
            Ok(())
        }
    }

    #[test]
    fn zero_to_one_accepts_either_branch() {
        let grammar = Grammar::new();
        grammar.add_token_type(TokenType::keyword("-", false), "minus");
        grammar.add_token_type(TokenType::word(r"[0-9]+").unwrap(), "number");
        let root = rule_node(&grammar, Rc::new(OptionalPrefix));
        grammar.set_root(root.0);

        let mut with_prefix = Parser::new(grammar);
        let ast = with_prefix.parse_string("- 7").unwrap();
        assert_eq!(ast.children.len(), 2);

        let grammar = Grammar::new();
        grammar.add_token_type(TokenType::keyword("-", false), "minus");
        grammar.add_token_type(TokenType::word(r"[0-9]+").unwrap(), "number");
        let root = rule_node(&grammar, Rc::new(OptionalPrefix));
        grammar.set_root(root.0);
        let mut without_prefix = Parser::new(grammar);
        let ast = without_prefix.parse_string("7").unwrap();
        assert_eq!(ast.children.len(), 1);
    }

    struct EnvVarRule;
    impl crate::Rule for EnvVarRule {
        fn name(&self) -> &'static str {
            "scoped"
        }
        fn env_vars(&self) -> HashMap<String, String> {
            let mut vars = HashMap::new();
            vars.insert("mode".to_string(), "strict".to_string());
            vars
        }
        fn expand(
            &self,
            grammar: &Grammar,
            entry: NodeId,
            exit: NodeId,
            ctx: &Context,
        ) -> Result<(), SuccessorError> {
            if ctx.get_env_var("mode").as_deref() != Some("strict") {
                return Err(SuccessorError);
            }
            let number = grammar.token_type_id("number").unwrap();
            let node = token_node(grammar, number, None);
            connect(grammar, entry, node.0);
            connect(grammar, node.1, exit);
            Ok(())
        }
    }

    #[test]
    fn rule_expansion_sees_its_own_env_vars() {
        let grammar = Grammar::new();
        grammar.add_token_type(TokenType::word(r"[0-9]+").unwrap(), "number");
        let root = rule_node(&grammar, Rc::new(EnvVarRule));
        grammar.set_root(root.0);
        let mut parser = Parser::new(grammar);
        let ast = parser.parse_string("7").unwrap();
        assert_eq!(ast.name, "scoped");
    }
}
