//! `synalyze` is a library to build a recursive-descent, backtracking parser for a custom
//! language: given a declarative grammar and an input character stream, it produces a tree of
//! named syntactic constructs (the [AstNode] tree).
//!
//! # Overview
//!
//! The crate is built from two tightly coupled engines.
//!
//! The [Lexer] is a position-tracking scanner. It segments an input character stream into
//! typed [Token]s according to a set of programmable [TokenType] classifiers (keywords, free
//! words, prefixes, postfixes, separators, quoted literals), with configurable line- and
//! block-comment modes.
//!
//! The [Parser] is a backtracking graph-walker. It matches the token stream produced by a
//! [Lexer] against a grammar expressed as a directed graph of alternatives, sequences,
//! repetitions and optional sub-rules (see [grammar]), producing an [AstNode] tree and a
//! well-located [ParseError] on failure.
//!
//! Grammar authors do not construct grammar graph nodes by hand; instead they implement
//! [Rule] and assemble fragments with the combinators in [grammar] ([sequence], [zero_to_one],
//! [zero_to_many], [one_to_many], [connect]).
//!
//! # Example
//!
//! ```
//! use synalyze::grammar::{connect, rule_node, sequence, token_node, Grammar};
//! use synalyze::lexeme::TokenType;
//! use synalyze::{Context, Parser, Rule, SuccessorError};
//! use std::rc::Rc;
//!
//! struct Assignment;
//! impl Rule for Assignment {
//!     fn name(&self) -> &'static str {
//!         "assignment"
//!     }
//!     fn expand(
//!         &self,
//!         grammar: &Grammar,
//!         entry: synalyze::grammar::NodeId,
//!         exit: synalyze::grammar::NodeId,
//!         _ctx: &Context,
//!     ) -> Result<(), SuccessorError> {
//!         let let_kw = grammar.token_type_id("let").unwrap();
//!         let ident = grammar.token_type_id("ident").unwrap();
//!         let eq = grammar.token_type_id("eq").unwrap();
//!         let number = grammar.token_type_id("number").unwrap();
//!         let semi = grammar.token_type_id("semi").unwrap();
//!         let seq = sequence(
//!             grammar,
//!             &[
//!                 token_node(grammar, let_kw, None),
//!                 token_node(grammar, ident, None),
//!                 token_node(grammar, eq, None),
//!                 token_node(grammar, number, None),
//!                 token_node(grammar, semi, None),
//!             ],
//!         );
//!         connect(grammar, entry, seq.0);
//!         connect(grammar, seq.1, exit);
//!         Ok(())
//!     }
//! }
//!
//! let grammar = Grammar::new();
//! let kw_let = grammar.add_token_type(TokenType::keyword("let", false), "let");
//! let ident = grammar.add_token_type(TokenType::word(r"[a-z]+").unwrap(), "ident");
//! let kw_eq = grammar.add_token_type(TokenType::keyword("=", false), "eq");
//! let number = grammar.add_token_type(TokenType::word(r"[0-9]+").unwrap(), "number");
//! let kw_semi = grammar.add_token_type(TokenType::postfix(";"), "semi");
//! let _ = (kw_let, ident, kw_eq, number, kw_semi);
//!
//! let root = rule_node(&grammar, Rc::new(Assignment));
//! grammar.set_root(root.0);
//!
//! let mut parser = Parser::new(grammar);
//! let ast = parser.parse_string("let x = 42;").unwrap();
//! assert_eq!(ast.name, "assignment");
//! assert_eq!(ast.children.len(), 5);
//! ```
//!
//! # License
//! `synalyze` is provided under the MIT OR Apache-2.0 license.

mod ast;
mod context;
mod error;
pub mod grammar;
mod input;
mod input_buffer;
pub mod lexeme;
mod lexer;
mod path;
mod parser;
mod position;
mod util;

pub use ast::AstNode;
pub use context::Context;
pub use error::{Error, InternalError, LexicalError, ParseError, SuccessorError};
pub use grammar::{connect, one_to_many, sequence, zero_to_many, zero_to_one, Grammar, Rule};
pub use input::{FileStream, InputStream, StringStream};
pub use input_buffer::InputBuffer;
pub use lexer::Lexer;
pub use lexeme::{Token, TokenType, TokenTypeId};
pub use parser::Parser;
pub use position::Position;
pub use util::Log;
