//! Whole-pipeline checks: a grammar built from [Rule] implementations, fed through a [Parser],
//! producing the AST shape the grammar describes.

use std::rc::Rc;

use synalyze::grammar::{connect, one_to_many, rule_node, sequence, token_node, zero_to_one, Grammar, NodeId};
use synalyze::{Context, Error, Parser, Rule, SuccessorError, TokenType};

struct LetStatement;
impl Rule for LetStatement {
    fn name(&self) -> &'static str {
        "let_statement"
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
                token_node(grammar, ident, None),
                token_node(grammar, eq, None),
                token_node(grammar, number, None),
                token_node(grammar, semi, None),
            ],
        );
        connect(grammar, entry, seq.0);
        connect(grammar, seq.1, exit);
        Ok(())
    }
}

#[test]
fn keyword_word_sequence_produces_five_ordered_children() {
    let grammar = Grammar::new();
    grammar.add_token_type(TokenType::keyword("let", false), "let");
    grammar.add_token_type(TokenType::word("[a-z]+").unwrap(), "ident");
    grammar.add_token_type(TokenType::keyword("=", false), "eq");
    grammar.add_token_type(TokenType::word("[0-9]+").unwrap(), "number");
    grammar.add_token_type(TokenType::postfix(";"), "semi");
    let root = rule_node(&grammar, Rc::new(LetStatement));
    grammar.set_root(root.0);

    let mut parser = Parser::new(grammar);
    let ast = parser.parse_string("let x = 42;").unwrap();
    assert_eq!(ast.name, "let_statement");
    let texts: Vec<&str> = ast.children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["let", "x", "=", "42", ";"]);
}

struct Words;
impl Rule for Words {
    fn name(&self) -> &'static str {
        "words"
    }
    fn expand(
        &self,
        grammar: &Grammar,
        entry: NodeId,
        exit: NodeId,
        _ctx: &Context,
    ) -> Result<(), SuccessorError> {
        let word = grammar.token_type_id("word").unwrap();
        let rep = one_to_many(grammar, token_node(grammar, word, None));
        connect(grammar, entry, rep.0);
        connect(grammar, rep.1, exit);
        Ok(())
    }
}

#[test]
fn one_to_many_repetition_collects_every_occurrence() {
    let grammar = Grammar::new();
    grammar.add_token_type(TokenType::word("[a-z]+").unwrap(), "word");
    let root = rule_node(&grammar, Rc::new(Words));
    grammar.set_root(root.0);

    let mut parser = Parser::new(grammar);
    let ast = parser.parse_string("a b c").unwrap();
    let texts: Vec<&str> = ast.children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

struct AOptBC;
impl Rule for AOptBC {
    fn name(&self) -> &'static str {
        "a_opt_b_c"
    }
    fn expand(
        &self,
        grammar: &Grammar,
        entry: NodeId,
        exit: NodeId,
        _ctx: &Context,
    ) -> Result<(), SuccessorError> {
        let a = grammar.token_type_id("a").unwrap();
        let b = grammar.token_type_id("b").unwrap();
        let c = grammar.token_type_id("c").unwrap();
        let seq = sequence(
            grammar,
            &[
                token_node(grammar, a, None),
                zero_to_one(grammar, token_node(grammar, b, None)),
                token_node(grammar, c, None),
            ],
        );
        connect(grammar, entry, seq.0);
        connect(grammar, seq.1, exit);
        Ok(())
    }
}

fn a_opt_b_c_grammar() -> Grammar {
    let grammar = Grammar::new();
    grammar.add_token_type(TokenType::word("a").unwrap(), "a");
    grammar.add_token_type(TokenType::word("b").unwrap(), "b");
    grammar.add_token_type(TokenType::word("c").unwrap(), "c");
    let root = rule_node(&grammar, Rc::new(AOptBC));
    grammar.set_root(root.0);
    grammar
}

#[test]
fn zero_to_one_accepts_with_and_without_the_optional_element() {
    let mut without = Parser::new(a_opt_b_c_grammar());
    assert_eq!(without.parse_string("a c").unwrap().children.len(), 2);

    let mut with = Parser::new(a_opt_b_c_grammar());
    assert_eq!(with.parse_string("a b c").unwrap().children.len(), 3);
}

#[test]
fn zero_to_one_rejects_a_second_optional_element_at_its_own_position() {
    let mut parser = Parser::new(a_opt_b_c_grammar());
    let err = parser.parse_string("a b b c").unwrap_err();
    match err {
        Error::Parse(e) => {
            assert_eq!(e.token_text, "b");
            assert_eq!(e.column, 4);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

struct AltAbAc;
impl Rule for AltAbAc {
    fn name(&self) -> &'static str {
        "alt"
    }
    fn expand(
        &self,
        grammar: &Grammar,
        entry: NodeId,
        exit: NodeId,
        _ctx: &Context,
    ) -> Result<(), SuccessorError> {
        let a = grammar.token_type_id("a").unwrap();
        let b = grammar.token_type_id("b").unwrap();
        let c = grammar.token_type_id("c").unwrap();
        let alt1 = sequence(
            grammar,
            &[token_node(grammar, a, None), token_node(grammar, b, None)],
        );
        let alt2 = sequence(
            grammar,
            &[token_node(grammar, a, None), token_node(grammar, c, None)],
        );
        connect(grammar, entry, alt1.0);
        connect(grammar, entry, alt2.0);
        connect(grammar, alt1.1, exit);
        connect(grammar, alt2.1, exit);
        Ok(())
    }
}

#[test]
fn backtracking_retries_the_second_alternative_after_the_first_fails() {
    let grammar = Grammar::new();
    grammar.add_token_type(TokenType::word("a").unwrap(), "a");
    grammar.add_token_type(TokenType::word("b").unwrap(), "b");
    grammar.add_token_type(TokenType::word("c").unwrap(), "c");
    let root = rule_node(&grammar, Rc::new(AltAbAc));
    grammar.set_root(root.0);

    let mut parser = Parser::new(grammar);
    let ast = parser.parse_string("a c").unwrap();
    let texts: Vec<&str> = ast.children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "c"]);
}

struct LineCommentedWords;
impl Rule for LineCommentedWords {
    fn name(&self) -> &'static str {
        "words"
    }
    fn expand(
        &self,
        grammar: &Grammar,
        entry: NodeId,
        exit: NodeId,
        _ctx: &Context,
    ) -> Result<(), SuccessorError> {
        let word = grammar.token_type_id("word").unwrap();
        let rep = one_to_many(grammar, token_node(grammar, word, None));
        connect(grammar, entry, rep.0);
        connect(grammar, rep.1, exit);
        Ok(())
    }
}

#[test]
fn line_comments_are_skipped_between_matched_tokens() {
    let grammar = Grammar::new();
    grammar.add_token_type(TokenType::word("[a-z]+").unwrap(), "word");
    let root = rule_node(&grammar, Rc::new(LineCommentedWords));
    grammar.set_root(root.0);

    let mut parser = Parser::new(grammar);
    parser.enable_line_comments("//");
    let ast = parser.parse_string("a // this is ignored\nb").unwrap();
    let texts: Vec<&str> = ast.children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}
