//! The read-only view of the current parse state exposed to [Rule::expand](crate::Rule::expand)
//! and other grammar callbacks.

use crate::grammar::Grammar;
use crate::lexeme::Token;
use crate::path::Path;
use std::rc::Rc;

/// A snapshot a grammar callback can consult while the parser is deciding where to go next:
/// what lexical environment variables are currently in scope, and (when one is available)
/// which token the parser is looking at.
pub struct Context<'p> {
    grammar: Rc<Grammar>,
    path: &'p Path,
    lookahead: Option<&'p Token>,
}

impl<'p> Context<'p> {
    pub(crate) fn new(grammar: &Rc<Grammar>, path: &'p Path, lookahead: Option<&'p Token>) -> Self {
        Self {
            grammar: grammar.clone(),
            path,
            lookahead,
        }
    }

    /// The innermost-scoped value of `name`, searching outward through every still-open rule
    /// scope and skipping scopes already closed by a `RuleEnd` the path has passed.
    pub fn get_env_var(&self, name: &str) -> Option<String> {
        self.path.get_env_var(name)
    }

    /// The keyword text of the token currently under consideration, if any of its matched
    /// types is a keyword. "Currently under consideration" is the token being tested for a
    /// forward match, or the token of the path element backtracking is currently reconsidering.
    pub fn get_cur_keyword(&self) -> Option<String> {
        let token = self.lookahead?;
        token.matched_types.iter().find_map(|id| {
            self.grammar
                .token_type_by_id(*id)
                .and_then(|tt| tt.keyword_text().map(|s| s.to_string()))
        })
    }
}
