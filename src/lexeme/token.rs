use super::{Token, TokenTypeId};

impl Token {
    pub fn new(
        text: impl Into<String>,
        start_line: usize,
        start_column: usize,
        matched_types: Vec<TokenTypeId>,
    ) -> Self {
        Self {
            text: text.into(),
            start_line,
            start_column,
            matched_types,
        }
    }

    pub fn has_type(&self, id: TokenTypeId) -> bool {
        self.matched_types.contains(&id)
    }
}
