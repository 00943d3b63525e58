use super::{Kind, TokenType, TokenTypeId};

impl TokenType {
    /// A token type matching when `text` occurs somewhere inside the lexeme, splitting it
    /// into a left and right remainder. When `whitespace_allowed` is `false`, both remainders
    /// must be non-empty (mirroring the reference grammar's `\S+` constraint); otherwise
    /// either may be empty.
    ///
    /// The rightmost occurrence of `text` is preferred, matching the greedy left-hand capture
    /// of the reference implementation's backtracking regular expression.
    pub fn separator(text: impl Into<String>, whitespace_allowed: bool) -> Self {
        Self {
            id: TokenTypeId::next(),
            kind: Kind::Separator {
                text: text.into(),
                whitespace_allowed,
            },
        }
    }

    /// If this separator matches `text`, returns `(left, matched_text, right)`.
    pub(crate) fn separator_split(&self, text: &str) -> Option<(String, String, String)> {
        let (sep, whitespace_allowed) = match &self.kind {
            Kind::Separator {
                text,
                whitespace_allowed,
            } => (text.as_str(), *whitespace_allowed),
            _ => return None,
        };
        if sep.is_empty() {
            return None;
        }

        let mut search_from = text.len();
        loop {
            let window = &text[..search_from];
            let idx = window.rfind(sep)?;
            let left = &text[..idx];
            let right = &text[idx + sep.len()..];
            if whitespace_allowed || (!left.is_empty() && !right.is_empty()) {
                return Some((left.to_string(), sep.to_string(), right.to_string()));
            }
            if idx == 0 {
                return None;
            }
            search_from = idx;
        }
    }
}
