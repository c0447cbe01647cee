//! Identifier rendering shared by the dialect adapters.
//!
//! Names may be dotted (`schema.table`) and may already carry quotes
//! (`"CamelCase".users`). Each part is rendered separately: parts that were
//! quoted in the input stay quoted, bare parts are quoted only when the
//! dialect requires it.
//!
//! - Bare parts that are safe are `[A-Za-z_][A-Za-z0-9_$]*` and not reserved
//! - Quote characters inside a name are escaped by doubling them

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Written without quotes.
    Bare(String),
    /// Written with `"..."`, `` `...` `` or `[...]` quotes in the input.
    Quoted(String),
}

/// How an adapter quotes identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStyle {
    pub open: char,
    pub close: char,
    /// Quote every part, not only the ones that need it.
    pub always: bool,
    /// Unquoted names are case-folded by the server, so mixed case needs quotes.
    pub folds_case: bool,
}

impl QuoteStyle {
    pub const BACKTICK: QuoteStyle = QuoteStyle {
        open: '`',
        close: '`',
        always: false,
        folds_case: false,
    };

    pub const DOUBLE_QUOTE: QuoteStyle = QuoteStyle {
        open: '"',
        close: '"',
        always: false,
        folds_case: false,
    };

    pub const BRACKET: QuoteStyle = QuoteStyle {
        open: '[',
        close: ']',
        always: true,
        folds_case: false,
    };

    pub const fn folding_case(mut self) -> Self {
        self.folds_case = true;
        self
    }
}

/// SQL reserved words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint", "create",
    "default", "delete", "desc", "distinct", "drop", "else", "end", "false", "foreign", "from",
    "group", "having", "in", "index", "inner", "insert", "is", "join", "key", "left", "like",
    "limit", "not", "null", "offset", "on", "or", "order", "outer", "primary", "references",
    "right", "select", "set", "table", "then", "true", "union", "update", "user", "values",
    "when", "where",
];

/// Split a possibly dotted, possibly quoted name into parts.
///
/// Unclosed quotes swallow the rest of the input as one quoted part.
pub fn parse(name: &str) -> Vec<IdentPart> {
    let mut parts = Vec::new();
    let mut chars = name.chars().peekable();

    while chars.peek().is_some() {
        let close = match chars.peek() {
            Some('"') => Some('"'),
            Some('`') => Some('`'),
            Some('[') => Some(']'),
            _ => None,
        };

        if let Some(close) = close {
            chars.next(); // opening quote
            let mut part = String::new();
            while let Some(c) = chars.next() {
                if c == close {
                    // Escaped quote: doubled closing character
                    if chars.peek() == Some(&close) {
                        chars.next();
                        part.push(close);
                    } else {
                        break;
                    }
                } else {
                    part.push(c);
                }
            }
            parts.push(IdentPart::Quoted(part));
            // Skip the separator, if any
            if chars.peek() == Some(&'.') {
                chars.next();
            }
            continue;
        }

        let mut part = String::new();
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '.' {
                break;
            }
            part.push(c);
        }
        parts.push(IdentPart::Bare(part));
    }

    parts
}

/// Whether a bare part must be quoted under `style`.
pub fn needs_quoting(part: &str, style: QuoteStyle) -> bool {
    if style.always {
        return true;
    }
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return true;
    }
    if !chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric()) {
        return true;
    }
    if style.folds_case && part.chars().any(|c| c.is_ascii_uppercase()) {
        return true;
    }
    RESERVED_WORDS.contains(&part.to_ascii_lowercase().as_str())
}

/// Render a name under `style`.
pub fn quote(name: &str, style: QuoteStyle) -> String {
    let parts = parse(name);
    let mut out = String::with_capacity(name.len() + 2 * parts.len());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        let (text, quoted) = match part {
            IdentPart::Bare(s) if s == "*" => (s.as_str(), false),
            IdentPart::Bare(s) => (s.as_str(), needs_quoting(s, style)),
            IdentPart::Quoted(s) => (s.as_str(), true),
        };
        if quoted {
            write_quoted(&mut out, text, style);
        } else {
            out.push_str(text);
        }
    }
    out
}

fn write_quoted(out: &mut String, text: &str, style: QuoteStyle) {
    out.push(style.open);
    for ch in text.chars() {
        if ch == style.close {
            out.push(style.close);
        }
        out.push(ch);
    }
    out.push(style.close);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_stay_bare() {
        assert_eq!(quote("Users", QuoteStyle::BACKTICK), "Users");
        assert_eq!(quote("public.users", QuoteStyle::DOUBLE_QUOTE), "public.users");
    }

    #[test]
    fn reserved_words_are_quoted() {
        assert_eq!(quote("order", QuoteStyle::BACKTICK), "`order`");
        assert_eq!(quote("User", QuoteStyle::DOUBLE_QUOTE), "\"User\"");
    }

    #[test]
    fn case_folding_dialects_quote_mixed_case() {
        let style = QuoteStyle::DOUBLE_QUOTE.folding_case();
        assert_eq!(quote("Users", style), "\"Users\"");
        assert_eq!(quote("users", style), "users");
    }

    #[test]
    fn brackets_always_quote_and_escape() {
        assert_eq!(quote("dbo.Users", QuoteStyle::BRACKET), "[dbo].[Users]");
        assert_eq!(quote("odd]name", QuoteStyle::BRACKET), "[odd]]name]");
    }

    #[test]
    fn pre_quoted_parts_are_kept() {
        assert_eq!(
            quote(r#""Camel Case".id"#, QuoteStyle::DOUBLE_QUOTE),
            r#""Camel Case".id"#
        );
        assert_eq!(
            parse(r#""a""b".c"#),
            vec![IdentPart::Quoted("a\"b".into()), IdentPart::Bare("c".into())]
        );
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(quote("my table", QuoteStyle::BACKTICK), "`my table`");
        assert_eq!(quote("1st", QuoteStyle::DOUBLE_QUOTE), "\"1st\"");
    }
}
