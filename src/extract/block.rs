//! Tolerant scanning of declaration blocks.
//!
//! This is not a grammar for the target language. It only knows
//! quoted strings (single, double, backtick), identifiers, punctuation and
//! comments, which is enough to isolate `key: { ... }` / `key: [ ... ]` spans
//! and read quoted values out of them.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Quoted literal with escapes resolved
    Str(String),
    /// Identifier or bare number
    Ident(String),
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl Token {
    fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    fn is_open(&self) -> bool {
        matches!(self.kind, TokenKind::Punct('{' | '[' | '('))
    }

    fn is_close(&self) -> bool {
        matches!(self.kind, TokenKind::Punct('}' | ']' | ')'))
    }

    /// Text of a string literal or identifier
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Str(s) | TokenKind::Ident(s) => Some(s),
            TokenKind::Punct(_) => None,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split text into tokens, skipping whitespace and comments.
///
/// Unterminated strings and comments run to the end of the input rather than
/// failing.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c == '/' {
            match chars.peek().map(|&(_, n)| n) {
                Some('/') => {
                    for (_, n) in chars.by_ref() {
                        if n == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for (_, n) in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                    continue;
                }
                _ => {}
            }
        }

        if matches!(c, '\'' | '"' | '`') {
            let mut value = String::new();
            let mut end = text.len();
            while let Some((i, n)) = chars.next() {
                if n == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                    continue;
                }
                if n == c {
                    end = i + n.len_utf8();
                    break;
                }
                value.push(n);
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                start,
                end,
            });
            continue;
        }

        if is_ident_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if !is_ident_char(n) {
                    break;
                }
                end = i + n.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Ident(text[start..end].to_string()),
                start,
                end,
            });
            continue;
        }

        tokens.push(Token {
            kind: TokenKind::Punct(c),
            start,
            end: start + c.len_utf8(),
        });
    }

    tokens
}

/// Nesting depth of every token; openers and closers report the outer depth.
fn depths(tokens: &[Token]) -> Vec<usize> {
    let mut depth = 0usize;
    tokens
        .iter()
        .map(|t| {
            if t.is_close() {
                depth = depth.saturating_sub(1);
                depth
            } else if t.is_open() {
                depth += 1;
                depth - 1
            } else {
                depth
            }
        })
        .collect()
}

/// A located `keyword: { ... }` or `keyword: [ ... ]` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// `{` or `[`
    pub open: char,
    /// Text between the delimiters
    pub body: &'a str,
}

impl Block<'_> {
    pub fn is_list(&self) -> bool {
        self.open == '['
    }
}

/// Find the shallowest block introduced by `keyword` followed by `:` or `=`.
///
/// Returns `None` when no such declaration exists. A block whose closing
/// delimiter is missing extends to the end of the text.
pub fn find_block<'a>(text: &'a str, keyword: &str) -> Option<Block<'a>> {
    let tokens = tokenize(text);
    let depth = depths(&tokens);

    let (open_idx, _) = tokens
        .windows(3)
        .enumerate()
        .filter(|(_, w)| {
            w[0].word() == Some(keyword)
                && (w[1].is_punct(':') || w[1].is_punct('='))
                && (w[2].is_punct('{') || w[2].is_punct('['))
        })
        .map(|(i, _)| (i + 2, depth[i]))
        .min_by_key(|&(i, d)| (d, i))?;

    let open = &tokens[open_idx];
    let open_char = match open.kind {
        TokenKind::Punct(c) => c,
        _ => return None,
    };

    let body_end = tokens[open_idx + 1..]
        .iter()
        .zip(&depth[open_idx + 1..])
        .find(|(t, &d)| t.is_close() && d == depth[open_idx])
        .map(|(t, _)| t.start)
        .unwrap_or(text.len());

    Some(Block {
        open: open_char,
        body: &text[open.end..body_end],
    })
}

/// Values directly inside a list body.
///
/// Quoted strings contribute themselves. Object entries contribute the value
/// of their `name`, `test` or `description` key so that lists of test-case
/// objects are tolerated.
pub fn list_values(body: &str) -> Vec<String> {
    let tokens = tokenize(body);
    let depth = depths(&tokens);
    let mut values = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        match &token.kind {
            TokenKind::Str(s) if depth[i] == 0 => values.push(s.clone()),
            TokenKind::Punct('{') if depth[i] == 0 => {
                let close = (i + 1..tokens.len())
                    .find(|&j| tokens[j].is_close() && depth[j] == 0)
                    .unwrap_or(tokens.len());
                let inner = &tokens[i + 1..close];
                let named = string_pairs_in(inner, &depth[i + 1..close], 1)
                    .into_iter()
                    .find(|(k, _)| matches!(k.as_str(), "name" | "test" | "description"))
                    .map(|(_, v)| v);
                if let Some(name) = named {
                    values.push(name);
                }
                i = close;
            }
            _ => {}
        }
        i += 1;
    }

    values
}

/// `key: value` pairs directly inside an object body, keys and values quoted
/// or bare identifiers.
pub fn string_pairs(body: &str) -> Vec<(String, String)> {
    let tokens = tokenize(body);
    let depth = depths(&tokens);
    string_pairs_in(&tokens, &depth, 0)
}

fn string_pairs_in(tokens: &[Token], depth: &[usize], level: usize) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for i in 0..tokens.len().saturating_sub(2) {
        if depth[i] != level || !tokens[i + 1].is_punct(':') {
            continue;
        }
        let starts_entry = i == 0 || tokens[i - 1].is_punct(',') || tokens[i - 1].is_open();
        let ends_entry = tokens
            .get(i + 3)
            .map(|t| t.is_punct(',') || t.is_close())
            .unwrap_or(true);
        if !starts_entry || !ends_entry {
            continue;
        }
        if let (Some(key), Some(value)) = (tokens[i].word(), tokens[i + 2].word()) {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Replace comments with spaces, keeping string literals and line numbers intact.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('/', Some('/')) => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            ('\'' | '"' | '`', _) => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_strings_and_comments() {
        let tokens = tokenize("a: 'x\\'y', // note\n /* block */ \"z\"");
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Punct(':'),
                TokenKind::Str("x'y".into()),
                TokenKind::Punct(','),
                TokenKind::Str("z".into()),
            ]
        );
    }

    #[test]
    fn test_find_block_scoped_to_braces() {
        let text = indoc! {r#"
            // routes: { 'GET /decoy': 'nope' }
            export const contract = {
              routes: {
                'GET /users': 'list',
                "POST /users": "create",
              },
              tests: ['mentions routes: { x }'],
            };
        "#};
        let block = find_block(text, "routes").unwrap();
        assert_eq!(block.open, '{');
        assert_eq!(
            string_pairs(block.body),
            vec![
                ("GET /users".to_string(), "list".to_string()),
                ("POST /users".to_string(), "create".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_block_prefers_shallowest() {
        let text = "x = { meta: { tests: ['inner'] }, tests: ['outer'] }";
        let block = find_block(text, "tests").unwrap();
        assert_eq!(list_values(block.body), vec!["outer"]);
    }

    #[test]
    fn test_absent_block_is_none() {
        assert!(find_block("export const contract = {}", "routes").is_none());
        assert!(find_block("routes = 5", "routes").is_none());
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let block = find_block("helpers: ['a', 'b'", "helpers").unwrap();
        assert_eq!(list_values(block.body), vec!["a", "b"]);
    }

    #[test]
    fn test_list_values_accepts_objects() {
        let values = list_values("{ name: 'returns 200', status: 200 }, 'plain',");
        assert_eq!(values, vec!["returns 200", "plain"]);
    }

    #[test]
    fn test_nested_values_not_treated_as_pairs() {
        let pairs = string_pairs("a: 'x', b: { c: 'y' }, d: e");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "x".to_string()),
                ("d".to_string(), "e".to_string())
            ]
        );
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let text = "const a = 'http://x'; // trailing\n/* gone */b";
        assert_eq!(strip_comments(text), "const a = 'http://x'; \n b");
    }
}
