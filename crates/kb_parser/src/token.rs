//! Whitespace-plus-parentheses tokenization of one logical line.
//! Parentheses denote a compound expression inline and are always their
//! own token, even glued to a word.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Word(String),
}

/// Splits one line into tokens. `(` and `)` are always their own token,
/// even when glued to a word (`(hasProperty` -> `(`, `hasProperty`).
/// Everything else is split on ASCII whitespace.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for ch in line.chars() {
        match ch {
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::RParen);
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

/// Strips a trailing `#` or `//` comment (whichever starts earlier), not
/// honoring any quoting — the DSL has none.
pub fn strip_comment(line: &str) -> &str {
    let hash = line.find('#');
    let slashes = line.find("//");
    let cut = match (hash, slashes) {
        (Some(h), Some(s)) => Some(h.min(s)),
        (Some(h), None) => Some(h),
        (None, Some(s)) => Some(s),
        (None, None) => None,
    };
    match cut {
        Some(i) => &line[..i],
        None => line,
    }
}
