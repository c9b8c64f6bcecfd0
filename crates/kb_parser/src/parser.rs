//! Recursive-descent parser over one logical line at a time, with a
//! special multi-line form for `solve` blocks. Connectives nest through
//! parenthesized sub-expressions; plain triples never need parentheses at
//! all.
//!
//! Negation has two surface forms that resolve to different store shapes:
//! `Not OP S O` (no parens) is a ground negative fact — `Expr::Atom` with
//! `Polarity::Negative`, indexed the same way a positive fact is. `Not
//! (...)` (parenthesized) wraps an arbitrary sub-expression as a compound,
//! matching how [`kb_store`] treats `Not` nested inside `And`/`Or`/
//! `Implies`.

use crate::error::ParseError;
use crate::statement::{
    MatchArg, ParamValue, ParsedStatement, RetractTarget, SolveBlock, SolveKind, SolveParam,
    StatementKind,
};
use crate::token::{strip_comment, tokenize_line, Token};
use kb_store::{Arg, Expr, Polarity, SymbolId, SymbolKind, Triple, Vocabulary};
use rustc_hash::FxHashSet;

const CONNECTIVES: [&str; 4] = ["And", "Or", "Not", "Implies"];
const DIRECTIVES: [&str; 9] = [
    "alias",
    "synonym",
    "retract",
    "Load",
    "solve",
    "end",
    "mutuallyExclusive",
    "contradictsSameArgs",
    "exception",
];

fn is_reserved(name: &str) -> bool {
    CONNECTIVES.contains(&name) || DIRECTIVES.contains(&name) || name.starts_with("__")
}

/// Parses `source` into a stream of statements, interning every symbol it
/// encounters into `vocabulary`. `known_names` is the set of `@name`
/// bindings already visible to this parse (typically carried over from
/// earlier `learn` calls in the same session); newly bound names are
/// added to it as they're declared, so later lines in the same source can
/// reference earlier ones.
pub fn parse(
    source: &str,
    vocabulary: &mut Vocabulary,
    known_names: &mut FxHashSet<String>,
) -> Result<Vec<ParsedStatement>, ParseError> {
    let lines: Vec<&str> = source.lines().collect();
    let mut parser = Parser { lines, cursor: 0, vocabulary, known_names };
    parser.parse_all()
}

struct Parser<'v, 'n> {
    lines: Vec<&'v str>,
    cursor: usize,
    vocabulary: &'v mut Vocabulary,
    known_names: &'n mut FxHashSet<String>,
}

impl<'v, 'n> Parser<'v, 'n> {
    fn parse_all(&mut self) -> Result<Vec<ParsedStatement>, ParseError> {
        let mut statements = Vec::new();
        while let Some((line_no, body)) = self.next_content_line() {
            let statement = self.parse_statement(line_no, body)?;
            if let Some(name) = &statement.binding {
                self.known_names.insert(name.clone());
            }
            statements.push(statement);
        }
        Ok(statements)
    }

    /// Advances past blank/comment-only lines and returns the next one
    /// with its comment stripped, along with its 1-based line number.
    fn next_content_line(&mut self) -> Option<(usize, String)> {
        while self.cursor < self.lines.len() {
            let line_no = self.cursor + 1;
            let raw = self.lines[self.cursor];
            self.cursor += 1;
            let stripped = strip_comment(raw).trim();
            if !stripped.is_empty() {
                return Some((line_no, stripped.to_string()));
            }
        }
        None
    }

    fn parse_statement(&mut self, line_no: usize, body: String) -> Result<ParsedStatement, ParseError> {
        let tokens = tokenize_line(&body);
        let (binding, rest) = self.split_binding(&tokens, line_no)?;

        if rest.is_empty() {
            return Err(ParseError::SyntaxInvalid { message: "empty statement body".into(), line: line_no });
        }

        let kind = match &rest[0] {
            Token::Word(w) if w == "alias" => self.parse_alias_like(&rest, line_no, true)?,
            Token::Word(w) if w == "synonym" => self.parse_alias_like(&rest, line_no, false)?,
            Token::Word(w) if w == "mutuallyExclusive" => self.parse_mutually_exclusive(&rest, line_no)?,
            Token::Word(w) if w == "contradictsSameArgs" => self.parse_contradicts_same_args(&rest, line_no)?,
            Token::Word(w) if w == "exception" => self.parse_exception(&rest, line_no)?,
            Token::Word(w) if w == "retract" => self.parse_retract(&rest, line_no)?,
            Token::Word(w) if w == "Load" => self.parse_load(&body, line_no)?,
            Token::Word(w) if w == "solve" => self.parse_solve(&rest, line_no)?,
            Token::Word(w) if w == "Not" => self.parse_not_statement(&rest, line_no)?,
            Token::Word(w) if CONNECTIVES.contains(&w.as_str()) => self.parse_connective_statement(&rest, line_no)?,
            _ => self.parse_plain_triple(&rest, line_no)?,
        };

        if let Some(name) = &binding {
            if let StatementKind::Fact(_, _) | StatementKind::Solve(_) = &kind {
                self.check_cyclic(&rest, name, line_no)?;
            }
        }

        Ok(ParsedStatement { binding, line: line_no, kind })
    }

    fn split_binding(&mut self, tokens: &[Token], line_no: usize) -> Result<(Option<String>, Vec<Token>), ParseError> {
        match tokens.first() {
            Some(Token::Word(w)) if w.starts_with('@') => {
                let name = w[1..].to_string();
                if name.is_empty() {
                    return Err(ParseError::SyntaxInvalid { message: "'@' with no name".into(), line: line_no });
                }
                if is_reserved(&name) {
                    return Err(ParseError::ReservedName { name, line: line_no });
                }
                Ok((Some(name), tokens[1..].to_vec()))
            }
            _ => Ok((None, tokens.to_vec())),
        }
    }

    fn check_cyclic(&self, body: &[Token], name: &str, line_no: usize) -> Result<(), ParseError> {
        let needle = format!("${name}");
        let refers = body.iter().any(|t| matches!(t, Token::Word(w) if *w == needle));
        if refers {
            return Err(ParseError::CyclicReference { name: name.to_string(), line: line_no });
        }
        Ok(())
    }

    fn check_references(&self, body: &[Token], line_no: usize) -> Result<(), ParseError> {
        for token in body {
            if let Token::Word(w) = token {
                if let Some(name) = w.strip_prefix('$') {
                    if !self.known_names.contains(name) {
                        return Err(ParseError::UnresolvedReference { name: name.to_string(), line: line_no });
                    }
                }
            }
        }
        Ok(())
    }

    fn intern(&mut self, word: &str) -> SymbolId {
        self.vocabulary.get_or_create(word)
    }

    fn expect_word<'a>(&self, tokens: &'a [Token], pos: &mut usize, line_no: usize) -> Result<&'a str, ParseError> {
        match tokens.get(*pos) {
            Some(Token::Word(w)) => {
                *pos += 1;
                Ok(w.as_str())
            }
            other => Err(ParseError::SyntaxInvalid {
                message: format!("expected a word, found {other:?}"),
                line: line_no,
            }),
        }
    }

    fn expect_lparen(&self, tokens: &[Token], pos: &mut usize, line_no: usize) -> Result<(), ParseError> {
        match tokens.get(*pos) {
            Some(Token::LParen) => {
                *pos += 1;
                Ok(())
            }
            other => Err(ParseError::SyntaxInvalid {
                message: format!("expected '(', found {other:?}"),
                line: line_no,
            }),
        }
    }

    fn expect_rparen(&self, tokens: &[Token], pos: &mut usize, line_no: usize) -> Result<(), ParseError> {
        match tokens.get(*pos) {
            Some(Token::RParen) => {
                *pos += 1;
                Ok(())
            }
            other => Err(ParseError::SyntaxInvalid {
                message: format!("expected ')', found {other:?}"),
                line: line_no,
            }),
        }
    }

    fn parse_triple_atom(&mut self, tokens: &[Token], pos: &mut usize, line_no: usize) -> Result<Expr, ParseError> {
        let op = self.expect_word(tokens, pos, line_no)?.to_string();
        let a1 = self.expect_word(tokens, pos, line_no)?.to_string();
        let a2 = self.expect_word(tokens, pos, line_no)?.to_string();
        if matches!(kb_store::classify_name(&op), SymbolKind::Variable | SymbolKind::Reference) {
            return Err(ParseError::SyntaxInvalid {
                message: format!("'{op}' cannot be used in operator position"),
                line: line_no,
            });
        }
        let operator = self.intern(&op);
        self.vocabulary.mark_operator(operator);
        let arg1 = Arg::Symbol(self.intern(&a1));
        let arg2 = Arg::Symbol(self.intern(&a2));
        Ok(Expr::Atom(Triple::new(operator, arg1, arg2)))
    }

    /// Parses whatever sits directly inside a pair of parens or at the
    /// top of a connective statement: either a connective with its own
    /// parenthesized children, or a bare triple.
    fn parse_inside(&mut self, tokens: &[Token], pos: &mut usize, line_no: usize) -> Result<Expr, ParseError> {
        if let Some(Token::Word(w)) = tokens.get(*pos) {
            if CONNECTIVES.contains(&w.as_str()) {
                let keyword = w.clone();
                *pos += 1;
                return self.parse_connective_body(&keyword, tokens, pos, line_no);
            }
        }
        self.parse_triple_atom(tokens, pos, line_no)
    }

    fn parse_paren_expr(&mut self, tokens: &[Token], pos: &mut usize, line_no: usize) -> Result<Expr, ParseError> {
        self.expect_lparen(tokens, pos, line_no)?;
        let expr = self.parse_inside(tokens, pos, line_no)?;
        self.expect_rparen(tokens, pos, line_no)?;
        Ok(expr)
    }

    fn parse_connective_body(
        &mut self,
        keyword: &str,
        tokens: &[Token],
        pos: &mut usize,
        line_no: usize,
    ) -> Result<Expr, ParseError> {
        match keyword {
            "And" | "Or" => {
                let mut children = Vec::new();
                while matches!(tokens.get(*pos), Some(Token::LParen)) {
                    children.push(self.parse_paren_expr(tokens, pos, line_no)?);
                }
                if children.is_empty() {
                    return Err(ParseError::SyntaxInvalid {
                        message: format!("{keyword} requires at least one parenthesized operand"),
                        line: line_no,
                    });
                }
                Ok(if keyword == "And" { Expr::And(children) } else { Expr::Or(children) })
            }
            "Not" => {
                let child = self.parse_paren_expr(tokens, pos, line_no)?;
                Ok(Expr::Not(Box::new(child)))
            }
            "Implies" => {
                let antecedent = self.parse_paren_expr(tokens, pos, line_no)?;
                let consequent = self.parse_paren_expr(tokens, pos, line_no)?;
                Ok(Expr::Implies(Box::new(antecedent), Box::new(consequent)))
            }
            other => unreachable!("'{other}' is not a connective keyword"),
        }
    }

    fn parse_not_statement(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        self.check_references(tokens, line_no)?;
        // `Not OP S O`, unparenthesized, is a ground negative fact.
        if tokens.len() == 4 && tokens[1..4].iter().all(|t| matches!(t, Token::Word(_))) {
            let mut pos = 1;
            let expr = self.parse_triple_atom(tokens, &mut pos, line_no)?;
            return Ok(StatementKind::Fact(expr, Polarity::Negative));
        }
        let mut pos = 0;
        let expr = self.parse_connective_statement_expr(tokens, &mut pos, line_no)?;
        Ok(StatementKind::Fact(expr, Polarity::Positive))
    }

    fn parse_connective_statement(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        self.check_references(tokens, line_no)?;
        let mut pos = 0;
        let expr = self.parse_connective_statement_expr(tokens, &mut pos, line_no)?;
        Ok(StatementKind::Fact(expr, Polarity::Positive))
    }

    fn parse_connective_statement_expr(
        &mut self,
        tokens: &[Token],
        pos: &mut usize,
        line_no: usize,
    ) -> Result<Expr, ParseError> {
        let expr = self.parse_inside(tokens, pos, line_no)?;
        if *pos != tokens.len() {
            return Err(ParseError::SyntaxInvalid {
                message: "trailing tokens after a complete expression".into(),
                line: line_no,
            });
        }
        Ok(expr)
    }

    fn parse_plain_triple(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        self.check_references(tokens, line_no)?;
        if tokens.len() != 3 {
            return Err(ParseError::SyntaxInvalid {
                message: "a bare statement must be exactly 'operator arg1 arg2'".into(),
                line: line_no,
            });
        }
        let mut pos = 0;
        let expr = self.parse_triple_atom(tokens, &mut pos, line_no)?;
        Ok(StatementKind::Fact(expr, Polarity::Positive))
    }

    fn parse_alias_like(&mut self, tokens: &[Token], line_no: usize, is_alias: bool) -> Result<StatementKind, ParseError> {
        if tokens.len() != 3 {
            return Err(ParseError::SyntaxInvalid {
                message: format!("'{}' needs exactly two names", if is_alias { "alias" } else { "synonym" }),
                line: line_no,
            });
        }
        let a = self.expect_word(tokens, &mut 1, line_no)?.to_string();
        let b = self.expect_word(tokens, &mut 2, line_no)?.to_string();
        let a_id = self.intern(&a);
        let b_id = self.intern(&b);
        Ok(if is_alias { StatementKind::Alias(a_id, b_id) } else { StatementKind::Synonym(a_id, b_id) })
    }

    fn parse_mutually_exclusive(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        if tokens.len() != 4 {
            return Err(ParseError::SyntaxInvalid {
                message: "'mutuallyExclusive' needs a relation and exactly two values".into(),
                line: line_no,
            });
        }
        let relation = self.expect_word(tokens, &mut 1, line_no)?.to_string();
        let a = self.expect_word(tokens, &mut 2, line_no)?.to_string();
        let b = self.expect_word(tokens, &mut 3, line_no)?.to_string();
        let relation_id = self.intern(&relation);
        self.vocabulary.mark_operator(relation_id);
        let a_id = self.intern(&a);
        let b_id = self.intern(&b);
        Ok(StatementKind::MutuallyExclusive(relation_id, a_id, b_id))
    }

    fn parse_contradicts_same_args(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        if tokens.len() != 3 {
            return Err(ParseError::SyntaxInvalid {
                message: "'contradictsSameArgs' needs exactly two relations".into(),
                line: line_no,
            });
        }
        let r = self.expect_word(tokens, &mut 1, line_no)?.to_string();
        let s = self.expect_word(tokens, &mut 2, line_no)?.to_string();
        let r_id = self.intern(&r);
        self.vocabulary.mark_operator(r_id);
        let s_id = self.intern(&s);
        self.vocabulary.mark_operator(s_id);
        Ok(StatementKind::ContradictsSameArgs(r_id, s_id))
    }

    /// `exception OP S O` or `exception Not OP S O` — same triple grammar
    /// as a plain/negated fact statement, but filed as an exemption rather
    /// than an assertion.
    fn parse_exception(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        self.check_references(tokens, line_no)?;
        let rest = &tokens[1..];
        if rest.len() == 4 {
            if let Token::Word(w) = &rest[0] {
                if w == "Not" {
                    let mut pos = 1;
                    let expr = self.parse_triple_atom(rest, &mut pos, line_no)?;
                    return Ok(StatementKind::Exception(expr, Polarity::Negative));
                }
            }
        }
        if rest.len() != 3 {
            return Err(ParseError::SyntaxInvalid {
                message: "'exception' needs 'operator arg1 arg2' (optionally prefixed with 'Not')".into(),
                line: line_no,
            });
        }
        let mut pos = 0;
        let expr = self.parse_triple_atom(rest, &mut pos, line_no)?;
        Ok(StatementKind::Exception(expr, Polarity::Positive))
    }

    fn parse_retract(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        self.check_references(tokens, line_no)?;
        let rest = &tokens[1..];
        if rest.len() == 1 {
            if let Token::Word(w) = &rest[0] {
                if let Some(name) = w.strip_prefix('$') {
                    let reference = self.intern(name);
                    return Ok(StatementKind::Retract(RetractTarget::Reference(reference)));
                }
            }
        }
        if rest.len() != 3 {
            return Err(ParseError::SyntaxInvalid {
                message: "retract needs either '$name' or 'operator arg1 arg2'".into(),
                line: line_no,
            });
        }
        let op = self.expect_word(rest, &mut 0, line_no)?.to_string();
        let a1 = self.match_arg(rest, 1, line_no)?;
        let a2 = self.match_arg(rest, 2, line_no)?;
        let operator = self.intern(&op);
        Ok(StatementKind::Retract(RetractTarget::Pattern { operator, arg1: a1, arg2: a2 }))
    }

    fn match_arg(&mut self, tokens: &[Token], index: usize, line_no: usize) -> Result<MatchArg, ParseError> {
        match tokens.get(index) {
            Some(Token::Word(w)) if w.starts_with('?') => Ok(MatchArg::Any),
            Some(Token::Word(w)) => Ok(MatchArg::Exact(self.intern(w))),
            other => Err(ParseError::SyntaxInvalid {
                message: format!("expected a name in retract pattern, found {other:?}"),
                line: line_no,
            }),
        }
    }

    fn parse_load(&mut self, body: &str, line_no: usize) -> Result<StatementKind, ParseError> {
        let path = body.strip_prefix("Load").unwrap_or(body).trim();
        if path.is_empty() {
            return Err(ParseError::SyntaxInvalid { message: "Load requires a path".into(), line: line_no });
        }
        Ok(StatementKind::Load(path.to_string()))
    }

    fn parse_solve(&mut self, tokens: &[Token], line_no: usize) -> Result<StatementKind, ParseError> {
        if tokens.len() != 2 {
            return Err(ParseError::SyntaxInvalid {
                message: "solve needs exactly one mode ('planning' or 'csp')".into(),
                line: line_no,
            });
        }
        let mode = self.expect_word(tokens, &mut 1, line_no)?;
        let kind = match mode {
            "planning" => SolveKind::Planning,
            "csp" => SolveKind::Csp,
            other => {
                return Err(ParseError::SyntaxInvalid {
                    message: format!("unknown solve mode '{other}'"),
                    line: line_no,
                })
            }
        };

        let mut params = Vec::new();
        loop {
            let (param_line, body) = self.next_content_line().ok_or_else(|| ParseError::SyntaxInvalid {
                message: "solve block missing a closing 'end'".into(),
                line: line_no,
            })?;
            if body == "end" {
                break;
            }
            let ptoks = tokenize_line(&body);
            if ptoks.len() != 3 {
                return Err(ParseError::SyntaxInvalid {
                    message: "solve parameters must read 'key from value'".into(),
                    line: param_line,
                });
            }
            let key = self.expect_word(&ptoks, &mut 0, param_line)?.to_string();
            let joiner = self.expect_word(&ptoks, &mut 1, param_line)?;
            if joiner != "from" {
                return Err(ParseError::SyntaxInvalid {
                    message: "solve parameters must read 'key from value'".into(),
                    line: param_line,
                });
            }
            let value_word = self.expect_word(&ptoks, &mut 2, param_line)?.to_string();
            if let Some(name) = value_word.strip_prefix('$') {
                if !self.known_names.contains(name) {
                    return Err(ParseError::UnresolvedReference { name: name.to_string(), line: param_line });
                }
            }
            let value = match value_word.parse::<i64>() {
                Ok(n) => ParamValue::Int(n),
                Err(_) => ParamValue::Symbol(self.intern(&value_word)),
            };
            params.push(SolveParam { key, value, line: param_line });
        }

        Ok(StatementKind::Solve(SolveBlock { kind, params }))
    }
}
