//! S-expression tree for KiCad documents.
//!
//! Records build `SExp` values; `to_pretty_string` renders them in the
//! tab-indented layout KiCad itself writes. The parser reads documents
//! back, which the tests use to check exported structure.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("Trailing input at position {0}")]
    TrailingInput(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    /// Bare symbol or number
    Atom(String),
    /// Quoted string
    Str(String),
    List(Vec<SExp>),
}

/// Format a millimetre value with six decimals, never as `-0.000000`.
pub fn fmt_mm(value: f64) -> String {
    let s = format!("{:.6}", value);
    match s.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => s,
    }
}

/// Lists whose children are written several to a line
const PACKED_LISTS: &[(&str, usize)] = &[("pts", 7)];

impl SExp {
    pub fn atom(s: impl Into<String>) -> Self {
        SExp::Atom(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        SExp::Str(s.into())
    }

    pub fn number(value: f64) -> Self {
        SExp::Atom(fmt_mm(value))
    }

    pub fn integer(value: i64) -> Self {
        SExp::Atom(value.to_string())
    }

    /// `(head children...)`
    pub fn list(head: &str, children: Vec<SExp>) -> Self {
        let mut items = Vec::with_capacity(children.len() + 1);
        items.push(SExp::atom(head));
        items.extend(children);
        SExp::List(items)
    }

    /// `(head child)`
    pub fn pair(head: &str, child: SExp) -> Self {
        SExp::List(vec![SExp::atom(head), child])
    }

    /// `(head x y)` in millimetres
    pub fn point(head: &str, (x, y): (f64, f64)) -> Self {
        SExp::list(head, vec![SExp::number(x), SExp::number(y)])
    }

    /// Text of an atom or string.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) | SExp::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// Head symbol of a list.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    pub fn get(&self, key: &str) -> Option<&SExp> {
        if let SExp::List(items) = self {
            for item in items {
                if let SExp::List(sublist) = item {
                    if sublist.first().and_then(SExp::as_atom) == Some(key) {
                        // single value: return it, otherwise the whole sublist
                        if sublist.len() == 2 {
                            return Some(&sublist[1]);
                        } else if sublist.len() > 2 {
                            return Some(item);
                        }
                    }
                }
            }
        }
        None
    }

    pub fn get_all(&self, key: &str) -> Vec<&SExp> {
        match self {
            SExp::List(items) => items
                .iter()
                .filter(|item| item.head() == Some(key))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn is_leaf_list(items: &[SExp]) -> bool {
        items.iter().all(|i| !matches!(i, SExp::List(_)))
    }

    /// Multi-line rendering: leaf lists inline, nested lists one per line,
    /// indented with tabs.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(0, &mut out);
        out.push('\n');
        out
    }

    fn write_pretty(&self, depth: usize, out: &mut String) {
        indent(depth, out);
        let items = match self {
            SExp::List(items) if !Self::is_leaf_list(items) => items,
            _ => {
                out.push_str(&self.to_string());
                return;
            }
        };

        out.push('(');
        let split = items
            .iter()
            .position(|i| matches!(i, SExp::List(_)))
            .unwrap_or(items.len());
        let inline: Vec<String> = items[..split].iter().map(ToString::to_string).collect();
        out.push_str(&inline.join(" "));

        let rest = &items[split..];
        let packed = self
            .head()
            .and_then(|h| PACKED_LISTS.iter().find(|(name, _)| *name == h))
            .map(|(_, per_line)| *per_line);

        match packed {
            Some(per_line) => {
                for chunk in rest.chunks(per_line) {
                    out.push('\n');
                    indent(depth + 1, out);
                    let line: Vec<String> = chunk.iter().map(ToString::to_string).collect();
                    out.push_str(&line.join(" "));
                }
            }
            None => {
                for child in rest {
                    out.push('\n');
                    child.write_pretty(depth + 1, out);
                }
            }
        }

        out.push('\n');
        indent(depth, out);
        out.push(')');
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

impl fmt::Display for SExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Atom(s) => write!(f, "{}", s),
            SExp::Str(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                write!(f, "\"")
            }
            SExp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

pub struct SExpParser {
    input: Vec<char>,
    pos: usize,
}

impl SExpParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Parse exactly one expression; anything but whitespace after it is
    /// an error.
    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }
        let sexp = self.parse_sexp()?;
        self.skip_whitespace();
        if !self.is_eof() {
            return Err(ParseError::TrailingInput(self.pos));
        }
        Ok(sexp)
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();

        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }

        match self.peek() {
            '(' => self.parse_list(),
            ')' => Err(ParseError::UnexpectedToken(")".to_string())),
            '"' => self.parse_string(),
            _ => self.parse_symbol(),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        self.expect_char('(')?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }

            if self.peek() == ')' {
                self.advance();
                break;
            }

            items.push(self.parse_sexp()?);
        }

        Ok(SExp::List(items))
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        self.expect_char('"')?;
        let mut s = String::new();
        let mut escaped = false;

        loop {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            let ch = self.peek();
            self.advance();

            if escaped {
                match ch {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    _ => s.push(ch),
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            } else {
                s.push(ch);
            }
        }

        Ok(SExp::Str(s))
    }

    fn parse_symbol(&mut self) -> Result<SExp, ParseError> {
        let mut s = String::new();

        while !self.is_eof() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.advance();
        }

        if s.is_empty() {
            Err(ParseError::UnexpectedToken("empty symbol".to_string()))
        } else {
            Ok(SExp::Atom(s))
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }

        let ch = self.peek();
        if ch == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken(format!(
                "Expected '{}', found '{}'",
                expected, ch
            )))
        }
    }
}
