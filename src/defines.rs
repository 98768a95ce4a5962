//! The compile-time inclusion boundary
//!
//! Kernel source sees the tuning constants as preprocessor substitutions. This module renders a
//! [`TileConfig`] as either a header or a list of `-D` compiler options, and reads a header back.

use crate::config::TileConfig;
use crate::error::{Result, TilingError};
use crate::kernels::{constants_for, Constant, GemmKernel};
use std::collections::HashMap;

/// Render `config` as a C preprocessor header.
///
/// `RTS` and `LPT` are written as expressions over the other defines, so editing a literal knob
/// in the emitted file keeps the derived values consistent.
pub fn render_header(config: &TileConfig) -> String {
    let mut out = String::new();
    let literal = |c: Constant| config.value(c).to_string();

    push_section(&mut out, "Constants for kernels 1 -- 5");
    push_define(&mut out, Constant::Ts, &literal(Constant::Ts), "The square-root of the 2D tile-size (== work-group dims)");

    push_section(&mut out, "Constants for kernels 3, 5");
    push_define(&mut out, Constant::Wpt, &literal(Constant::Wpt), "The amount of work-per-thread, i.e. the thread-coarsening factor");
    push_define(&mut out, Constant::Rts, "(TS/WPT)", "The reduced tile-size in one dimension");

    push_section(&mut out, "Constants for kernels 4, 7 -- 10");
    push_define(&mut out, Constant::Width, &literal(Constant::Width), "The vector-width (in number of floats)");

    push_section(&mut out, "Constants for kernel 5");
    push_define(&mut out, Constant::Tsdk, &literal(Constant::Tsdk), "The tile-size in dimension K (for kernel 5 only)");
    push_define(&mut out, Constant::Lpt, "((TSDK*WPT)/(TS))", "The amount of loads-per-thread (assume TSN==TSM)");

    out
}

fn push_section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str("// ");
    out.push_str(title);
    out.push('\n');
}

fn push_define(out: &mut String, name: Constant, value: &str, comment: &str) {
    let directive = format!("#define {} {}", name, value);
    out.push_str(&format!("{:<36} // {}\n", directive, comment));
}

/// `-D NAME=VALUE` options for every constant, derived ones as literals
pub fn compiler_options(config: &TileConfig) -> String {
    options_for_constants(config, &Constant::ALL)
}

/// `-D` options restricted to the constants `kernels` read
pub fn compiler_options_for(config: &TileConfig, kernels: &[GemmKernel]) -> String {
    options_for_constants(config, &constants_for(kernels))
}

fn options_for_constants(config: &TileConfig, constants: &[Constant]) -> String {
    constants
        .iter()
        .map(|&c| format!("-D {}={}", c, config.value(c)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a header of `#define NAME EXPR` lines into a validated [`TileConfig`].
///
/// `RTS` and `LPT` are optional; when present they must match the derived values.
pub fn parse_header(text: &str) -> Result<TileConfig> {
    let stripped = strip_block_comments(text)?;
    let mut defines: HashMap<String, Option<i64>> = HashMap::new();

    for (index, raw_line) in stripped.lines().enumerate() {
        let line_no = index + 1;
        let line = match raw_line.find("//") {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        let Some(directive) = line.strip_prefix('#') else {
            return Err(TilingError::parse(line_no, format!("expected a preprocessor directive, found '{}'", line)));
        };
        let directive = directive.trim_start();
        let (keyword, rest) = split_identifier(directive);

        if keyword != "define" {
            log::debug!("line {}: ignoring #{}", line_no, keyword);
            continue;
        }

        let rest = rest.trim_start();
        let (name, body) = split_identifier(rest);
        if name.is_empty() {
            return Err(TilingError::parse(line_no, "#define without a name"));
        }
        if body.starts_with('(') {
            return Err(TilingError::parse(line_no, format!("function-like macro {} is not supported", name)));
        }
        if defines.contains_key(name) {
            return Err(TilingError::parse(line_no, format!("redefinition of {}", name)));
        }

        let body = body.trim();
        let value = if body.is_empty() {
            None
        } else {
            Some(evaluate(body, &defines, line_no)?)
        };

        if Constant::from_name(name).is_none() {
            log::debug!("line {}: {} is not a tuning constant", line_no, name);
        }
        defines.insert(name.to_string(), value);
    }

    let knob = |constant: Constant| -> Result<usize> {
        let name = constant.name();
        match defines.get(name) {
            None => Err(TilingError::MissingDefine(name.to_string())),
            Some(None) => Err(TilingError::invalid_parameter(name, "defined without a value")),
            Some(Some(value)) => usize::try_from(*value)
                .map_err(|_| TilingError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("{} is not a positive integer", value),
                }),
        }
    };

    let config = TileConfig::new(
        knob(Constant::Ts)?,
        knob(Constant::Wpt)?,
        knob(Constant::Width)?,
        knob(Constant::Tsdk)?,
    )?;

    for derived in [Constant::Rts, Constant::Lpt] {
        if defines.contains_key(derived.name()) {
            let actual = knob(derived)?;
            let expected = config.value(derived);
            if actual != expected {
                return Err(TilingError::InconsistentDefine {
                    name: derived.name().to_string(),
                    expected,
                    actual,
                });
            }
        }
    }

    log::debug!("parsed header: {}", config);
    Ok(config)
}

/// Blank out `/* */` comments, keeping newlines so line numbers survive
fn strip_block_comments(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut opened_at = None;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match opened_at {
            Some(_) => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    opened_at = None;
                    out.push_str("  ");
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
            None => {
                if c == '/' && chars.peek() == Some(&'/') {
                    // Line comment: copy through to the newline untouched
                    out.push(c);
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        out.push(next);
                        chars.next();
                    }
                } else if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    opened_at = Some(line);
                    out.push_str("  ");
                } else {
                    out.push(c);
                }
            }
        }
    }

    match opened_at {
        Some(start) => Err(TilingError::parse(start, "unterminated block comment")),
        None => Ok(out),
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a leading identifier off `s`
fn split_identifier(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(is_identifier_char(c) && !(i == 0 && c.is_ascii_digit())))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(i64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(expr: &str, line: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = expr;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        } else if c.is_ascii_digit() {
            let end = rest.find(|ch: char| !is_identifier_char(ch)).unwrap_or(rest.len());
            tokens.push(Token::Number(parse_literal(&rest[..end], line)?));
            rest = &rest[end..];
        } else if is_identifier_char(c) {
            let (ident, tail) = split_identifier(rest);
            tokens.push(Token::Ident(ident.to_string()));
            rest = tail;
        } else {
            let token = match c {
                '+' | '-' | '*' | '/' | '%' => Token::Op(c),
                '(' => Token::Open,
                ')' => Token::Close,
                other => return Err(TilingError::parse(line, format!("unexpected character '{}'", other))),
            };
            tokens.push(token);
            rest = &rest[c.len_utf8()..];
        }
    }

    Ok(tokens)
}

/// Integer literal with optional `0x` prefix and `u`/`l` suffixes
fn parse_literal(text: &str, line: usize) -> Result<i64> {
    let digits = text.trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    parsed.map_err(|_| TilingError::parse(line, format!("invalid integer literal '{}'", text)))
}

fn evaluate(expr: &str, defines: &HashMap<String, Option<i64>>, line: usize) -> Result<i64> {
    let tokens = tokenize(expr, line)?;
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        defines,
        line,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.tokens.get(parser.pos) {
        return Err(TilingError::parse(line, format!("unexpected {:?} after expression", token)));
    }
    Ok(value)
}

/// Recursive-descent evaluator for `+ - * / %` with C precedence
struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    defines: &'a HashMap<String, Option<i64>>,
    line: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn overflow(&self) -> TilingError {
        TilingError::parse(self.line, "integer overflow in expression")
    }

    fn expr(&mut self) -> Result<i64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            value = match op {
                '+' => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }
            .ok_or_else(|| self.overflow())?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            if op != '*' && rhs == 0 {
                return Err(TilingError::parse(self.line, "division by zero"));
            }
            value = match op {
                '*' => value.checked_mul(rhs),
                '/' => value.checked_div(rhs),
                _ => value.checked_rem(rhs),
            }
            .ok_or_else(|| self.overflow())?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<i64> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                let value = self.unary()?;
                value.checked_neg().ok_or_else(|| self.overflow())
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<i64> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| TilingError::parse(self.line, "unexpected end of expression"))?;
        self.pos += 1;

        match token {
            Token::Number(value) => Ok(value),
            Token::Ident(name) => match self.defines.get(&name) {
                Some(Some(value)) => Ok(*value),
                Some(None) => Err(TilingError::parse(self.line, format!("{} has no value", name))),
                None => Err(TilingError::parse(self.line, format!("undefined name {}", name))),
            },
            Token::Open => {
                let value = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    _ => Err(TilingError::parse(self.line, "missing ')'")),
                }
            }
            other => Err(TilingError::parse(self.line, format!("unexpected {:?}", other))),
        }
    }
}
