//! Go-template style actions (`{{.Key}}`, `{{if ...}}`, `{{range ...}}`)
//! compiled into Tera source.
//!
//! Only a small, closed subset is accepted. Anything outside it is reported as
//! a syntax error rather than passed through, so a bundle never renders with
//! half-understood actions.

use std::collections::BTreeSet;

use super::RenderFault;

/// Filter appended to every printed value; formats lists as `[a b c]`.
pub(crate) const DISPLAY_FILTER: &str = "display";

/// Tera source plus every root variable the template reads.
#[derive(Debug)]
pub(crate) struct Compiled {
    pub source: String,
    pub references: BTreeSet<String>,
}

pub(crate) fn compile(text: &str) -> Result<Compiled, RenderFault> {
    let pieces = split(text)?;
    let mut compiler = Compiler::default();

    for piece in pieces {
        match piece {
            Piece::Text(literal) => push_text(&mut compiler.out, &literal),
            Piece::Action { body, line } => compiler.action(&body, line)?,
        }
    }

    if let Some(open) = compiler.blocks.last() {
        return Err(syntax(open.line, "missing {{end}}"));
    }

    Ok(Compiled {
        source: compiler.out,
        references: compiler.references,
    })
}

fn syntax(line: usize, message: impl Into<String>) -> RenderFault {
    RenderFault::Syntax {
        line,
        message: message.into(),
    }
}

#[derive(Debug, PartialEq)]
enum Piece {
    Text(String),
    Action { body: String, line: usize },
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn split(text: &str) -> Result<Vec<Piece>, RenderFault> {
    let mut pieces = Vec::new();
    let mut pos = 0;
    let mut trim_leading = false;

    while let Some(found) = text[pos..].find("{{") {
        let start = pos + found;
        let line = line_at(text, start);

        let mut literal = &text[pos..start];
        if trim_leading {
            literal = literal.trim_start_matches(is_space);
        }

        let mut body_start = start + 2;
        let after = &text[body_start..];
        if after.starts_with('-') && after[1..].starts_with(is_space) {
            literal = literal.trim_end_matches(is_space);
            body_start += 1;
        }

        let close = body_start + find_close(&text[body_start..], line)?;
        let mut body = &text[body_start..close];

        trim_leading = false;
        if body.ends_with('-') && body[..body.len() - 1].ends_with(is_space) {
            trim_leading = true;
            body = &body[..body.len() - 1];
        }

        if !literal.is_empty() {
            pieces.push(Piece::Text(literal.to_string()));
        }
        pieces.push(Piece::Action {
            body: body.trim_matches(is_space).to_string(),
            line,
        });

        pos = close + 2;
    }

    let mut literal = &text[pos..];
    if trim_leading {
        literal = literal.trim_start_matches(is_space);
    }
    if !literal.is_empty() {
        pieces.push(Piece::Text(literal.to_string()));
    }

    Ok(pieces)
}

/// Offset of the `}}` closing an action body, skipping quoted strings and comments.
fn find_close(body: &str, line: usize) -> Result<usize, RenderFault> {
    let trimmed = body.trim_start_matches(is_space);
    if trimmed.starts_with("/*") {
        let comment_start = body.len() - trimmed.len();
        let Some(end) = trimmed.find("*/") else {
            return Err(syntax(line, "unclosed comment"));
        };
        let after = comment_start + end + 2;
        let rest = body[after..].trim_start_matches(is_space);
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        if !rest.starts_with("}}") {
            return Err(syntax(line, "comment must end the action"));
        }
        return Ok(body.len() - rest.len());
    }

    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'`' {
                    i += 1;
                }
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Ok(i),
            _ => {}
        }
        i += 1;
    }

    Err(syntax(line, "unclosed action"))
}

/// Emit literal text, escaping any `{` that Tera would read as a delimiter.
fn push_text(out: &mut String, literal: &str) {
    for (i, c) in literal.char_indices() {
        if c == '{' && matches!(literal[i + 1..].chars().next(), None | Some('{' | '%' | '#')) {
            out.push_str(r#"{{ "{" }}"#);
        } else {
            out.push(c);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `.A.B` (root = false) or `$.A.B` (root = true).
    Field { root: bool, path: Vec<String> },
    Dot,
    Str(String),
    Int(i64),
    Ident(String),
    LParen,
    RParen,
}

fn tokenize(body: &str, line: usize) -> Result<Vec<Token>, RenderFault> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if is_space(c) => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(syntax(line, "unterminated string")),
                        Some('"') => break,
                        Some('\\') => {
                            let escaped = match chars.get(i + 1) {
                                Some('n') => '\n',
                                Some('t') => '\t',
                                Some('"') => '"',
                                Some('\\') => '\\',
                                Some(other) => {
                                    return Err(syntax(line, format!("unknown escape \\{other}")))
                                }
                                None => return Err(syntax(line, "unterminated string")),
                            };
                            value.push(escaped);
                            i += 2;
                        }
                        Some(&other) => {
                            value.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
                i += 1;
            }
            '`' => {
                let start = i + 1;
                let Some(len) = chars[start..].iter().position(|&ch| ch == '`') else {
                    return Err(syntax(line, "unterminated raw string"));
                };
                tokens.push(Token::Str(chars[start..start + len].iter().collect()));
                i = start + len + 1;
            }
            '.' => {
                let (path, next) = read_path(&chars, i);
                tokens.push(if path.is_empty() {
                    Token::Dot
                } else {
                    Token::Field { root: false, path }
                });
                i = next;
            }
            '$' => {
                if chars.get(i + 1) != Some(&'.') {
                    return Err(syntax(line, "template variables are not supported"));
                }
                let (path, next) = read_path(&chars, i + 1);
                if path.is_empty() {
                    return Err(syntax(line, "`$.` must name a variable"));
                }
                tokens.push(Token::Field { root: true, path });
                i = next;
            }
            '|' => return Err(syntax(line, "pipelines are not supported")),
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[start..i].iter().collect();
                let value = digits
                    .parse()
                    .map_err(|_| syntax(line, format!("invalid number {digits}")))?;
                tokens.push(Token::Int(value));
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(syntax(line, format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Read `.A.B.C` starting at a `.`; returns the segments and the next index.
fn read_path(chars: &[char], mut i: usize) -> (Vec<String>, usize) {
    let mut path = Vec::new();
    while chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|&c| is_ident_start(c)) {
        let start = i + 1;
        i = start;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        path.push(chars[start..i].iter().collect());
    }
    if path.is_empty() {
        i += 1;
    }
    (path, i)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Not,
    And,
    Or,
    Len,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "lt" => Self::Lt,
            "le" => Self::Le,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "len" => Self::Len,
            _ => return None,
        })
    }

    fn check_arity(self, count: usize, line: usize) -> Result<(), RenderFault> {
        let ok = match self {
            Self::Eq => count >= 2,
            Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => count == 2,
            Self::Not | Self::Len => count == 1,
            Self::And | Self::Or => count >= 1,
        };
        if ok {
            Ok(())
        } else {
            Err(syntax(line, format!("wrong number of arguments for {self:?}").to_lowercase()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Field { root: bool, path: Vec<String> },
    Dot,
    Str(String),
    Int(i64),
    Bool(bool),
    Call { func: Func, args: Vec<Expr> },
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl Parser<'_> {
    /// A full command: `func arg...` or a single operand.
    fn command(&mut self) -> Result<Expr, RenderFault> {
        if let Some(Token::Ident(name)) = self.tokens.get(self.pos) {
            if let Some(func) = Func::lookup(name) {
                self.pos += 1;
                let mut args = Vec::new();
                while self.pos < self.tokens.len() && self.tokens[self.pos] != Token::RParen {
                    args.push(self.operand()?);
                }
                func.check_arity(args.len(), self.line)?;
                return Ok(Expr::Call { func, args });
            }
        }
        self.operand()
    }

    fn operand(&mut self) -> Result<Expr, RenderFault> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(syntax(self.line, "missing value"));
        };
        self.pos += 1;

        match token {
            Token::Field { root, path } => Ok(Expr::Field { root, path }),
            Token::Dot => Ok(Expr::Dot),
            Token::Str(value) => Ok(Expr::Str(value)),
            Token::Int(value) => Ok(Expr::Int(value)),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                _ if Func::lookup(&name).is_some() => Err(syntax(
                    self.line,
                    format!("call to {name} must be parenthesised when used as an argument"),
                )),
                _ => Err(syntax(self.line, format!("function {name} is not defined"))),
            },
            Token::LParen => {
                let inner = self.command()?;
                if self.tokens.get(self.pos) != Some(&Token::RParen) {
                    return Err(syntax(self.line, "missing )"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Token::RParen => Err(syntax(self.line, "unexpected )")),
        }
    }
}

fn parse_expr(tokens: &[Token], line: usize) -> Result<Expr, RenderFault> {
    if tokens.is_empty() {
        return Err(syntax(line, "missing value"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        line,
    };
    let expr = parser.command()?;
    if parser.pos != tokens.len() {
        return Err(syntax(line, "unexpected trailing tokens"));
    }
    Ok(expr)
}

/// Pushes a negation down to the leaves. Tera only accepts `not` in front of
/// a comparison, never in front of a parenthesised `and`/`or`.
/// Returns `None` for leaves, which are negated with a plain `not`.
fn negate(expr: &Expr) -> Option<Expr> {
    let Expr::Call { func, args } = expr else {
        return None;
    };
    let call = |func: Func, args: Vec<Expr>| Some(Expr::Call { func, args });
    let flip = |func: Func| call(func, args.clone());

    match func {
        Func::Not => Some(args[0].clone()),
        Func::And | Func::Or => {
            let dual = if *func == Func::And { Func::Or } else { Func::And };
            let negated = args
                .iter()
                .map(|arg| {
                    negate(arg).unwrap_or_else(|| Expr::Call {
                        func: Func::Not,
                        args: vec![arg.clone()],
                    })
                })
                .collect();
            call(dual, negated)
        }
        Func::Eq if args.len() == 2 => flip(Func::Ne),
        Func::Eq => {
            let tests = args[1..]
                .iter()
                .map(|right| Expr::Call {
                    func: Func::Ne,
                    args: vec![args[0].clone(), right.clone()],
                })
                .collect();
            call(Func::And, tests)
        }
        Func::Ne => flip(Func::Eq),
        Func::Lt => flip(Func::Ge),
        Func::Le => flip(Func::Gt),
        Func::Gt => flip(Func::Le),
        Func::Ge => flip(Func::Lt),
        Func::Len => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Prec {
    /// A value or filtered value; usable anywhere.
    Atom,
    /// `a == b`, `not a`; usable as a logic operand.
    Test,
    /// `a and b`; needs parentheses as an operand.
    Logic,
}

#[derive(Debug)]
enum BlockKind {
    If { has_else: bool },
    Range { var: String },
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    line: usize,
}

#[derive(Default)]
struct Compiler {
    out: String,
    references: BTreeSet<String>,
    blocks: Vec<Block>,
}

impl Compiler {
    fn action(&mut self, body: &str, line: usize) -> Result<(), RenderFault> {
        if body.starts_with("/*") {
            return Ok(());
        }

        let tokens = tokenize(body, line)?;
        let keyword = match tokens.first() {
            Some(Token::Ident(name)) => name.as_str(),
            None => return Err(syntax(line, "empty action")),
            _ => "",
        };

        match keyword {
            "if" => {
                let cond = self.expr(&parse_expr(&tokens[1..], line)?, line)?.0;
                self.out.push_str(&format!("{{% if {cond} %}}"));
                self.blocks.push(Block {
                    kind: BlockKind::If { has_else: false },
                    line,
                });
            }
            "else" => self.else_branch(&tokens[1..], line)?,
            "end" => {
                if tokens.len() != 1 {
                    return Err(syntax(line, "unexpected tokens after end"));
                }
                let Some(block) = self.blocks.pop() else {
                    return Err(syntax(line, "unexpected {{end}}"));
                };
                self.out.push_str(match block.kind {
                    BlockKind::If { .. } => "{% endif %}",
                    BlockKind::Range { .. } => "{% endfor %}",
                });
            }
            "range" => {
                let source = parse_expr(&tokens[1..], line)?;
                if !matches!(source, Expr::Field { .. } | Expr::Dot) {
                    return Err(syntax(line, "range expects a variable"));
                }
                let list = self.expr(&source, line)?.0;
                let var = format!("__item{}", self.range_depth());
                self.out.push_str(&format!("{{% for {var} in {list} %}}"));
                self.blocks.push(Block {
                    kind: BlockKind::Range { var },
                    line,
                });
            }
            "with" | "define" | "template" | "block" | "break" | "continue" => {
                return Err(syntax(line, format!("{{{{{keyword}}}}} is not supported")));
            }
            _ => {
                let (value, prec) = self.expr(&parse_expr(&tokens, line)?, line)?;
                if prec == Prec::Atom {
                    self.out.push_str(&format!("{{{{ {value} | {DISPLAY_FILTER} }}}}"));
                } else {
                    self.out.push_str(&format!("{{{{ {value} }}}}"));
                }
            }
        }

        Ok(())
    }

    fn else_branch(&mut self, rest: &[Token], line: usize) -> Result<(), RenderFault> {
        let Some(block) = self.blocks.last_mut() else {
            return Err(syntax(line, "unexpected {{else}}"));
        };
        let BlockKind::If { has_else } = &mut block.kind else {
            return Err(syntax(line, "{{else}} inside range is not supported"));
        };
        if *has_else {
            return Err(syntax(line, "{{else}} after final {{else}}"));
        }

        match rest.first() {
            None => {
                *has_else = true;
                self.out.push_str("{% else %}");
            }
            Some(Token::Ident(name)) if name == "if" => {
                let cond = self.expr(&parse_expr(&rest[1..], line)?, line)?.0;
                self.out.push_str(&format!("{{% elif {cond} %}}"));
            }
            Some(_) => return Err(syntax(line, "expected {{else}} or {{else if ...}}")),
        }
        Ok(())
    }

    fn range_depth(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Range { .. }))
            .count()
    }

    fn range_var(&self) -> Option<&str> {
        self.blocks.iter().rev().find_map(|b| match &b.kind {
            BlockKind::Range { var } => Some(var.as_str()),
            BlockKind::If { .. } => None,
        })
    }

    fn expr(&mut self, expr: &Expr, line: usize) -> Result<(String, Prec), RenderFault> {
        match expr {
            Expr::Field { root, path } => {
                let joined = path.join(".");
                match self.range_var() {
                    Some(var) if !root => Ok((format!("{var}.{joined}"), Prec::Atom)),
                    _ => {
                        self.references.insert(path[0].clone());
                        Ok((joined, Prec::Atom))
                    }
                }
            }
            Expr::Dot => match self.range_var() {
                Some(var) => Ok((var.to_string(), Prec::Atom)),
                None => Err(syntax(line, "`.` is only supported inside range")),
            },
            Expr::Str(value) => {
                let Some(quote) = ['"', '\'', '`'].into_iter().find(|q| !value.contains(*q)) else {
                    return Err(syntax(line, "string literal mixes every quote character"));
                };
                Ok((format!("{quote}{value}{quote}"), Prec::Atom))
            }
            Expr::Int(value) => Ok((value.to_string(), Prec::Atom)),
            Expr::Bool(value) => Ok((value.to_string(), Prec::Atom)),
            Expr::Call { func, args } => self.call(*func, args, line),
        }
    }

    fn comparison_operand(&mut self, expr: &Expr, line: usize) -> Result<String, RenderFault> {
        let (value, prec) = self.expr(expr, line)?;
        if prec != Prec::Atom {
            return Err(syntax(line, "comparison operands must be plain values"));
        }
        Ok(value)
    }

    fn logic_operand(&mut self, expr: &Expr, line: usize) -> Result<String, RenderFault> {
        let (value, prec) = self.expr(expr, line)?;
        Ok(if prec == Prec::Logic {
            format!("({value})")
        } else {
            value
        })
    }

    fn call(&mut self, func: Func, args: &[Expr], line: usize) -> Result<(String, Prec), RenderFault> {
        let binary = |op: &str, this: &mut Self| -> Result<(String, Prec), RenderFault> {
            let left = this.comparison_operand(&args[0], line)?;
            let right = this.comparison_operand(&args[1], line)?;
            Ok((format!("{left} {op} {right}"), Prec::Test))
        };

        match func {
            Func::Eq => {
                let left = self.comparison_operand(&args[0], line)?;
                let mut tests = Vec::with_capacity(args.len() - 1);
                for arg in &args[1..] {
                    let right = self.comparison_operand(arg, line)?;
                    tests.push(format!("{left} == {right}"));
                }
                let prec = if tests.len() == 1 { Prec::Test } else { Prec::Logic };
                Ok((tests.join(" or "), prec))
            }
            Func::Ne => binary("!=", self),
            Func::Lt => binary("<", self),
            Func::Le => binary("<=", self),
            Func::Gt => binary(">", self),
            Func::Ge => binary(">=", self),
            Func::Not => match negate(&args[0]) {
                Some(rewritten) => self.expr(&rewritten, line),
                None => {
                    let inner = self.comparison_operand(&args[0], line)?;
                    Ok((format!("not {inner}"), Prec::Test))
                }
            },
            Func::And | Func::Or => {
                let op = if func == Func::And { " and " } else { " or " };
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.logic_operand(arg, line)?);
                }
                let prec = if parts.len() == 1 { Prec::Test } else { Prec::Logic };
                Ok((parts.join(op), prec))
            }
            Func::Len => {
                let inner = self.comparison_operand(&args[0], line)?;
                Ok((format!("{inner} | length"), Prec::Atom))
            }
        }
    }
}
