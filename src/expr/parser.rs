use super::lexer::{Token, TokenKind, lex};
use super::{BinOp, Func, Node, ParseError};

/// Longest accepted expression source, in bytes.
pub const MAX_SOURCE_LEN: usize = 1024;

/// Deepest accepted nesting of sub-expressions and calls.
pub const MAX_DEPTH: usize = 64;

const PREFIX_BP: u8 = 45;

pub(crate) fn parse(src: &str) -> Result<Node, ParseError> {
    if src.len() > MAX_SOURCE_LEN {
        return Err(ParseError::new(
            MAX_SOURCE_LEN,
            format!("expression longer than {MAX_SOURCE_LEN} bytes"),
        ));
    }
    let tokens = lex(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_expr(0)?;
    match parser.peek() {
        TokenKind::Eof => Ok(node),
        other => Err(parser.error(format!("unexpected {}", describe(other)))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.pos)
    }

    fn next(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.offset(), message)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                describe(expected),
                describe(self.peek())
            )))
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!("expression nested deeper than {MAX_DEPTH} levels")));
        }
        Ok(())
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Node, ParseError> {
        self.enter()?;
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(op) = infix_op(self.peek()) else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.next();
            let rhs = self.parse_expr(r_bp)?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        self.depth -= 1;
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Node, ParseError> {
        let start = self.offset();
        match self.next() {
            TokenKind::Number(v) => Ok(Node::Number(v)),
            TokenKind::Minus => {
                let operand = self.parse_expr(PREFIX_BP)?;
                Ok(Node::Negate(Box::new(operand)))
            }
            TokenKind::Plus => self.parse_expr(PREFIX_BP),
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.parse_ident(&name, start),
            other => Err(ParseError::new(start, format!("unexpected {}", describe(&other)))),
        }
    }

    fn parse_ident(&mut self, name: &str, start: usize) -> Result<Node, ParseError> {
        if *self.peek() == TokenKind::LParen {
            let func = Func::from_name(name)
                .ok_or_else(|| ParseError::new(start, format!("unknown function '{name}'")))?;
            self.next();
            let args = self.parse_args()?;
            if !func.accepts(args.len()) {
                return Err(ParseError::new(
                    start,
                    format!("{name}() takes {}, got {}", func.arity_hint(), args.len()),
                ));
            }
            return Ok(Node::Call(func, args));
        }

        match name {
            "x" => Ok(Node::Var),
            "pi" => Ok(Node::Number(std::f64::consts::PI)),
            "e" => Ok(Node::Number(std::f64::consts::E)),
            _ => Err(ParseError::new(start, format!("unknown name '{name}'"))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        if *self.peek() == TokenKind::RParen {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.next() {
                TokenKind::Comma => {}
                TokenKind::RParen => return Ok(args),
                other => {
                    return Err(self.error(format!("expected ',' or ')', found {}", describe(&other))));
                }
            }
        }
    }
}

fn infix_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Rem,
        TokenKind::StarStar => BinOp::Pow,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Le => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::Ge => BinOp::Ge,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::Ne,
        _ => return None,
    };
    Some(op)
}

/// `(left, right)` binding powers. Power is right-associative and binds
/// tighter than unary minus, so `-x**2` is `-(x**2)`.
fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => (10, 11),
        BinOp::Add | BinOp::Sub => (30, 31),
        BinOp::Mul | BinOp::Div | BinOp::Rem => (40, 41),
        BinOp::Pow => (51, 50),
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(v) => format!("number {v}"),
        TokenKind::Ident(name) => format!("'{name}'"),
        TokenKind::Plus => "'+'".into(),
        TokenKind::Minus => "'-'".into(),
        TokenKind::Star => "'*'".into(),
        TokenKind::StarStar => "'**'".into(),
        TokenKind::Slash => "'/'".into(),
        TokenKind::Percent => "'%'".into(),
        TokenKind::Lt => "'<'".into(),
        TokenKind::Le => "'<='".into(),
        TokenKind::Gt => "'>'".into(),
        TokenKind::Ge => "'>='".into(),
        TokenKind::EqEq => "'=='".into(),
        TokenKind::NotEq => "'!='".into(),
        TokenKind::LParen => "'('".into(),
        TokenKind::RParen => "')'".into(),
        TokenKind::Comma => "','".into(),
        TokenKind::Eof => "end of expression".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let node = parse("1 + 2 * x").expect("parses");
        assert_eq!(
            node,
            Node::Binary(
                BinOp::Add,
                Box::new(Node::Number(1.0)),
                Box::new(Node::Binary(
                    BinOp::Mul,
                    Box::new(Node::Number(2.0)),
                    Box::new(Node::Var)
                ))
            )
        );
    }

    #[test]
    fn test_power_is_right_associative_and_beats_negation() {
        let node = parse("-2**3**2").expect("parses");
        let Node::Negate(inner) = node else {
            panic!("expected negation at the root");
        };
        assert!(matches!(*inner, Node::Binary(BinOp::Pow, _, ref rhs) if matches!(**rhs, Node::Binary(BinOp::Pow, _, _))));
    }

    #[test]
    fn test_rejects_unknown_names() {
        assert!(parse("y + 1").is_err());
        assert!(parse("open(x)").is_err());
        assert!(parse("__import__").is_err());
    }

    #[test]
    fn test_arity_checked_at_parse_time() {
        assert!(parse("sqrt(x, 2)").is_err());
        assert!(parse("pow(x)").is_err());
        assert!(parse("max(x, 1, 2)").is_ok());
        assert!(parse("round(x, 2)").is_ok());
    }

    #[test]
    fn test_trailing_and_missing_tokens() {
        assert!(parse("x +").is_err());
        assert!(parse("(x").is_err());
        assert!(parse("x x").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_limits() {
        let deep = format!("{}x{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse(&deep).is_err());

        let long = format!("x{}", " + 1".repeat(MAX_SOURCE_LEN));
        assert!(parse(&long).is_err());
    }
}
