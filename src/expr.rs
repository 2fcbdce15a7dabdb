//! Sandboxed arithmetic expressions for `derive_column` with `custom`.
//!
//! The language is deliberately tiny: numeric literals, the variable `x`,
//! the constants `pi` and `e`, arithmetic (`+ - * / % **`), comparisons
//! (`< <= > >= == !=`, yielding `1.0` or `0.0`), parentheses, and a fixed set
//! of math functions. There are no strings, attributes, assignments or
//! user-defined names, so nothing outside the current row value can be
//! reached. Anything else is a [`ParseError`].
//!
//! ```
//! use datawash::expr::Expression;
//!
//! let expr = Expression::parse("x * x + 1").unwrap();
//! assert_eq!(expr.eval(3.0), Ok(10.0));
//! assert!(Expression::parse("__import__('os')").is_err());
//! ```

mod lexer;
mod parser;

pub use parser::{MAX_DEPTH, MAX_SOURCE_LEN};

use std::fmt;

/// A parsed, validated expression over one variable `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// # Errors
    ///
    /// Returns a [`ParseError`] for anything outside the language, including
    /// unknown names, wrong function arity, sources longer than
    /// [`MAX_SOURCE_LEN`] and nesting deeper than [`MAX_DEPTH`].
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let root = parser::parse(source)?;
        Ok(Self {
            source: source.to_owned(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate for one row value. Any non-finite intermediate result
    /// is an error rather than a value.
    pub fn eval(&self, x: f64) -> Result<f64, EvalError> {
        self.root.eval(x)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Byte offset in the source where the problem was detected.
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    DivisionByZero,
    /// A result was NaN or infinite (domain errors such as `sqrt(-1)` or
    /// `log(0)`, and overflow).
    NonFinite,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => f.write_str("division by zero"),
            Self::NonFinite => f.write_str("result is not a finite number"),
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Var,
    Negate(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Abs,
    Sqrt,
    Ln,
    Log10,
    Log2,
    Exp,
    Floor,
    Ceil,
    Round,
    Trunc,
    Min,
    Max,
    Pow,
    Sin,
    Cos,
    Tan,
}

impl Func {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "log2" => Self::Log2,
            "exp" => Self::Exp,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "trunc" => Self::Trunc,
            "min" => Self::Min,
            "max" => Self::Max,
            "pow" => Self::Pow,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            _ => return None,
        };
        Some(func)
    }

    pub(crate) fn accepts(self, argc: usize) -> bool {
        match self {
            Self::Min | Self::Max => argc >= 2,
            Self::Pow => argc == 2,
            Self::Round => argc == 1 || argc == 2,
            _ => argc == 1,
        }
    }

    pub(crate) fn arity_hint(self) -> &'static str {
        match self {
            Self::Min | Self::Max => "at least 2 arguments",
            Self::Pow => "2 arguments",
            Self::Round => "1 or 2 arguments",
            _ => "1 argument",
        }
    }

    fn call(self, args: &[f64]) -> f64 {
        let first = args.first().copied().unwrap_or(f64::NAN);
        let second = args.get(1).copied();
        match self {
            Self::Abs => first.abs(),
            Self::Sqrt => first.sqrt(),
            Self::Ln => first.ln(),
            Self::Log10 => first.log10(),
            Self::Log2 => first.log2(),
            Self::Exp => first.exp(),
            Self::Floor => first.floor(),
            Self::Ceil => first.ceil(),
            Self::Round => match second {
                None => first.round_ties_even(),
                Some(digits) => {
                    let scale = 10_f64.powi(digits.trunc() as i32);
                    (first * scale).round_ties_even() / scale
                }
            },
            Self::Trunc => first.trunc(),
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Pow => first.powf(second.unwrap_or(f64::NAN)),
            Self::Sin => first.sin(),
            Self::Cos => first.cos(),
            Self::Tan => first.tan(),
        }
    }
}

impl Node {
    fn eval(&self, x: f64) -> Result<f64, EvalError> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Var => x,
            Self::Negate(inner) => -inner.eval(x)?,
            Self::Binary(op, lhs, rhs) => binary(*op, lhs.eval(x)?, rhs.eval(x)?)?,
            Self::Call(func, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(x))
                    .collect::<Result<Vec<_>, _>>()?;
                func.call(&values)
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

fn binary(op: BinOp, a: f64, b: f64) -> Result<f64, EvalError> {
    let truth = |cond: bool| if cond { 1.0 } else { 0.0 };
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinOp::Div => a / b,
        BinOp::Rem if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinOp::Rem => floored_rem(a, b),
        BinOp::Pow => a.powf(b),
        BinOp::Lt => truth(a < b),
        BinOp::Le => truth(a <= b),
        BinOp::Gt => truth(a > b),
        BinOp::Ge => truth(a >= b),
        BinOp::Eq => truth(a == b),
        BinOp::Ne => truth(a != b),
    };
    Ok(value)
}

/// Remainder with the sign of the divisor, so `-1 % 3 == 2`.
fn floored_rem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, x: f64) -> Result<f64, EvalError> {
        Expression::parse(src).expect("parses").eval(x)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("x*x+1", 3.0), Ok(10.0));
        assert_eq!(eval("(x + 1) * 2", 1.5), Ok(5.0));
        assert_eq!(eval("2 ** 3 ** 2", 0.0), Ok(512.0));
        assert_eq!(eval("-x ** 2", 3.0), Ok(-9.0));
        assert_eq!(eval("-1 % 3", 0.0), Ok(2.0));
        assert_eq!(eval("7 % -3", 0.0), Ok(-2.0));
    }

    #[test]
    fn test_comparisons_yield_flags() {
        assert_eq!(eval("x > 2", 3.0), Ok(1.0));
        assert_eq!(eval("x == 2", 3.0), Ok(0.0));
        assert_eq!(eval("(x >= 3) * 10", 3.0), Ok(10.0));
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval("abs(x)", -4.0), Ok(4.0));
        assert_eq!(eval("max(x, 0, 2)", -1.0), Ok(2.0));
        assert_eq!(eval("round(x)", 2.5), Ok(2.0));
        assert_eq!(eval("round(x, 1)", 1.25), Ok(1.2));
        assert_eq!(eval("ln(1)", 0.0), Ok(0.0));
        assert!(eval("log(e) - 1", 0.0).is_ok_and(|v| v.abs() < 1e-12));
        assert!(eval("cos(pi) + 1", 0.0).is_ok_and(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_eval_failures() {
        assert_eq!(eval("1 / x", 0.0), Err(EvalError::DivisionByZero));
        assert_eq!(eval("x % 0", 1.0), Err(EvalError::DivisionByZero));
        assert_eq!(eval("sqrt(x)", -1.0), Err(EvalError::NonFinite));
        assert_eq!(eval("log(x)", 0.0), Err(EvalError::NonFinite));
        assert_eq!(eval("10 ** x", 400.0), Err(EvalError::NonFinite));
    }

    #[test]
    fn test_rejects_code() {
        for src in [
            "__import__('os')",
            "x.__class__",
            "[x for x in range(3)]",
            "lambda: 1",
            "exec",
            "x if x else 1",
        ] {
            assert!(Expression::parse(src).is_err(), "{src} should be rejected");
        }
    }
}
