//! Derived numeric columns.
//!
//! Every function here produces a brand new column named `target`; the
//! dispatcher decides whether it is appended or overwrites an existing one.

use super::Transformed;
use super::coerce::parse_float;
use crate::dataset::{CellValue, Column, ColumnType};
use crate::expr::Expression;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FromStr for BinaryOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" | "sub" => Ok(Self::Subtract),
            "multiply" | "mul" => Ok(Self::Multiply),
            "divide" | "div" => Ok(Self::Divide),
            other => Err(format!("unknown binary operator '{other}'")),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `x / 100`
    Percent,
    Negate,
    Square,
    SquareRoot,
    NaturalLog,
}

impl FromStr for UnaryOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" => Ok(Self::Percent),
            "negate" | "neg" => Ok(Self::Negate),
            "square" => Ok(Self::Square),
            "sqrt" => Ok(Self::SquareRoot),
            "log" | "ln" => Ok(Self::NaturalLog),
            other => Err(format!("unknown unary operator '{other}'")),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Percent => "percent",
            Self::Negate => "negate",
            Self::Square => "square",
            Self::SquareRoot => "sqrt",
            Self::NaturalLog => "log",
        };
        f.write_str(name)
    }
}

/// Row-wise `a op b` over two numeric columns of equal length.
///
/// Add, subtract and multiply of two integer columns stay integer (overflow
/// becomes null); every other combination and every division produce float.
/// A null operand gives null; division by zero gives null and is counted.
pub fn binary(a: &Column, b: &Column, op: BinaryOp, target: &str) -> Transformed {
    let integral =
        a.kind() == ColumnType::Integer && b.kind() == ColumnType::Integer && op != BinaryOp::Divide;
    let mut nulled = 0;

    let cells = a
        .cells()
        .iter()
        .zip(b.cells())
        .map(|(lhs, rhs)| {
            let result = match (lhs, rhs) {
                (CellValue::Integer(x), CellValue::Integer(y)) if integral => {
                    checked_integer(op, *x, *y).map(CellValue::Integer)
                }
                _ => match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(x), Some(y)) => float_binary(op, x, y).map(CellValue::Float),
                    _ => return CellValue::Null,
                },
            };
            result.unwrap_or_else(|| {
                nulled += 1;
                CellValue::Null
            })
        })
        .collect();

    let kind = if integral { ColumnType::Integer } else { ColumnType::Float };
    Transformed {
        column: Column::from_parts(target, kind, cells),
        nulled,
    }
}

fn checked_integer(op: BinaryOp, x: i64, y: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => x.checked_add(y),
        BinaryOp::Subtract => x.checked_sub(y),
        BinaryOp::Multiply => x.checked_mul(y),
        BinaryOp::Divide => x.checked_div(y),
    }
}

fn float_binary(op: BinaryOp, x: f64, y: f64) -> Option<f64> {
    let value = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Subtract => x - y,
        BinaryOp::Multiply => x * y,
        BinaryOp::Divide if y == 0.0 => return None,
        BinaryOp::Divide => x / y,
    };
    value.is_finite().then_some(value)
}

/// Row-wise unary operation over a column of any type.
///
/// Text cells are parsed as numbers first; cells that do not parse become
/// null and are counted. Negate and square keep an integer column integer,
/// the remaining operators always produce float. `sqrt` of a negative value
/// and `log` of a non-positive value give null.
pub fn unary(column: &Column, op: UnaryOp, target: &str) -> Transformed {
    let integral =
        column.kind() == ColumnType::Integer && matches!(op, UnaryOp::Negate | UnaryOp::Square);
    let mut nulled = 0;

    let cells = column
        .cells()
        .iter()
        .map(|cell| {
            if cell.is_null() {
                return CellValue::Null;
            }
            let result = match cell {
                CellValue::Integer(v) if integral => checked_unary(op, *v).map(CellValue::Integer),
                other => numeric(other)
                    .and_then(|v| float_unary(op, v))
                    .map(CellValue::Float),
            };
            result.unwrap_or_else(|| {
                nulled += 1;
                CellValue::Null
            })
        })
        .collect();

    let kind = if integral { ColumnType::Integer } else { ColumnType::Float };
    Transformed {
        column: Column::from_parts(target, kind, cells),
        nulled,
    }
}

fn checked_unary(op: UnaryOp, v: i64) -> Option<i64> {
    match op {
        UnaryOp::Negate => v.checked_neg(),
        UnaryOp::Square => v.checked_mul(v),
        _ => None,
    }
}

fn float_unary(op: UnaryOp, v: f64) -> Option<f64> {
    let value = match op {
        UnaryOp::Percent => v / 100.0,
        UnaryOp::Negate => -v,
        UnaryOp::Square => v * v,
        UnaryOp::SquareRoot if v < 0.0 => return None,
        UnaryOp::SquareRoot => v.sqrt(),
        UnaryOp::NaturalLog if v <= 0.0 => return None,
        UnaryOp::NaturalLog => v.ln(),
    };
    value.is_finite().then_some(value)
}

/// Evaluate `expression` once per row with `x` bound to the source value.
/// The result is a float column; rows whose evaluation fails are null.
pub fn custom(column: &Column, expression: &Expression, target: &str) -> Transformed {
    let mut nulled = 0;
    let cells = column
        .cells()
        .iter()
        .map(|cell| {
            if cell.is_null() {
                return CellValue::Null;
            }
            match numeric(cell).map(|x| expression.eval(x)) {
                Some(Ok(v)) => CellValue::Float(v),
                _ => {
                    nulled += 1;
                    CellValue::Null
                }
            }
        })
        .collect();

    Transformed {
        column: Column::from_parts(target, ColumnType::Float, cells),
        nulled,
    }
}

/// An all-null float column, the result of an expression that failed to parse.
pub fn null_column(target: &str, len: usize) -> Column {
    Column::from_parts(target, ColumnType::Float, vec![CellValue::Null; len])
}

fn numeric(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Text(s) => parse_float(s),
        other => other.as_f64(),
    }
}
