//! The sidebar four-function calculator.

use crate::GameError;
use rust_decimal::Decimal;

/// Calculator operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalcOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl CalcOp {
    /// Parse the operator symbol offered by the UI.
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(CalcOp::Add),
            "-" => Some(CalcOp::Sub),
            "*" => Some(CalcOp::Mul),
            "/" => Some(CalcOp::Div),
            _ => None,
        }
    }
}

/// Evaluate a single operation. Division by zero yields
/// [`GameError::DivisionByZero`] rather than any numeric result.
pub fn calculate(lhs: Decimal, op: CalcOp, rhs: Decimal) -> Result<Decimal, GameError> {
    match op {
        CalcOp::Add => Ok(lhs + rhs),
        CalcOp::Sub => Ok(lhs - rhs),
        CalcOp::Mul => Ok(lhs * rhs),
        CalcOp::Div => {
            if rhs == Decimal::ZERO {
                Err(GameError::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
    }
}
