//! Arithmetic operations
//!
//! The four operations form a closed set. Each one is a pure function of its
//! two operands; division is the only one that can fail.

mod types;

pub use types::{OperationRequest, OperationResult};

/// Failure of an arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Binary operation selected by the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Route path bound to this operation
    pub const fn path(self) -> &'static str {
        match self {
            Self::Add => "/soma",
            Self::Subtract => "/subtracao",
            Self::Multiply => "/multiplicacao",
            Self::Divide => "/divisao",
        }
    }

    /// Exact path lookup, no prefixes or trailing slashes
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.path() == path)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Apply the operation to `(a, b)` in that order.
    ///
    /// Division checks `b == 0.0` with plain IEEE equality, so `-0.0` is
    /// rejected too. No other input is rejected: NaN and infinities pass
    /// straight through the arithmetic.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, OperationError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide => {
                if b == 0.0 {
                    return Err(OperationError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
