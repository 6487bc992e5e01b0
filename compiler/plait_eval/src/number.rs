//! Numeric atoms.
//!
//! Three cast levels: `Int32` (0), `Int64` (1), `Float` (2). Binary
//! operations promote both operands to the higher level first. Integer
//! arithmetic wraps; integer division or remainder by zero is an error.

use std::fmt;

use crate::errors::{division_by_zero, EvalResult};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Float(f64),
}

impl Number {
    pub fn cast_level(self) -> u8 {
        match self {
            Number::Int32(_) => 0,
            Number::Int64(_) => 1,
            Number::Float(_) => 2,
        }
    }

    /// Convert to the given cast level. Narrowing truncates.
    #[must_use]
    pub fn cast_to(self, level: u8) -> Number {
        match level {
            0 => Number::Int32(self.to_i32()),
            1 => Number::Int64(self.to_i64()),
            _ => Number::Float(self.to_f64()),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "narrowing casts are the documented conversion"
    )]
    pub fn to_i32(self) -> i32 {
        match self {
            Number::Int32(v) => v,
            Number::Int64(v) => v as i32,
            Number::Float(v) => v as i32,
        }
    }

    /// The value as an `i32` when it is an integer that fits.
    pub fn exact_i32(self) -> Option<i32> {
        match self {
            Number::Int32(v) => Some(v),
            Number::Int64(v) => i32::try_from(v).ok(),
            Number::Float(_) => None,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to integer conversion truncates"
    )]
    pub fn to_i64(self) -> i64 {
        match self {
            Number::Int32(v) => i64::from(v),
            Number::Int64(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "i64 to f64 loses precision above 2^53"
    )]
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int32(v) => f64::from(v),
            Number::Int64(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Zero of the same type.
    #[must_use]
    pub fn zero(self) -> Number {
        match self {
            Number::Int32(_) => Number::Int32(0),
            Number::Int64(_) => Number::Int64(0),
            Number::Float(_) => Number::Float(0.0),
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int32(v) => v == 0,
            Number::Int64(v) => v == 0,
            Number::Float(v) => v == 0.0,
        }
    }

    fn promote(self, other: Number) -> (Number, Number) {
        let level = self.cast_level().max(other.cast_level());
        (self.cast_to(level), other.cast_to(level))
    }

    #[must_use]
    pub fn add(self, other: Number) -> Number {
        match self.promote(other) {
            (Number::Int32(a), Number::Int32(b)) => Number::Int32(a.wrapping_add(b)),
            (Number::Int64(a), Number::Int64(b)) => Number::Int64(a.wrapping_add(b)),
            (a, b) => Number::Float(a.to_f64() + b.to_f64()),
        }
    }

    #[must_use]
    pub fn sub(self, other: Number) -> Number {
        match self.promote(other) {
            (Number::Int32(a), Number::Int32(b)) => Number::Int32(a.wrapping_sub(b)),
            (Number::Int64(a), Number::Int64(b)) => Number::Int64(a.wrapping_sub(b)),
            (a, b) => Number::Float(a.to_f64() - b.to_f64()),
        }
    }

    #[must_use]
    pub fn mul(self, other: Number) -> Number {
        match self.promote(other) {
            (Number::Int32(a), Number::Int32(b)) => Number::Int32(a.wrapping_mul(b)),
            (Number::Int64(a), Number::Int64(b)) => Number::Int64(a.wrapping_mul(b)),
            (a, b) => Number::Float(a.to_f64() * b.to_f64()),
        }
    }

    pub fn div(self, other: Number) -> EvalResult<Number> {
        match self.promote(other) {
            (Number::Int32(_), Number::Int32(0)) | (Number::Int64(_), Number::Int64(0)) => {
                Err(division_by_zero())
            }
            (Number::Int32(a), Number::Int32(b)) => Ok(Number::Int32(a.wrapping_div(b))),
            (Number::Int64(a), Number::Int64(b)) => Ok(Number::Int64(a.wrapping_div(b))),
            (a, b) => Ok(Number::Float(a.to_f64() / b.to_f64())),
        }
    }

    pub fn rem(self, other: Number) -> EvalResult<Number> {
        match self.promote(other) {
            (Number::Int32(_), Number::Int32(0)) | (Number::Int64(_), Number::Int64(0)) => {
                Err(division_by_zero())
            }
            (Number::Int32(a), Number::Int32(b)) => Ok(Number::Int32(a.wrapping_rem(b))),
            (Number::Int64(a), Number::Int64(b)) => Ok(Number::Int64(a.wrapping_rem(b))),
            (a, b) => Ok(Number::Float(a.to_f64() % b.to_f64())),
        }
    }

    #[must_use]
    pub fn neg(self) -> Number {
        self.zero().sub(self)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int32(v) => write!(f, "{v}"),
            Number::Int64(v) => write!(f, "{v}L"),
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}
