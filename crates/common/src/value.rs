//! Runtime value representation for the NVM.
//!
//! Values live on the operand stack and in variable bindings. They move
//! between the two; a `LOAD_NAME` is the only place a value is copied.

use std::fmt;

use crate::type_tag::TypeTag;

/// Runtime value representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed 32-bit integer.
    Int(i32),
}

impl Value {
    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(Value::Int(42).type_tag(), TypeTag::Int);
    }

    #[test]
    fn equality() {
        assert_eq!(Value::Int(42), Value::from(42));
        assert_ne!(Value::Int(42), Value::Int(43));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(-13).to_string(), "-13");
        assert_eq!(Value::Int(-13).as_int(), Some(-13));
    }
}
