//! Type tags for runtime values.

/// Identifies which variant a [`Value`](crate::Value) holds.
///
/// The machine is defined over 32-bit signed integers only; the tag exists
/// so further variants can be added without changing the value's shape.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed 32-bit integer.
    Int = 0x01,
}

impl TypeTag {
    /// Returns the display name for this type tag.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "INT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(TypeTag::Int.name(), "INT");
    }
}
