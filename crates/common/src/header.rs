//! The 3-byte version header that opens every bytecode buffer.
//!
//! ```text
//! Byte 0: major (u8)
//! Byte 1: minor (u8)
//! Byte 2: patch (u8)
//! Byte 3..: instruction stream
//! ```

use std::fmt;

use crate::error::DecodeError;

/// Length of the version header in bytes.
pub const HEADER_LEN: usize = 3;

/// Bytecode format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    /// The version written by this toolchain.
    pub const CURRENT: Version = Version::new(0, 0, 1);

    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Read the header from the start of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Self, DecodeError> {
        match bytes {
            [major, minor, patch, ..] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(DecodeError::MissingHeader { len: bytes.len() }),
        }
    }

    /// The header as it appears on the wire.
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        [self.major, self.minor, self.patch]
    }

    /// Two versions are compatible when their major numbers agree.
    pub fn is_compatible_with(&self, other: &Version) -> bool {
        self.major == other.major
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_exact_header() {
        assert_eq!(Version::read(&[0, 0, 1]), Ok(Version::CURRENT));
    }

    #[test]
    fn read_ignores_trailing_code() {
        assert_eq!(Version::read(&[1, 2, 3, 0x00, 0x0B]), Ok(Version::new(1, 2, 3)));
    }

    #[test]
    fn short_buffers_have_no_header() {
        assert_eq!(
            Version::read(&[]),
            Err(DecodeError::MissingHeader { len: 0 })
        );
        assert_eq!(
            Version::read(&[0, 0]),
            Err(DecodeError::MissingHeader { len: 2 })
        );
    }

    #[test]
    fn compatibility_is_by_major() {
        assert!(Version::new(0, 3, 9).is_compatible_with(&Version::CURRENT));
        assert!(!Version::new(1, 0, 1).is_compatible_with(&Version::CURRENT));
    }

    #[test]
    fn display() {
        assert_eq!(Version::new(2, 10, 0).to_string(), "2.10.0");
        assert_eq!(Version::CURRENT.to_bytes(), [0, 0, 1]);
    }
}
