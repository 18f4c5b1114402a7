//! VM configuration.

use crate::alloc::{AllocationStrategy, SystemAllocation};

/// Options fixed when a VM is loaded.
///
/// ```
/// use nvm_vm::{Budget, VmConfig};
///
/// let config = VmConfig::new()
///     .allocation(Budget::new(1024))
///     .strict_version(true);
/// assert!(config.is_strict_version());
/// ```
#[derive(Debug)]
pub struct VmConfig {
    pub(crate) allocation: Box<dyn AllocationStrategy>,
    pub(crate) strict_version: bool,
}

impl VmConfig {
    /// The default configuration: unbounded allocation, any header version.
    pub fn new() -> Self {
        Self {
            allocation: Box::new(SystemAllocation),
            strict_version: false,
        }
    }

    /// Use `strategy` to account for stack slots, bindings, blocks and frames.
    pub fn allocation(mut self, strategy: impl AllocationStrategy + 'static) -> Self {
        self.allocation = Box::new(strategy);
        self
    }

    /// Reject buffers whose major version differs from
    /// [`Version::CURRENT`](nvm_common::Version::CURRENT).
    pub fn strict_version(mut self, strict: bool) -> Self {
        self.strict_version = strict;
        self
    }

    pub fn is_strict_version(&self) -> bool {
        self.strict_version
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self::new()
    }
}
