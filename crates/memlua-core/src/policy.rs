//! # Sandbox Policy
//!
//! The single gate between a script and a memory write.
//!
//! A write is allowed when the target address lies inside the sandbox range,
//! or when the script is not sandboxed. Reads are never gated.
//!
//! The range is a plain value injected at construction. It does not change
//! for the lifetime of a [`SandboxPolicy`].

use std::fmt;

use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::types::Address;

/// Inclusive address interval writable by every script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SandboxRange
{
    start: Address,
    end: Address,
}

impl SandboxRange
{
    /// `0x40000000..=0x41B00000`
    pub const DEFAULT: Self = Self {
        start: Address::new(0x4000_0000),
        end: Address::new(0x41B0_0000),
    };

    /// Create a range covering `start..=end`.
    ///
    /// ## Errors
    ///
    /// `InvalidRange` if `start > end`.
    pub fn new(start: Address, end: Address) -> Result<Self>
    {
        if start > end {
            return Err(BridgeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering `len` bytes starting at `start`. A zero `len` is
    /// treated as one byte.
    pub fn spanning(start: Address, len: u64) -> Self
    {
        let end = start + len.saturating_sub(1);
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Lower bound (inclusive).
    pub const fn start(&self) -> Address
    {
        self.start
    }

    /// Upper bound (inclusive).
    pub const fn end(&self) -> Address
    {
        self.end
    }

    /// Whether `address` lies within the range.
    pub fn contains(&self, address: Address) -> bool
    {
        self.start <= address && address <= self.end
    }
}

impl Default for SandboxRange
{
    fn default() -> Self
    {
        Self::DEFAULT
    }
}

impl fmt::Display for SandboxRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Decides whether a write may go ahead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SandboxPolicy
{
    range: SandboxRange,
}

impl SandboxPolicy
{
    /// Create a policy around `range`.
    pub const fn new(range: SandboxRange) -> Self
    {
        Self { range }
    }

    /// The unconditionally writable range.
    pub const fn range(&self) -> SandboxRange
    {
        self.range
    }

    /// `true` if `address` is in range or the script is not sandboxed.
    ///
    /// ```rust
    /// use memlua_core::policy::SandboxPolicy;
    /// use memlua_core::types::Address;
    ///
    /// let policy = SandboxPolicy::default();
    /// assert!(policy.is_write_allowed(Address::new(0x4000_0000), true));
    /// assert!(policy.is_write_allowed(Address::new(0x1000), false));
    /// assert!(!policy.is_write_allowed(Address::new(0x1000), true));
    /// ```
    pub fn is_write_allowed(&self, address: Address, sandboxed: bool) -> bool
    {
        !sandboxed || self.range.contains(address)
    }

    /// Gate a write performed by `operation`.
    ///
    /// ## Errors
    ///
    /// `SandboxViolation` when [`is_write_allowed`](Self::is_write_allowed) is false.
    pub fn check_write(&self, address: Address, sandboxed: bool, operation: &'static str) -> Result<()>
    {
        if self.is_write_allowed(address, sandboxed) {
            return Ok(());
        }

        debug!(operation, %address, range = %self.range, "sandboxed write rejected");
        Err(BridgeError::SandboxViolation { operation, address })
    }
}
