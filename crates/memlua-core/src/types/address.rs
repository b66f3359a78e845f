//! Memory address type.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::BridgeError;

/// Strongly typed memory address
///
/// Scripts hand addresses over as plain integers. This wrapper keeps them
/// apart from sizes, bit indices and values once they cross into Rust.
///
/// An address carries no type information: the same value can be read as a
/// `u8` on one call and as an `f32` on the next. Nothing here checks that the
/// address is mapped, aligned, or owned by anything in particular.
///
/// ## Example
///
/// ```rust
/// use memlua_core::types::Address;
///
/// let addr = Address::from(0x4000_0000);
/// let next_addr = addr + 0x10;
/// assert_eq!(next_addr.value(), 0x4000_0010);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// ```rust
    /// use memlua_core::types::Address;
    ///
    /// const RANGE_START: Address = Address::new(0x4000_0000);
    /// assert_eq!(RANGE_START.value(), 0x4000_0000);
    /// ```
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Reinterpret a script integer as an address.
    ///
    /// The bits are kept as-is, so negative integers become addresses at the
    /// top of the address space.
    ///
    /// ```rust
    /// use memlua_core::types::Address;
    ///
    /// assert_eq!(Address::from_script(0x1000).value(), 0x1000);
    /// assert_eq!(Address::from_script(-1).value(), u64::MAX);
    /// ```
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_script(value: i64) -> Self
    {
        Address(value as u64)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use memlua_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// View this address as a pointer to `T`.
    ///
    /// Creating the pointer is safe; dereferencing it is not.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn as_ptr<T>(self) -> *const T
    {
        self.0 as usize as *const T
    }

    /// View this address as a mutable pointer to `T`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn as_mut_ptr<T>(self) -> *mut T
    {
        self.0 as usize as *mut T
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl<T> From<*const T> for Address
{
    fn from(ptr: *const T) -> Self
    {
        Address(ptr as usize as u64)
    }
}

impl<T> From<*mut T> for Address
{
    fn from(ptr: *mut T) -> Self
    {
        Address(ptr as usize as u64)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

/// Parses `0x`-prefixed hexadecimal or plain decimal.
///
/// ```rust
/// use memlua_core::types::Address;
///
/// assert_eq!("0x41B00000".parse::<Address>().unwrap().value(), 0x41B0_0000);
/// assert_eq!("4096".parse::<Address>().unwrap().value(), 4096);
/// assert!("forty".parse::<Address>().is_err());
/// ```
impl FromStr for Address
{
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            u64::from_str_radix(&hex.replace('_', ""), 16)
        } else {
            trimmed.replace('_', "").parse::<u64>()
        };

        parsed
            .map(Address)
            .map_err(|_| BridgeError::InvalidAddress(s.to_string()))
    }
}
