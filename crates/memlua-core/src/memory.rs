//! # Raw Memory Access
//!
//! Unchecked reads and writes at script-supplied addresses.
//!
//! Every function here dereferences an integer as a pointer. Nothing checks
//! that the address is mapped, aligned, or large enough; that is the capability
//! the bridge hands to scripts. Accesses are unaligned so that a script can
//! reinterpret any byte offset at any width.
//!
//! The callers in [`crate::ops`] validate arguments and consult the
//! [`SandboxPolicy`](crate::policy::SandboxPolicy) before reaching these.

use std::ffi::CStr;
use std::ptr;

use libc::c_char;

use crate::types::Address;

/// Number of addressable bits in the word used by the bit accessors.
pub const WORD_BITS: u32 = u32::BITS;

/// Read a `T` at `address`.
///
/// # Safety
///
/// `address..address + size_of::<T>()` must be readable, and any bit pattern
/// there must be a valid `T` (true for the integer and float scalars).
pub unsafe fn read_scalar<T: Copy>(address: Address) -> T
{
    ptr::read_unaligned(address.as_ptr::<T>())
}

/// Store `value` at `address`.
///
/// # Safety
///
/// `address..address + size_of::<T>()` must be writable and not in use by
/// anything that relies on it staying unchanged.
pub unsafe fn write_scalar<T: Copy>(address: Address, value: T)
{
    ptr::write_unaligned(address.as_mut_ptr::<T>(), value);
}

/// Read bit `bit` of the 32-bit word at `address`.
///
/// # Safety
///
/// Same as [`read_scalar`] for a `u32`. `bit` must be below [`WORD_BITS`].
pub unsafe fn read_bit(address: Address, bit: u32) -> bool
{
    debug_assert!(bit < WORD_BITS);
    (read_scalar::<u32>(address) >> bit) & 1 == 1
}

/// Set bit `bit` of the 32-bit word at `address` to `value`.
///
/// The word is adjusted by adding or subtracting the bit's weight rather than
/// masking. Nothing is written when the bit already holds `value`. Returns
/// whether memory was written.
///
/// # Safety
///
/// Same as [`write_scalar`] for a `u32`. `bit` must be below [`WORD_BITS`].
pub unsafe fn write_bit(address: Address, bit: u32, value: bool) -> bool
{
    debug_assert!(bit < WORD_BITS);
    let word = read_scalar::<u32>(address);
    let current = (word >> bit) & 1 == 1;
    if current == value {
        return false;
    }

    let weight = 1u32 << bit;
    let updated = if current { word.wrapping_sub(weight) } else { word.wrapping_add(weight) };
    write_scalar(address, updated);
    true
}

/// Read the NUL-terminated byte string at `address`, without the terminator.
///
/// # Safety
///
/// There must be a readable NUL byte at or after `address`, with every byte
/// before it readable. There is no length limit.
pub unsafe fn read_cstring(address: Address) -> Vec<u8>
{
    CStr::from_ptr(address.as_ptr::<c_char>()).to_bytes().to_vec()
}

/// Copy `bytes` and a terminating NUL to `address`.
///
/// Copying stops at the first NUL inside `bytes`. The destination length is
/// not checked: a source longer than the destination overruns it.
///
/// # Safety
///
/// `address..address + n + 1` must be writable, where `n` is the number of
/// bytes before the first NUL in `bytes` (or `bytes.len()`).
pub unsafe fn write_cstring(address: Address, bytes: &[u8])
{
    let len = nul_prefix_len(bytes);
    let dest = address.as_mut_ptr::<u8>();
    ptr::copy(bytes.as_ptr(), dest, len);
    dest.add(len).write(0);
}

/// Like [`write_cstring`] but never writes more than `capacity` bytes,
/// terminator included. Returns the number of bytes copied before the NUL.
///
/// # Safety
///
/// `address..address + capacity` must be writable and `capacity` must be at
/// least 1.
pub unsafe fn write_cstring_bounded(address: Address, bytes: &[u8], capacity: usize) -> usize
{
    debug_assert!(capacity >= 1);
    let len = nul_prefix_len(bytes).min(capacity - 1);
    let dest = address.as_mut_ptr::<u8>();
    ptr::copy(bytes.as_ptr(), dest, len);
    dest.add(len).write(0);
    len
}

fn nul_prefix_len(bytes: &[u8]) -> usize
{
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}
