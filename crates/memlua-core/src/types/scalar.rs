//! Scalar widths understood by the typed accessors.

use std::fmt;
use std::mem::size_of;

use libc::{c_char, c_int, c_long, c_short};
use mlua::{Integer, Number, Value};

/// Width and signedness of a scalar access.
///
/// Alias names registered by the operation table (`byte`, `word`, `dword`,
/// `float`, `double`) map onto the same variant as their fixed-width
/// counterpart, so every alias of a physical width shares one code path.
/// The native C kinds keep their own variants because their width follows the
/// host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind
{
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 8-bit integer (also `byte`)
    U8,
    /// Unsigned 16-bit integer (also `word`)
    U16,
    /// Unsigned 32-bit integer (also `dword`)
    U32,
    /// Native C `char`
    Char,
    /// Native C `short`
    Short,
    /// Native C `int`
    Int,
    /// Native C `long`
    Long,
    /// 32-bit float (also `float`)
    F32,
    /// 64-bit float (also `double`)
    F64,
}

impl ScalarKind
{
    /// Size of the access in bytes.
    pub const fn width(self) -> usize
    {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::F64 => 8,
            ScalarKind::Char => size_of::<c_char>(),
            ScalarKind::Short => size_of::<c_short>(),
            ScalarKind::Int => size_of::<c_int>(),
            ScalarKind::Long => size_of::<c_long>(),
        }
    }

    /// Whether the access reads or writes a floating-point value.
    pub const fn is_float(self) -> bool
    {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    /// Whether the access is signed. `char` follows the platform.
    #[allow(clippy::unnecessary_cast)]
    pub const fn is_signed(self) -> bool
    {
        match self {
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 => false,
            ScalarKind::Char => (c_char::MIN as i64) < 0,
            _ => true,
        }
    }
}

impl fmt::Display for ScalarKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::Char => "char",
            ScalarKind::Short => "short",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        };
        f.pad(name)
    }
}

/// A native value that can be moved between memory and a Lua value.
///
/// Conversions from script values use `as`, so integers truncate to the
/// target width (300 stored as `u8` is 44) and `f64` rounds to `f32`.
pub trait Scalar: Copy + 'static
{
    /// `true` for floating-point types, which take their value as a Lua number.
    const FLOAT: bool;

    /// Convert to the value handed back to the script.
    fn into_value(self) -> Value;

    /// Convert a script integer to this type.
    fn from_integer(value: Integer) -> Self;

    /// Convert a script number to this type.
    fn from_number(value: Number) -> Self;
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_possible_wrap,
                clippy::unnecessary_cast
            )]
            impl Scalar for $ty
            {
                const FLOAT: bool = false;

                fn into_value(self) -> Value
                {
                    Value::Integer(self as Integer)
                }

                fn from_integer(value: Integer) -> Self
                {
                    value as $ty
                }

                fn from_number(value: Number) -> Self
                {
                    value as $ty
                }
            }
        )*
    };
}

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::unnecessary_cast)]
            impl Scalar for $ty
            {
                const FLOAT: bool = true;

                fn into_value(self) -> Value
                {
                    Value::Number(Number::from(self))
                }

                fn from_integer(value: Integer) -> Self
                {
                    value as $ty
                }

                fn from_number(value: Number) -> Self
                {
                    value as $ty
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, u8, u16, u32);
float_scalar!(f32, f64);
