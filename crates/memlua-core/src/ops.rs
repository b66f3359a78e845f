//! # Accessor Bodies
//!
//! Argument checking and dispatch for every registered operation.
//!
//! Checks run in a fixed order: arity, address type, sandbox gate (writes
//! only), range checks, value type. Memory is only touched once all of them
//! have passed, so a failed call never leaves a partial write behind.

use mlua::{Integer, Lua, Number, Value};
use tracing::trace;

use crate::context::ScriptContext;
use crate::error::{BridgeError, Result};
use crate::memory::{self, WORD_BITS};
use crate::policy::SandboxPolicy;
use crate::types::{Address, Scalar, ScalarKind};

/// Arguments of one script call to a named operation.
pub struct Call<'lua>
{
    lua: &'lua Lua,
    operation: &'static str,
    args: Vec<Value>,
}

impl<'lua> Call<'lua>
{
    /// Bundle the arguments of a call to `operation`.
    pub fn new(lua: &'lua Lua, operation: &'static str, args: Vec<Value>) -> Self
    {
        Self { lua, operation, args }
    }

    /// Registered name of the operation being called.
    pub fn operation(&self) -> &'static str
    {
        self.operation
    }

    fn expect_arity(&self, expected: usize) -> Result<()>
    {
        if self.args.len() == expected {
            return Ok(());
        }
        Err(BridgeError::WrongArgumentCount {
            operation: self.operation,
            expected,
            got: self.args.len(),
        })
    }

    fn arg(&self, position: usize) -> &Value
    {
        // Arity is checked first, so every position asked for exists.
        &self.args[position - 1]
    }

    fn bad_type(&self, position: usize, expected: &'static str) -> BridgeError
    {
        BridgeError::BadArgumentType {
            position,
            operation: self.operation,
            expected,
            got: self.arg(position).type_name().to_string(),
        }
    }

    /// Integer argument. Integral floats and numeric strings convert.
    fn integer(&self, position: usize) -> Result<Integer>
    {
        self.lua
            .coerce_integer(self.arg(position).clone())?
            .ok_or_else(|| self.bad_type(position, "integer"))
    }

    /// Number argument. Numeric strings convert.
    fn number(&self, position: usize) -> Result<Number>
    {
        self.lua
            .coerce_number(self.arg(position).clone())?
            .ok_or_else(|| self.bad_type(position, "number"))
    }

    /// String argument as raw bytes. Numbers convert.
    fn bytes(&self, position: usize) -> Result<Vec<u8>>
    {
        let string = self
            .lua
            .coerce_string(self.arg(position).clone())?
            .ok_or_else(|| self.bad_type(position, "string"))?;
        Ok(string.as_bytes().to_vec())
    }

    fn address(&self, position: usize) -> Result<Address>
    {
        self.integer(position).map(Address::from_script)
    }

    fn bit_index(&self, position: usize) -> Result<u32>
    {
        let bit = self.integer(position)?;
        u32::try_from(bit)
            .ok()
            .filter(|bit| *bit < WORD_BITS)
            .ok_or(BridgeError::InvalidArgument {
                position,
                operation: self.operation,
            })
    }

    fn gate(&self, policy: &SandboxPolicy, address: Address) -> Result<()>
    {
        policy.check_write(address, ScriptContext::is_sandboxed(self.lua), self.operation)
    }
}

/// `read_<type>(address) -> number`
pub fn read_scalar(call: &Call<'_>, kind: ScalarKind) -> Result<Value>
{
    call.expect_arity(1)?;
    let address = call.address(1)?;

    // SAFETY: unchecked access is the capability granted to scripts.
    Ok(unsafe { load(kind, address) })
}

/// `write_<type>(address, value)`
pub fn write_scalar(call: &Call<'_>, policy: &SandboxPolicy, kind: ScalarKind) -> Result<()>
{
    call.expect_arity(2)?;
    let address = call.address(1)?;
    call.gate(policy, address)?;

    trace!(operation = call.operation, %address, "scalar write");
    match kind {
        ScalarKind::I8 => store::<i8>(call, address),
        ScalarKind::I16 => store::<i16>(call, address),
        ScalarKind::I32 => store::<i32>(call, address),
        ScalarKind::U8 => store::<u8>(call, address),
        ScalarKind::U16 => store::<u16>(call, address),
        ScalarKind::U32 => store::<u32>(call, address),
        ScalarKind::Char => store::<libc::c_char>(call, address),
        ScalarKind::Short => store::<libc::c_short>(call, address),
        ScalarKind::Int => store::<libc::c_int>(call, address),
        ScalarKind::Long => store::<libc::c_long>(call, address),
        ScalarKind::F32 => store::<f32>(call, address),
        ScalarKind::F64 => store::<f64>(call, address),
    }
}

unsafe fn load(kind: ScalarKind, address: Address) -> Value
{
    match kind {
        ScalarKind::I8 => memory::read_scalar::<i8>(address).into_value(),
        ScalarKind::I16 => memory::read_scalar::<i16>(address).into_value(),
        ScalarKind::I32 => memory::read_scalar::<i32>(address).into_value(),
        ScalarKind::U8 => memory::read_scalar::<u8>(address).into_value(),
        ScalarKind::U16 => memory::read_scalar::<u16>(address).into_value(),
        ScalarKind::U32 => memory::read_scalar::<u32>(address).into_value(),
        ScalarKind::Char => memory::read_scalar::<libc::c_char>(address).into_value(),
        ScalarKind::Short => memory::read_scalar::<libc::c_short>(address).into_value(),
        ScalarKind::Int => memory::read_scalar::<libc::c_int>(address).into_value(),
        ScalarKind::Long => memory::read_scalar::<libc::c_long>(address).into_value(),
        ScalarKind::F32 => memory::read_scalar::<f32>(address).into_value(),
        ScalarKind::F64 => memory::read_scalar::<f64>(address).into_value(),
    }
}

fn store<T: Scalar>(call: &Call<'_>, address: Address) -> Result<()>
{
    let value = if T::FLOAT {
        T::from_number(call.number(2)?)
    } else {
        T::from_integer(call.integer(2)?)
    };

    // SAFETY: the sandbox gate has passed; the target is the script's responsibility.
    unsafe { memory::write_scalar(address, value) };
    Ok(())
}

/// `read_bit(address, bit) -> 0|1`
pub fn read_bit(call: &Call<'_>) -> Result<Value>
{
    call.expect_arity(2)?;
    let address = call.address(1)?;
    let bit = call.bit_index(2)?;

    // SAFETY: unchecked access is the capability granted to scripts.
    let set = unsafe { memory::read_bit(address, bit) };
    Ok(Value::Integer(Integer::from(set)))
}

/// `write_bit(address, bit, value)`
///
/// `value` is a boolean or the integer 0 or 1.
pub fn write_bit(call: &Call<'_>, policy: &SandboxPolicy) -> Result<()>
{
    call.expect_arity(3)?;
    let address = call.address(1)?;
    call.gate(policy, address)?;
    let bit = call.bit_index(2)?;

    let value = match call.arg(3) {
        Value::Boolean(value) => *value,
        _ => match call.integer(3)? {
            0 => false,
            1 => true,
            _ => {
                return Err(BridgeError::InvalidArgument {
                    position: 3,
                    operation: call.operation,
                })
            }
        },
    };

    // SAFETY: the sandbox gate has passed; the target is the script's responsibility.
    let written = unsafe { memory::write_bit(address, bit, value) };
    trace!(operation = call.operation, %address, bit, value, written, "bit write");
    Ok(())
}

/// `read_string8(address) -> string`
pub fn read_string(call: &Call<'_>) -> Result<Value>
{
    call.expect_arity(1)?;
    let address = call.address(1)?;

    // SAFETY: unchecked access is the capability granted to scripts.
    let bytes = unsafe { memory::read_cstring(address) };
    Ok(Value::String(call.lua.create_string(bytes)?))
}

/// `write_string8(address, value)`
///
/// Unbounded: the destination must already be large enough.
pub fn write_string(call: &Call<'_>, policy: &SandboxPolicy) -> Result<()>
{
    call.expect_arity(2)?;
    let address = call.address(1)?;
    call.gate(policy, address)?;
    let bytes = call.bytes(2)?;

    trace!(operation = call.operation, %address, len = bytes.len(), "string write");
    // SAFETY: the sandbox gate has passed; the target is the script's responsibility.
    unsafe { memory::write_cstring(address, &bytes) };
    Ok(())
}

/// `write_string8_bounded(address, value, capacity) -> copied`
///
/// Writes at most `capacity` bytes including the terminator and returns the
/// number of bytes copied before it.
pub fn write_string_bounded(call: &Call<'_>, policy: &SandboxPolicy) -> Result<Value>
{
    call.expect_arity(3)?;
    let address = call.address(1)?;
    call.gate(policy, address)?;
    let bytes = call.bytes(2)?;
    let capacity = usize::try_from(call.integer(3)?)
        .ok()
        .filter(|capacity| *capacity >= 1)
        .ok_or(BridgeError::InvalidArgument {
            position: 3,
            operation: call.operation,
        })?;

    // SAFETY: the sandbox gate has passed; the target is the script's responsibility.
    let copied = unsafe { memory::write_cstring_bounded(address, &bytes, capacity) };
    trace!(operation = call.operation, %address, capacity, copied, "bounded string write");
    Ok(Value::Integer(Integer::try_from(copied).unwrap_or(Integer::MAX)))
}
