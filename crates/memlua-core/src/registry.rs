//! # Operation Registry
//!
//! Binds every accessor into a Lua state's globals under its fixed name.
//!
//! The set of operations is a static table of [`OperationDescriptor`]s. The
//! table is the only place names are listed; [`MemoryBridge::register`] walks
//! it and creates one Lua function per entry, so aliases of the same width
//! share one implementation by construction.
//!
//! ## Example
//!
//! ```rust
//! use memlua_core::{MemoryBridge, ScriptContext};
//!
//! let lua = mlua::Lua::new();
//! ScriptContext::trusted("example").install(&lua);
//! MemoryBridge::default().register(&lua)?;
//!
//! let mut value = 0u32;
//! let address = std::ptr::from_mut(&mut value) as usize;
//! lua.load(format!("write_dword({address}, 7)")).exec()?;
//! assert_eq!(value, 7);
//! # Ok::<(), memlua_core::BridgeError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mlua::{Lua, MultiValue, Value, Variadic};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{Result, ScriptError};
use crate::messages::{EnglishLocalizer, Localizer};
use crate::ops::{self, Call};
use crate::policy::SandboxPolicy;
use crate::types::ScalarKind;

/// What an operation does when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation
{
    /// `read_<type>(address)`
    ReadScalar(ScalarKind),
    /// `write_<type>(address, value)`
    WriteScalar(ScalarKind),
    /// `read_bit(address, bit)`
    ReadBit,
    /// `write_bit(address, bit, value)`
    WriteBit,
    /// `read_string8(address)`
    ReadString,
    /// `write_string8(address, value)`
    WriteString,
    /// `write_string8_bounded(address, value, capacity)`
    WriteStringBounded,
}

/// Whether an operation reads or writes memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access
{
    /// Never gated by the sandbox policy
    Read,
    /// Gated by the sandbox policy before any mutation
    Write,
}

impl fmt::Display for Access
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Access::Read => f.pad("read"),
            Access::Write => f.pad("write"),
        }
    }
}

/// Script-side kind of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind
{
    /// Integer reinterpreted as a pointer
    Address,
    /// Integer value
    Integer,
    /// Floating-point value
    Number,
    /// Boolean or integer 0/1
    BitValue,
    /// Byte string
    String,
}

impl Operation
{
    /// Argument kinds in call order. The length is the arity.
    pub const fn argument_kinds(self) -> &'static [ArgKind]
    {
        match self {
            Operation::ReadScalar(_) | Operation::ReadString => &[ArgKind::Address],
            Operation::WriteScalar(kind) if kind.is_float() => &[ArgKind::Address, ArgKind::Number],
            Operation::WriteScalar(_) => &[ArgKind::Address, ArgKind::Integer],
            Operation::ReadBit => &[ArgKind::Address, ArgKind::Integer],
            Operation::WriteBit => &[ArgKind::Address, ArgKind::Integer, ArgKind::BitValue],
            Operation::WriteString => &[ArgKind::Address, ArgKind::String],
            Operation::WriteStringBounded => &[ArgKind::Address, ArgKind::String, ArgKind::Integer],
        }
    }

    /// Required number of arguments.
    pub const fn arity(self) -> usize
    {
        self.argument_kinds().len()
    }

    /// Read or write class.
    pub const fn access(self) -> Access
    {
        match self {
            Operation::ReadScalar(_) | Operation::ReadBit | Operation::ReadString => Access::Read,
            _ => Access::Write,
        }
    }

    /// Width of the access in bytes, when fixed. Strings have none.
    pub const fn width(self) -> Option<usize>
    {
        match self {
            Operation::ReadScalar(kind) | Operation::WriteScalar(kind) => Some(kind.width()),
            Operation::ReadBit | Operation::WriteBit => Some(4),
            _ => None,
        }
    }
}

/// A named operation exposed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationDescriptor
{
    /// Global name in the Lua state
    pub name: &'static str,
    /// Behaviour
    pub operation: Operation,
}

impl OperationDescriptor
{
    const fn new(name: &'static str, operation: Operation) -> Self
    {
        Self { name, operation }
    }

    /// Required number of arguments.
    pub const fn arity(&self) -> usize
    {
        self.operation.arity()
    }

    /// Read or write class.
    pub const fn access(&self) -> Access
    {
        self.operation.access()
    }
}

const fn read(name: &'static str, kind: ScalarKind) -> OperationDescriptor
{
    OperationDescriptor::new(name, Operation::ReadScalar(kind))
}

const fn write(name: &'static str, kind: ScalarKind) -> OperationDescriptor
{
    OperationDescriptor::new(name, Operation::WriteScalar(kind))
}

/// Every operation bound by [`MemoryBridge::register`], in registration order.
pub static OPERATIONS: &[OperationDescriptor] = &[
    read("read_i8", ScalarKind::I8),
    write("write_i8", ScalarKind::I8),
    read("read_i16", ScalarKind::I16),
    write("write_i16", ScalarKind::I16),
    read("read_i32", ScalarKind::I32),
    write("write_i32", ScalarKind::I32),
    read("read_u8", ScalarKind::U8),
    write("write_u8", ScalarKind::U8),
    read("read_u16", ScalarKind::U16),
    write("write_u16", ScalarKind::U16),
    read("read_u32", ScalarKind::U32),
    write("write_u32", ScalarKind::U32),
    read("read_byte", ScalarKind::U8),
    write("write_byte", ScalarKind::U8),
    read("read_word", ScalarKind::U16),
    write("write_word", ScalarKind::U16),
    read("read_dword", ScalarKind::U32),
    write("write_dword", ScalarKind::U32),
    read("read_char", ScalarKind::Char),
    write("write_char", ScalarKind::Char),
    read("read_short", ScalarKind::Short),
    write("write_short", ScalarKind::Short),
    read("read_int", ScalarKind::Int),
    write("write_int", ScalarKind::Int),
    read("read_long", ScalarKind::Long),
    write("write_long", ScalarKind::Long),
    read("read_f32", ScalarKind::F32),
    write("write_f32", ScalarKind::F32),
    read("read_f64", ScalarKind::F64),
    write("write_f64", ScalarKind::F64),
    read("read_float", ScalarKind::F32),
    write("write_float", ScalarKind::F32),
    read("read_double", ScalarKind::F64),
    write("write_double", ScalarKind::F64),
    OperationDescriptor::new("read_bit", Operation::ReadBit),
    OperationDescriptor::new("write_bit", Operation::WriteBit),
    OperationDescriptor::new("read_string8", Operation::ReadString),
    OperationDescriptor::new("write_string8", Operation::WriteString),
    OperationDescriptor::new("read_string", Operation::ReadString),
    OperationDescriptor::new("write_string", Operation::WriteString),
    OperationDescriptor::new("write_string8_bounded", Operation::WriteStringBounded),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static OperationDescriptor>> =
    Lazy::new(|| OPERATIONS.iter().map(|descriptor| (descriptor.name, descriptor)).collect());

/// Look up an operation by its registered name.
pub fn descriptor(name: &str) -> Option<&'static OperationDescriptor>
{
    BY_NAME.get(name).copied()
}

struct Shared
{
    policy: SandboxPolicy,
    localizer: Box<dyn Localizer>,
}

/// The memory bridge installed into Lua states.
///
/// Holds the sandbox policy and the message catalogue. Cloning is cheap;
/// every registered function keeps its own handle.
#[derive(Clone)]
pub struct MemoryBridge
{
    shared: Arc<Shared>,
}

impl MemoryBridge
{
    /// Bridge enforcing `policy`, with English messages.
    pub fn new(policy: SandboxPolicy) -> Self
    {
        Self {
            shared: Arc::new(Shared {
                policy,
                localizer: Box::new(EnglishLocalizer),
            }),
        }
    }

    /// Replace the message catalogue.
    #[must_use]
    pub fn with_localizer(self, localizer: impl Localizer + 'static) -> Self
    {
        Self {
            shared: Arc::new(Shared {
                policy: self.shared.policy,
                localizer: Box::new(localizer),
            }),
        }
    }

    /// The policy gating writes.
    pub fn policy(&self) -> SandboxPolicy
    {
        self.shared.policy
    }

    /// Bind every operation in [`OPERATIONS`] into `lua`'s globals.
    ///
    /// Call once per Lua state, before running scripts. Existing globals
    /// with the same names are replaced.
    ///
    /// ## Errors
    ///
    /// `Lua` if a function cannot be created or assigned.
    pub fn register(&self, lua: &Lua) -> Result<()>
    {
        let globals = lua.globals();
        for descriptor in OPERATIONS {
            let function = self.bind(lua, *descriptor)?;
            globals.set(descriptor.name, function)?;
        }

        debug!(
            count = OPERATIONS.len(),
            range = %self.shared.policy.range(),
            "memory operations registered"
        );
        Ok(())
    }

    fn bind(&self, lua: &Lua, descriptor: OperationDescriptor) -> mlua::Result<mlua::Function>
    {
        let bridge = self.clone();
        lua.create_function(move |lua, args: MultiValue| {
            let call = Call::new(lua, descriptor.name, args.into_iter().collect());
            bridge
                .dispatch(&call, descriptor.operation)
                .map(|value| value.into_iter().collect::<Variadic<Value>>())
                .map_err(|err| mlua::Error::external(ScriptError::new(err, bridge.shared.localizer.as_ref())))
        })
    }

    /// Run `operation` for `call`. Writes return no value.
    ///
    /// ## Errors
    ///
    /// Whatever the accessor rejects: arity, argument, or sandbox errors.
    pub fn dispatch(&self, call: &Call<'_>, operation: Operation) -> Result<Option<Value>>
    {
        let policy = &self.shared.policy;
        match operation {
            Operation::ReadScalar(kind) => ops::read_scalar(call, kind).map(Some),
            Operation::WriteScalar(kind) => ops::write_scalar(call, policy, kind).map(|()| None),
            Operation::ReadBit => ops::read_bit(call).map(Some),
            Operation::WriteBit => ops::write_bit(call, policy).map(|()| None),
            Operation::ReadString => ops::read_string(call).map(Some),
            Operation::WriteString => ops::write_string(call, policy).map(|()| None),
            Operation::WriteStringBounded => ops::write_string_bounded(call, policy).map(Some),
        }
    }
}

impl Default for MemoryBridge
{
    fn default() -> Self
    {
        Self::new(SandboxPolicy::default())
    }
}

impl fmt::Debug for MemoryBridge
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("MemoryBridge").field("policy", &self.shared.policy).finish_non_exhaustive()
    }
}
