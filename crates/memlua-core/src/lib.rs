//! # memlua-core
//!
//! Typed process-memory accessors for embedded Lua scripts.
//!
//! This crate provides:
//! - Typed scalar reads and writes (`read_u8`, `write_f32`, ...)
//! - Single-bit reads and writes within a 32-bit word
//! - NUL-terminated string reads and writes
//! - A sandbox policy that restricts where untrusted scripts may write
//! - The registry that binds all of the above into a Lua state
//!
//! ## Why unsafe code is needed
//!
//! Scripts pass integers that are dereferenced as pointers into this
//! process's own address space. That is the capability being granted, so the
//! accessors cannot check that an address is mapped or sized correctly. The
//! only gate is the [`SandboxPolicy`], applied before every write.

#![allow(unsafe_code)] // Raw pointer reinterpretation is the point of this crate

pub mod context;
pub mod error;
pub mod memory;
pub mod messages;
pub mod ops;
pub mod policy;
pub mod registry;
pub mod types;

pub use context::ScriptContext;
// Re-export commonly used types
pub use error::{BridgeError, Result};
pub use policy::{SandboxPolicy, SandboxRange};
pub use registry::{descriptor, MemoryBridge, OperationDescriptor, OPERATIONS};
pub use types::{Address, ScalarKind};
