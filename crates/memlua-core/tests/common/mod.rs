//! Shared helpers for the integration tests.

#![allow(dead_code)]

use memlua_core::{Address, BridgeError, MemoryBridge, SandboxPolicy, SandboxRange, ScriptContext};
use mlua::Lua;

/// A Lua state with the bridge registered under `policy`.
pub fn lua_with(context: ScriptContext, policy: SandboxPolicy) -> Lua
{
    let lua = Lua::new();
    context.install(&lua);
    MemoryBridge::new(policy).register(&lua).expect("register bridge");
    lua
}

/// A trusted script under the default policy.
pub fn trusted_lua() -> Lua
{
    lua_with(ScriptContext::trusted("test"), SandboxPolicy::default())
}

/// A sandboxed script under the default policy.
pub fn sandboxed_lua() -> Lua
{
    lua_with(ScriptContext::sandboxed("test"), SandboxPolicy::default())
}

/// A sandboxed script whose sandbox range is exactly `buf`.
pub fn sandboxed_over(buf: &mut [u8]) -> Lua
{
    let range = SandboxRange::spanning(address_of(buf), buf.len() as u64);
    lua_with(ScriptContext::sandboxed("test"), SandboxPolicy::new(range))
}

/// Address of the first byte of `buf`.
pub fn address_of(buf: &mut [u8]) -> Address
{
    Address::from(buf.as_mut_ptr())
}

/// Run `chunk` and return the error it raises.
pub fn run_err(lua: &Lua, chunk: &str) -> mlua::Error
{
    lua.load(chunk).exec().expect_err("chunk should fail")
}

/// The bridge error carried by a failed call.
pub fn bridge_error(error: &mlua::Error) -> &BridgeError
{
    BridgeError::from_lua_error(error).unwrap_or_else(|| panic!("not a bridge error: {error}"))
}

/// Asserts that a heap address is outside the default range, which the
/// sandbox tests rely on.
pub fn assert_outside_default_range(address: Address)
{
    assert!(
        !SandboxRange::DEFAULT.contains(address),
        "test buffer landed inside the default sandbox range: {address}"
    );
}
