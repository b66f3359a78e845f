//! Example embedding the memory bridge in a host application
//!
//! The host owns a small status block, hands its address to two scripts and
//! lets each of them poke at it:
//!
//! 1. A trusted script, which may write anywhere
//! 2. A sandboxed script whose sandbox range is the status block itself
//! 3. A sandboxed script under the default range, whose write is rejected
//!
//! Run with `RUST_LOG=memlua_core=trace` to see every access.

use memlua_core::{Address, BridgeError, MemoryBridge, SandboxPolicy, SandboxRange, ScriptContext};
use memlua_utils::{error, info, init_logging};
use mlua::Lua;

#[repr(C)]
#[derive(Debug, Default)]
struct Status
{
    flags: u32,
    health: f32,
    name: [u8; 16],
}

fn main() -> Result<(), BridgeError>
{
    let _guard = init_logging().expect("Failed to initialize logging");

    let mut status = Status::default();
    let base = Address::from(std::ptr::from_mut(&mut status));
    let block = SandboxRange::spanning(base, std::mem::size_of::<Status>() as u64);

    // Trusted: the default range does not matter
    let trusted = new_state(ScriptContext::trusted("trusted"), SandboxPolicy::default())?;
    trusted
        .load(format!(
            r"
            write_dword({base}, 0)
            write_bit({base}, 3, true)
            write_float({base} + 4, 100.0)
            write_string8({base} + 8, 'player')
            "
        ))
        .exec()?;
    info!(flags = status.flags, health = status.health, "after trusted script");

    // Sandboxed over the status block: same writes are allowed
    let scoped = new_state(ScriptContext::sandboxed("scoped"), SandboxPolicy::new(block))?;
    let copied: i64 = scoped
        .load(format!(
            r"
            write_f32({base} + 4, read_f32({base} + 4) - 12.5)
            return write_string8_bounded({base} + 8, 'a-very-long-player-name', 16)
            "
        ))
        .eval()?;
    info!(health = status.health, copied, "after scoped script");

    // Sandboxed under the default range: the write is refused
    let confined = new_state(ScriptContext::sandboxed("confined"), SandboxPolicy::default())?;
    if let Err(err) = confined.load(format!("write_dword({base}, 0xFFFFFFFF)")).exec() {
        match BridgeError::from_lua_error(&err) {
            Some(cause) => error!(%cause, "confined script was stopped"),
            None => error!(%err, "confined script failed"),
        }
    }
    info!(flags = status.flags, "status block after all scripts");

    let name_len = status.name.iter().position(|b| *b == 0).unwrap_or(status.name.len());
    println!(
        "flags={:#x} health={} name={}",
        status.flags,
        status.health,
        String::from_utf8_lossy(&status.name[..name_len])
    );
    Ok(())
}

fn new_state(context: ScriptContext, policy: SandboxPolicy) -> Result<Lua, BridgeError>
{
    let lua = Lua::new();
    context.install(&lua);
    MemoryBridge::new(policy).register(&lua)?;
    Ok(lua)
}
