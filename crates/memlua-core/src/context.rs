//! Per-script trust state.

use mlua::Lua;

/// What the bridge knows about the script running in a Lua state.
///
/// The script manager decides whether a script is sandboxed and installs the
/// context before running it. Accessors only read it, once per write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext
{
    /// Display name of the script, used in log events.
    pub name: Option<String>,
    /// Restrict writes to the sandbox range.
    pub sandboxed: bool,
}

impl ScriptContext
{
    /// A script whose writes are restricted to the sandbox range.
    pub fn sandboxed(name: impl Into<String>) -> Self
    {
        Self {
            name: Some(name.into()),
            sandboxed: true,
        }
    }

    /// A script trusted with full memory access.
    pub fn trusted(name: impl Into<String>) -> Self
    {
        Self {
            name: Some(name.into()),
            sandboxed: false,
        }
    }

    /// Attach this context to `lua`, replacing any previous one.
    pub fn install(self, lua: &Lua) -> Option<ScriptContext>
    {
        lua.set_app_data(self)
    }

    /// Whether the script running in `lua` is sandboxed.
    ///
    /// A state without an installed context counts as sandboxed.
    pub fn is_sandboxed(lua: &Lua) -> bool
    {
        lua.app_data_ref::<ScriptContext>().map_or(true, |context| context.sandboxed)
    }

    /// Name of the script running in `lua`, if one was installed.
    pub fn name_of(lua: &Lua) -> Option<String>
    {
        lua.app_data_ref::<ScriptContext>().and_then(|context| context.name.clone())
    }
}

impl Default for ScriptContext
{
    fn default() -> Self
    {
        Self {
            name: None,
            sandboxed: true,
        }
    }
}
