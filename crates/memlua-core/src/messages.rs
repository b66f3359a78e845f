//! # Script Messages
//!
//! Message catalogue for errors raised into scripts.
//!
//! Every script-visible failure is identified by a [`MessageKey`]. A
//! [`Localizer`] turns the key into a template, and [`render`] fills the
//! template's `{}` placeholders with the error's positional arguments.

use std::borrow::Cow;
use std::fmt;

/// Identifier of a script-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey
{
    /// Arguments: operation name.
    WrongNumberOfArguments,
    /// Arguments: argument position, operation name.
    InvalidFunctionArgument,
    /// No arguments.
    ScriptSandboxInvalidAddress,
    /// Arguments: argument position, operation name, expected type, actual type.
    BadArgumentType,
}

impl MessageKey
{
    /// Every key, in catalogue order.
    pub const ALL: [MessageKey; 4] = [
        MessageKey::WrongNumberOfArguments,
        MessageKey::InvalidFunctionArgument,
        MessageKey::ScriptSandboxInvalidAddress,
        MessageKey::BadArgumentType,
    ];

    /// Stable identifier, suitable as a key into translation files.
    pub const fn id(self) -> &'static str
    {
        match self {
            MessageKey::WrongNumberOfArguments => "lua_error_wrong_number_of_arguments",
            MessageKey::InvalidFunctionArgument => "lua_error_invalid_function_argument",
            MessageKey::ScriptSandboxInvalidAddress => "lua_error_script_sandbox_invalid_address",
            MessageKey::BadArgumentType => "lua_error_bad_argument_type",
        }
    }
}

impl fmt::Display for MessageKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.id())
    }
}

/// Source of message templates.
///
/// Hosts with their own translation tables implement this and hand it to
/// [`MemoryBridge::with_localizer`](crate::registry::MemoryBridge::with_localizer).
pub trait Localizer
{
    /// Template for `key`, with one `{}` per positional argument.
    fn template(&self, key: MessageKey) -> Cow<'static, str>;
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer
{
    fn template(&self, key: MessageKey) -> Cow<'static, str>
    {
        Cow::Borrowed(match key {
            MessageKey::WrongNumberOfArguments => "wrong number of arguments in {}",
            MessageKey::InvalidFunctionArgument => "invalid argument #{} in {}",
            MessageKey::ScriptSandboxInvalidAddress => {
                "this script is sandboxed and cannot write outside of the sandbox range"
            }
            MessageKey::BadArgumentType => "bad argument #{} to '{}' ({} expected, got {})",
        })
    }
}

/// Fill `{}` placeholders in order.
///
/// Placeholders without a matching argument are left as-is; surplus
/// arguments are ignored.
///
/// ```rust
/// use memlua_core::messages::render;
///
/// let args = vec!["2".to_string(), "read_bit".to_string()];
/// assert_eq!(render("invalid argument #{} in {}", &args), "invalid argument #2 in read_bit");
/// ```
pub fn render(template: &str, args: &[String]) -> String
{
    let mut output = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(index) = rest.find("{}") {
        output.push_str(&rest[..index]);
        match args.next() {
            Some(arg) => output.push_str(arg),
            None => output.push_str("{}"),
        }
        rest = &rest[index + 2..];
    }
    output.push_str(rest);
    output
}
