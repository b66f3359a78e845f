//! # Error Types
//!
//! General error handling for the memory bridge.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages. The `Display` text is the English message; scripts
//! see the text produced by the configured [`Localizer`](crate::messages::Localizer).

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::messages::{render, Localizer, MessageKey};
use crate::types::Address;

/// Main error type for bridge operations
///
/// ## Error Categories
///
/// 1. **Call errors**: WrongArgumentCount, InvalidArgument, BadArgumentType
/// 2. **Policy errors**: SandboxViolation
/// 3. **Configuration errors**: InvalidRange, InvalidAddress
/// 4. **Host errors**: Lua, Io
///
/// Call and policy errors abort the current script call only. Memory is
/// never touched when any of them is returned.
#[derive(Error, Debug)]
pub enum BridgeError
{
    /// The operation was called with the wrong number of arguments
    #[error("Wrong number of arguments to {operation}: expected {expected}, got {got}")]
    WrongArgumentCount
    {
        /// Registered name of the operation
        operation: &'static str,
        /// Arity of the operation
        expected: usize,
        /// Number of arguments the script passed
        got: usize,
    },

    /// An argument failed a range check
    ///
    /// Examples:
    /// - A bit index outside `0..32`
    /// - A bit value other than `0`, `1`, `true` or `false`
    /// - A zero capacity for a bounded string write
    #[error("Invalid argument #{position} to {operation}")]
    InvalidArgument
    {
        /// 1-based argument position
        position: usize,
        /// Registered name of the operation
        operation: &'static str,
    },

    /// An argument has the wrong script type
    ///
    /// Raised when, for example, an address is a table or a value to be
    /// written as an integer has a fractional part.
    #[error("Bad argument #{position} to {operation} ({expected} expected, got {got})")]
    BadArgumentType
    {
        /// 1-based argument position
        position: usize,
        /// Registered name of the operation
        operation: &'static str,
        /// What the operation expected
        expected: &'static str,
        /// Script type name of what was passed
        got: String,
    },

    /// A sandboxed script tried to write outside the sandbox range
    #[error("Sandboxed script cannot write to {address} ({operation})")]
    SandboxViolation
    {
        /// Registered name of the operation
        operation: &'static str,
        /// Target of the rejected write
        address: Address,
    },

    /// A sandbox range whose start lies past its end
    #[error("Invalid sandbox range: {start}..={end}")]
    InvalidRange
    {
        /// Lower bound
        start: Address,
        /// Upper bound
        end: Address,
    },

    /// A string that could not be parsed as an address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Error raised by the Lua runtime itself
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// I/O error (reading a script file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError
{
    /// Message catalogue entry used when this error is raised to a script.
    ///
    /// Host-side errors have no catalogue entry.
    pub fn message_key(&self) -> Option<MessageKey>
    {
        match self {
            BridgeError::WrongArgumentCount { .. } => Some(MessageKey::WrongNumberOfArguments),
            BridgeError::InvalidArgument { .. } => Some(MessageKey::InvalidFunctionArgument),
            BridgeError::BadArgumentType { .. } => Some(MessageKey::BadArgumentType),
            BridgeError::SandboxViolation { .. } => Some(MessageKey::ScriptSandboxInvalidAddress),
            _ => None,
        }
    }

    /// Positional arguments substituted into the message template.
    pub fn message_args(&self) -> Vec<String>
    {
        match self {
            BridgeError::WrongArgumentCount { operation, .. } => vec![(*operation).to_string()],
            BridgeError::InvalidArgument { position, operation } => {
                vec![position.to_string(), (*operation).to_string()]
            }
            BridgeError::BadArgumentType {
                position,
                operation,
                expected,
                got,
            } => vec![
                position.to_string(),
                (*operation).to_string(),
                (*expected).to_string(),
                got.clone(),
            ],
            _ => Vec::new(),
        }
    }

    /// Render the message a script sees for this error.
    pub fn localized(&self, localizer: &dyn Localizer) -> String
    {
        match self.message_key() {
            Some(key) => render(&localizer.template(key), &self.message_args()),
            None => self.to_string(),
        }
    }

    /// Find the bridge error carried by a Lua error, if any.
    ///
    /// Errors raised by an accessor reach the host wrapped in one or more
    /// `CallbackError` layers; this walks through them.
    pub fn from_lua_error(error: &mlua::Error) -> Option<&BridgeError>
    {
        match error {
            mlua::Error::CallbackError { cause, .. } => Self::from_lua_error(cause),
            mlua::Error::WithContext { cause, .. } => Self::from_lua_error(cause),
            mlua::Error::ExternalError(inner) => inner.downcast_ref::<ScriptError>().map(ScriptError::error),
            _ => None,
        }
    }
}

/// The value raised into Lua when an accessor fails.
///
/// `Display` is the localised message; the typed error stays available as the
/// error source.
#[derive(Debug, Clone)]
pub struct ScriptError
{
    message: String,
    error: Arc<BridgeError>,
}

impl ScriptError
{
    /// Pair an error with its rendered message.
    pub fn new(error: BridgeError, localizer: &dyn Localizer) -> Self
    {
        Self {
            message: error.localized(localizer),
            error: Arc::new(error),
        }
    }

    /// The rendered message.
    pub fn message(&self) -> &str
    {
        &self.message
    }

    /// The typed error.
    pub fn error(&self) -> &BridgeError
    {
        &self.error
    }
}

impl fmt::Display for ScriptError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ScriptError
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
    {
        Some(self.error.as_ref())
    }
}

/// Convenience type alias for `Result<T, BridgeError>`
///
/// ```rust
/// use memlua_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;
