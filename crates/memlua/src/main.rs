use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use memlua_core::{Address, BridgeError, MemoryBridge, Result, SandboxPolicy, SandboxRange, ScriptContext, OPERATIONS};
use memlua_utils::{debug, info, init_logging_with_config, LogFormat, LogLevel, LoggingConfig};
use mlua::Lua;

/// Run Lua scripts with typed access to process memory.
#[derive(Parser, Debug)]
#[command(name = "memlua")]
#[command(version)]
#[command(about = "Run Lua scripts with typed access to process memory behind a sandbox write gate", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format: pretty or json (overrides MEMLUA_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Run a Lua script with the memory operations installed
    Run
    {
        /// Path to the Lua script
        script: PathBuf,
        /// Restrict the script's writes to the sandbox range
        #[arg(long, default_value_t = false)]
        sandboxed: bool,
        /// Script name used in messages (defaults to the path)
        #[arg(long)]
        name: Option<String>,
        /// Allocate a zeroed scratch buffer of this many bytes, exposed as SCRATCH / SCRATCH_LEN
        #[arg(long)]
        scratch: Option<usize>,
        /// Use the scratch buffer as the sandbox range
        #[arg(long, default_value_t = false, requires = "scratch")]
        scratch_sandbox: bool,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// List every operation the bridge registers
    Ops,
    /// Check whether a write to an address would be allowed
    Check
    {
        /// Target address (hex format: 0x1000 or decimal)
        address: Address,
        /// Evaluate for a sandboxed script
        #[arg(long, default_value_t = false)]
        sandboxed: bool,
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Args, Debug)]
struct RangeArgs
{
    /// First address of the sandbox range (inclusive)
    #[arg(long)]
    range_start: Option<Address>,
    /// Last address of the sandbox range (inclusive)
    #[arg(long)]
    range_end: Option<Address>,
}

impl RangeArgs
{
    fn range(&self) -> Result<SandboxRange>
    {
        let default = SandboxRange::DEFAULT;
        SandboxRange::new(
            self.range_start.unwrap_or(default.start()),
            self.range_end.unwrap_or(default.end()),
        )
    }
}

fn main()
{
    let cli = Cli::parse();

    let mut config = LoggingConfig::from_env();
    config.level = cli.log_level;
    if let Some(format) = cli.log_format {
        config.format = format;
    }
    let _guard = match init_logging_with_config(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command) {
        match &e {
            BridgeError::Lua(lua_error) => match BridgeError::from_lua_error(lua_error) {
                Some(cause) => eprintln!("Error: {}\n{}", cause, lua_error),
                None => eprintln!("Error: {}", lua_error),
            },
            _ => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<()>
{
    match command {
        Commands::Run {
            script,
            sandboxed,
            name,
            scratch,
            scratch_sandbox,
            range,
        } => run_script(&script, sandboxed, name, scratch, scratch_sandbox, &range),
        Commands::Ops => {
            print_operations();
            Ok(())
        }
        Commands::Check {
            address,
            sandboxed,
            range,
        } => {
            let policy = SandboxPolicy::new(range.range()?);
            let verdict = if policy.is_write_allowed(address, sandboxed) {
                "allowed"
            } else {
                "denied"
            };
            println!(
                "write to {} by a {} script: {} (sandbox range {})",
                address,
                if sandboxed { "sandboxed" } else { "trusted" },
                verdict,
                policy.range()
            );
            Ok(())
        }
    }
}

fn run_script(
    script: &Path,
    sandboxed: bool,
    name: Option<String>,
    scratch: Option<usize>,
    scratch_sandbox: bool,
    range: &RangeArgs,
) -> Result<()>
{
    let source = std::fs::read_to_string(script)?;
    let name = name.unwrap_or_else(|| script.display().to_string());

    let lua = Lua::new();
    ScriptContext {
        name: Some(name.clone()),
        sandboxed,
    }
    .install(&lua);

    // Lives until the script has finished; scripts hold its address.
    let mut scratch = scratch.map(|len| vec![0u8; len]);
    let mut range = range.range()?;
    if let Some(buffer) = scratch.as_mut() {
        let address = Address::from(buffer.as_mut_ptr());
        let globals = lua.globals();
        globals.set("SCRATCH", address.value())?;
        globals.set("SCRATCH_LEN", buffer.len())?;
        debug!(%address, len = buffer.len(), "scratch buffer allocated");

        if scratch_sandbox {
            range = SandboxRange::spanning(address, buffer.len() as u64);
        }
    }

    let bridge = MemoryBridge::new(SandboxPolicy::new(range));
    bridge.register(&lua)?;

    info!(script = %name, sandboxed, %range, "running script");
    lua.load(source.as_str()).set_name(name.as_str()).exec()?;
    info!(script = %name, "script finished");

    drop(scratch);
    Ok(())
}

fn print_operations()
{
    println!("{:<24} {:<6} {:>5} {:>6}", "NAME", "ACCESS", "ARITY", "WIDTH");
    for descriptor in OPERATIONS {
        let width = descriptor
            .operation
            .width()
            .map_or_else(|| "-".to_string(), |width| width.to_string());
        println!(
            "{:<24} {:<6} {:>5} {:>6}",
            descriptor.name,
            descriptor.access(),
            descriptor.arity(),
            width
        );
    }
}
