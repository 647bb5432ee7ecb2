use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use resonance_core::catalogue::{self, Arity};
use resonance_core::{Address, CallContext, RecordingSink, ResonanceEngine, U256, evaluate};
use resonance_store::{Config, DataDir, Store};

#[derive(Parser)]
#[command(name = "rcalc", about = "Resonance calculator engine CLI")]
struct Cli {
    /// Identity the call is made as (default: the zero identity, which holds no role)
    #[arg(long = "as", global = true, default_value_t = Address::ZERO)]
    caller: Address,

    /// Data directory (default: $RC_DATA_DIR, then ~/.resonance-calc)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config and a fresh engine
    Init {
        #[arg(long)]
        curator: Address,
        #[arg(long)]
        oracle: Address,
        #[arg(long)]
        keeper: Address,
        /// Deployment time in Unix seconds (default: now)
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Show engine state
    Status,

    /// List catalogue functions
    List,

    /// Evaluate a pure catalogue function
    Eval {
        function: String,
        #[arg(value_parser = parse_u256)]
        args: Vec<U256>,
    },

    /// Resolve a triad and record the result
    ResolveTriad {
        #[arg(value_parser = parse_u256)]
        a: U256,
        #[arg(value_parser = parse_u256)]
        b: U256,
        #[arg(value_parser = parse_u256)]
        c: U256,
    },

    /// Compute a flux value
    Flux {
        #[arg(value_parser = parse_u256)]
        magnitude: U256,
        #[arg(value_parser = parse_u256)]
        phase: U256,
    },

    /// Write a harmonic slot (keeper)
    StoreHarmonic {
        #[arg(value_parser = parse_u256)]
        slot: U256,
        #[arg(value_parser = parse_u256)]
        value: U256,
    },

    /// Read a harmonic slot
    GetHarmonic {
        #[arg(value_parser = parse_u256)]
        slot: U256,
    },

    /// Set the magnitude bound (curator)
    SetBound {
        #[arg(value_parser = parse_u256)]
        bound: U256,
    },

    /// Record an oracle result (oracle)
    Oracle {
        #[arg(value_parser = parse_u256)]
        query_id: U256,
        #[arg(value_parser = parse_u256)]
        result: U256,
    },

    /// Read the last result for a query id
    OracleResult {
        #[arg(value_parser = parse_u256)]
        query_id: U256,
    },

    /// Set the current phase (keeper)
    PhaseLock {
        #[arg(value_parser = parse_u256)]
        phase: U256,
    },

    /// Append a resonant value at the next slot (keeper)
    RecordPoint {
        #[arg(value_parser = parse_u256)]
        value: U256,
    },

    /// Run the super calculation over a list of values
    SuperCalc {
        #[arg(required = true, value_parser = parse_u256)]
        values: Vec<U256>,
        /// Value attached to the call, forwarded to the keeper
        #[arg(long, default_value = "0", value_parser = parse_u256)]
        value: U256,
    },

    /// Verify a triad and record the verdict
    VerifyTriad {
        #[arg(value_parser = parse_u256)]
        a: U256,
        #[arg(value_parser = parse_u256)]
        b: U256,
        #[arg(value_parser = parse_u256)]
        c: U256,
    },

    /// Send value to the engine; it is forwarded to the keeper
    SendValue {
        #[arg(value_parser = parse_u256)]
        amount: U256,
    },

    /// Show the most recent event records as JSON lines
    Events {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Export engine state and event log to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Replace engine state from a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },
}

/// Decimal, or hex with a `0x` prefix.
fn parse_u256(s: &str) -> std::result::Result<U256, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{e:?}")),
        None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Init {
            curator,
            oracle,
            keeper,
            timestamp,
        } => cmd_init(&cli, *curator, *oracle, *keeper, *timestamp),
        Commands::Status => cmd_status(&cli),
        Commands::List => cmd_list(),
        Commands::Eval { function, args } => cmd_eval(function, args),
        Commands::ResolveTriad { a, b, c } => {
            with_call(&cli, U256::zero(), "resolve-triad", |engine, ctx, _| {
                let (sum, root) = engine.resolve_triad(ctx, *a, *b, *c)?;
                Ok(format!("sum={sum} root={root}"))
            })
        }
        Commands::Flux { magnitude, phase } => {
            with_call(&cli, U256::zero(), "flux", |engine, ctx, _| {
                Ok(engine.compute_flux(ctx, *magnitude, *phase)?.to_string())
            })
        }
        Commands::StoreHarmonic { slot, value } => {
            with_call(&cli, U256::zero(), "store-harmonic", |engine, ctx, _| {
                engine.store_harmonic(ctx, *slot, *value)?;
                Ok(format!("slot {slot} = {value}"))
            })
        }
        Commands::GetHarmonic { slot } => {
            let session = Session::open(&cli)?;
            println!("{}", session.engine.get_harmonic(*slot)?);
            Ok(())
        }
        Commands::SetBound { bound } => {
            with_call(&cli, U256::zero(), "set-bound", |engine, ctx, _| {
                engine.set_magnitude_bound(ctx, *bound)?;
                Ok(format!("magnitude bound = {bound}"))
            })
        }
        Commands::Oracle { query_id, result } => {
            with_call(&cli, U256::zero(), "oracle", |engine, ctx, _| {
                engine.invoke_oracle(ctx, *query_id, *result)?;
                Ok(format!("query {query_id} = {result}"))
            })
        }
        Commands::OracleResult { query_id } => {
            let session = Session::open(&cli)?;
            println!("{}", session.engine.get_last_oracle_result(*query_id)?);
            Ok(())
        }
        Commands::PhaseLock { phase } => {
            with_call(&cli, U256::zero(), "phase-lock", |engine, ctx, _| {
                engine.update_phase_lock(ctx, *phase)?;
                Ok(format!("phase = {phase}"))
            })
        }
        Commands::RecordPoint { value } => {
            with_call(&cli, U256::zero(), "record-point", |engine, ctx, _| {
                let slot = engine.record_resonant_point(ctx, *value)?;
                Ok(format!("slot {slot} = {value}"))
            })
        }
        Commands::SuperCalc { values, value } => {
            with_call(&cli, *value, "super-calc", |engine, ctx, sink| {
                Ok(engine.execute_super_calc(ctx, values, sink)?.to_string())
            })
        }
        Commands::VerifyTriad { a, b, c } => {
            with_call(&cli, U256::zero(), "verify-triad", |engine, ctx, _| {
                Ok(engine.verify_and_emit_triad(ctx, *a, *b, *c)?.to_string())
            })
        }
        Commands::SendValue { amount } => {
            with_call(&cli, *amount, "send-value", |engine, ctx, sink| {
                engine.receive_value(ctx, sink)?;
                Ok(format!("forwarded {amount}"))
            })
        }
        Commands::Events { limit } => cmd_events(&cli, *limit),
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path),
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn data_dir(cli: &Cli) -> DataDir {
    DataDir::resolve(cli.data_dir.as_deref())
}

/// The host side of one command: config, store and the loaded engine.
struct Session {
    store: Store,
    engine: ResonanceEngine,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let data = data_dir(cli);
        if !data.is_initialized() {
            bail!(
                "no engine in {}; run `rcalc init` first",
                data.root().display()
            );
        }
        let config = data.load_config().context("failed to read config")?;
        let store = data.open_store().context("failed to open engine store")?;
        let engine = store
            .load_engine()
            .context("failed to load engine")?
            .context("engine database is empty; run `rcalc init` first")?;

        if config.roles().context("invalid config")? != *engine.roles() {
            tracing::warn!("config roles differ from the stored engine; using the engine's");
        }
        Ok(Session { store, engine })
    }
}

/// Runs one stateful call in a fresh simulated block, then persists the
/// engine and any value the call forwarded.
fn with_call<F>(cli: &Cli, value: U256, name: &str, call: F) -> Result<()>
where
    F: FnOnce(&mut ResonanceEngine, &CallContext, &mut RecordingSink) -> Result<String>,
{
    let mut session = Session::open(cli)?;
    let block = session.store.next_block().context("failed to advance block")?;
    let ctx = CallContext::new(cli.caller, block, now_unix_secs()).with_value(value);
    let mut sink = RecordingSink::new();

    tracing::debug!(call = name, caller = %cli.caller, block, "dispatching");
    let message = match call(&mut session.engine, &ctx, &mut sink) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(call = name, caller = %cli.caller, "call rejected: {err}");
            return Err(err.context(format!("{name} failed")));
        }
    };

    for (to, amount) in &sink.transfers {
        session
            .store
            .record_transfer(block, *to, *amount)
            .context("failed to record transfer")?;
    }
    session
        .store
        .save_engine(&session.engine)
        .context("failed to save engine")?;

    println!("{message}");
    Ok(())
}

fn cmd_init(
    cli: &Cli,
    curator: Address,
    oracle: Address,
    keeper: Address,
    timestamp: Option<u64>,
) -> Result<()> {
    let data = data_dir(cli);
    if data.is_initialized() {
        bail!("{} is already initialized", data.root().display());
    }

    let timestamp = timestamp.unwrap_or_else(now_unix_secs);
    let engine = ResonanceEngine::new(curator, oracle, keeper, timestamp)
        .context("failed to create engine")?;

    let store = data.open_store().context("failed to open engine store")?;
    store.save_engine(&engine).context("failed to save engine")?;
    data.write_config(&Config::new(curator, oracle, keeper))
        .context("failed to write config")?;

    println!(
        "initialized {} (phase {})",
        data.root().display(),
        engine.current_phase()
    );
    Ok(())
}

fn cmd_status(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let engine = &session.engine;
    let roles = engine.roles();
    let store = &session.store;

    println!("curator:          {}", roles.curator());
    println!("oracle:           {}", roles.oracle());
    println!("keeper:           {}", roles.keeper());
    println!("magnitude_bound:  {}", engine.magnitude_bound());
    println!("current_phase:    {}", engine.current_phase());
    println!("harmonic_slots:   {}", engine.harmonic_slot_count());
    println!("oracle_calls:     {}", engine.oracle_call_count());
    println!("flux_count:       {}", engine.flux_count());
    println!("forwarded_total:  {}", engine.forwarded_total());
    println!("block_height:     {}", store.block_height()?);
    println!("events:           {}", store.event_count()?);
    Ok(())
}

fn describe_arity(arity: Arity) -> String {
    match arity {
        Arity::Fixed(n) => format!("{n}"),
        Arity::Array => "array".to_string(),
        Arity::ScalarThenArray => "scalar, array".to_string(),
        Arity::Parallel => "array, array".to_string(),
    }
}

fn cmd_list() -> Result<()> {
    for name in catalogue::names() {
        let arity = catalogue::arity(name)?;
        println!("{name:<28} {}", describe_arity(arity));
    }
    Ok(())
}

fn cmd_eval(function: &str, args: &[U256]) -> Result<()> {
    let output = evaluate(function, args).with_context(|| format!("{function} failed"))?;
    println!("{output}");
    Ok(())
}

fn cmd_events(cli: &Cli, limit: usize) -> Result<()> {
    let session = Session::open(cli)?;
    let records = session
        .store
        .recent_events(limit)
        .context("failed to read events")?;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let session = Session::open(cli)?;
    session
        .store
        .export_json_file(path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(cli: &Cli, path: &Path) -> Result<()> {
    let data = data_dir(cli);
    let store = data.open_store().context("failed to open engine store")?;
    store
        .import_json_file(path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    let engine = store
        .load_engine()
        .context("failed to load engine after import")?
        .context("import produced no engine")?;
    let roles = engine.roles();
    data.write_config(&Config::new(roles.curator(), roles.oracle(), roles.keeper()))
        .context("failed to write config")?;

    println!(
        "imported from {}. slots={}, events={}",
        path.display(),
        engine.harmonic_slot_count(),
        store.event_count()?
    );
    Ok(())
}
