use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use flakeid::{GeneratorConfig, IdLayout, SnowflakeId};

/// Runtime configuration for the `flakeid` binary.
///
/// The generator settings are global flags so they apply to every
/// subcommand: `decode` and `layout` need the same epoch and widths the ids
/// were minted with. All of them can also come from environment variables (or
/// a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Mint and inspect Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Worker id encoded into every minted id.
    ///
    /// Must be unique among all processes minting ids with the same epoch
    /// and layout at the same time, and fit in `worker_id_bits`.
    ///
    /// Environment variable: `SNOWFLAKE_WORKER_ID`
    #[arg(long, env = "SNOWFLAKE_WORKER_ID", default_value_t = 0, global = true)]
    pub worker_id: u64,

    /// Custom epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Defaults to 2025-01-01 00:00:00 UTC.
    ///
    /// Environment variable: `SNOWFLAKE_EPOCH_MILLIS`
    #[arg(
        long,
        env = "SNOWFLAKE_EPOCH_MILLIS",
        default_value_t = GeneratorConfig::default().epoch_millis,
        global = true
    )]
    pub epoch_millis: u64,

    /// Width of the worker id field.
    ///
    /// Environment variable: `SNOWFLAKE_WORKER_ID_BITS`
    #[arg(
        long,
        env = "SNOWFLAKE_WORKER_ID_BITS",
        default_value_t = flakeid::DEFAULT_WORKER_ID_BITS,
        global = true
    )]
    pub worker_id_bits: u8,

    /// Width of the sequence field.
    ///
    /// Environment variable: `SNOWFLAKE_SEQUENCE_BITS`
    #[arg(
        long,
        env = "SNOWFLAKE_SEQUENCE_BITS",
        default_value_t = flakeid::DEFAULT_SEQUENCE_BITS,
        global = true
    )]
    pub sequence_bits: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint new ids and print them, one per line.
    Generate {
        /// Number of ids to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Number of threads sharing one generator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Generator implementation.
        #[arg(long, value_enum, default_value_t = GeneratorKind::Lock)]
        generator: GeneratorKind,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Split ids into timestamp, worker id and sequence.
    Decode {
        /// Ids to decode, as decimal integers.
        #[arg(required = true)]
        ids: Vec<SnowflakeId>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Print the configured layout and its wraparound date.
    Layout,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Mutex-guarded state.
    Lock,
    /// Lock-free compare-and-swap state.
    Atomic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub layout: IdLayout,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let generator = GeneratorConfig {
            worker_id: args.worker_id,
            epoch_millis: args.epoch_millis,
            worker_id_bits: args.worker_id_bits,
            sequence_bits: args.sequence_bits,
        };

        let layout = generator
            .validate()
            .context("SNOWFLAKE_* settings do not describe a usable generator")?;

        if let Command::Generate { count, threads, .. } = &args.command {
            if *threads == 0 {
                bail!("--threads must be greater than 0");
            }
            if *threads > 1 && *count < *threads {
                bail!("--count ({count}) must be at least --threads ({threads})");
            }
        }

        Ok(Self {
            generator,
            layout,
            command: args.command,
        })
    }
}
