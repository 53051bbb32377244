use anyhow::{Context, bail};
use bigid::{BigId, ClockBase};
use clap::{Parser, Subcommand};

/// Upper bound on `--count`, to keep a typo from flooding the terminal.
pub const MAX_COUNT: usize = 1_000_000;

/// Command-line configuration for the `bigid` binary.
///
/// Every option can also come from the environment (or a `.env` file in the
/// working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bigid",
    version,
    about = "Generate and inspect time-ordered 64-bit shard IDs"
)]
pub struct CliArgs {
    /// Clock base as milliseconds since the Unix epoch (UTC).
    ///
    /// IDs only decode to the right creation time under the base they were
    /// generated with. Defaults to 2015-06-06 00:00:00 local time.
    ///
    /// Environment variable: `BIGID_CLOCK_BASE_MS`
    #[arg(
        long,
        env = "BIGID_CLOCK_BASE_MS",
        global = true,
        allow_negative_numbers = true
    )]
    pub clock_base_ms: Option<i64>,

    /// Print JSON instead of plain text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate new IDs.
    Generate {
        /// Shard ID written into every generated ID.
        ///
        /// Values above 255 are truncated to their low 8 bits unless
        /// `--strict` is set.
        ///
        /// Environment variable: `BIGID_SHARD_ID`
        #[arg(long, env = "BIGID_SHARD_ID", default_value_t = 0)]
        shard_id: u64,

        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Reject shard IDs above 255 instead of truncating them.
        ///
        /// Environment variable: `BIGID_STRICT`
        #[arg(long, env = "BIGID_STRICT", default_value_t = false)]
        strict: bool,
    },

    /// Decode IDs into version, reserved, timestamp, shard, sequence and
    /// creation time.
    Decode {
        /// IDs in signed decimal form.
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<String>,
    },

    /// Print the shard ID carried by each ID.
    Shard {
        /// IDs in signed decimal form.
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<String>,
    },

    /// Print the shard-only placeholder ID for a shard.
    Placeholder {
        shard_id: u64,

        /// Reject shard IDs above 255 instead of truncating them.
        #[arg(long, env = "BIGID_STRICT", default_value_t = false)]
        strict: bool,
    },
}

/// What to do, with every input already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate {
        shard_id: u64,
        count: usize,
        strict: bool,
    },
    Decode(Vec<BigId>),
    Shard(Vec<BigId>),
    Placeholder {
        shard_id: u64,
        strict: bool,
    },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub clock_base: ClockBase,
    pub json: bool,
    pub action: Action,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let clock_base = match args.clock_base_ms {
            Some(ms) => match ClockBase::from_utc_millis(ms) {
                Some(base) => base,
                None => bail!("BIGID_CLOCK_BASE_MS ({ms}) is outside the representable range"),
            },
            None => ClockBase::default(),
        };

        let action = match args.command {
            Command::Generate {
                shard_id,
                count,
                strict,
            } => {
                if count == 0 {
                    bail!("--count must be greater than 0");
                }
                if count > MAX_COUNT {
                    bail!("--count ({count}) exceeds the maximum of {MAX_COUNT}");
                }
                Action::Generate {
                    shard_id,
                    count,
                    strict,
                }
            }
            Command::Decode { ids } => Action::Decode(parse_ids(&ids)?),
            Command::Shard { ids } => Action::Shard(parse_ids(&ids)?),
            Command::Placeholder { shard_id, strict } => Action::Placeholder { shard_id, strict },
        };

        Ok(Self {
            clock_base,
            json: args.json,
            action,
        })
    }
}

fn parse_ids(ids: &[String]) -> anyhow::Result<Vec<BigId>> {
    ids.iter()
        .map(|text| bigid::parse(text).with_context(|| format!("cannot read {text:?} as an id")))
        .collect()
}
