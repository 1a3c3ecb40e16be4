use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use flakeid::{BitLayout, FieldOrder, FlakeId, LockFlakeGenerator, Preset, TWITTER_EPOCH};

/// Runtime configuration for the `flakeid` binary.
///
/// Every value can come from a flag, an environment variable, or a `.env`
/// file in the working directory. The generator is built once from these
/// settings and used for the whole run.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Generate or decode Snowflake-family ids"
)]
pub struct CliArgs {
    /// Layout preset. `custom` requires `--bits` and `--tick-ms`.
    ///
    /// Environment variable: `FLAKE_PRESET`
    #[arg(long, env = "FLAKE_PRESET", value_enum, default_value_t = PresetArg::Standard)]
    pub preset: PresetArg,

    /// Epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `FLAKE_EPOCH_MS`
    #[arg(long, env = "FLAKE_EPOCH_MS", default_value_t = TWITTER_EPOCH, allow_hyphen_values = true)]
    pub epoch_ms: i64,

    /// Node identifier. Must fit the node field of the layout and be unique
    /// across every process sharing an id space.
    ///
    /// Environment variable: `FLAKE_NODE_ID`
    #[arg(long, env = "FLAKE_NODE_ID", default_value_t = 0, allow_hyphen_values = true)]
    pub node_id: i64,

    /// Milliseconds per time-field unit (custom preset only).
    ///
    /// Environment variable: `FLAKE_TICK_MS`
    #[arg(long, env = "FLAKE_TICK_MS", allow_hyphen_values = true)]
    pub tick_ms: Option<i64>,

    /// Field widths as `random,time,node,sequence` (custom preset only).
    ///
    /// Environment variable: `FLAKE_BITS`
    #[arg(long, env = "FLAKE_BITS", value_parser = parse_quad::<u32>)]
    pub bits: Option<Quad<u32>>,

    /// Field ranks as `random,time,node,sequence`; larger is more
    /// significant (custom preset only, defaults to `3,2,1,0`).
    ///
    /// Environment variable: `FLAKE_ORDER`
    #[arg(long, env = "FLAKE_ORDER", value_parser = parse_quad::<i32>, allow_hyphen_values = true)]
    pub order: Option<Quad<i32>>,

    /// Number of ids to generate.
    ///
    /// Environment variable: `FLAKE_COUNT`
    #[arg(short = 'n', long, env = "FLAKE_COUNT", default_value_t = 1)]
    pub count: usize,

    /// Output format.
    ///
    /// Environment variable: `FLAKE_FORMAT`
    #[arg(long, env = "FLAKE_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Emit logs as JSON on stderr.
    ///
    /// Environment variable: `FLAKE_LOG_JSON`
    #[arg(long, env = "FLAKE_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Decode these ids with the configured layout instead of generating.
    #[arg(long, num_args = 1.., value_name = "ID", allow_hyphen_values = true)]
    pub decode: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetArg {
    Compact,
    Extended,
    Standard,
    WideNode,
    Custom,
}

impl PresetArg {
    fn preset(self) -> Option<Preset> {
        match self {
            Self::Compact => Some(Preset::Compact),
            Self::Extended => Some(Preset::Extended),
            Self::Standard => Some(Preset::Standard),
            Self::WideNode => Some(Preset::WideNode),
            Self::Custom => None,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Four comma-separated values in `random,time,node,sequence` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad<T>(pub [T; 4]);

fn parse_quad<T>(s: &str) -> Result<Quad<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<T>()
                .map_err(|e| format!("{:?}: {e}", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let values: [T; 4] = values
        .try_into()
        .map_err(|v: Vec<T>| format!("expected 4 comma-separated values, got {}", v.len()))?;
    Ok(Quad(values))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub label: String,
    pub epoch_ms: i64,
    pub node_id: i64,
    pub tick_ms: i64,
    pub layout: BitLayout,
    pub order: FieldOrder,
    pub count: usize,
    pub format: OutputFormat,
    pub log_json: bool,
    pub decode: Vec<FlakeId>,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let (label, tick_ms, layout, order) = match args.preset.preset() {
            Some(preset) => {
                if args.bits.is_some() || args.order.is_some() || args.tick_ms.is_some() {
                    bail!(
                        "--bits, --order and --tick-ms only apply to --preset custom (got {preset})"
                    );
                }
                (
                    preset.to_string(),
                    preset.tick_millis(),
                    preset.layout(),
                    preset.order(),
                )
            }
            None => {
                let Some(Quad([random, time, node, sequence])) = args.bits else {
                    bail!("--preset custom requires --bits random,time,node,sequence");
                };
                let Some(tick_ms) = args.tick_ms else {
                    bail!("--preset custom requires --tick-ms");
                };
                let layout = BitLayout::new(random, time, node, sequence)?;
                let order = match args.order {
                    Some(Quad([random, time, node, sequence])) => {
                        FieldOrder::new(random, time, node, sequence)?
                    }
                    None => FieldOrder::DESCENDING,
                };
                ("custom".to_owned(), tick_ms, layout, order)
            }
        };

        if args.count == 0 && args.decode.is_empty() {
            bail!("FLAKE_COUNT must be greater than 0");
        }

        let decode = args
            .decode
            .iter()
            .map(|text| FlakeId::from_text(text).with_context(|| format!("decoding {text:?}")))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            label,
            epoch_ms: args.epoch_ms,
            node_id: args.node_id,
            tick_ms,
            layout,
            order,
            count: args.count,
            format: args.format,
            log_json: args.log_json,
            decode,
        })
    }
}

impl Config {
    /// Builds the single generator used for this process.
    pub fn build_generator(&self) -> anyhow::Result<LockFlakeGenerator> {
        LockFlakeGenerator::new(
            self.epoch_ms,
            self.tick_ms,
            self.node_id,
            self.layout,
            self.order,
        )
        .with_context(|| format!("invalid {} generator configuration", self.label))
    }
}
