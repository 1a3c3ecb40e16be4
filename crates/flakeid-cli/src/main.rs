mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, Config, OutputFormat};
use flakeid::{FlakeId, LockFlakeGenerator};
use serde::Serialize;
use telemetry::init_telemetry;

#[derive(Serialize)]
struct IdRecord {
    id: FlakeId,
}

#[derive(Serialize)]
struct DecodedRecord {
    id: FlakeId,
    random: i64,
    tick: i64,
    node: i64,
    sequence: i64,
    unix_millis: i64,
}

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.log_json)?;
    log_startup_info(&config);

    let generator = config.build_generator()?;
    let mut out = BufWriter::new(io::stdout().lock());

    if config.decode.is_empty() {
        generate(&generator, &config, &mut out)?;
    } else {
        decode(&generator, &config, &mut out)?;
    }

    out.flush()?;
    Ok(())
}

fn log_startup_info(config: &Config) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    } else {
        tracing::info!(
            preset = %config.label,
            node_id = config.node_id,
            epoch_ms = config.epoch_ms,
            "Starting id generator"
        );
    }
}

fn generate(
    generator: &LockFlakeGenerator,
    config: &Config,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for _ in 0..config.count {
        let id = generator.next_id();
        match config.format {
            OutputFormat::Text => writeln!(out, "{id}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &IdRecord { id })?;
                writeln!(out)?;
            }
        }
    }
    tracing::info!(count = config.count, "Generated ids");
    Ok(())
}

fn decode(
    generator: &LockFlakeGenerator,
    config: &Config,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for &id in &config.decode {
        let parts = generator.decompose(id);
        let record = DecodedRecord {
            id,
            random: parts.random,
            tick: parts.tick,
            node: parts.node,
            sequence: parts.sequence,
            unix_millis: generator.unix_millis_of(id),
        };
        if record.node != generator.node_id() {
            tracing::warn!(
                %id,
                node = record.node,
                "id was issued by a different node"
            );
        }
        match config.format {
            OutputFormat::Text => writeln!(
                out,
                "{} random={} tick={} node={} sequence={} unix_ms={}",
                record.id,
                record.random,
                record.tick,
                record.node,
                record.sequence,
                record.unix_millis
            )?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
