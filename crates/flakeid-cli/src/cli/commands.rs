use std::{io::Write, thread::scope, time::Duration};

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use flakeid::{
    AtomicSnowflakeGenerator, GeneratorConfig, IdLayout, LockSnowflakeGenerator,
    SnowflakeGenerator, SnowflakeId, SystemClock,
};
use serde::Serialize;

use crate::cli::config::{CliConfig, Command, GeneratorKind, OutputFormat};

/// Runs the configured subcommand, writing its output to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate {
            count,
            threads,
            generator,
            format,
        } => {
            let ids = match generator {
                GeneratorKind::Lock => mint(
                    &LockSnowflakeGenerator::new(config.generator, SystemClock)?,
                    *count,
                    *threads,
                )?,
                GeneratorKind::Atomic => mint(
                    &AtomicSnowflakeGenerator::new(config.generator, SystemClock)?,
                    *count,
                    *threads,
                )?,
            };
            write_ids(out, &ids, *format)
        }
        Command::Decode { ids, format } => {
            let decoded: Vec<_> = ids
                .iter()
                .map(|&id| DecodedId::new(id, &config.layout, &config.generator))
                .collect();
            write_decoded(out, &decoded, *format)
        }
        Command::Layout => write_layout(out, &config.layout, &config.generator),
    }
}

/// Mints `count` ids from one generator shared by `threads` threads.
///
/// The result is sorted, so the output order matches generation order even
/// when several threads interleave.
fn mint<G>(generator: &G, count: usize, threads: usize) -> anyhow::Result<Vec<SnowflakeId>>
where
    G: SnowflakeGenerator<SystemClock> + Sync,
{
    tracing::debug!(count, threads, "minting ids");

    let mut ids = if threads <= 1 {
        (0..count)
            .map(|_| generator.next_id())
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let per_thread = count / threads;
        let remainder = count % threads;

        scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|index| {
                    let share = per_thread + usize::from(index < remainder);
                    s.spawn(move || {
                        (0..share)
                            .map(|_| generator.next_id())
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();

            let mut ids = Vec::with_capacity(count);
            for handle in handles {
                let chunk = handle
                    .join()
                    .map_err(|_| anyhow!("a generator thread panicked"))??;
                ids.extend(chunk);
            }
            Ok::<_, anyhow::Error>(ids)
        })?
    };

    ids.sort_unstable();
    tracing::debug!(minted = ids.len(), "done");
    Ok(ids)
}

fn write_ids(
    out: &mut impl Write,
    ids: &[SnowflakeId],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Plain => {
            for id in ids {
                writeln!(out, "{id}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, ids)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct DecodedId {
    id: SnowflakeId,
    timestamp: u64,
    worker_id: u64,
    sequence: u64,
    unix_millis: u64,
    time: String,
}

impl DecodedId {
    #[allow(clippy::cast_possible_truncation)]
    fn new(id: SnowflakeId, layout: &IdLayout, config: &GeneratorConfig) -> Self {
        let parts = layout.decompose(id);
        let unix = parts.unix_time(config.epoch());
        Self {
            id,
            timestamp: parts.timestamp,
            worker_id: parts.worker_id,
            sequence: parts.sequence,
            unix_millis: unix.as_millis() as u64,
            time: format_unix(unix),
        }
    }
}

fn write_decoded(
    out: &mut impl Write,
    decoded: &[DecodedId],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Plain => {
            for d in decoded {
                writeln!(
                    out,
                    "{}\ttime={} timestamp={} worker_id={} sequence={}",
                    d.id, d.time, d.timestamp, d.worker_id, d.sequence
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, decoded)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_layout(
    out: &mut impl Write,
    layout: &IdLayout,
    config: &GeneratorConfig,
) -> anyhow::Result<()> {
    let epoch = config.epoch();
    let horizon = layout.horizon(epoch);
    writeln!(
        out,
        "layout         : 1 reserved | 41 timestamp | {} worker id | {} sequence",
        layout.worker_id_bits(),
        layout.sequence_bits()
    )?;
    writeln!(
        out,
        "worker id      : {} (max {})",
        config.worker_id,
        layout.max_worker_id()
    )?;
    writeln!(out, "ids/ms/worker  : {}", layout.ids_per_millisecond())?;
    writeln!(
        out,
        "epoch          : {} ({} ms)",
        format_unix(epoch),
        epoch.as_millis()
    )?;
    writeln!(
        out,
        "horizon        : {} ({} ms)",
        format_unix(horizon),
        horizon.as_millis()
    )?;
    Ok(())
}

/// RFC 3339 with millisecond precision, or the raw millisecond count if
/// chrono can't represent it.
fn format_unix(since_unix_epoch: Duration) -> String {
    i64::try_from(since_unix_epoch.as_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || format!("{}ms", since_unix_epoch.as_millis()),
            |time| time.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn config(command: Command) -> CliConfig {
        let generator = GeneratorConfig::new(3);
        CliConfig {
            generator,
            layout: generator.validate().unwrap(),
            command,
        }
    }

    fn run_to_string(config: &CliConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generate_prints_unique_sorted_ids() {
        for generator in [GeneratorKind::Lock, GeneratorKind::Atomic] {
            let output = run_to_string(&config(Command::Generate {
                count: 10_000,
                threads: 4,
                generator,
                format: OutputFormat::Plain,
            }));
            let ids: Vec<u64> = output.lines().map(|line| line.parse().unwrap()).collect();
            assert_eq!(ids.len(), 10_000);
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 10_000);
        }
    }

    #[test]
    fn generate_zero_prints_nothing() {
        let plain = run_to_string(&config(Command::Generate {
            count: 0,
            threads: 1,
            generator: GeneratorKind::Atomic,
            format: OutputFormat::Plain,
        }));
        assert_eq!(plain, "");
        let json = run_to_string(&config(Command::Generate {
            count: 0,
            threads: 1,
            generator: GeneratorKind::Lock,
            format: OutputFormat::Json,
        }));
        assert_eq!(json, "[]\n");
    }

    #[test]
    fn generate_json_is_an_array_of_integers() {
        let output = run_to_string(&config(Command::Generate {
            count: 3,
            threads: 1,
            generator: GeneratorKind::Lock,
            format: OutputFormat::Json,
        }));
        let ids: Vec<u64> = serde_json::from_str(&output).unwrap();
        assert_eq!(ids.len(), 3);
        let layout = IdLayout::default();
        assert!(ids
            .iter()
            .all(|&raw| layout.decompose(SnowflakeId::from_raw(raw)).worker_id == 3));
    }

    #[test]
    fn decode_reports_fields_and_time() {
        let id = SnowflakeId::from_raw((5 << 17) | (3 << 12) | 1);
        let output = run_to_string(&config(Command::Decode {
            ids: vec![id],
            format: OutputFormat::Plain,
        }));
        assert_eq!(
            output,
            format!(
                "{id}\ttime=2025-01-01T00:00:00.005Z timestamp=5 worker_id=3 sequence=1\n"
            )
        );
    }

    #[test]
    fn decode_json() {
        let output = run_to_string(&config(Command::Decode {
            ids: vec![SnowflakeId::from_raw(3 << 12)],
            format: OutputFormat::Json,
        }));
        let decoded: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(decoded[0]["worker_id"], 3);
        assert_eq!(decoded[0]["unix_millis"], 1_735_689_600_000_u64);
        assert_eq!(decoded[0]["time"], "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn layout_shows_horizon() {
        let output = run_to_string(&config(Command::Layout));
        assert!(output.contains("5 worker id | 12 sequence"), "{output}");
        assert!(output.contains("ids/ms/worker  : 4096"), "{output}");
        assert!(output.contains("2094-09-07T15:47:35.551Z"), "{output}");
    }
}
