use std::io::Write;

use bigid::{BigId, BigIdGenerator, DecodedFields, decode_with_base};

use crate::cli::config::{Action, CliConfig};

/// Runs the configured action, writing one result per line to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.action {
        Action::Generate {
            shard_id,
            count,
            strict,
        } => {
            let generator = BigIdGenerator::with_base(config.clock_base);
            tracing::info!(shard_id, count, strict, base = %config.clock_base, "generating ids");
            for _ in 0..*count {
                let id = if *strict {
                    generator.try_generate(*shard_id)?
                } else {
                    generator.generate(*shard_id)
                };
                write_id(out, id, config.json)?;
            }
        }
        Action::Decode(ids) => {
            for id in ids {
                let fields = decode_with_base(id.to_u64(), &config.clock_base);
                write_fields(out, *id, &fields, config.json)?;
            }
        }
        Action::Shard(ids) => {
            for id in ids {
                if config.json {
                    let line = serde_json::json!({ "id": id, "vsid": id.shard_id() });
                    writeln!(out, "{line}")?;
                } else {
                    writeln!(out, "{}", id.shard_id())?;
                }
            }
        }
        Action::Placeholder { shard_id, strict } => {
            let id = if *strict {
                BigId::try_placeholder(*shard_id)?
            } else {
                BigId::placeholder(*shard_id)
            };
            write_id(out, id, config.json)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_id(out: &mut impl Write, id: BigId, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(&id)?)?;
    } else {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

fn write_fields(
    out: &mut impl Write,
    id: BigId,
    fields: &DecodedFields,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(fields)?)?;
    } else {
        writeln!(
            out,
            "{id} version={} reserved={} timestamp={} shard_id={} sequence={} create_time={}",
            fields.version,
            fields.reserved,
            fields.timestamp,
            fields.shard_id,
            fields.sequence,
            fields.create_time,
        )?;
    }
    Ok(())
}
