use docqa::config::Config;
use docqa::engine::Engine;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Command {
    Serve,
    Ingest { file: PathBuf },
    Stats,
}

pub fn parse_command() -> anyhow::Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Serve);
    }

    match args[1].as_str() {
        "serve" => Ok(Command::Serve),
        "ingest" => parse_ingest(&args[2..]),
        "stats" => Ok(Command::Stats),
        _ => Ok(Command::Serve),
    }
}

fn parse_ingest(args: &[String]) -> anyhow::Result<Command> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--file" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow::anyhow!("--file requires a path"))?;
            return Ok(Command::Ingest {
                file: PathBuf::from(value),
            });
        }
    }
    anyhow::bail!("ingest requires --file <path>")
}

pub fn run_ingest(config: Config, file: PathBuf) -> anyhow::Result<()> {
    if config.sqlite_file().is_none() {
        anyhow::bail!("ingest requires DATA_DIR or SQLITE_DB_PATH");
    }
    let text = std::fs::read_to_string(&file)
        .map_err(|err| anyhow::anyhow!("read {}: {err}", file.display()))?;
    let engine = Engine::new(config)?;
    let id = engine
        .ingest_text(&text)
        .map_err(|err| anyhow::anyhow!("ingest failed: {err}"))?;
    println!("Document {id} uploaded from `{}`.", file.display());
    Ok(())
}

pub fn run_stats(config: Config) -> anyhow::Result<()> {
    let engine = Engine::new(config)?;
    let stats = engine
        .stats()
        .map_err(|err| anyhow::anyhow!("stats failed: {err}"))?;
    println!(
        "documents={} indexed={} identities={} dimension={}",
        stats.stored, stats.indexed, stats.identities, stats.dimension
    );
    Ok(())
}
