//! Flag-then-env-then-default resolution for every `Config` knob.

pub fn resolve_bind_addr() -> Option<String> {
    resolve_string("--bind", "BIND_ADDR")
}

pub fn resolve_port() -> u16 {
    first_valid::<u16>([cli_arg("--port"), std::env::var("PORT").ok()]).unwrap_or(8000)
}

pub fn resolve_data_dir() -> Option<String> {
    resolve_string("--data-dir", "DATA_DIR")
}

pub fn resolve_sqlite_path() -> Option<String> {
    resolve_string("--sqlite-path", "SQLITE_DB_PATH")
}

pub fn resolve_dimension() -> usize {
    resolve_usize("--dimension", "EMBEDDING_DIM", 384)
}

pub fn resolve_default_k() -> usize {
    resolve_usize("--top-k", "TOP_K", 5)
}

pub fn resolve_max_k() -> usize {
    resolve_usize("--max-k", "MAX_K", 256)
}

pub fn resolve_similarity_threshold() -> f32 {
    resolve_f32("--threshold", "SIMILARITY_THRESHOLD", 0.0)
}

pub fn resolve_reindex_on_ingest() -> bool {
    resolve_bool("--reindex-on-ingest", "REINDEX_ON_INGEST", true)
}

pub fn resolve_parallel_search_min() -> usize {
    resolve_usize("--parallel-search-min", "PARALLEL_SEARCH_MIN", 4096)
}

pub fn resolve_max_body_mb() -> usize {
    resolve_mb("--max-body-mb", "MAX_BODY_MB", 10.0)
}

pub fn resolve_max_question_len() -> usize {
    resolve_usize("--max-question-len", "MAX_QUESTION_LEN", 1024)
}

pub fn resolve_request_timeout_secs() -> u64 {
    resolve_u64("--request-timeout-secs", "REQUEST_TIMEOUT_SECS", 30)
}

// Helpers

fn cli_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn resolve_string(flag: &str, env: &str) -> Option<String> {
    cli_arg(flag)
        .or_else(|| std::env::var(env).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_mb(flag: &str, env: &str, default_mb: f64) -> usize {
    if let Some(val_str) = cli_arg(flag) {
        if let Ok(mb) = val_str.parse::<f64>() {
            return (mb * 1024.0 * 1024.0) as usize;
        }
    }

    if let Ok(val_str) = std::env::var(env) {
        if let Ok(mb) = val_str.parse::<f64>() {
            return (mb * 1024.0 * 1024.0) as usize;
        }
    }

    (default_mb * 1024.0 * 1024.0) as usize
}

fn resolve_usize(flag: &str, env: &str, default: usize) -> usize {
    if let Some(val_str) = cli_arg(flag) {
        if let Ok(v) = val_str.parse::<usize>() {
            return v;
        }
    }
    if let Ok(val_str) = std::env::var(env) {
        if let Ok(v) = val_str.parse::<usize>() {
            return v;
        }
    }
    default
}

fn resolve_u64(flag: &str, env: &str, default: u64) -> u64 {
    if let Some(val_str) = cli_arg(flag) {
        if let Ok(v) = val_str.parse::<u64>() {
            return v;
        }
    }
    if let Ok(val_str) = std::env::var(env) {
        if let Ok(v) = val_str.parse::<u64>() {
            return v;
        }
    }
    default
}

/// First candidate that parses as `T`. Out-of-range and malformed values are
/// skipped.
fn first_valid<T: std::str::FromStr>(
    candidates: impl IntoIterator<Item = Option<String>>,
) -> Option<T> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|raw| raw.trim().parse::<T>().ok())
}

fn resolve_f32(flag: &str, env: &str, default: f32) -> f32 {
    let parse = |raw: String| raw.parse::<f32>().ok().filter(|v| v.is_finite());
    cli_arg(flag)
        .and_then(parse)
        .or_else(|| std::env::var(env).ok().and_then(parse))
        .unwrap_or(default)
}

fn resolve_bool(flag: &str, env: &str, default: bool) -> bool {
    cli_arg(flag)
        .and_then(|raw| parse_bool(&raw))
        .or_else(|| std::env::var(env).ok().and_then(|raw| parse_bool(&raw)))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
