use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::AppConfig;

/// Get the default rowflow data directory: ~/.rowflow
pub fn get_rowflow_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".rowflow"))
}

pub fn get_rowflow_env_file_path() -> anyhow::Result<PathBuf> {
    Ok(get_rowflow_data_dir()?.join(".env"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.rowflow/config.toml (highest)
    let data_dir = get_rowflow_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    let env_file = get_rowflow_env_file_path()?;
    if env_file.exists() {
        for (key, value) in parse_env_file(&env_file)? {
            // Real environment wins over the file.
            if std::env::var_os(&key).is_none() {
                std::env::set_var(&key, value);
            }
        }
    }
    cfg.env_file = env_file.to_string_lossy().to_string();

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;

    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str::<AppConfig>(&s).with_context(|| format!("invalid config {}", path.display()))
}

/// Environment variable overrides (Priority 0: highest, below CLI flags).
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("ROWFLOW_SOURCE_URL") {
        cfg.source.url = v;
    }
    if let Some(v) = get("ROWFLOW_SINK_URL") {
        cfg.sink.url = Some(v);
    }
    if let Some(v) = get("ROWFLOW_SINK_API_KEY") {
        cfg.sink.api_key = Some(v);
    }
    if let Some(v) = get("ROWFLOW_SINK_PATH") {
        cfg.sink.path = Some(v);
    }
    if let Some(v) = get("ROWFLOW_BATCH_SIZE") {
        cfg.batch.batch_size = v
            .trim()
            .parse()
            .with_context(|| format!("invalid ROWFLOW_BATCH_SIZE: {v}"))?;
    }
    if let Some(v) = get("ROWFLOW_CONCURRENCY") {
        cfg.batch.concurrency = v
            .trim()
            .parse()
            .with_context(|| format!("invalid ROWFLOW_CONCURRENCY: {v}"))?;
    }
    if let Some(v) = get("ROWFLOW_LOG_LEVEL") {
        cfg.logging.level = v;
    }

    Ok(())
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped;
/// matching single or double quotes around a value are stripped.
pub fn parse_env_file(path: &Path) -> anyhow::Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read env file {}", path.display()))?;
    parse_env_content(&content)
}

pub fn parse_env_content(content: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut out = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (k, v) = line.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("invalid env line at {} (expected KEY=VALUE)", idx + 1)
        })?;
        let key = k.trim();
        if key.is_empty() {
            anyhow::bail!("invalid env line at {} (empty key)", idx + 1);
        }
        out.push((key.to_string(), unquote(v.trim()).to_string()));
    }

    Ok(out)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
