use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

const CATALOG_URL: &str = "https://valaam.ru/chants/";
const DEFAULT_OUTPUT_DIR: &str = "downloads";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Everything the session needs from the environment, resolved once at
/// startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_url: Url,
    pub output_root: PathBuf,
    pub timeout: Duration,
}

impl Config {
    /// Defaults, with `CHANTDL_OUTPUT_DIR` and `CHANTDL_TIMEOUT_SECS` as
    /// optional overrides. A malformed timeout is ignored with a warning.
    pub fn from_env() -> Self {
        let output_root = env::var("CHANTDL_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let mut timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        if let Ok(raw) = env::var("CHANTDL_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => timeout = Duration::from_secs(secs),
                _ => log::warn!("ignoring invalid CHANTDL_TIMEOUT_SECS={:?}", raw),
            }
        }

        Config {
            catalog_url: Url::parse(CATALOG_URL).unwrap(),
            output_root,
            timeout,
        }
    }
}
