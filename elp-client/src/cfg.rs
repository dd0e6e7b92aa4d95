use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::Config;
use http::Uri;

fn default_token_path() -> PathBuf {
    "/var/lib/elp/token".into()
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApiConfig {
    /// Base URI of the course backend's REST API.
    #[serde(with = "parse_uri")]
    pub base_url: Uri,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct MediaConfig {
    /// Origin prepended to relative media paths delivered by the backend.
    #[serde(with = "parse_uri")]
    pub origin: Uri,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ElpConfig {
    /// Enables debug logging/tracing.
    pub debug: bool,

    /// REST API configuration
    pub api: ApiConfig,

    /// Media URL resolution configuration
    pub media: MediaConfig,

    /// Where the login token is cached between runs.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

/// Parses the configuration of the portal client, returning an ElpConfig
/// struct. Uses the given path to read a structured file format (toml, yaml,
/// json, etc). Individual values can be overriden by `ELP_`-prefixed
/// environment variables.
pub fn get_config(path: &Path) -> Result<ElpConfig> {
    let config = Config::builder()
        .add_source(config::File::with_name(
            path.to_str()
                .context("Parsing configuration path as a str")?,
        ))
        .add_source(config::Environment::with_prefix("ELP"))
        .build()
        .context("Building the configuration of the portal client from file and environment")?;

    config
        .try_deserialize()
        .context("Deserializing the configuration as ElpConfig")
}

mod parse_uri {
    use http::Uri;

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Uri, D::Error> {
        d.deserialize_str(Visitor {})
    }

    struct Visitor {}

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Uri;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            writeln!(formatter, "A valid URI")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            v.try_into()
                .map_err(|e| E::custom(format!("{v} is an invalid URI: {e}")))
        }
    }
}
