//! Environment-sourced configuration.
//!
//! Values are read once at startup (after `.env` has been loaded by `dotenv`) into a
//! [`Config`] that is then carried inside the framework's user data.

use std::env;
use std::time::Duration;

use poise::serenity_prelude::GuildId;
use tracing::debug;
use url::Url;

use crate::delivery::MESSAGE_CHARACTER_CEILING;
use crate::error::ConfigurationError;
use crate::segment::MAX_SEGMENT_LENGTH;

/// Room reserved for the marker, mention and separator in front of a segment.
pub const PREFIX_HEADROOM: usize = 64;

const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
const DEFAULT_SD_URL: &str = "http://localhost:8080";
const DEFAULT_SD_MODEL: &str = "runwayml/stable-diffusion-v1-5";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Model-hub credential forwarded to the image backend.
    pub hf_token: Option<String>,
    pub ollama_host: Url,
    pub chat_model: String,
    pub pull_model_on_start: bool,
    pub sd_url: Url,
    pub sd_model: String,
    pub sd_clear_cache_path: Option<String>,
    pub max_segment_length: usize,
    pub generation_timeout: Option<Duration>,
    /// Registers commands in this guild only, which takes effect immediately.
    pub dev_guild_id: Option<GuildId>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = var("DISCORD_TOKEN").ok_or(ConfigurationError::Missing {
            name: "DISCORD_TOKEN",
        })?;

        let ollama_host = parse_url(
            "OLLAMA_HOST",
            var("OLLAMA_HOST").as_deref().unwrap_or(DEFAULT_OLLAMA_HOST),
        )?;
        let sd_url = parse_url("SD_URL", var("SD_URL").as_deref().unwrap_or(DEFAULT_SD_URL))?;

        let pull_model_on_start = match var("OLLAMA_PULL_ON_START") {
            Some(value) => parse_bool("OLLAMA_PULL_ON_START", &value)?,
            None => true,
        };

        let max_segment_length = match var("MAX_SEGMENT_LENGTH") {
            Some(value) => parse_segment_length(&value)?,
            None => MAX_SEGMENT_LENGTH,
        };

        let generation_timeout = var("GENERATION_TIMEOUT")
            .map(|value| {
                humantime_serde::re::humantime::parse_duration(&value).map_err(|e| {
                    ConfigurationError::Invalid {
                        name: "GENERATION_TIMEOUT",
                        diagnostic: e.to_string(),
                    }
                })
            })
            .transpose()?;

        let dev_guild_id = var("DEV_GUILD_ID")
            .map(|value| match value.trim().parse::<u64>() {
                Ok(id) if id > 0 => Ok(GuildId::new(id)),
                _ => Err(ConfigurationError::Invalid {
                    name: "DEV_GUILD_ID",
                    diagnostic: format!("'{value}' is not a guild id"),
                }),
            })
            .transpose()?;

        let config = Self {
            discord_token,
            hf_token: var("HF_TOKEN"),
            ollama_host,
            chat_model: var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            pull_model_on_start,
            sd_url,
            sd_model: var("SD_MODEL").unwrap_or_else(|| DEFAULT_SD_MODEL.to_string()),
            sd_clear_cache_path: var("SD_CLEAR_CACHE_PATH"),
            max_segment_length,
            generation_timeout,
            dev_guild_id,
        };

        debug!(
            "Loaded configuration: model '{}' at {}, segments of {} characters",
            config.chat_model, config.ollama_host, config.max_segment_length
        );

        Ok(config)
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigurationError> {
    Url::parse(value).map_err(|e| ConfigurationError::Invalid {
        name,
        diagnostic: format!("'{value}': {e}"),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigurationError::Invalid {
            name,
            diagnostic: format!("'{other}' is not a boolean"),
        }),
    }
}

fn parse_segment_length(value: &str) -> Result<usize, ConfigurationError> {
    let limit = MESSAGE_CHARACTER_CEILING - PREFIX_HEADROOM;

    match value.trim().parse::<usize>() {
        Ok(length) if length > 0 && length <= limit => Ok(length),
        _ => Err(ConfigurationError::Invalid {
            name: "MAX_SEGMENT_LENGTH",
            diagnostic: format!("expected a number between 1 and {limit}, got '{value}'"),
        }),
    }
}
