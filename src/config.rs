use std::str::FromStr;

use bridge::RunnerConfig;
use dotenv_flow::dotenv_flow;
use eyre::{eyre, Result, WrapErr};
use tracing::Level;

pub const WORKER_THREADS: &str = "WALLET_SDK_WORKER_THREADS";
pub const MAX_BLOCKING_THREADS: &str = "WALLET_SDK_MAX_BLOCKING_THREADS";
pub const THREAD_NAME: &str = "WALLET_SDK_THREAD_NAME";
pub const LOG_LEVEL: &str = "WALLET_SDK_LOG_LEVEL";

/// Settings of the SDK, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
    pub thread_name: String,
    pub log_level: Level,
}

impl Default for SdkConfig {
    fn default() -> Self {
        let runner = RunnerConfig::default();

        Self {
            worker_threads: runner.worker_threads,
            max_blocking_threads: runner.max_blocking_threads,
            thread_name: runner.thread_name,
            log_level: Level::INFO,
        }
    }
}

impl SdkConfig {
    /// Loads `.env` files, then reads the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv_flow().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup`; unset variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default = Self::default();

        Ok(Self {
            worker_threads: parse_or(&lookup, WORKER_THREADS, default.worker_threads)?,
            max_blocking_threads: parse_or(&lookup, MAX_BLOCKING_THREADS, default.max_blocking_threads)?,
            thread_name: lookup(THREAD_NAME).unwrap_or(default.thread_name),
            log_level: parse_or(&lookup, LOG_LEVEL, default.log_level)?,
        })
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            worker_threads: self.worker_threads,
            max_blocking_threads: self.max_blocking_threads,
            thread_name: self.thread_name.clone(),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| eyre!("{e}"))
            .wrap_err_with(|| format!("{name} has an invalid value {value:?}")),
    }
}
