use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use thiserror::Error;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 5020;
const DEFAULT_BODY_LIMIT_MB: usize = 5;
const DEFAULT_MODEL_PATH: &str = "./model/frozen_graph.pb";
const DEFAULT_CLASS_LIST_PATH: &str = "./model/class_list.txt";
const DEFAULT_INPUT_OP: &str = "x";
const DEFAULT_OUTPUT_OP: &str = "Identity";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Startup settings, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub model_path: PathBuf,
    pub class_list_path: PathBuf,
    pub model_url: Option<String>,
    pub class_list_url: Option<String>,
    pub download_token: Option<String>,
    pub input_op: String,
    pub output_op: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HOST",
                expected: "an IP address",
                value: v,
            })?,
            None => DEFAULT_HOST,
        };

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                expected: "a number between 0 and 65535",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let body_limit_bytes = {
            let mb = match get("BODY_LIMIT_MB") {
                Some(v) => v
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|mb| *mb > 0)
                    .ok_or(ConfigError::Invalid {
                        key: "BODY_LIMIT_MB",
                        expected: "a positive integer",
                        value: v,
                    })?,
                None => DEFAULT_BODY_LIMIT_MB,
            };
            mb * 1024 * 1024
        };

        Ok(Config {
            host,
            port,
            body_limit_bytes,
            model_path: get("MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.into())
                .into(),
            class_list_path: get("CLASS_LIST_PATH")
                .unwrap_or_else(|| DEFAULT_CLASS_LIST_PATH.into())
                .into(),
            model_url: get("MODEL_URL"),
            class_list_url: get("CLASS_LIST_URL"),
            download_token: get("GITHUB_TOKEN"),
            input_op: get("MODEL_INPUT_OP").unwrap_or_else(|| DEFAULT_INPUT_OP.into()),
            output_op: get("MODEL_OUTPUT_OP").unwrap_or_else(|| DEFAULT_OUTPUT_OP.into()),
        })
    }
}
