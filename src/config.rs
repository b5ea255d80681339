use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_TEMPLATE: &str = "TEMPLATE.md";
const DEFAULT_OUTPUT: &str = "README.md";

/// Everything a run needs, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub username: String,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub api_url: String,
    /// Skip repositories flagged `private` when totalling stars and commits.
    pub public_only: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("ACCESS_TOKEN").context("ACCESS_TOKEN environment variable not set")?;
        let username = get("GITHUB_USER").context("GITHUB_USER environment variable not set")?;

        let mut api_url = get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        while api_url.ends_with('/') {
            api_url.pop();
        }

        let public_only = match get("STATS_PUBLIC_ONLY") {
            Some(raw) => parse_flag(&raw).context("STATS_PUBLIC_ONLY must be a boolean")?,
            None => false,
        };

        Ok(Self {
            token: token.trim().to_string(),
            username: username.trim().to_string(),
            template_path: get("STATS_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
                .into(),
            output_path: get("STATS_OUTPUT")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
                .into(),
            api_url,
            public_only,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_user_and_token_are_set() {
        let config =
            config_from(&[("GITHUB_USER", "octocat"), ("ACCESS_TOKEN", "ghp_abc")]).unwrap();

        assert_eq!(config.username, "octocat");
        assert_eq!(config.token, "ghp_abc");
        assert_eq!(config.template_path, PathBuf::from("TEMPLATE.md"));
        assert_eq!(config.output_path, PathBuf::from("README.md"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.public_only);
    }

    #[test]
    fn missing_user_is_an_error() {
        let err = config_from(&[("ACCESS_TOKEN", "t")]).unwrap_err();
        assert!(err.to_string().contains("GITHUB_USER"));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = config_from(&[("GITHUB_USER", "octocat")]).unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN"));
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let err = config_from(&[("GITHUB_USER", "octocat"), ("ACCESS_TOKEN", "  ")]).unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN"));
    }

    #[test]
    fn overrides_are_honoured() {
        let config = config_from(&[
            ("GITHUB_USER", "octocat"),
            ("ACCESS_TOKEN", "ghp_abc"),
            ("STATS_TEMPLATE", "tpl/profile.md"),
            ("STATS_OUTPUT", "out/profile.md"),
            ("GITHUB_API_URL", "http://127.0.0.1:9000/"),
            ("STATS_PUBLIC_ONLY", "Yes"),
        ])
        .unwrap();

        assert_eq!(config.token, "ghp_abc");
        assert_eq!(config.template_path, PathBuf::from("tpl/profile.md"));
        assert_eq!(config.output_path, PathBuf::from("out/profile.md"));
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert!(config.public_only);
    }

    #[test]
    fn garbage_flag_is_rejected() {
        let err = config_from(&[
            ("GITHUB_USER", "octocat"),
            ("ACCESS_TOKEN", "t"),
            ("STATS_PUBLIC_ONLY", "maybe"),
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("maybe"));
    }
}
