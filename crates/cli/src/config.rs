use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use replay_core::domain::SenderOverrides;
use replay_core::error::ReplayError;
use telegram_adapter::DEFAULT_API_BASE;

/// CLI tool to replay an exported Telegram chat through two bot accounts
#[derive(Parser, Debug)]
#[command(name = "chat-replay")]
#[command(about = "Replays exported chat history into a live group, split across two accounts by sender")]
pub struct Cli {
    /// Directory containing messages*.html export files
    #[arg(short = 'd', long = "export-dir", env = "EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Bot token for the primary account
    #[arg(long = "primary-token", env = "PRIMARY_BOT_TOKEN", hide_env_values = true)]
    pub primary_token: Option<String>,

    /// Bot token for the secondary account
    #[arg(long = "secondary-token", env = "SECONDARY_BOT_TOKEN", hide_env_values = true)]
    pub secondary_token: Option<String>,

    /// Target chat, numeric id or @username, shared by both accounts
    #[arg(short = 'c', long = "chat", env = "TARGET_CHAT")]
    pub chat: Option<String>,

    /// Sender label forced onto the primary account
    #[arg(long = "primary-sender", env = "DEFAULT_FROM_NAME_1")]
    pub primary_sender: Option<String>,

    /// Sender label forced onto the secondary account
    #[arg(long = "secondary-sender", env = "DEFAULT_FROM_NAME_2")]
    pub secondary_sender: Option<String>,

    /// Seconds to wait after each successful send
    #[arg(long = "delay-secs", env = "REPLAY_DELAY_SECS", default_value_t = 3)]
    pub delay_secs: u64,

    /// Bot API base URL
    #[arg(long = "api-base", env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub export_dir: PathBuf,
    pub primary_token: String,
    pub secondary_token: String,
    pub chat: String,
    pub overrides: SenderOverrides,
    pub delay: Duration,
    pub api_base: String,
}

impl ReplayConfig {
    /// Fails with every missing required value named at once
    pub fn from_cli(cli: Cli) -> Result<Self, ReplayError> {
        let required = (
            present(cli.primary_token),
            present(cli.secondary_token),
            present(cli.chat),
        );
        let (primary_token, secondary_token, chat) = match required {
            (Some(primary), Some(secondary), Some(chat)) => (primary, secondary, chat),
            (primary, secondary, chat) => {
                let missing: Vec<&str> = [
                    ("PRIMARY_BOT_TOKEN", primary.is_none()),
                    ("SECONDARY_BOT_TOKEN", secondary.is_none()),
                    ("TARGET_CHAT", chat.is_none()),
                ]
                .into_iter()
                .filter(|(_, is_missing)| *is_missing)
                .map(|(name, _)| name)
                .collect();
                return Err(ReplayError::Config(format!(
                    "missing account information: {}",
                    missing.join(", ")
                )));
            }
        };

        Ok(Self {
            export_dir: cli.export_dir,
            primary_token,
            secondary_token,
            chat,
            overrides: SenderOverrides {
                primary: present(cli.primary_sender),
                secondary: present(cli.secondary_sender),
            },
            delay: Duration::from_secs(cli.delay_secs),
            api_base: cli.api_base,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["chat-replay"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_cli_complete() {
        let config = ReplayConfig::from_cli(cli(&[
            "--primary-token",
            "1:a",
            "--secondary-token",
            "2:b",
            "--chat",
            "@family",
            "--secondary-sender",
            "Bob",
            "--delay-secs",
            "0",
            "--export-dir",
            "/exports",
        ]))
        .unwrap();

        assert_eq!(config.primary_token, "1:a");
        assert_eq!(config.secondary_token, "2:b");
        assert_eq!(config.chat, "@family");
        assert_eq!(config.overrides.primary, None);
        assert_eq!(config.overrides.secondary.as_deref(), Some("Bob"));
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.export_dir, PathBuf::from("/exports"));
    }

    #[test]
    fn test_from_cli_reports_all_missing_values() {
        let cli = Cli {
            export_dir: PathBuf::from("."),
            primary_token: Some("1:a".to_string()),
            secondary_token: None,
            chat: Some("  ".to_string()),
            primary_sender: None,
            secondary_sender: None,
            delay_secs: 3,
            api_base: DEFAULT_API_BASE.to_string(),
        };

        match ReplayConfig::from_cli(cli) {
            Err(ReplayError::Config(message)) => {
                assert!(message.contains("SECONDARY_BOT_TOKEN"));
                assert!(message.contains("TARGET_CHAT"));
                assert!(!message.contains("PRIMARY_BOT_TOKEN"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_sender_override_is_absent() {
        let cli = Cli {
            export_dir: PathBuf::from("."),
            primary_token: Some("1:a".to_string()),
            secondary_token: Some("2:b".to_string()),
            chat: Some("-100200".to_string()),
            primary_sender: Some(String::new()),
            secondary_sender: None,
            delay_secs: 3,
            api_base: DEFAULT_API_BASE.to_string(),
        };

        let config = ReplayConfig::from_cli(cli).unwrap();
        assert_eq!(config.overrides.primary, None);
        assert_eq!(config.delay, Duration::from_secs(3));
    }
}
