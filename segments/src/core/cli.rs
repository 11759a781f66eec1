use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::InvalidRulePolicy;
use super::constants::{ENV_CONFIG, ENV_ON_INVALID_RULE, ENV_PARENT, ENV_POSTGRES_URL};

#[derive(Parser)]
#[command(name = "segments")]
#[command(version, about = "Run saved segment rules against customer data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Company or group id (grp_/cmp_) that scopes the customer query
    #[arg(long, global = true, env = ENV_PARENT)]
    pub parent: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,

    /// What to do with a rule that fails to compile (skip or halt)
    #[arg(long, global = true, env = ENV_ON_INVALID_RULE, value_parser = parse_invalid_rule_policy)]
    pub on_invalid_rule: Option<InvalidRulePolicy>,
}

/// Parse invalid rule policy from CLI/env string
fn parse_invalid_rule_policy(s: &str) -> Result<InvalidRulePolicy, String> {
    match s.to_lowercase().as_str() {
        "skip" => Ok(InvalidRulePolicy::Skip),
        "halt" => Ok(InvalidRulePolicy::Halt),
        _ => Err(format!(
            "Invalid rule policy '{}'. Valid options: skip, halt",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run every saved segment rule (default command)
    Run,
    /// Compile a rule document and print the SQL and parameters (no database)
    Compile {
        /// Rule document to compile (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the full customer query instead of only the predicate
        #[arg(long)]
        full: bool,

        /// Number placeholders from `$N+1`, leaving `$1..$N` to the caller
        #[arg(long, default_value_t = 0, conflicts_with = "full")]
        offset: usize,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub parent: Option<String>,
    pub postgres_url: Option<String>,
    pub on_invalid_rule: Option<InvalidRulePolicy>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        parent: cli.parent,
        postgres_url: cli.postgres_url,
        on_invalid_rule: cli.on_invalid_rule,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invalid_rule_policy() {
        assert_eq!(
            parse_invalid_rule_policy("SKIP").unwrap(),
            InvalidRulePolicy::Skip
        );
        assert_eq!(
            parse_invalid_rule_policy("halt").unwrap(),
            InvalidRulePolicy::Halt
        );
        assert!(parse_invalid_rule_policy("ignore").is_err());
    }

    #[test]
    fn test_cli_compile_subcommand() {
        let cli = Cli::try_parse_from(["segments", "compile", "--file", "rule.json", "--full"])
            .unwrap();
        match cli.command {
            Some(Commands::Compile { file, full, offset }) => {
                assert_eq!(file, Some(PathBuf::from("rule.json")));
                assert!(full);
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_compile_offset() {
        let cli = Cli::try_parse_from(["segments", "compile", "--offset", "2"]).unwrap();
        match cli.command {
            Some(Commands::Compile { file, full, offset }) => {
                assert!(file.is_none());
                assert!(!full);
                assert_eq!(offset, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(
            Cli::try_parse_from(["segments", "compile", "--offset", "2", "--full"]).is_err()
        );
        assert!(Cli::try_parse_from(["segments", "compile", "--offset", "-1"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "segments",
            "run",
            "--parent",
            "cmp_1",
            "--on-invalid-rule",
            "skip",
        ])
        .unwrap();
        assert_eq!(cli.parent.as_deref(), Some("cmp_1"));
        assert_eq!(cli.on_invalid_rule, Some(InvalidRulePolicy::Skip));
    }
}
