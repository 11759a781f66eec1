//! Core application

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::PostgresService;
use crate::domain::rules::{compile_from, parse_rule};
use crate::domain::segments::{CustomerQuery, RuleOutcome, SegmentRunner};
use crate::utils::terminal::prompt_line;

pub struct CoreApp {
    pub config: AppConfig,
    pub database: PostgresService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Compile { file, full, offset }) => {
                Self::compile_document(&cli_config, file.as_deref(), full, offset)
            }
            Some(Commands::Run) | None => {
                let app = Self::init(&cli_config).await?;
                let result = app.run_segments().await;
                app.database.close().await;
                result
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let mut config = AppConfig::load(cli)?;
        Self::resolve_missing(&mut config)?;

        let database = PostgresService::init(&config.postgres)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { config, database })
    }

    /// Prompt for the parent and connection URL when no other layer set them
    fn resolve_missing(config: &mut AppConfig) -> Result<()> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut stdout = io::stdout();

        if config.parent.is_empty() {
            config.parent = prompt_line(&mut reader, &mut stdout, "CompanyID (grp_/cmp_)")?;
        }
        if config.postgres.url.is_empty() {
            config.postgres.url =
                prompt_line(&mut reader, &mut stdout, "Database Connection String")?;
        }

        if config.parent.is_empty() {
            anyhow::bail!("CompanyID is required");
        }
        if config.postgres.url.is_empty() {
            anyhow::bail!("Database Connection String is required");
        }
        Ok(())
    }

    async fn run_segments(&self) -> Result<()> {
        println!("Running segment rules for {}", self.config.parent);

        let runner = SegmentRunner::new(
            self.database.pool(),
            &self.config.rules,
            &self.config.parent,
        );
        let summary = runner.run(print_outcome).await?;

        println!();
        println!(
            "Done: {} rule(s) evaluated, {} skipped, {} customer match(es)",
            summary.evaluated, summary.skipped, summary.customers
        );
        Ok(())
    }

    /// Compile one rule document without touching the database
    fn compile_document(
        cli: &CliConfig,
        file: Option<&Path>,
        full: bool,
        offset: usize,
    ) -> Result<()> {
        let config = AppConfig::load(cli)?;

        let json = match file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rule file: {}", path.display()))?,
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read rule from stdin")?;
                buf
            }
        };

        let rule = parse_rule(&json, &config.rules.allowed_fields)?;

        let output = if full {
            if config.parent.is_empty() {
                anyhow::bail!("--parent is required with --full");
            }
            let query = CustomerQuery::new(&config.rules.customer_table, &config.parent);
            serde_json::to_string_pretty(&query.with_rule(&rule)?)?
        } else {
            serde_json::to_string_pretty(&compile_from(&rule, offset)?)?
        };

        println!("{}", output);
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn print_outcome(outcome: &RuleOutcome) {
    println!();
    println!("-> For Rule: {}", outcome.rule_name);
    println!("Query: {}", outcome.query.sql);
    println!(
        "Args: {}",
        serde_json::to_string(&outcome.query.params).unwrap_or_default()
    );
    println!("Results:");
    for customer in &outcome.customers {
        println!(
            "- ({}, {}, {}, {})",
            customer.id,
            customer.display_name(),
            customer.email.as_deref().unwrap_or_default(),
            customer.phone_number.as_deref().unwrap_or_default()
        );
    }
}
