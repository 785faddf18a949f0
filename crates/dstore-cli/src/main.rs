//! dstore CLI - Main entry point

use clap::Parser;
use dstore_cli::commands::{bulk_put, count, delete, get, put, query};
use dstore_cli::{Cli, Commands};
use dstore_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Verbose mode logs debug to stderr; otherwise only warnings and errors
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("dstore")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    // The CLI works without logging, so a failed init is not fatal
    let _log_guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> dstore_cli::Result<()> {
    let config = cli.config()?;

    match cli.command {
        Commands::BulkPut {
            expression,
            datastore,
            from_file,
            primary_key,
            manifest,
            show,
        } => {
            bulk_put::run(
                &config,
                bulk_put::BulkPutArgs {
                    expression,
                    datastore,
                    from_file,
                    primary_key,
                    manifest,
                    show,
                },
            )
            .await
        }

        Commands::Query {
            expression,
            datastore,
            to_file,
            output,
            show,
        } => {
            query::run(
                &config,
                query::QueryArgs {
                    expression,
                    datastore,
                    to_file,
                    output,
                    show,
                },
            )
            .await
        }

        Commands::Put {
            expression,
            datastore,
            show,
        } => {
            let args = put::PutArgs {
                expression,
                datastore,
                show,
            };
            put::run(&config, args, put::WriteMode::Put).await
        }

        Commands::Update {
            expression,
            datastore,
            show,
        } => {
            let args = put::PutArgs {
                expression,
                datastore,
                show,
            };
            put::run(&config, args, put::WriteMode::Update).await
        }

        Commands::Get {
            expression,
            datastore,
            output,
            show,
        } => {
            let args = get::GetArgs {
                expression,
                datastore,
                output,
                show,
            };
            get::run(&config, args).await
        }

        Commands::BulkGet {
            expression,
            datastore,
            output,
            show,
        } => {
            let args = get::GetArgs {
                expression,
                datastore,
                output,
                show,
            };
            get::run_bulk(&config, args).await
        }

        Commands::Delete {
            expression,
            datastore,
            show,
        } => {
            let args = delete::DeleteArgs {
                expression,
                datastore,
                show,
            };
            delete::run(&config, args).await
        }

        Commands::BulkDelete {
            expression,
            datastore,
            show,
        } => {
            let args = delete::DeleteArgs {
                expression,
                datastore,
                show,
            };
            delete::run_bulk(&config, args).await
        }

        Commands::Count {
            expression,
            datastore,
            show,
        } => {
            let args = count::CountArgs {
                expression,
                datastore,
                show,
            };
            count::run(&config, args).await
        }
    }
}
