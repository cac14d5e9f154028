// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailforge - bulk email dispatch and progress tracking service.
//!
//! This is the binary entry point for the Mailforge server.

use clap::{Parser, Subcommand};

mod serve;

/// Mailforge - bulk email dispatch and progress tracking service.
#[derive(Parser, Debug)]
#[command(name = "mailforge", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Mailforge HTTP server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match mailforge_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            mailforge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("mailforge serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("mailforge: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    #[test]
    #[serial]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config =
            mailforge_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
    }
}
