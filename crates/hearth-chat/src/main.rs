//! Hearth Chat - terminal chat client
//!
//! Runs the chat client against the in-process backend emulator.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive session
//! hearth-chat run --config hearth.toml
//!
//! # Two seeded accounts take turns talking
//! hearth-chat demo
//! ```

mod commands;
mod config;
mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hearth_backend::{Emulator, SeedAccount, SeedData};
use hearth_client::{ChatClient, ClientError, CredentialForm};
use hearth_logging::HearthSubscriberBuilder;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use commands::Command;
use config::AppConfig;
use display::*;

/// Hearth Chat - a minimal chat client
#[derive(Parser)]
#[command(name = "hearth-chat")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Run,
    /// Play a short conversation between two accounts
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let mut logging = HearthSubscriberBuilder::new().with_config(config.logging.clone());
    if let Some(level) = &cli.log_level {
        logging = logging.with_level(level);
    }
    let _log_guard = logging.init();

    match cli.command {
        Commands::Run => cmd_run(config).await,
        Commands::Demo => cmd_demo(config).await,
    }
}

/// Backend emulator and a client rendering to the terminal
async fn connect(config: &AppConfig, seed: &SeedData) -> Result<(Emulator, ChatClient)> {
    let emulator = Emulator::new();
    emulator
        .seed(seed, &config.client.collections.users)
        .await
        .context("Failed to seed the backend emulator")?;

    let client = ChatClient::new(
        emulator.identity.clone(),
        Arc::new(emulator.store.clone()),
        Arc::new(TerminalSurface::default()),
        config.client.clone(),
    );
    Ok((emulator, client))
}

async fn cmd_run(config: AppConfig) -> Result<()> {
    print_banner();
    let (_emulator, client) = connect(&config, &config.seed).await?;
    info!(variant = ?config.client.variant, "Starting interactive session");

    client.start();
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match Command::parse(&line) {
            Command::Quit => break,
            command => execute(&client, command).await,
        }
    }

    client.shutdown().await;
    print_info("Goodbye!");
    Ok(())
}

/// Run one command; failures were already alerted by the client
async fn execute(client: &ChatClient, command: Command) {
    match command {
        Command::Login(mut form) => {
            let _ = client.login(&mut form).await;
        }
        Command::Signup(form) => {
            let _ = client.signup(&form).await;
        }
        Command::Submit(mut form) => {
            let _ = client.submit(&mut form).await;
        }
        Command::Logout => {
            let _ = client.logout().await;
        }
        Command::ToggleMode => {
            client.toggle_form_mode();
        }
        Command::Help => print_help(),
        Command::Message(mut text) => match client.send(&mut text) {
            Ok(_) => {}
            Err(ClientError::NotSignedIn) => print_error("Log in before sending messages."),
            Err(e) => print_error(&e.to_string()),
        },
        Command::Invalid(msg) => print_error(&msg),
        Command::Quit => {}
    }
}

async fn cmd_demo(config: AppConfig) -> Result<()> {
    print_banner();
    print_info("Two accounts take turns; each snapshot redraws the list.");

    let seed = if config.seed.accounts.len() >= 2 {
        config.seed.clone()
    } else {
        demo_seed()
    };
    let (_emulator, client) = connect(&config, &seed).await?;
    client.start();

    let [first, second] = [&seed.accounts[0], &seed.accounts[1]];
    let script = [
        (first, "Hey! Is anyone around?"),
        (second, "Hi, just logged in."),
        (first, "Messages arrive over a live query."),
        (second, "And names come from the profile cache."),
    ];

    for (account, text) in script {
        let mut form = CredentialForm::new(account.email.as_str(), account.password.as_str());
        client
            .login(&mut form)
            .await
            .with_context(|| format!("Demo login failed for {}", account.email))?;
        tokio::time::sleep(Duration::from_millis(200)).await;

        if let Some(pending) = client.send(&mut text.to_string())? {
            pending.confirmed().await?;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        client.logout().await?;
    }

    client.shutdown().await;
    println!();
    print_success("Demo complete!");
    Ok(())
}

fn demo_seed() -> SeedData {
    SeedData {
        accounts: vec![
            SeedAccount {
                email: "ann@example.com".into(),
                password: "ann-pw".into(),
                display_name: Some("Ann".into()),
            },
            SeedAccount {
                email: "bob@example.com".into(),
                password: "bob-pw".into(),
                display_name: Some("Bob".into()),
            },
        ],
    }
}
