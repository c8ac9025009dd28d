mod app;
mod cli;
mod config;
mod services;
mod ui;

use crate::cli::{Command, ThemeAction, TokenAction};
use crate::config::AppConfig;
use crate::services::clipboard::SystemClipboard;
use crate::services::notify::ConsoleNotifier;
use crate::services::token_storage::{select_token_storage, StorageBackends};
use crate::ui::{ThemeContext, ThemeLabState};
use anyhow::{Context, Result};
use clap::Parser;
use std::panic;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        eprintln!("ThemeLab panic: {info}");
        if let Some(location) = info.location() {
            eprintln!(
                "  at {}:{}",
                location.file(),
                location.line()
            );
        }
    }));

    let cli = cli::Cli::parse();
    let settings = AppConfig::load(&cli)?;
    init_tracing(&settings.log_filter);

    if let Some(command) = cli.command.clone() {
        return handle_command(command, &cli, &settings);
    }

    if cli.headless {
        println!("Headless mode: UI not launched. Try `themelab theme generate`.");
        return Ok(());
    }

    let theme = ThemeContext::load(settings.theme_path.as_deref())
        .context("loading theme descriptor")?;
    let backends = StorageBackends::detect(&settings.keyring_service, cli.ephemeral);
    app::run(settings, theme, backends)
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_command(command: Command, cli: &cli::Cli, settings: &AppConfig) -> Result<()> {
    let runtime = Runtime::new().context("starting tokio runtime")?;

    match command {
        Command::Theme { action } => {
            let theme = ThemeContext::load(settings.theme_path.as_deref())
                .context("loading theme descriptor")?;
            let mut lab = ThemeLabState::new();
            let text = lab.generate_theme(&theme).to_owned();
            match action {
                ThemeAction::Generate => println!("{text}"),
                ThemeAction::Copy => {
                    let clipboard = SystemClipboard::new();
                    runtime.block_on(async {
                        lab.copy_generated_theme(&clipboard, &ConsoleNotifier).await;
                        if cfg!(target_os = "linux") {
                            eprintln!("Serving the theme on the clipboard until it is replaced.");
                        }
                        clipboard.hold_until_replaced().await
                    })?;
                }
            }
        }
        Command::Token { secure, action } => {
            let backends = StorageBackends::detect(&settings.keyring_service, cli.ephemeral);
            let storage = select_token_storage(secure || settings.secure_token_storage, &backends);
            match action {
                TokenAction::Save { token } => {
                    let token = match token {
                        Some(token) => token,
                        None => cli::prompt_for_token().context("reading token")?,
                    };
                    runtime.block_on(storage.save_token(&token));
                    println!("Token saved to {}", storage.kind());
                }
                TokenAction::Get => match runtime.block_on(storage.get_token()) {
                    Some(token) => println!("{token}"),
                    None => println!("no token stored in {}", storage.kind()),
                },
                TokenAction::Delete => {
                    runtime.block_on(storage.delete_token());
                    println!("Token removed from {}", storage.kind());
                }
            }
        }
    }
    Ok(())
}
