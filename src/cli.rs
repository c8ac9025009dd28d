use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Password};
use std::path::PathBuf;

/// Command line interface for ThemeLab.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "themelab",
    author,
    version,
    about = "Theme Lab for the embeddable chat widget"
)]
pub struct Cli {
    /// Optional path to a configuration file (TOML, YAML, JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Named profile to load (e.g. dev, staging, prod).
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Theme descriptor (JSON) to use instead of the configured one.
    #[arg(long, global = true)]
    pub theme: Option<PathBuf>,

    /// Keep the local token in memory only, for this process.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Launch without opening the UI (useful for scripting and diagnostics).
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the theme descriptor shown by the Theme Lab.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Manage the stored session token.
    Token {
        /// Use the system keychain instead of local storage.
        #[arg(long, global = true)]
        secure: bool,
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Print the generated theme text.
    Generate,
    /// Copy the generated theme text to the clipboard.
    Copy,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TokenAction {
    /// Store a token; prompts when none is given.
    Save { token: Option<String> },
    /// Print the stored token.
    Get,
    /// Forget the stored token.
    Delete,
}

pub fn prompt_for_token() -> Result<String, dialoguer::Error> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Session token")
        .allow_empty_password(false)
        .interact()
}
