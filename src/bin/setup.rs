//! Interactive credential setup.
//!
//! Prompts for the five X API credentials, writes them to `.env` (primary)
//! and the config file (fallback), then reports validation results.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use x_auto_poster::config::{self, save_credentials_to_env, AppConfig, TwitterCredentials};

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush().context("flushing stdout")?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).context("reading input")?;
    Ok(line.trim().to_string())
}

fn main() -> Result<()> {
    println!("Setting up X API credentials...");
    println!("You can get these from https://developer.x.com/en/portal/dashboard");
    println!();

    let creds = TwitterCredentials {
        bearer_token: prompt("Enter Bearer Token")?,
        api_key: prompt("Enter API Key")?,
        api_secret: prompt("Enter API Secret")?,
        access_token: prompt("Enter Access Token")?,
        access_token_secret: prompt("Enter Access Token Secret")?,
    };

    let path = config::config_path();
    let mut cfg = AppConfig::load_or_create(&path)?;
    cfg.twitter = creds.clone();

    save_credentials_to_env(&creds, Path::new(".env"))?;
    cfg.save(&path)?;
    println!();
    println!("Credentials saved to {} and .env", path.display());

    let errors = cfg.validate();
    if errors.is_empty() {
        println!();
        println!("Configuration validated successfully!");
        println!("You can now run the bot with: cargo run");
    } else {
        println!();
        println!("Configuration has errors:");
        for e in &errors {
            println!(" - {e}");
        }
        println!();
        println!("Please fix these issues before running the bot.");
    }

    Ok(())
}
