//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use healthnav_core::HealthnavConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "extraction.max_value_gap")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init(init_args) => init_config(init_args, ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> anyhow::Result<()> {
    if !ctx.config_path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}

fn init_config(args: InitArgs, ctx: &Context) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| ctx.config_path.clone());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    HealthnavConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> anyhow::Result<()> {
    let json = serde_json::to_value(&ctx.config)?;
    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> anyhow::Result<()> {
    // Bare words that are not valid JSON are stored as strings
    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&ctx.config)?;
    assign(&mut json, key, parsed_value.clone())?;

    let config: HealthnavConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = ctx.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(&ctx.config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(ctx: &Context) -> anyhow::Result<()> {
    println!("Configuration file: {}", ctx.config_path.display());
    println!("Data directory: {}", ctx.data_dir.display());

    if ctx.config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'healthnav config init' to create a configuration file.");
    }

    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Set a dotted key; only existing sections can be descended into.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (path, last) = match key.rsplit_once('.') {
        Some((path, last)) => (Some(path), last),
        None => (None, key),
    };

    let mut current = json;
    if let Some(path) = path {
        for part in path.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let obj = current
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?;
    if !obj.contains_key(last) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    obj.insert(last.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(HealthnavConfig::default()).unwrap();
        assert_eq!(lookup(&json, "assistant.top_k"), Some(&json!(1)));
        assert_eq!(lookup(&json, "assistant.missing"), None);
    }

    #[test]
    fn test_assign_existing_key() {
        let mut json = serde_json::to_value(HealthnavConfig::default()).unwrap();
        assign(&mut json, "extraction.max_value_gap", json!(50)).unwrap();

        let config: HealthnavConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.extraction.max_value_gap, 50);
    }

    #[test]
    fn test_assign_rejects_unknown_key() {
        let mut json = serde_json::to_value(HealthnavConfig::default()).unwrap();
        assert!(assign(&mut json, "extraction.typo", json!(1)).is_err());
        assert!(assign(&mut json, "nope.key", json!(1)).is_err());
    }
}
