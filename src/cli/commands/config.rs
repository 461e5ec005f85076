//! Config command implementation.
//!
//! View and modify convo-edit configuration settings.

use std::path::PathBuf;

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::Config;
use crate::error::{EditorError, Result};

use super::config_path;

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let path = config_path(cli)?;
    match &args.action {
        ConfigAction::Show => show_config(cli, &load(&path)),
        ConfigAction::Get { key } => get_config_value(cli, &load(&path), key),
        ConfigAction::Set { key, value } => set_config_value(&path, key, value),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init => init_config(&path),
        ConfigAction::Reset => reset_config(&path),
    }
}

fn load(path: &std::path::Path) -> Config {
    if path.exists() {
        Config::load_from(path).unwrap_or_default()
    } else {
        Config::default()
    }
}

/// Show full configuration.
fn show_config(cli: &Cli, config: &Config) -> Result<()> {
    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        _ => {
            println!("convo-edit Configuration");
            println!("========================\n");

            println!("[editor]");
            println!("  output_suffix = \"{}\"", config.editor.output_suffix);
            println!("  max_file_size = {}", config.editor.max_file_size);
            println!("  strict = {}", config.editor.strict);
            println!();

            println!("[mirror]");
            println!("  enabled = {}", config.mirror.enabled);
            match &config.mirror.path {
                Some(path) => println!("  path = \"{}\"", path.display()),
                None => println!("  path = # not set"),
            }
            println!();

            println!("[display]");
            println!("  preview_width = {}", config.display.preview_width);
            println!("  show_errors = {}", config.display.show_errors);
            println!();

            println!("[theme]");
            println!("  name = \"{}\"", config.theme.name);
            println!("  color = {}", config.theme.color);
            println!("  unicode = {}", config.theme.unicode);
        }
    }

    Ok(())
}

/// Get a specific configuration value.
fn get_config_value(cli: &Cli, config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "editor.output_suffix" => config.editor.output_suffix.clone(),
        "editor.max_file_size" => config.editor.max_file_size.to_string(),
        "editor.strict" => config.editor.strict.to_string(),

        "mirror.enabled" => config.mirror.enabled.to_string(),
        "mirror.path" => config
            .mirror
            .path
            .as_ref()
            .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string()),

        "display.preview_width" => config.display.preview_width.to_string(),
        "display.show_errors" => config.display.show_errors.to_string(),

        "theme.name" => config.theme.name.clone(),
        "theme.color" => config.theme.color.to_string(),
        "theme.unicode" => config.theme.unicode.to_string(),

        _ => return Err(unknown_key(key)),
    };

    match cli.effective_output() {
        OutputFormat::Json => println!("{}", serde_json::json!({ key: value })),
        _ => println!("{value}"),
    }

    Ok(())
}

/// Set a configuration value.
fn set_config_value(path: &std::path::Path, key: &str, value: &str) -> Result<()> {
    let mut config = load(path);

    match key {
        "editor.output_suffix" => config.editor.output_suffix = value.to_string(),
        "editor.max_file_size" => config.editor.max_file_size = parse_u64(value)?,
        "editor.strict" => config.editor.strict = parse_bool(value)?,

        "mirror.enabled" => config.mirror.enabled = parse_bool(value)?,
        "mirror.path" => {
            config.mirror.path = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }

        "display.preview_width" => config.display.preview_width = parse_usize(value)?,
        "display.show_errors" => config.display.show_errors = parse_bool(value)?,

        "theme.name" => config.theme.name = value.to_string(),
        "theme.color" => config.theme.color = parse_bool(value)?,
        "theme.unicode" => config.theme.unicode = parse_bool(value)?,

        _ => return Err(unknown_key(key)),
    }

    config.save_to(path)?;
    println!("Set {key} = {value}");

    Ok(())
}

/// Initialize configuration file with defaults.
fn init_config(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use 'convo-edit config reset' to reset to defaults.");
        return Ok(());
    }

    Config::default().save_to(path)?;
    println!("Created configuration file at: {}", path.display());

    Ok(())
}

/// Reset configuration to defaults.
fn reset_config(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        println!("No configuration file exists. Use 'convo-edit config init' to create one.");
        return Ok(());
    }

    Config::default().save_to(path)?;
    println!("Reset configuration to defaults at: {}", path.display());

    Ok(())
}

fn unknown_key(key: &str) -> EditorError {
    EditorError::ConfigError {
        message: format!("Unknown configuration key: {key}"),
    }
}

/// Parse boolean value.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(EditorError::ConfigError {
            message: format!("Invalid boolean value: {s}. Use true/false."),
        }),
    }
}

/// Parse usize value.
fn parse_usize(s: &str) -> Result<usize> {
    s.parse().map_err(|_| EditorError::ConfigError {
        message: format!("Invalid number: {s}"),
    })
}

/// Parse u64 value.
fn parse_u64(s: &str) -> Result<u64> {
    s.parse().map_err(|_| EditorError::ConfigError {
        message: format!("Invalid number: {s}"),
    })
}
