//! Config command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};

use dh_core::config::{self, PlatformConfig};

use crate::output::{print_info, print_success, print_warning};

fn resolve_path(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

/// Show current configuration
pub fn config_show(config_path: Option<&PathBuf>) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Using built-in defaults:");
        println!();
        let defaults = toml::to_string_pretty(&PlatformConfig::default())
            .context("Failed to render default configuration")?;
        println!("{}", defaults);
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    println!("{}", content);

    Ok(())
}

/// Get a config value by dotted key (e.g. `retry.exists_attempts`)
pub fn config_get(config_path: Option<&PathBuf>, key: &str) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let table: toml::Table = toml::from_str(&content).context("Failed to parse config file")?;

    let mut current = &toml::Value::Table(table);
    for part in key.split('.') {
        current = match current.as_table().and_then(|t| t.get(part)) {
            Some(v) => v,
            None => {
                print_warning(&format!("Key not found: {}", key));
                return Ok(());
            }
        };
    }

    match current {
        toml::Value::Table(_) => println!("{}", toml::to_string_pretty(current)?),
        toml::Value::String(s) => println!("{}", s),
        other => println!("{}", other),
    }

    Ok(())
}

/// Set a config value by dotted key, creating the file if needed
pub fn config_set(config_path: Option<&PathBuf>, key: &str, value: &str) -> Result<()> {
    let path = resolve_path(config_path);

    let mut table: toml::Table = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).context("Failed to parse config file")?
    } else {
        toml::Table::new()
    };

    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = parts
        .split_last()
        .context("Invalid key: key path cannot be empty")?;

    let mut current = &mut table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .with_context(|| format!("Cannot navigate to key: {}", key))?;
    }

    // Parse the value as the most specific TOML type it fits
    let toml_value = if value == "true" || value == "false" {
        toml::Value::Boolean(value == "true")
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    };
    current.insert(last.to_string(), toml_value);

    config::save_config(&path, &table)?;
    print_success(&format!("Set {} = {}", key, value));

    Ok(())
}
