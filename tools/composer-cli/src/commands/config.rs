//! Show or persist the effective configuration.

use anyhow::Context;
use composer_common::ComposerConfig;

pub fn run(config: &ComposerConfig, save: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        config.save().context("Failed to save config")?;
        tracing::info!("Config saved");
    }
    Ok(())
}
