//! Configuration commands: validate, init, list-types

use anyhow::{Context, Result};
use marquee_config::{ConfigLoader, MarqueeConfig};
use std::fs;
use std::path::Path;

use super::build_registry;

/// Handle configuration validation
pub fn handle_validate(path: &Path) -> Result<()> {
    tracing::info!("Validating configuration file: {}", path.display());

    let config = match ConfigLoader::new().from_file(path) {
        Ok(config) => config,
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            return Err(e).context(format!("Invalid configuration: {}", path.display()));
        }
    };

    let registry = build_registry()?;
    println!("✅ Configuration file is valid");
    println!(
        "   {} sources ({} enabled)",
        config.sources.len(),
        config.enabled_sources().count()
    );
    for source in &config.sources {
        let status = if !source.enabled {
            "disabled"
        } else if registry.contains(&source.source_type) {
            "ok"
        } else {
            "unknown type"
        };
        println!(
            "   - {} [{}] {} ({})",
            source.id, source.source_type, source.schedule, status
        );
    }
    Ok(())
}

/// Write the sample document to `output`
pub fn handle_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {}. Use --force to overwrite.",
            output.display()
        ));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, MarqueeConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Sample configuration generated at: {}", output.display());
    println!("🔧 Validate with: marquee validate --config {}", output.display());
    Ok(())
}

pub fn handle_list_types() -> Result<()> {
    for source_type in build_registry()?.list_types() {
        println!("{}", source_type);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sources.yaml");

        handle_init(&path, false).unwrap();
        assert!(handle_validate(&path).is_ok());

        // Refuses to clobber without --force
        assert!(handle_init(&path, false).is_err());
        assert!(handle_init(&path, true).is_ok());
    }

    #[test]
    fn test_validate_reports_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yaml");
        fs::write(
            &path,
            "sources:\n  - { id: a, type: clock, schedule: \"* * *\" }\n",
        )
        .unwrap();

        assert!(handle_validate(&path).is_err());
    }
}
