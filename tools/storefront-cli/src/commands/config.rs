//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    if let Some(ref env) = ctx.environment {
        ctx.output.kv("environment", env);
    }

    let config = &ctx.config;

    ctx.output.info("[server]");
    ctx.output.kv("host", &config.server.host);
    ctx.output.kv("port", &config.server.port.to_string());
    ctx.output.kv("frontend_url", &config.server.frontend_url);

    ctx.output.info("[database]");
    ctx.output.kv("url", &config.database.url);
    ctx.output
        .kv("max_connections", &config.database.max_connections.to_string());
    ctx.output
        .kv("busy_timeout_ms", &config.database.busy_timeout_ms.to_string());

    ctx.output.info("[pricing]");
    ctx.output.kv("currency", &config.pricing.currency);
    ctx.output
        .kv("shipping_flat", &config.pricing.shipping_flat.to_string());
    ctx.output.kv("tax_rate", &config.pricing.tax_rate.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("level", &config.logging.level);
    ctx.output.kv("format", &config.logging.format.to_string());

    if !config.environments.is_empty() {
        ctx.output.info("Environments:");
        let mut names: Vec<&String> = config.environments.keys().collect();
        names.sort();
        for env in names {
            ctx.output.list_item(env);
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output
        .success(&format!("Created {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let (errors, warnings) = ctx.config.check();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    } else {
        for warning in &warnings {
            ctx.output.warn(warning);
        }
        for error in &errors {
            ctx.output.error(error);
        }
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }
    ctx.output.success("Configuration is valid");

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::config::StoreConfig;
    use crate::output::Output;

    fn context_in(dir: &std::path::Path) -> Context {
        Context {
            config: StoreConfig::default(),
            output: Output::new(false, true),
            cwd: dir.to_path_buf(),
            environment: None,
            config_path: None,
        }
    }

    #[test]
    fn test_init_refuses_overwrite() -> TestResult {
        let dir = tempfile::tempdir()?;
        let ctx = context_in(dir.path());

        init_config(false, &ctx)?;
        let written = fs::read_to_string(dir.path().join("storefront.toml"))?;
        assert_eq!(written, generate_default_config());

        assert!(init_config(false, &ctx).is_err());
        init_config(true, &ctx)?;

        Ok(())
    }

    #[test]
    fn test_validate_fails_on_errors() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut ctx = context_in(dir.path());
        validate_config(&ctx)?;

        ctx.config.pricing.currency = "XYZ".to_string();
        assert!(validate_config(&ctx).is_err());

        Ok(())
    }
}
