use unspool_config::{CopyPolicy, ExtensionSet, IngestConfig, PriorityGroups, write_config_file};

use crate::cli::{CliContext, ConfigInitArgs, OutputFormat};
use crate::commands::read_settings;
use crate::error::{CliError, CliResult};
use crate::output::render_config;

pub(crate) fn handle_config_show(ctx: &CliContext, format: OutputFormat) -> CliResult<()> {
    let config = read_settings(ctx)?;
    render_config(&ctx.config_path, &config, format)
}

pub(crate) fn handle_config_init(ctx: &CliContext, args: &ConfigInitArgs) -> CliResult<()> {
    if ctx.config_path.exists() && !args.force {
        return Err(CliError::validation(format!(
            "refusing to overwrite {} (pass --force to replace it)",
            ctx.config_path.display()
        )));
    }
    let config = config_from_args(args)?;
    config.validate()?;
    write_config_file(&ctx.config_path, &config)?;
    println!("Wrote settings to {}", ctx.config_path.display());
    Ok(())
}

fn config_from_args(args: &ConfigInitArgs) -> CliResult<IngestConfig> {
    let priority_groups = match args.priority.as_deref() {
        Some(raw) => {
            let groups = PriorityGroups::parse(raw);
            if groups.is_empty() {
                return Err(CliError::validation(format!(
                    "no valid priority groups in `{raw}`"
                )));
            }
            groups
        }
        None => PriorityGroups::default(),
    };
    let policy = CopyPolicy {
        extension_filter: args
            .extensions
            .as_deref()
            .map(ExtensionSet::parse)
            .filter(|set| !set.is_empty()),
        extension_filter_enabled: !args.no_filter,
        priority_enabled: !priority_groups.is_empty(),
        priority_groups,
        whole_folder_copy: args.whole_folder,
        delete_archive_after_extract: args.delete_archive,
        delete_extracted_after_copy: args.delete_extracted,
    };
    Ok(IngestConfig::new(&args.monitor, &args.destination).with_policy(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use anyhow::{Result, anyhow};
    use unspool_config::read_config_file;
    use unspool_test_support::fixtures::IngestWorkspace;

    fn context(workspace: &IngestWorkspace) -> CliContext {
        CliContext {
            config_path: workspace.root().join("conf").join("unspool.conf"),
            log_level: "info".to_string(),
            rar_tool: None,
        }
    }

    fn init_args(workspace: &IngestWorkspace) -> ConfigInitArgs {
        ConfigInitArgs {
            monitor: workspace.monitor().to_path_buf(),
            destination: workspace.destination().to_path_buf(),
            extensions: Some(".JPG, png".to_string()),
            no_filter: false,
            priority: Some("1-ai;2-png,eps".to_string()),
            whole_folder: false,
            delete_archive: true,
            delete_extracted: false,
            force: false,
        }
    }

    #[test]
    fn init_writes_a_readable_settings_file() -> Result<()> {
        let workspace = IngestWorkspace::new()?;
        let ctx = context(&workspace);
        handle_config_init(&ctx, &init_args(&workspace))
            .map_err(|err| anyhow!(err.display_message()))?;

        let config = read_config_file(&ctx.config_path)?;
        assert_eq!(config.monitor_folder, workspace.monitor());
        assert_eq!(config.destination_folder, workspace.destination());
        let filter = config
            .policy
            .extension_filter
            .ok_or_else(|| anyhow!("extension filter missing"))?;
        assert!(filter.contains("jpg"));
        assert!(filter.contains("png"));
        assert!(config.policy.priority_enabled);
        assert_eq!(config.policy.priority_groups.len(), 2);
        assert!(config.policy.delete_archive_after_extract);
        assert!(!config.policy.delete_extracted_after_copy);

        handle_config_show(&ctx, OutputFormat::Json)
            .map_err(|err| anyhow!(err.display_message()))?;
        Ok(())
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() -> Result<()> {
        let workspace = IngestWorkspace::new()?;
        let ctx = context(&workspace);
        fs::create_dir_all(workspace.root().join("conf"))?;
        fs::write(&ctx.config_path, "monitor_folder=/keep\n")?;

        let Err(err) = handle_config_init(&ctx, &init_args(&workspace)) else {
            anyhow::bail!("expected overwrite to be refused");
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fs::read_to_string(&ctx.config_path)?, "monitor_folder=/keep\n");

        let forced = ConfigInitArgs {
            force: true,
            ..init_args(&workspace)
        };
        handle_config_init(&ctx, &forced).map_err(|err| anyhow!(err.display_message()))?;
        assert!(fs::read_to_string(&ctx.config_path)?.contains("delete_after_zip=true"));
        Ok(())
    }

    #[test]
    fn init_rejects_unusable_input() -> Result<()> {
        let workspace = IngestWorkspace::new()?;
        let ctx = context(&workspace);

        let same_folder = ConfigInitArgs {
            destination: workspace.monitor().to_path_buf(),
            ..init_args(&workspace)
        };
        let Err(err) = handle_config_init(&ctx, &same_folder) else {
            anyhow::bail!("expected identical folders to fail");
        };
        assert_eq!(err.exit_code(), 2);

        let no_groups = ConfigInitArgs {
            priority: Some("label-;;".to_string()),
            ..init_args(&workspace)
        };
        let Err(err) = handle_config_init(&ctx, &no_groups) else {
            anyhow::bail!("expected empty priority groups to fail");
        };
        assert!(err.display_message().contains("no valid priority groups"));
        assert!(!ctx.config_path.exists());
        Ok(())
    }
}
