//! Command handlers grouped by concern.

pub(crate) mod batch;
pub(crate) mod config;
pub(crate) mod watch;

use std::sync::Arc;

use unspool_config::{IngestConfig, read_config_file};
use unspool_ingest::{CodecRegistry, Dispatcher, RarCodec, SharedSink};
use unspool_telemetry::LoggingConfig;

use crate::cli::CliContext;
use crate::error::{CliError, CliResult};

/// Read the settings file without checking the folders.
pub(crate) fn read_settings(ctx: &CliContext) -> CliResult<IngestConfig> {
    if !ctx.config_path.is_file() {
        return Err(CliError::validation(format!(
            "no settings file at {}; run `unspool config init` first",
            ctx.config_path.display()
        )));
    }
    Ok(read_config_file(&ctx.config_path)?)
}

/// Read the settings file and require both folders to be usable.
pub(crate) fn load_config(ctx: &CliContext) -> CliResult<IngestConfig> {
    let config = read_settings(ctx)?;
    config.validate()?;
    Ok(config)
}

/// Build the dispatcher for `config`, pinning the RAR tool when one was given.
pub(crate) fn build_dispatcher(
    ctx: &CliContext,
    config: IngestConfig,
    sink: SharedSink,
) -> CliResult<Dispatcher> {
    let dispatcher = Dispatcher::new(config, sink).map_err(CliError::failure)?;
    Ok(match &ctx.rar_tool {
        Some(tool) => dispatcher.with_codecs(
            CodecRegistry::default().with_codec(Arc::new(RarCodec::with_tool(tool))),
        ),
        None => dispatcher,
    })
}

pub(crate) fn init_logging(ctx: &CliContext) -> CliResult<()> {
    let logging = LoggingConfig {
        level: &ctx.log_level,
        ..LoggingConfig::default()
    };
    unspool_telemetry::init_logging(&logging).map_err(CliError::failure)
}
