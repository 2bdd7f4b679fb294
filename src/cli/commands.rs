//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{OutputFormat, format_context, format_stats};
use crate::cli::parser::{Cli, Commands};
use crate::config::{ContextResolver, ContextSource};
use crate::error::Result;
use crate::filter::FilterPipe;
use crate::io::{endpoint_name, open_input, open_output};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. Filtered data written to stdout
/// is not part of the returned string.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Filter { input, output } => {
            cmd_filter(cli, input.as_deref(), output.as_deref(), format).await
        }
        Commands::Context => cmd_context(cli, format).await,
    }
}

fn resolver(cli: &Cli) -> ContextResolver {
    let resolver = ContextResolver::new().with_environment(cli.environment());
    match cli.timeout() {
        Some(limit) => resolver.with_timeout(limit),
        None => resolver,
    }
}

async fn cmd_filter(
    cli: &Cli,
    input: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    // Validate options before touching any file
    let options = cli.filter_options()?;

    let input_name = endpoint_name(input, "<stdin>");
    let output_name = endpoint_name(output, "<stdout>");
    let pipe = FilterPipe::new(cli.context_source(), resolver(cli), options)?
        .with_endpoints(input_name, output_name.clone());

    let reader = open_input(input).await?;
    let writer = open_output(output).await?;
    let stats = pipe.run(reader, writer).await?;

    // Stdout carries the filtered stream; report only when writing a file
    if output.is_some() && cli.verbose {
        format_stats(&stats, &output_name, format)
    } else {
        Ok(String::new())
    }
}

async fn cmd_context(cli: &Cli, format: OutputFormat) -> Result<String> {
    let context = match cli.context_source() {
        ContextSource::Inline(context) => context,
        ContextSource::Files(sources) => resolver(cli).resolve(&sources).await?,
    };
    format_context(&context, format)
}
