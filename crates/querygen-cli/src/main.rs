//! querygen CLI - generate, build and run native queries.

mod build;
mod colors;
mod generate;
mod progress;
mod run;
mod settings;
mod source;
mod template;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use querygen_core::ElementType;

use settings::Settings;
use template::TemplateOptions;

#[derive(Parser)]
#[command(name = "querygen")]
#[command(about = "Generate, build and run native storage engine queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root containing the storage engine (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (default: <root>/querygen.toml if present)
    #[arg(long, global = true, env = "QUERYGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Skip the formatter
    #[arg(long, global = true)]
    no_format: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write and format generated source without building it
    Generate {
        /// Artifact name (file base name, build target and module name)
        name: String,

        /// Source file to read, or `-` for stdin
        #[arg(short, long)]
        source: String,

        /// Append the default bridge for this artifact
        #[arg(long)]
        bridge: bool,
    },

    /// Build a previously generated artifact
    Build {
        /// Artifact name
        name: String,
    },

    /// Generate, build and execute an artifact
    Run {
        /// Artifact name
        name: String,

        /// Source file to read, or `-` for stdin
        #[arg(short, long)]
        source: String,

        /// Append the default bridge for this artifact
        #[arg(long)]
        bridge: bool,
    },

    /// Print bridge code for a module (or a query header with --header)
    Template {
        /// Module name, or the query hash with --header
        name: String,

        /// Native query class template
        #[arg(long, default_value = "Query")]
        query_type: String,

        /// Attribute element types
        #[arg(long, value_delimiter = ',', default_value = "long,long")]
        keys: Vec<ElementType>,

        /// Annotation element type
        #[arg(long, default_value = "long")]
        annotation: ElementType,

        /// Return this query member from fetch_data instead of a placeholder
        #[arg(long)]
        fetch_member: Option<String>,

        /// Print the query header skeleton instead
        #[arg(long)]
        header: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format querygen-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<querygen_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    let load_settings = || {
        Settings::load(
            cli.root.as_deref(),
            cli.config.as_deref(),
            cli.no_format,
            cli.json,
        )
        .map_err(format_error)
    };

    match cli.command {
        Commands::Generate {
            name,
            source,
            bridge,
        } => generate::execute(&load_settings()?, &name, &source, bridge).map_err(format_error)?,

        Commands::Build { name } => build::execute(&load_settings()?, &name).map_err(format_error)?,

        Commands::Run {
            name,
            source,
            bridge,
        } => run::execute(&load_settings()?, &name, &source, bridge).map_err(format_error)?,

        Commands::Template {
            name,
            query_type,
            keys,
            annotation,
            fetch_member,
            header,
        } => {
            let options = TemplateOptions {
                query_type,
                keys,
                annotation,
                fetch_member,
                header,
            };
            template::execute(&name, options)?;
        }
    }

    Ok(())
}
