// SPDX-License-Identifier: AGPL-3.0-or-later
//! Treeloom - convert documents between annotated-leaf JSON, mdast JSON and markdown

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treeloom_cli::{into_flat, into_markdown, into_nested, load_config, open_file, save_file, Document};
use treeloom_core::ConvertConfig;

#[derive(Debug, Parser)]
#[command(name = "treeloom", version, about)]
struct Cli {
    /// TOML file with a [convert] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail on node and mark types without a handler
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Markdown or mdast JSON in, annotated-leaf JSON out
    ToFlat {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Annotated-leaf JSON or markdown in, mdast JSON out
    ToNested {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Annotated-leaf or mdast JSON in, markdown out
    ToMarkdown {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treeloom=info,treeloom_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.strict)?;

    match cli.command {
        Command::ToFlat { input, output } => {
            let flat = into_flat(&read_input(&input)?, &config)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            write_output(output.as_deref(), &to_json(&flat)?)
        }
        Command::ToNested { input, output } => {
            let nested = into_nested(&read_input(&input)?, &config)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            write_output(output.as_deref(), &to_json(&nested)?)
        }
        Command::ToMarkdown { input, output } => {
            let markdown = into_markdown(&read_input(&input)?, &config)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            write_output(output.as_deref(), &markdown)
        }
    }
}

/// Settings file first, then command-line flags on top
fn resolve_config(path: Option<&Path>, strict: bool) -> Result<ConvertConfig> {
    let mut config = match path {
        Some(path) => load_config(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => ConvertConfig::default(),
    };
    if strict {
        config.strict = true;
    }
    tracing::debug!(?config, "conversion settings");
    Ok(config)
}

fn read_input(path: &Path) -> Result<Document> {
    let opened = open_file(path).with_context(|| format!("failed to open {}", path.display()))?;
    let info = &opened.file_info;
    tracing::info!("Read {} as {} ({} bytes)", info.path, info.format, info.size);
    Ok(opened.document)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialize tree")?;
    json.push('\n');
    Ok(json)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            save_file(content, path).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
