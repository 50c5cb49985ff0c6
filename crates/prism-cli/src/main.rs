// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `prism`: headless host for the graph engine.
//! Reads a query response (file or stdin), pumps a run on the tokio runtime
//! and writes the exported graph to stdout as JSON. Logs go to stderr.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use prism_app_core::{ConfigService, ConsolePrefs};
use prism_config_fs::FsConfigStore;
use prism_graph::{
    normalize_schema_response, DisplayMode, GraphConfig, GraphRun, GraphSnapshot, ResultObject,
    RunEpoch,
};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn a graph query response into display nodes and edges")]
struct Args {
    /// Response JSON file; stdin when omitted or `-`
    input: Option<PathBuf>,
    /// Parent-qualified node ids: one node per path instead of one per entity
    #[arg(long)]
    tree: bool,
    /// Traversal items processed per batch
    #[arg(long)]
    batch_size: Option<usize>,
    /// Input is a schema-introspection response
    #[arg(long)]
    schema: bool,
    /// Pretty-print the graph
    #[arg(long)]
    pretty: bool,
    /// Ignore saved console preferences
    #[arg(long, conflicts_with = "save_prefs")]
    no_prefs: bool,
    /// Store the effective engine config as the new console preferences
    #[arg(long)]
    save_prefs: bool,
    /// Preferences directory (defaults to the platform config dir)
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = effective_config(&args)?;
    let raw = read_input(args.input.as_deref())?;
    let mut response = extract_response(&raw)?;
    if args.schema {
        response = normalize_schema_response(response);
    }

    let epoch = RunEpoch::new();
    let mut run = GraphRun::new(response, config, epoch.begin())?;
    let graph = run
        .drive_async()
        .await
        .ok_or_else(|| anyhow!("run was superseded before it finished"))?;
    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        batches = run.progress().batches,
        "graph ready"
    );
    write_graph(&graph, args.pretty)
}

/// Saved prefs (unless disabled) with command-line overrides applied.
fn effective_config(args: &Args) -> Result<GraphConfig> {
    let service = if args.no_prefs {
        None
    } else {
        let store = match &args.config_dir {
            Some(dir) => FsConfigStore::with_base(dir),
            None => FsConfigStore::new(),
        }
        .context("opening preferences store")?;
        Some(ConfigService::new(store))
    };

    let mut prefs = match &service {
        Some(service) => ConsolePrefs::load(service).context("loading console preferences")?,
        None => ConsolePrefs::default(),
    };
    if args.tree {
        prefs.graph.mode = DisplayMode::Tree;
    }
    if let Some(size) = args.batch_size {
        prefs.graph.batch_size = size;
    }
    prefs.graph.validate()?;

    if args.save_prefs {
        if let Some(service) = &service {
            prefs.save(service).context("saving console preferences")?;
            info!("console preferences saved");
        }
    }
    Ok(prefs.graph)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

/// The result object, unwrapped from a `{"data": {...}}` envelope if present.
fn extract_response(raw: &str) -> Result<ResultObject> {
    let value: Value = serde_json::from_str(raw).context("input is not valid JSON")?;
    let Value::Object(mut object) = value else {
        bail!("response must be a JSON object");
    };
    match object.remove("data") {
        Some(Value::Object(data)) => Ok(data),
        Some(other) => {
            object.insert("data".into(), other);
            Ok(object)
        }
        None => Ok(object),
    }
}

fn write_graph(graph: &GraphSnapshot, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, graph)?;
    } else {
        serde_json::to_writer(&mut out, graph)?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_is_unwrapped() {
        let r = extract_response(r#"{"data": {"q": [{"uid": "0x1"}]}, "extensions": {}}"#).unwrap();
        assert!(r.contains_key("q"));
        assert!(!r.contains_key("extensions"));
    }

    #[test]
    fn bare_result_object_is_used_as_is() {
        let r = extract_response(r#"{"q": [], "data": [1]}"#).unwrap();
        assert!(r.contains_key("q"));
        assert!(r.contains_key("data"));
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert!(extract_response("[1, 2]").is_err());
        assert!(extract_response("{").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["prism", "--no-prefs", "--tree", "--batch-size", "7"]);
        let cfg = effective_config(&args).unwrap();
        assert_eq!(cfg.mode, DisplayMode::Tree);
        assert_eq!(cfg.batch_size, 7);
    }
}
