use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use conduit_core::{
    Document, InMemoryConduit, LoadPolicy, MemorySessionChannel, Runtime, ShellConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

const DEMO_FIXTURES: &str = include_str!("../fixtures/demo.json");

/// Boots the Conduit shell, replays a navigation script and prints every rendered page.
#[derive(Parser, Debug)]
struct Args {
    /// Location the shell boots at, e.g. `/` or `#/article/some-slug`.
    #[arg(long)]
    location: Option<String>,
    /// Further locations to visit in order after boot.
    #[arg(long = "visit")]
    visits: Vec<String>,
    /// File holding the boot payload (a JSON-encoded user, optionally wrapped in a JSON string).
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[arg(long)]
    fixtures: Option<PathBuf>,
    #[arg(long)]
    load_policy: Option<LoadPolicy>,
    /// Raw session payload delivered as if another tab had written it.
    #[arg(long)]
    external_session: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(location) = args.location {
        settings.start_location = location;
    }
    if let Some(path) = args.session_file {
        settings.session_path = Some(path);
    }
    if let Some(path) = args.fixtures {
        settings.fixtures_path = Some(path);
    }
    if let Some(policy) = args.load_policy {
        settings.load_policy = policy;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let api = match &settings.fixtures_path {
        Some(path) => InMemoryConduit::from_fixture_file(path)?,
        None => InMemoryConduit::from_fixture_json(DEMO_FIXTURES)
            .context("embedded demo fixtures are invalid")?,
    };
    let channel = Arc::new(MemorySessionChannel::new());
    let shell_config = ShellConfig {
        load_policy: settings.load_policy,
    };
    info!(policy = ?settings.load_policy, location = %settings.start_location, "starting");

    let mut runtime = match &settings.session_path {
        Some(path) => {
            let payload = fs::read_to_string(path)
                .with_context(|| format!("failed to read session from '{}'", path.display()))?;
            Runtime::boot_with_payload(
                shell_config,
                Arc::new(api),
                channel.clone(),
                Some(payload.trim()),
                &settings.start_location,
            )
        }
        None => Runtime::boot(
            shell_config,
            Arc::new(api),
            channel.clone(),
            &settings.start_location,
        ),
    };
    runtime.settle().await;
    print_document(runtime.location(), &runtime.render());

    if let Some(raw) = args.external_session {
        channel.notify_external(raw);
        runtime.settle().await;
        print_document(runtime.location(), &runtime.render());
    }

    for location in args.visits {
        runtime.visit(&location);
        runtime.settle().await;
        print_document(runtime.location(), &runtime.render());
    }

    Ok(())
}

fn print_document(location: &str, document: &Document) {
    println!("=== {location} | {}", document.title);
    println!("{}", document.body);
    println!();
}
