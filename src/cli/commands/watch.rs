//! `tkt watch` command - Reload on file changes and report each reload

use console::style;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ItemWatcher, StoreEvent};

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Debounce window in milliseconds (default from config)
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// Exit after this many reloads
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,
}

pub fn run(args: WatchArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let debounce = args
        .debounce
        .map(Duration::from_millis)
        .unwrap_or_else(|| ws.config.watch_debounce());

    let store = Arc::new(ws.store);
    let (mut watcher, events) = ItemWatcher::spawn(Arc::clone(&store), debounce)?;

    if !global.quiet && global.format != OutputFormat::Json {
        println!(
            "{} Watching {} ({} items, Ctrl-C to stop)",
            style("●").green(),
            style(store.dir().display()).cyan(),
            store.len()
        );
    }

    let mut seen = 0;
    while let Ok(event) = events.recv() {
        report(&event, store.len(), global)?;
        seen += 1;
        if args.count.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    watcher.stop();
    Ok(())
}

fn report(event: &StoreEvent, items: usize, global: &GlobalOpts) -> Result<()> {
    if global.format == OutputFormat::Json {
        let value = match event {
            StoreEvent::Reloaded(stats) => serde_json::json!({
                "event": "reloaded",
                "items": items,
                "files_scanned": stats.files_scanned,
                "files_skipped": stats.files_skipped,
                "duration_ms": stats.duration_ms,
            }),
            StoreEvent::ReloadFailed(error) => serde_json::json!({
                "event": "reload_failed",
                "error": error,
            }),
        };
        println!("{}", serde_json::to_string(&value).into_diagnostic()?);
        return Ok(());
    }

    let time = chrono::Local::now().format("%H:%M:%S");
    match event {
        StoreEvent::Reloaded(stats) => {
            if !global.quiet {
                println!(
                    "{} {} reloaded {} item(s) in {}ms",
                    style(time).dim(),
                    style("✓").green(),
                    items,
                    stats.duration_ms
                );
            }
        }
        StoreEvent::ReloadFailed(error) => {
            eprintln!(
                "{} {} reload failed: {}",
                style(time).dim(),
                style("✗").red(),
                error
            );
        }
    }
    Ok(())
}
