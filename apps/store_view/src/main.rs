use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{config::load_config, QueueLink, ViewCore, ViewEvent};
use crossbeam_channel::Receiver;
use shared::protocol::ViewRequest;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod console;
mod render;

/// Bridges a controller on stdin/stdout to the view core.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    start_page: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(page) = args.start_page {
        config.start_page = page;
    }

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let (link, outbound) = QueueLink::unbounded();
    let writer = thread::spawn(move || forward_outbound(outbound));

    let mut core = ViewCore::new(&config, Arc::new(link));
    let mut events = core.subscribe_events();
    core.start(&config.start_page);
    render_pending(&core, &mut events);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let keep_running = handle_line(&mut core, &line);
        render_pending(&core, &mut events);
        if !keep_running {
            break;
        }
    }

    info!("shutting down view");
    drop(core);
    writer
        .join()
        .map_err(|_| anyhow!("outbound writer thread panicked"))?
}

/// Returns `false` once the user asked to quit.
fn handle_line(core: &mut ViewCore, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    if line.starts_with('{') {
        core.receive_raw(line);
        return true;
    }

    match console::parse(line) {
        Ok(console::Intent::Quit) => false,
        Ok(intent) => {
            if let Err(err) = console::apply(core, intent) {
                warn!(error = %err, "intent rejected");
            }
            true
        }
        Err(err) => {
            warn!(input = line, error = %err, "unrecognised console input");
            true
        }
    }
}

fn render_pending(core: &ViewCore, events: &mut broadcast::Receiver<ViewEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => render::render(core, &event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind; state changes skipped")
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

/// Writes one envelope per line until every link handle is dropped.
fn forward_outbound(outbound: Receiver<ViewRequest>) -> Result<()> {
    let stdout = io::stdout();
    for request in outbound.iter() {
        let envelope = request.to_envelope()?;
        let mut out = stdout.lock();
        writeln!(out, "{envelope}").context("failed to write envelope")?;
        out.flush().context("failed to flush stdout")?;
    }
    Ok(())
}
