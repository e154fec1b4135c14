mod actions;
mod config;
mod datasource;
mod db;
mod domains;
mod error;
mod export;
mod ipc;
mod logging;
mod notify;
mod pipeline;

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;

use crate::datasource::{DataSource, FixtureSource};
use crate::domains::Domain;

enum Event {
    Line(String),
    Tick,
    Eof,
}

fn startup(state: &mut ipc::AppState) -> anyhow::Result<()> {
    if let Some(ws) = state.config.workspace.clone() {
        let conn = db::open_db(&ws)
            .with_context(|| format!("failed to open workspace {}", ws.to_string_lossy()))?;
        state.db = Some(conn);
        state.workspace = Some(ws);
    }
    for name in state.config.autoload.clone() {
        let domains = if name == "all" {
            Domain::ALL.to_vec()
        } else {
            vec![Domain::parse(&name)?]
        };
        for domain in domains {
            let data = FixtureSource.load(domain)?;
            state.portal.install(data)?;
        }
    }
    Ok(())
}

/// Envelope for a line that is not a valid request. The id is echoed when
/// the line is JSON with a string id.
fn bad_request(line: &str, e: &serde_json::Error) -> serde_json::Value {
    let id = serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string))
        .unwrap_or_default();
    ipc::err(&id, "bad_json", e.to_string(), None)
}

fn write_line(stdout: &mut io::Stdout, resp: &serde_json::Value) -> io::Result<()> {
    let text = serde_json::to_string(resp).unwrap_or_else(|_| "{\"ok\":false}".to_string());
    writeln!(stdout, "{}", text)?;
    stdout.flush()
}

fn main() -> anyhow::Result<()> {
    let cfg = config::PortalConfig::load()?;
    logging::init_logging(&cfg.log_level)?;

    let refresh = Duration::from_millis(cfg.stats_refresh_ms.max(1));
    let mut state = ipc::AppState::new(cfg);
    startup(&mut state)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        loaded = state.portal.loaded().count(),
        "portald ready"
    );

    let (tx, rx) = mpsc::channel::<Event>();

    let reader_tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if reader_tx.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = reader_tx.send(Event::Eof);
    });

    thread::spawn(move || loop {
        thread::sleep(refresh);
        if tx.send(Event::Tick).is_err() {
            return;
        }
    });

    let mut stdout = io::stdout();
    for event in rx {
        match event {
            Event::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let resp = match serde_json::from_str::<ipc::Request>(&line) {
                    Ok(req) => ipc::handle_request(&mut state, req),
                    Err(e) => bad_request(&line, &e),
                };
                if let Err(e) = write_line(&mut stdout, &resp) {
                    tracing::error!(error = %e, "stdout closed");
                    break;
                }
            }
            Event::Tick => ipc::tick(&mut state),
            Event::Eof => break,
        }
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}
