// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! intercept-relay CLI
//!
//! Runs URL logs through the interception core, for checking filters and
//! replaying captured sessions outside the host app.

use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use parking_lot::Mutex;
use serde_json::json;

use intercept_relay::{
    compile_patterns, BroadcastEvent, CallbackBridge, InterceptCoordinator, InterceptOutcome,
    RelayConfig, Result as RelayResult, SurfaceEvent, SurfaceId, SERVICE_WORKER_SURFACE,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intercept_relay=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "filter" => {
            if args.len() < 3 {
                eprintln!("Usage: intercept-relay filter <patterns> [file]");
                return ExitCode::from(1);
            }
            filter_urls(&args[2], args.get(3).map(String::as_str))
        }
        "replay" => {
            if args.len() < 3 {
                eprintln!("Usage: intercept-relay replay <log> [--config <file>] [--recent <n>]");
                return ExitCode::from(1);
            }
            replay_log(&args[2], &args[3..]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("intercept-relay {}", intercept_relay::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"intercept-relay - Webview request interception core

USAGE:
    intercept-relay <COMMAND> [OPTIONS]

COMMANDS:
    filter <patterns> [file]    Print URLs (one per line, stdin if no file) that
                                match any of the comma-separated patterns
    replay <log> [OPTIONS]      Run a session log through a coordinator and
                                print buffers, events and metrics as JSON
    help                        Show this help message
    version                     Show version information

REPLAY OPTIONS:
    --config <file>             JSON relay config
    --recent <n>                Entries to report per surface (default 20)

REPLAY LOG FORMAT (one directive per line, '#' starts a comment):
    <surface> <url>             Request seen by a surface
    service-worker <url>        Request made by a service worker
    subscribe <surface>
    unsubscribe <surface>
    patterns <surface> [p...]   Replace patterns (none = match all)
    echo <surface> on|off
    clear <surface>

EXAMPLES:
    intercept-relay filter 'login,\.m3u8$' urls.txt
    intercept-relay replay session.log --recent 5
"#
    );
}

fn open_input(path: Option<&str>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(p) if p != "-" => {
            let file = std::fs::File::open(p).with_context(|| format!("opening {}", p))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn filter_urls(patterns: &str, path: Option<&str>) -> anyhow::Result<()> {
    let config = RelayConfig::default();
    let compiled = compile_patterns(patterns.split(','), config.regex_size_limit);
    for err in &compiled.rejected {
        eprintln!("skipped: {}", err);
    }
    if compiled.active.is_empty() && !compiled.rejected.is_empty() {
        bail!("no valid patterns");
    }

    for line in open_input(path)?.lines() {
        let line = line?;
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if compiled.active.is_empty() || compiled.active.iter().any(|p| p.is_match(url)) {
            println!("{}", url);
        }
    }
    Ok(())
}

fn parse_surface(raw: &str) -> SurfaceId {
    raw.parse::<i64>()
        .map(SurfaceId::from)
        .unwrap_or_else(|_| SurfaceId::from(raw))
}

fn outcome_key(outcome: InterceptOutcome) -> &'static str {
    match outcome {
        InterceptOutcome::Ignored => "ignored",
        InterceptOutcome::Filtered => "filtered",
        InterceptOutcome::Buffered => "buffered",
        InterceptOutcome::Notified(_) => "notified",
    }
}

async fn replay_log(path: &str, options: &[String]) -> anyhow::Result<()> {
    let mut config = RelayConfig::default();
    let mut recent: i64 = 20;

    let mut opts = options.iter();
    while let Some(opt) = opts.next() {
        match opt.as_str() {
            "--config" => {
                let file = opts.next().context("--config needs a file")?;
                config = RelayConfig::from_file(file).with_context(|| format!("loading {}", file))?;
            }
            "--recent" => {
                let n = opts.next().context("--recent needs a number")?;
                recent = n.parse().with_context(|| format!("invalid count '{}'", n))?;
            }
            other => bail!("unknown option '{}'", other),
        }
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let surface_events = events.clone();
    let broadcast_events = events.clone();
    let bridge = CallbackBridge::new()
        .on_surface(Arc::new(
            move |surface: &SurfaceId, name: &str, payload: &SurfaceEvent| -> RelayResult<()> {
                surface_events
                    .lock()
                    .push(json!({ "channel": name, "surface": surface, "url": payload.url }));
                Ok(())
            },
        ))
        .on_broadcast(Arc::new(
            move |channel: &str, payload: &BroadcastEvent| -> RelayResult<()> {
                broadcast_events.lock().push(json!({ "channel": channel, "payload": payload }));
                Ok(())
            },
        ));

    let relay = InterceptCoordinator::new(config, Arc::new(bridge))?;
    let mut outcomes: BTreeMap<&'static str, u64> = BTreeMap::new();

    for (lineno, line) in open_input(Some(path))?.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (head, arg) {
            ("subscribe", Some(s)) => relay.subscribe(&parse_surface(s)),
            ("unsubscribe", Some(s)) => relay.unsubscribe(&parse_surface(s)),
            ("clear", Some(s)) => relay.clear_surface(&parse_surface(s)),
            ("echo", Some(s)) => {
                let on = matches!(parts.next(), Some("on") | Some("true") | Some("1"));
                relay.set_echo_all(&parse_surface(s), on);
            }
            ("patterns", Some(s)) => {
                let report = relay.set_patterns(&parse_surface(s), parts);
                for err in &report.rejected {
                    eprintln!("line {}: skipped {}", lineno + 1, err);
                }
            }
            (SERVICE_WORKER_SURFACE, Some(url)) => {
                let outcome = relay.on_service_worker_request(url);
                *outcomes.entry(outcome_key(outcome)).or_default() += 1;
            }
            (surface, Some(url)) => {
                let outcome = relay.on_request(&parse_surface(surface), url);
                *outcomes.entry(outcome_key(outcome)).or_default() += 1;
            }
            (_, None) => bail!("line {}: expected '<surface> <url>'", lineno + 1),
        }
    }

    let mut buffers = serde_json::Map::new();
    let mut surfaces = relay.store().surfaces();
    surfaces.sort();
    for surface in surfaces {
        let entries = relay.get_recent(&surface, recent).await?;
        buffers.insert(surface.to_string(), json!(entries));
    }

    let events = events.lock().clone();
    let report = json!({
        "outcomes": outcomes,
        "recent": buffers,
        "events": events,
        "metrics": relay.metrics(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
