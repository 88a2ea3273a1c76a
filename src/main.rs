//! gesturewire demo - replay a touch trace through gesture handlers
//!
//! Reads a JSON trace (handlers + touch events), drives the registry with
//! it and prints every emitted handler event as a JSON line. Without a
//! trace file a built-in demo trace runs: a drag that activates a pan and
//! fails a tap, then a long press driven by the clock.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gesturewire::{
    EventDataMap, HandlerKind, HandlerRegistry, Point, TouchEvent, Tuning,
};

#[derive(Parser, Debug)]
#[command(name = "gesturewire")]
#[command(about = "Replay touch traces through gesture handlers", long_about = None)]
struct Args {
    /// JSON trace file (built-in demo trace when omitted)
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// TOML tuning file with baseline handler configs
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Pretty-print emitted events instead of one JSON line each
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Deserialize)]
struct Trace {
    handlers: Vec<HandlerDecl>,
    events: Vec<TraceEvent>,
}

#[derive(Debug, Deserialize)]
struct HandlerDecl {
    kind: String,
    tag: i32,
    #[serde(default = "default_target")]
    target: i32,
    #[serde(default)]
    config: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum TraceEvent {
    Down {
        id: i32,
        x: f64,
        y: f64,
        t: u64,
        #[serde(default = "default_target")]
        target: i32,
    },
    Move {
        id: i32,
        x: f64,
        y: f64,
        t: u64,
        #[serde(default = "default_target")]
        target: i32,
    },
    Up {
        id: i32,
        t: u64,
        #[serde(default = "default_target")]
        target: i32,
    },
    Cancel {
        t: u64,
        #[serde(default = "default_target")]
        target: i32,
    },
    Tick {
        t: u64,
    },
}

fn default_target() -> i32 {
    1
}

const DEMO_TRACE: &str = r#"{
  "handlers": [
    { "kind": "pan",        "tag": 1, "target": 1, "config": { "minDist": 15.0 } },
    { "kind": "tap",        "tag": 2, "target": 1 },
    { "kind": "long_press", "tag": 3, "target": 2 }
  ],
  "events": [
    { "op": "down", "id": 0, "x": 100.0, "y": 100.0, "t": 0,   "target": 1 },
    { "op": "move", "id": 0, "x": 130.0, "y": 100.0, "t": 32,  "target": 1 },
    { "op": "move", "id": 0, "x": 180.0, "y": 100.0, "t": 64,  "target": 1 },
    { "op": "up",   "id": 0, "t": 96,  "target": 1 },
    { "op": "down", "id": 0, "x": 400.0, "y": 300.0, "t": 1000, "target": 2 },
    { "op": "tick", "t": 1550 },
    { "op": "up",   "id": 0, "t": 1600, "target": 2 }
  ]
}"#;

/// Turn a JSON config object into the map the handlers consume
fn config_map(json: &serde_json::Map<String, serde_json::Value>) -> Result<EventDataMap> {
    let mut map = EventDataMap::new();
    for (key, value) in json {
        match value {
            serde_json::Value::Bool(b) => map.insert(key.as_str(), *b),
            serde_json::Value::String(s) => map.insert(key.as_str(), s.as_str()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    map.insert(key.as_str(), i);
                } else if let Some(f) = n.as_f64() {
                    map.insert(key.as_str(), f);
                } else {
                    bail!("config key '{}' has an unrepresentable number", key);
                }
            }
            other => bail!("config key '{}' has unsupported value {}", key, other),
        }
    }
    Ok(map)
}

fn run(args: &Args) -> Result<()> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path).context("loading tuning file")?,
        None => Tuning::default(),
    };

    let text = match &args.trace {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading trace {}", path.display()))?,
        None => DEMO_TRACE.to_string(),
    };
    let trace: Trace = serde_json::from_str(&text).context("parsing trace")?;

    let mut registry = HandlerRegistry::new();
    for decl in &trace.handlers {
        let kind = HandlerKind::from_name(&decl.kind)?;
        let mut handler = tuning.build(kind, decl.tag);
        handler.apply_config(&config_map(&decl.config)?)?;
        registry.register(handler)?;
        registry.attach(decl.tag, decl.target)?;
    }
    info!(
        handlers = trace.handlers.len(),
        events = trace.events.len(),
        "replaying trace"
    );

    let mut emitted = 0_usize;
    for entry in &trace.events {
        let batch = match *entry {
            TraceEvent::Down { id, x, y, t, target } => registry.dispatch_touch(
                target,
                &TouchEvent::Down { id, position: Point::new(x, y), time_ms: t },
            ),
            TraceEvent::Move { id, x, y, t, target } => registry.dispatch_touch(
                target,
                &TouchEvent::Motion { id, position: Point::new(x, y), time_ms: t },
            ),
            TraceEvent::Up { id, t, target } => {
                registry.dispatch_touch(target, &TouchEvent::Up { id, time_ms: t })
            }
            TraceEvent::Cancel { t, target } => {
                registry.dispatch_touch(target, &TouchEvent::Cancel { time_ms: t })
            }
            TraceEvent::Tick { t } => registry.tick(t),
        };
        for event in &batch {
            let line = if args.pretty {
                serde_json::to_string_pretty(event)?
            } else {
                serde_json::to_string(event)?
            };
            println!("{}", line);
        }
        emitted += batch.len();
    }

    info!(emitted, "replay complete");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "debug,gesturewire=debug"
    } else {
        "warn,gesturewire=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    run(&args)
}
