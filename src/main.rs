//! Command-line front end for a host pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use hostpool::config::{load_config, HostConfig, PoolConfig};
use hostpool::health::{PingMonitor, PingStats};
use hostpool::observability::logging::init_logging;
use hostpool::{Pool, RequestOptions, Shutdown};

#[derive(Parser)]
#[command(name = "hostpool")]
#[command(about = "Talk to a cluster of database hosts through a resilient pool", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra host to register (repeatable)
    #[arg(long = "host")]
    hosts: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping every host once, or keep pinging with --watch
    Ping {
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        watch: bool,
    },
    /// GET a path and print the JSON response
    Get {
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },
    /// POST a path and print the response text
    Post {
        path: String,
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Show host eligibility
    Status,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PoolConfig::default(),
    };
    config.hosts.extend(cli.hosts.iter().map(HostConfig::new));

    init_logging(&config.observability);

    let pool = Arc::new(Pool::from_config(&config)?);
    if pool.hosts().is_empty() {
        return Err("no hosts configured; pass --host or --config".into());
    }

    match cli.command {
        Commands::Ping { path, timeout_ms, watch } => {
            let mut ping = config.ping.clone();
            if let Some(path) = path {
                ping.path = path;
            }
            if let Some(timeout_ms) = timeout_ms {
                ping.timeout_ms = timeout_ms;
            }

            if watch {
                let shutdown = Shutdown::new();
                let _ctrl_c = shutdown.trigger_on_ctrl_c();
                PingMonitor::new(pool.clone(), ping)
                    .run(shutdown.subscribe(), |report| print_json(&ping_report(report)))
                    .await;
            } else {
                let report = pool.ping(Duration::from_millis(ping.timeout_ms), &ping.path).await;
                print_json(&ping_report(&report));
            }
        }
        Commands::Get { path, query } => {
            let mut request = RequestOptions::get(path);
            request.query = query;
            let value: Value = pool.json(&request).await?;
            print_json(&value);
        }
        Commands::Post { path, query, body } => {
            let mut request = RequestOptions::post(path);
            request.query = query;
            request.body = body.map(String::into_bytes);
            println!("{}", pool.text(&request).await?);
        }
        Commands::Status => {
            let hosts: Vec<Value> = pool
                .hosts()
                .iter()
                .map(|h| {
                    let health = h.health();
                    json!({
                        "url": h.url().as_str(),
                        "eligible": h.is_eligible(std::time::Instant::now()),
                        "failures": health.backoff.attempt(),
                    })
                })
                .collect();
            print_json(&json!({
                "host_available": pool.host_is_available(),
                "hosts": hosts,
            }));
        }
    }

    Ok(())
}

fn ping_report(report: &[PingStats]) -> Value {
    Value::Array(
        report
            .iter()
            .map(|s| {
                json!({
                    "url": s.url,
                    "online": s.online,
                    "rtt_ms": s.rtt.map(|d| d.as_secs_f64() * 1000.0),
                    "version": s.version,
                })
            })
            .collect(),
    )
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: cannot render output: {}", e),
    }
}
