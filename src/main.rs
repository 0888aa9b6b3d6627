use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use logstash_notifier::codec::RecordFormatter;
use logstash_notifier::config::{
    local_hostname, process_state_events, self_name_from_env, user_data_from_inputs,
    CollectorConfig,
};
use logstash_notifier::{relay, EventFilter, EventListener, LogstashSink};

/// Supervisor event listener that forwards process state changes to Logstash.
///
/// Reads LOGSTASH_SERVER, LOGSTASH_PORT and LOGSTASH_PROTO from the environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Process states to forward, e.g. EXITED FATAL
    #[arg(
        short,
        long,
        num_args = 1..,
        value_name = "STATE",
        default_values = ["BACKOFF", "FATAL", "EXITED", "STOPPED", "STARTING", "RUNNING"]
    )]
    events: Vec<String>,

    /// Extra fields: `key=value`, or a variable name to copy from the environment
    #[arg(short, long, num_args = 1.., value_name = "TOKEN")]
    include: Vec<String>,

    /// Send integer-looking values as numbers
    #[arg(short, long)]
    coerce: bool,

    /// Terminate every record with a newline
    #[arg(short = 'n', long)]
    append_newline: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout belongs to the supervisor protocol
    initialize_logging(args.debug);

    let collector = CollectorConfig::from_env()?;
    let events = process_state_events(&args.events);
    info!(
        "Forwarding {} to {}://{}:{}",
        events.join(","),
        collector.protocol,
        collector.host,
        collector.port
    );

    let formatter = RecordFormatter::new(local_hostname())
        .user_data(user_data_from_inputs(&args.include))
        .coerce_integers(args.coerce)
        .append_newline(args.append_newline);

    let mut sink = LogstashSink::connect(
        collector.protocol,
        &collector.host,
        collector.port,
        formatter,
    )
    .await
    .context("Failed to connect to collector")?;

    let filter = EventFilter::new(events).self_name(self_name_from_env());
    info!("Dropping events from own process {}", filter.own_name());
    let mut listener = EventListener::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        filter,
    );

    let stats = relay(&mut listener, &mut sink)
        .await
        .context("Supervisor event stream failed")?;

    info!(
        "Shutting down: {} forwarded, {} failed",
        stats.forwarded, stats.failed
    );
    Ok(())
}

fn initialize_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}
