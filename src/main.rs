use anyhow::Result;
use apim_usage::apim::scanner;
use apim_usage::azure::client::{format_arm_error, ArmClient, DEFAULT_ENDPOINT};
use apim_usage::config;
use clap::{Parser, ValueEnum};
use tracing::Level;

/// Version injected at compile time via APIM_USAGE_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("APIM_USAGE_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Per-API Product and Subscription usage across Azure API Management services
#[derive(Parser, Debug)]
#[command(name = "apim-usage", version, about, long_about = None)]
struct Args {
    /// Azure subscription to scan (falls back to AZURE_SUBSCRIPTION_ID or SUBSCRIPTION_ID)
    #[arg(short, long)]
    subscription_id: Option<String>,

    /// Management endpoint (sovereign clouds, mock servers)
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Diagnostics go to stderr so the stdout report stays clean
fn setup_logging(level: LogLevel) {
    let Some(tracing_level) = level.to_tracing_level() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!("apim-usage {} started with log level: {:?}", VERSION, level);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.log_level);

    let Some(subscription_id) = config::resolve_subscription_id(args.subscription_id) else {
        println!("please set the SUBSCRIPTION_ID environment variable");
        return Ok(());
    };
    println!("using subscription {subscription_id}");

    let client = ArmClient::new(&subscription_id, &args.endpoint)?;

    scanner::walk_services(&client).await.map_err(|err| {
        eprintln!("Error: {}", format_arm_error(&err));
        err
    })
}
