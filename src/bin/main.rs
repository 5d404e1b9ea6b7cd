use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "reco-gateway")]
#[command(about = "HTTP front for an external recommendation engine", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "reco-gateway.yaml")]
    config: String,
    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "reco_gateway=debug,tower_http=debug"
    } else {
        "reco_gateway=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = reco_gateway::run(&args.config, args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
