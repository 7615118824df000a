use anyhow::Result;
use clap::Parser;

use linkclean_api::api::config::ApiConfig;
use linkclean_api::api::start_server;
use linkclean_api::resolver::ResolverConfig;
use linkclean_api::utils::logger::init_logger;

/// Expands shortened URLs in pasted text and strips tracking parameters
#[derive(Parser, Debug)]
#[command(name = "linkclean-api", version, about)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Resolution service endpoint; falls back to the
    /// LINKCLEAN_RESOLVER_ENDPOINT environment variable
    #[arg(long)]
    resolver_endpoint: Option<String>,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let _ = init_logger(&args.log_dir);

    // Resolver endpoint: flag first, then environment, then built-in default
    let endpoint = args
        .resolver_endpoint
        .or_else(|| std::env::var("LINKCLEAN_RESOLVER_ENDPOINT").ok());

    let mut config = ApiConfig::default();
    if let Some(endpoint) = endpoint {
        config.resolver = ResolverConfig::new(endpoint);
    }

    // Start server
    start_server(&args.host, args.port, Some(config)).await?;

    Ok(())
}
