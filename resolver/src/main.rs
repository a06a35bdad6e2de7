//! NIP resolver binary entry point

use clap::{Parser, Subcommand};
use serde::Serialize;

use nip_resolver::{NipResolver, ResolverConfig, ResolverError, ResolverResult};
use shared::{format_nip, logging, LookupOptions};

#[derive(Parser)]
#[command(name = "nip-resolver")]
#[command(about = "Validate Polish NIPs and resolve them to company data")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check format and checksum without any network access
    Validate { nip: String },

    /// Print a valid NIP as DDD-DDD-DD-DD
    Format { nip: String },

    /// Resolve a NIP through the provider chain
    Lookup {
        nip: String,

        /// Bypass the cache read
        #[arg(long)]
        skip_cache: bool,

        /// Fail with NIP_NOT_FOUND instead of returning a manual-entry placeholder
        #[arg(long)]
        no_manual: bool,
    },

    /// Report availability of every configured provider
    Status,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    if let Err(e) = run(args.command).await {
        eprintln!("{}", failure_line(&e));
        std::process::exit(1);
    }
}

async fn run(command: Command) -> ResolverResult<()> {
    match command {
        Command::Validate { nip } => print_json(&shared::nip::validate(&nip)),
        Command::Format { nip } => {
            let normalized = shared::nip::parse(&nip)
                .map_err(|reason| ResolverError::InvalidNip { reason })?;
            println!("{}", format_nip(&normalized));
            Ok(())
        }
        Command::Lookup { nip, skip_cache, no_manual } => {
            let resolver = build_resolver()?;
            let options = LookupOptions {
                skip_cache,
                allow_manual: !no_manual,
            };
            let result = resolver.lookup(&nip, options).await?;
            logging::log_success(&format!("Resolved {} via {}", format_nip(&result.nip), result.source));
            print_json(&result)
        }
        Command::Status => {
            let resolver = build_resolver()?;
            print_json(&resolver.provider_status().await)
        }
    }
}

fn build_resolver() -> ResolverResult<NipResolver> {
    let config = ResolverConfig::from_env()?;
    logging::log_startup(&format!("NIP resolver ({} environment)", config.environment));
    if config.registry.api_key.is_none() {
        tracing::warn!("NIP_REGISTRY_API_KEY is not set, official registry will report unavailable");
    }
    NipResolver::from_config(&config)
}

fn print_json<T: Serialize>(value: &T) -> ResolverResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ResolverError::Serialization {
            message: format!("Failed to render output: {e}"),
        })?;
    println!("{json}");
    Ok(())
}

/// `KIND: message`, the only line written to stderr on failure
fn failure_line(error: &ResolverError) -> String {
    format!("{}: {}", error.kind(), error)
}
