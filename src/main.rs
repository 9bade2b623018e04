use anyhow::anyhow;
use clap::Parser;
use clap_derive::{Parser, Subcommand};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use tokio::select;
use tracing::{info, Level};

use udping::config::{ProberConfig, ResponderConfig};
use udping::prober::Prober;
use udping::responder::Responder;
use udping::util::random::RngRandom;


#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(short, long, default_value_t = false)]
    verbose: bool,

    #[clap(long, default_value_t = false)]
    very_verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Answer liveness probes, dropping a configurable fraction of them, and
    ///  shut down after an idle period
    Serve {
        #[clap(long, default_value = "localhost")]
        host: String,

        #[clap(long, default_value_t = 12345)]
        port: u16,

        /// seconds of inactivity before the responder terminates itself
        #[clap(long, default_value_t = 20)]
        idle_timeout: u64,

        /// probability in [0.0, 1.0] of silently discarding a valid probe
        #[clap(long, default_value_t = 0.3)]
        drop_probability: f64,
    },
    /// Send a bounded sequence of liveness probes and report each outcome
    Probe {
        #[clap(long, default_value = "localhost")]
        host: String,

        #[clap(long, default_value_t = 12345)]
        port: u16,

        #[clap(long, default_value_t = 10)]
        attempts: usize,

        /// seconds to wait for each probe's acknowledgment
        #[clap(long, default_value_t = 1)]
        timeout: u64,
    },
}

fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port).to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow!("no address found for {}:{}", host, port))
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match (args.verbose, args.very_verbose) {
        (_, true) => Level::TRACE,
        (true, _) => Level::DEBUG,
        (false, false) => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init()
        .ok();

    match args.command {
        Command::Serve { host, port, idle_timeout, drop_probability } => {
            let mut config = ResponderConfig::new(resolve(&host, port)?);
            config.idle_timeout = Duration::from_secs(idle_timeout);
            config.drop_probability = drop_probability;

            let responder = Responder::<RngRandom>::bind(config).await?;
            select! {
                result = responder.serve() => { result }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, shutting down");
                    Ok(())
                }
            }
        }
        Command::Probe { host, port, attempts, timeout } => {
            let mut config = ProberConfig::new(resolve(&host, port)?);
            config.attempts = attempts;
            config.attempt_timeout = Duration::from_secs(timeout);

            // timeouts are reported per attempt, never as a process failure
            let prober = Prober::bind(config).await?;
            prober.run().await?;
            Ok(())
        }
    }
}
