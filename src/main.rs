//! voxelgate - authoritative block-edit server for classic voxel clients
//!
//! Main executable: loads configuration, builds the world and serves clients.

mod config;

use anyhow::{Context, Result};
use config::{ServerConfig, DEFAULT_CONFIG_PATH};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::{env, process};
use tracing::{error, info, warn};
use voxelgate_core::ConnectionId;
use voxelgate_net::ServerEndpoint;
use voxelgate_server::{serve, ServerContext};
use voxelgate_world::World;

#[tokio::main]
async fn main() -> Result<()> {
    // INFO by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting voxelgate v{}", env!("CARGO_PKG_VERSION"));

    let cli = match CliOptions::parse(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: voxelgate [--config <path>] [--bind <addr>]");
            process::exit(2);
        }
    };
    let mut cfg = ServerConfig::load_from_path(&cli.config);
    if let Some(bind) = cli.bind {
        cfg.bind = bind;
    }

    let perms = Arc::new(cfg.block_permissions());
    let world = World::flat(cfg.world_name.clone(), cfg.world, perms);
    if let Some(path) = &cfg.audit_log {
        world
            .audit()
            .open_sink(path)
            .with_context(|| format!("Failed to open audit log {}", path.display()))?;
        info!("Audit log enabled at {}", path.display());
    }
    let (width, height, length) = world.dimensions();
    info!(
        "World {} ready ({}x{}x{})",
        world.name(),
        width,
        height,
        length
    );
    let world = Arc::new(world);
    let ctx = Arc::new(ServerContext::new(cfg.policy.clone()));

    let endpoint = ServerEndpoint::bind(cfg.bind).await?;
    let mut next_id = 0u64;
    loop {
        tokio::select! {
            accepted = endpoint.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Failed to accept connection: {:#}", e);
                        continue;
                    }
                };
                next_id += 1;
                let id = ConnectionId(next_id);
                let (world, ctx) = (Arc::clone(&world), Arc::clone(&ctx));
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, peer, id, world, ctx).await {
                        warn!(conn = %id, "Session from {} ended with error: {:#}", peer, e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    if let Err(e) = world.audit().flush() {
        error!("Failed to flush audit log: {:#}", e);
    }
    Ok(())
}

struct CliOptions {
    config: PathBuf,
    bind: Option<SocketAddr>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self, String> {
        let mut opts = CliOptions {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            bind: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().ok_or("--config requires a path")?;
                    opts.config = PathBuf::from(value);
                }
                "--bind" => {
                    let value = args.next().ok_or("--bind requires an address")?;
                    let addr = value
                        .parse()
                        .map_err(|e| format!("invalid --bind address {value:?}: {e}"))?;
                    opts.bind = Some(addr);
                }
                other => return Err(format!("unknown argument {other:?}")),
            }
        }
        Ok(opts)
    }
}
