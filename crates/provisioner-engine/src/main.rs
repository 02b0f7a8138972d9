//! provisioner: CLI for client infrastructure provisioning
//!
//! `provision` creates the full resource chain for a client and prints the
//! receipt as JSON; `teardown` best-effort deletes everything a client may
//! have. Ctrl-C cancels the in-flight attempt, which rolls back whatever
//! was already created.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use provisioner_engine::{
    AwsContext, AwsResourceClient, Provisioner, ProvisionerConfig, ProvisionRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "provisioner")]
#[command(about = "Per-client cloud infrastructure provisioning")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision the full resource chain for a client
    Provision {
        /// Client identifier (lowercase letters, digits, hyphens)
        #[arg(long)]
        client_id: String,

        /// Human-readable client name
        #[arg(long)]
        client_name: String,

        /// AWS region (overrides AWS_REGION)
        #[arg(long)]
        region: Option<String>,
    },

    /// Delete every resource a client may have
    Teardown {
        /// Client identifier
        #[arg(long)]
        client_id: String,

        /// AWS region (overrides AWS_REGION)
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = ProvisionerConfig::from_env().context("failed to load configuration")?;
    let region_override = match &args.command {
        Command::Provision { region, .. } | Command::Teardown { region, .. } => region.clone(),
    };
    if let Some(region) = region_override {
        config.aws_region = region;
    }

    let ctx = AwsContext::new(&config.aws_region).await;
    if config.aws_account_id.is_none() {
        config.aws_account_id = Some(ctx.account_id().await?);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, rolling back in-flight work");
                cancel.cancel();
            }
        });
    }

    let provisioner = Provisioner::new(AwsResourceClient::from_context(&ctx), config);

    match args.command {
        Command::Provision {
            client_id,
            client_name,
            ..
        } => {
            let request = ProvisionRequest {
                client_id,
                client_name,
            };
            let receipt = provisioner
                .provision(&request, Some(&cancel))
                .await
                .map_err(|failure| anyhow::anyhow!("{failure}"))?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::Teardown { client_id, .. } => {
            let failures = provisioner
                .deprovision(&client_id)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            if failures.is_empty() {
                info!(client_id = %client_id, "teardown complete");
            } else {
                for failure in &failures {
                    warn!(resource = %failure.resource, error = %failure.error, "not deleted");
                }
                anyhow::bail!("teardown incomplete: {} resource(s) left", failures.len());
            }
        }
    }

    Ok(())
}
