//! carbonmart deploys the carbon token and its NFT marketplace, then hands the
//! contract artifacts over to the frontend.

mod cli;

use anyhow::Result;
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};

use carbonmart_deploy::{DeploymentOutcome, Deployer};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let base = Deployer::load(cli.config.as_deref())?;
    let save_config = cli.save_config.clone();
    let deployer = cli.into_builder(base).build()?;

    if let Some(path) = save_config {
        deployer.save_to_file(&path)?;
    }

    let outcome = deployer.deploy().await?;
    println!("{}", summary(&outcome));

    Ok(())
}

/// Render the deployed contracts and the files written for the frontend.
fn summary(outcome: &DeploymentOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Contract", "Address", "Transaction", "Artifact"]);

    for (deployed, artifact) in [
        (&outcome.token, &outcome.token_artifact),
        (&outcome.marketplace, &outcome.marketplace_artifact),
    ] {
        table.add_row(vec![
            deployed.contract.clone(),
            deployed.address.to_checksum(None),
            deployed.tx_hash.to_string(),
            artifact.display().to_string(),
        ]);
    }

    table
}
