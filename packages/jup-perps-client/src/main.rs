use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use jup_perps_client::{config::CloseArgs, Cli, Command, Config, PerpsClient};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    run(cli.command, &config)
}

fn run(command: Command, config: &Config) -> Result<()> {
    let mut client = PerpsClient::new(config)?;
    let owner = client.owner();
    info!(%owner, rpc_url = %config.rpc_url, "loaded signer");

    match command {
        Command::Demo {
            open,
            close_price_slippage,
            desired_mint,
        } => {
            let signature = client.open_position(&open.increase_request(owner)?)?;
            info!(%signature, "increase request submitted");

            let close = CloseArgs {
                market: open.market,
                price_slippage: close_price_slippage,
                desired_mint,
            };
            // The keeper executes the increase asynchronously, the position may not exist yet
            match client.close_position(&close.decrease_request(owner)?) {
                Ok(signature) => info!(%signature, "decrease request submitted"),
                Err(err) if err.is_position_state() => warn!(%err, "nothing to close"),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Open(open) => {
            let signature = client.open_position(&open.increase_request(owner)?)?;
            info!(%signature, "increase request submitted");
        }
        Command::Close(close) => {
            let signature = client.close_position(&close.decrease_request(owner)?)?;
            info!(%signature, "decrease request submitted");
        }
        Command::Position(market) => {
            let position_pk = market.position_key(owner).position_pk()?;
            match client.fetch_position(&position_pk)? {
                Some(position) => info!(
                    position = %position_pk,
                    side = ?position.side,
                    price = position.price,
                    size_usd = position.size_usd,
                    collateral_usd = position.collateral_usd,
                    realised_pnl_usd = position.realised_pnl_usd,
                    open = position.is_open(),
                    "position"
                ),
                None => info!(position = %position_pk, "no position account"),
            }
        }
    }
    Ok(())
}
