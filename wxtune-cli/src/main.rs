//! wxtune CLI - playlists from the Hong Kong chart that match the current weather.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wxtune-cli",
    version,
    about = "Weather-matched Hong Kong chart playlists"
)]
struct Cli {
    #[command(subcommand)]
    command: wxtune_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[wxtune] cli: starting");
    wxtune_cmd::run(cli.command).await
}
