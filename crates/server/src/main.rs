mod relay;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "brawl-server")]
#[command(about = "Message relay for brawl peers")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    log::info!("relay listening on {bind_addr}");
    relay::run(&bind_addr).await
}
