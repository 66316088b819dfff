use clap::Parser;

use linkhub::cli::{Cli, Commands};
use linkhub::config::{get_config, init_config};
use linkhub::runtime::modes;
use linkhub::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());

    match cli.command {
        None | Some(Commands::Serve) => {
            let config = get_config();
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                return Err(e);
            }
            Ok(())
        }
        Some(command) => {
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
