use clap::Parser;

use edgelimit::api::ApiClient;
use edgelimit::cli::{self, Cli, Commands};
use edgelimit::commands;
use edgelimit::config::Config;
use edgelimit::error::Error;
use edgelimit::output;

#[tokio::main(flavor = "current_thread")] // one request in flight at a time
async fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.log_level.as_deref());
    if let Err(e) = run(&cli).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let cfg = Config::from_env()?;
    let client = ApiClient::new(cfg)?;
    let zone = required_zone(&cli.zone)?;
    match &cli.command {
        Commands::List(args) => commands::list(&client, zone, args).await,
        Commands::Describe(args) => commands::describe(&client, zone, args).await,
        Commands::Create(args) => commands::create(&client, zone, args).await,
        Commands::Update(args) => commands::update(&client, zone, args).await,
        Commands::Delete(args) => commands::delete(&client, zone, args).await,
    }
}

fn required_zone(zone: &Option<String>) -> Result<&str, Error> {
    zone.as_deref()
        .ok_or_else(|| Error::Configuration("missing required flag --zone".to_string()))
}
