use clap::Parser;
use gap_fill::cli::{Cli, Commands};
use gap_fill::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::example()?
        }
    };

    // Initialize telemetry
    let _telemetry = gap_fill::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Scan(args) => args.execute(&config).await?,
        Commands::Backtest(args) => args.execute(&config).await?,
        Commands::Detail(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("# Effective configuration");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
