use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wuxing-cli", version, about = "Wuxing guided-demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guided demo control
    Demo {
        #[command(subcommand)]
        action: commands::demo::DemoAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Demo { action } => commands::demo::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
