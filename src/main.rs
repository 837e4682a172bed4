use tracing_subscriber::{EnvFilter, fmt};
use tracing::debug;

use learnhub::cli::{self, Command};
use learnhub::config::ClientConfig;
use learnhub::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean on stdout
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = if args.is_empty() { "learnhub".to_string() } else { args.remove(0) };

    let inv = match cli::parse_args(&args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{}\n\n{}", e, cli::commands::usage(&program));
            std::process::exit(2);
        }
    };
    if inv.command == Command::Help {
        println!("{}", cli::commands::usage(&program));
        return Ok(());
    }

    let cfg = inv.config(ClientConfig::from_env());
    debug!(target: "learnhub", base_url = %cfg.base_url, session_dir = %cfg.session_dir.display(), "configuration");
    let app = App::from_config(&cfg)?;

    match cli::run(&app, &inv.command).await {
        Ok(out) => {
            println!("{}", out.trim_end());
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
