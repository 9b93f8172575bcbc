use clap::Parser;

use impex::cli::{self, Cli};
use impex::diagnostics::{DiagnosticEvent, DiagnosticSink, LogSink};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if args.no_color {
        colored::control::set_override(false);
    }

    log::debug!("Starting impex");

    if let Err(e) = cli::run(args).await {
        LogSink.emit(DiagnosticEvent::Fatal {
            component: "impex",
            message: format!("{:#}", e),
        });
        std::process::exit(1);
    }
}
