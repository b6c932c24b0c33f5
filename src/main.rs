// src/main.rs

use terrapolice::{EXIT_CODE_ERROR, EXIT_CODE_OK, cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(()) => EXIT_CODE_OK,
        Err(err) => {
            eprintln!("terrapolice error: {err:?}");
            EXIT_CODE_ERROR
        }
    };
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<()> {
    // Slack credentials may live in a local .env file.
    dotenvy::dotenv().ok();

    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
