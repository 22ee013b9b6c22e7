use anyhow::Error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use acquaint::config::{Cli, Commands, GenerateArgs, RunArgs};
use acquaint::{generate, report, run_batch};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Set the RUST_LOG, if it hasn't been explicitly defined
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "acquaint=info")
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Generate(args) => write_log(args),
    }
}

async fn run(args: RunArgs) -> Result<(), Error> {
    let settings = args.settings();
    tracing::info!(
        "computing for {} files with {} workers",
        args.files.len(),
        settings.workers
    );

    let outcomes = run_batch(&args.files, &settings).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report::render_json(&outcomes))?);
    } else {
        print!("{}", report::render_table(&outcomes));
    }

    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    tracing::info!(
        "program terminates normally; {} of {} sources failed",
        failed,
        outcomes.len()
    );
    Ok(())
}

fn write_log(args: GenerateArgs) -> Result<(), Error> {
    let settings = args.settings();
    let seed = generate::generate_file(&args.output, &settings)?;
    tracing::info!(
        "wrote {} calls to {} (seed {})",
        settings.records,
        args.output.display(),
        seed
    );
    Ok(())
}
