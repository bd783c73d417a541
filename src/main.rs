use clap::Parser;
use fieldsales::args::{Args, Command, VisitSubcommand};
use fieldsales::{commands, Config, ErrorType, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for testing the program without a field-visit service. When
    // FIELDSALES_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Remote.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.service_url(),
            init_args.branch(),
            init_args.token(),
        )
        .await?
        .print(),

        Command::Quote(quote_args) => commands::quote(load_config(home).await?, quote_args.clone())
            .await?
            .print(),

        Command::Price(price_args) => {
            commands::price(price_args.rate(), price_args.qty(), price_args.discount()).print()
        }

        Command::Words(words_args) => commands::words(words_args.number()).print(),

        Command::Visit(visit_args) => match visit_args.action() {
            VisitSubcommand::Check(args) => commands::visit_check(args.form()).await?.print(),
            VisitSubcommand::Submit(args) => {
                let config = load_config(home).await?;
                commands::visit_submit(config, mode, args.form(), args.photos())
                    .await?
                    .print()
            }
        },
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home).await.map_err(|e| {
        fieldsales::Error::new(
            ErrorType::Config,
            e.context(format!(
                "Unable to load the configuration from {}. Have you run `fieldsales init`?",
                home.display()
            )),
        )
    })
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
