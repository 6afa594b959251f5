use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use skas_connector::config::DEFAULT_CONFIG_PATH;
use skas_connector::telemetry::{self, TracingTelemetry};
use skas_connector::{Configuration, LoginOutcome, PasswordConnector, Scopes};
use tokio_util::sync::CancellationToken;

const PASSWORD_ENV: &str = "SKAS_PASSWORD";

/// Check a login against the configured SKAS provider.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Connector configuration file.
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Connector identifier, shown in logs.
    #[arg(long, default_value = "skas")]
    id: String,
    /// Login to check. Password is read from `SKAS_PASSWORD` or stdin.
    #[arg(long, short)]
    login: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "login check aborted");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Configuration::read(Some(&args.config))?;
    let connector = config.open(&args.id, Box::new(TracingTelemetry::new()))?;

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => read_password(connector.prompt())?,
    };

    // Ctrl-C aborts the in-flight exchange.
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let outcome = connector
        .login(&cancel, &Scopes::default(), &args.login, &password)
        .await?;

    match outcome {
        LoginOutcome::Valid(identity) => {
            println!("{}", serde_json::to_string_pretty(&identity)?);
            Ok(ExitCode::SUCCESS)
        },
        LoginOutcome::InvalidPassword => {
            println!("invalid credentials");
            Ok(ExitCode::from(2))
        },
    }
}

fn read_password(prompt: &str) -> std::io::Result<String> {
    eprint!("{prompt} password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
