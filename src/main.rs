mod cli;

use clap::Parser;
use echoprobe::ping::Pinger;
use echoprobe::{logging, Error};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

async fn run(args: cli::Args) -> Result<(), Error> {
    let mode = args.validate()?;
    logging::init(args.log_file.as_deref())?;

    let mut pinger = Pinger::resolve(&args.target)?;
    args.apply(&mut pinger, mode);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    pinger.ping_async(cancel).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("echoprobe: {}", e);
            ExitCode::FAILURE
        }
    }
}
