mod args;
mod export;

use clap::Parser;
use log::debug;
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let res = export::run_export(&args);
    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("caused by: {}", source);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
