//! `carb`: content-addressable, deduplicating backup ingester with
//! forward-error-correction parity. Thin entry point; all orchestration
//! lives in the library half of this crate (see `lib.rs`) so it can be
//! exercised from integration tests without going through
//! `std::process::exit`.

use carb_cli::cli::Cli;
use clap::Parser;

fn main() {
    carb_telemetry::init_logging();
    let cli = Cli::parse();

    let exit_code = match carb_cli::run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("carb: {e}");
            carb_cli::exit_code_for(&e)
        }
    };
    std::process::exit(exit_code);
}
