use std::process::ExitCode;

use dupe_sweep::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = dupe_sweep::cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
