use std::process::ExitCode;

fn main() -> ExitCode {
    cfo_tracker_lib::run()
}
