use std::process::ExitCode;

fn main() -> ExitCode {
    jesprec_cli::run()
}
