use std::process::ExitCode;

fn main() -> ExitCode {
    match dosing_qc::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
