use std::process::ExitCode;

mod banner;
mod cli;
mod commands;

fn main() -> ExitCode {
    let (cli, matches) = match cli::parse_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            if cli::error_lacks_usage(&e) {
                eprintln!();
                eprintln!("{}", cli::render_usage());
            }
            // help and version go to stdout and are not failures
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    commands::run(&cli, &matches)
}
