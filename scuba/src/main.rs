use colored::Colorize;
use scuba::commands::command_argument_builder;
use scuba::handlers::{FATAL_EXIT_CODE, handle_audit, handle_init, init_logging, print_banner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(quiet, verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command, quiet)
            .await
            .map(ExitCode::from),
        Some(("init", primary_command)) => handle_init(primary_command).map(|()| ExitCode::SUCCESS),
        // No subcommand provided, just show the banner
        None => Ok(ExitCode::SUCCESS),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}
