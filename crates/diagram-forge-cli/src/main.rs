mod cli;
mod commands;
mod config;
#[allow(unused_assignments)]
mod diagnostic;
mod error;
mod logging;
mod output;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    logging::init(&cli.global);
    let output = output::OutputContext::from_global(&cli.global);

    let result = config::load_config(cli.global.config.as_deref()).and_then(|config| {
        match cli.command {
            cli::Commands::Check(args) => commands::check::run(args, &config, &output),
            cli::Commands::Fmt(args) => commands::fmt::run(args, &config, &output),
            cli::Commands::Export(args) => commands::export::run(args, &config, &output),
            cli::Commands::Completions(args) => commands::completions::run(args),
        }
    });

    match result {
        Ok(()) => std::process::exit(error::ExitCode::Success as i32),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}
