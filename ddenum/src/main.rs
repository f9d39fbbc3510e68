use commands::command_argument_builder;
use ddenum::handlers::{handle_enumerate, handle_list_probes, verbosity_level};
use ddenum_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();
    let quiet = matches.get_flag("quiet");

    // Logs share stderr with progress output; the report owns stdout
    tracing_subscriber::fmt()
        .with_max_level(verbosity_level(matches.get_count("verbose")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if matches.get_flag("list-probes") {
        handle_list_probes();
        return;
    }

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let code = handle_enumerate(&matches).await;
    std::process::exit(code);
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
