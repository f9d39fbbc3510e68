use crate::CLAP_STYLING;
use clap::arg;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("ddenum")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ddenum")
        .about("Enumerate what a Datadog API key (and optional application key) can read")
        .styles(CLAP_STYLING)
        .arg(
            arg!([API_KEY])
                .required(false)
                .help("Datadog API key (falls back to DD_API_KEY)"),
        )
        .arg(
            arg!([APP_KEY])
                .required(false)
                .help("Datadog application key (falls back to DD_APP_KEY)"),
        )
        .arg(
            arg!(-r --"region" <REGION>)
                .required(false)
                .help("Datadog site: us1, us3, us5, eu, ap1")
                .default_value("us1"),
        )
        .arg(
            arg!(--"api-url" <URL>)
                .required(false)
                .help("Explicit API base URL, overrides --region")
                .conflicts_with("region"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"attempt-all")
                .required(false)
                .help("Send probes that need an application key even when none was given")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-c --"category" <CATEGORY>)
                .required(false)
                .help("Only run probes in this category (repeatable, see --list-probes)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json, markdown")
                .value_parser(["text", "json", "markdown", "md"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: print to stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(
            arg!(-v --"verbose" ...)
                .required(false)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            arg!(--"list-probes")
                .required(false)
                .help("Print the probe catalog and exit")
                .action(clap::ArgAction::SetTrue),
        )
}
