use clap::{ArgAction, arg, command};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/scuba/scuba.json";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("scuba")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("scuba")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true)
                .conflicts_with("verbose"),
        )
        .arg(
            arg!(-v --"verbose" "Log every link decision and check")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default audit configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Where to write the configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(--"force")
                        .help("Overwrite an existing configuration file at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("audit")
                .about(
                    "Collect the internal links in a site's navigation and footer, then smoke \
                test every page found.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL (usually the home page)")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to a JSON audit configuration (see `scuba init`)"),
                )
                .arg(
                    arg!(--"origin" <ORIGIN>)
                        .required(false)
                        .help("Additional origin treated as internal. The seed's origin is always included.")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(--"special-path" <PATH>)
                        .required(false)
                        .help("Path fragment of pages without navbar/footer (replaces the configured list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(--"seed-timeout" <SECS>)
                        .required(false)
                        .help("Seconds allowed for loading the seed page")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"nav-timeout" <SECS>)
                        .required(false)
                        .help("Seconds allowed for each page navigation")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"idle-timeout" <SECS>)
                        .required(false)
                        .help("Seconds to wait for network idle before checking a page")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"settle" <MILLIS>)
                        .required(false)
                        .help("Fixed delay after network idle, in milliseconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-color")
                        .required(false)
                        .help("Disable coloured output")
                        .action(ArgAction::SetTrue),
                ),
        )
}
