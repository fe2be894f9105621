use crate::CLAP_STYLING;
use clap::{arg, command};
use seoaudit_scanner::fetcher::DEFAULT_USER_AGENT;

fn sitemap_arg() -> clap::Arg {
    arg!(-s --"sitemap" <URL>)
        .required(true)
        .help("URL of the root sitemap.xml or sitemap index")
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Per-request timeout in seconds")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value("20")
}

fn user_agent_arg() -> clap::Arg {
    arg!(--"user-agent" <UA>)
        .required(false)
        .help("User-Agent header sent with every request")
        .default_value(DEFAULT_USER_AGENT)
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoaudit")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoaudit")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress bars and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ...)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("audit")
                .about(
                    "Resolve a sitemap tree and audit every page it lists for on-page SEO \
                issues.",
                )
                .arg(sitemap_arg())
                .arg(
                    arg!(-T --"thin-threshold" <WORDS>)
                        .required(false)
                        .help("Pages with fewer visible words than this are thin content")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("300"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of pages fetched concurrently")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(timeout_arg())
                .arg(user_agent_arg())
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("resolve")
                .about("Flatten a sitemap tree into its page URLs without auditing them")
                .arg(sitemap_arg())
                .arg(timeout_arg())
                .arg(user_agent_arg()),
        )
}
