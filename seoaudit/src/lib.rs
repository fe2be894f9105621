pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{
    EXIT_ERRORS_FOUND, EXIT_FAILURE, EXIT_OK, exit_code_for, expand_output_path, handle_audit,
    handle_resolve, init_tracing, level_for_verbosity, parse_format, print_banner,
};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
