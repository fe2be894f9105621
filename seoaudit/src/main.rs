use seoaudit::{
    command_argument_builder, handle_audit, handle_resolve, init_tracing, print_banner,
};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbosity = chosen_command.get_count("verbose");

    init_tracing(verbosity);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let code = match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command, quiet).await,
        Some(("resolve", primary_command)) => handle_resolve(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    std::process::exit(code);
}
