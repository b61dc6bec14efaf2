use tracing_subscriber::EnvFilter;
use xml_osi::cli::CommandLineInterface;

fn main() {
    // stdout carries the generated source, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        tracing::error!("{error:#}");
        std::process::exit(1);
    }
}
