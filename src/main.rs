use clap::Parser;
use ctk::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose, global.quiet);

    match cli.command {
        Commands::Fields(args) => ctk::cli::commands::fields::run(args, &global),
        Commands::Template(args) => ctk::cli::commands::template::run(args, &global),
        Commands::Map(args) => ctk::cli::commands::map::run(args, &global),
        Commands::Validate(args) => ctk::cli::commands::validate::run(args, &global),
        Commands::Import(args) => ctk::cli::commands::import::run(args, &global),
        Commands::Export(args) => ctk::cli::commands::export::run(args, &global),
        Commands::Completions(args) => ctk::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "ctk=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
