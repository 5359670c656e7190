use clap::Parser;
use miette::Result;
use tkt::cli::logging::init_tracing;
use tkt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => tkt::cli::commands::init::run(args),
        Commands::New(args) => tkt::cli::commands::new::run(args, &global),
        Commands::Show(args) => tkt::cli::commands::show::run(args, &global),
        Commands::List(args) => tkt::cli::commands::list::run(args, &global),
        Commands::Search(args) => tkt::cli::commands::search::run(args, &global),
        Commands::Edit(args) => tkt::cli::commands::edit::run(args, &global),
        Commands::Link(cmd) => tkt::cli::commands::link::run(cmd, &global),
        Commands::Delete(args) => tkt::cli::commands::delete::run(args, &global),
        Commands::Watch(args) => tkt::cli::commands::watch::run(args, &global),
        Commands::Completions(args) => tkt::cli::commands::completions::run(args),
    }
}
