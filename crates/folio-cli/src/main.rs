mod commands;
mod prompt;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFLICT, EXIT_FAILURE, EXIT_STORE_ERROR, EXIT_VALIDATION_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Validate and publish extensions into a MyBible CLI extensions repository"
)]
struct Cli {
    /// Path to the extensions repository root.
    #[arg(long, default_value = ".", global = true)]
    repo: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate an extension archive and add it to the registry.
    Publish {
        /// Path to the extension archive (.zip).
        archive: PathBuf,
        /// Answer yes to every confirmation.
        #[arg(short, long, default_value_t = false, conflicts_with = "non_interactive")]
        yes: bool,
        /// Never prompt; take the default answer for every confirmation.
        #[arg(long, default_value_t = false)]
        non_interactive: bool,
    },
    /// Validate an extension archive without touching the repository.
    Validate {
        /// Path to the extension archive (.zip).
        archive: PathBuf,
    },
    /// List published extensions.
    List,
    /// Show one registry entry.
    Inspect {
        /// Extension name.
        name: String,
    },
    /// Check every published artifact against its registry entry.
    Verify,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FOLIO_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let repo = cli.repo.as_path();

    let result = match cli.command {
        Commands::Publish {
            archive,
            yes,
            non_interactive,
        } => commands::publish::run(repo, &archive, yes, non_interactive, json_output),
        Commands::Validate { archive } => commands::validate::run(repo, &archive, json_output),
        Commands::List => commands::list::run(repo, json_output),
        Commands::Inspect { name } => commands::inspect::run(repo, &name, json_output),
        Commands::Verify => commands::verify::run(repo, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest validation failed:")
                || msg.starts_with("file validation failed")
            {
                EXIT_VALIDATION_ERROR
            } else if msg.starts_with("store error:")
                || msg.starts_with("lock error:")
                || msg.starts_with("I/O error:")
            {
                EXIT_STORE_ERROR
            } else if msg.starts_with("publish cancelled:") || msg.contains("already published") {
                EXIT_CONFLICT
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
