use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sensible::{SensibleError, ToolKind, Toolbox};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sensible", version, about = "Open files, text, URLs or output in your preferred editor, browser or pager.")]
struct Cli {
    /// Log resolution and process lifecycle details to stderr
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Kind {
    Editor,
    Browser,
    Pager,
}

impl From<Kind> for ToolKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Editor => ToolKind::Editor,
            Kind::Browser => ToolKind::Browser,
            Kind::Pager => ToolKind::Pager,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum Cmd {
    /// Print the executable (and fixed arguments) that would be used
    Find {
        #[arg(value_enum, default_value = "editor")]
        kind: Kind,
    },
    /// Edit files in the preferred editor
    Edit {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Edit text in a scratch file and print the result
    EditTmp {
        /// Initial contents of the scratch file
        #[arg(default_value = "")]
        text: String,
    },
    /// Open URLs in the preferred browser
    Browse {
        #[arg(required = true)]
        urls: Vec<Url>,
    },
    /// Show a file (or stdin) in the preferred pager
    Page { file: Option<PathBuf> },
}

fn init_logging(verbose: bool) {
    let filter = env::var("SENSIBLE_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_source(file: Option<&PathBuf>) -> anyhow::Result<Box<dyn Read + Send>> {
    Ok(match file {
        Some(p) => Box::new(
            File::open(p).with_context(|| format!("failed to open {}", p.display()))?,
        ),
        None => Box::new(io::stdin()),
    })
}

fn page(tools: &Toolbox, file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut source = open_source(file)?;
    // Nothing to page interactively; pass the bytes through like `git` does.
    if !atty::is(atty::Stream::Stdout) {
        return match io::copy(&mut source, &mut io::stdout().lock()) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("failed to copy input to stdout")),
        };
    }
    tools.page(source)?;
    Ok(())
}

fn run(cli: &Cli, tools: &Toolbox) -> anyhow::Result<()> {
    match &cli.command {
        Cmd::Find { kind } => {
            let session = tools.session((*kind).into())?;
            if session.args().is_empty() {
                println!("{}", session.path().display());
            } else {
                println!("{} {}", session.path().display(), session.args().join(" "));
            }
        }
        Cmd::Edit { files } => tools.edit(files.as_slice())?,
        Cmd::EditTmp { text } => {
            let out = tools.edit_tmp(text)?;
            print!("{out}");
        }
        Cmd::Browse { urls } => tools.browse(urls)?,
        Cmd::Page { file } => page(tools, file.as_ref())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let tools = Toolbox::from_env();

    match run(&cli, &tools) {
        Ok(()) => ExitCode::from(0),
        Err(e) => match e.downcast_ref::<SensibleError>() {
            // The tool already told the user what went wrong.
            Some(se @ SensibleError::NonZeroExit { .. }) => ExitCode::from(se.exit_code()),
            Some(se) => {
                eprintln!("sensible: {se}");
                ExitCode::from(se.exit_code())
            }
            None => {
                eprintln!("sensible: {e:#}");
                ExitCode::from(1)
            }
        },
    }
}
