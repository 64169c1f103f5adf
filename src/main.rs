use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use svn_scm::{
    commands::{handlers::CommandArgs, registry},
    core::{
        app::App,
        error::{AppResult, user_message},
        settings::Settings,
    },
};

#[derive(Parser, Debug)]
#[command(name = "svn-scm", about = "Run svn operations across the working copies in a folder")]
struct Cli {
    /// Settings file (defaults to svn-scm.toml in the current folder)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print every svn command line and its stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show local changes of a working copy.
    Status { path: Option<PathBuf> },
    /// Schedule files for addition.
    Add { paths: Vec<PathBuf> },
    /// Schedule files for deletion.
    Remove {
        paths: Vec<PathBuf>,
        /// Keep the files on disk
        #[arg(long, default_value_t = false)]
        keep_local: bool,
    },
    /// Discard local changes.
    Revert {
        paths: Vec<PathBuf>,
        #[arg(short, long, default_value_t = false)]
        recursive: bool,
    },
    /// Move files into a changelist, or out of any with --remove.
    Changelist {
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long, default_value_t = false)]
        remove: bool,
    },
    /// Commit the given files, or a changelist of one working copy when no files are given.
    Commit {
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Update a working copy to HEAD or a given revision.
    Update {
        path: Option<PathBuf>,
        /// Target revision (e.g., "100", "r100" or "HEAD")
        #[arg(short, long)]
        revision: Option<String>,
        #[arg(long, default_value_t = false)]
        ignore_externals: bool,
    },
    /// Switch to an existing branch.
    Switch {
        /// Branch name; pick from a list when omitted
        name: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Create a branch from the current URL and switch to it.
    Branch {
        name: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// List branches, trunk first.
    Branches { path: Option<PathBuf> },
    /// Show history.
    Log {
        path: Option<PathBuf>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Resolve conflicts; all of them when no path is given.
    Resolve {
        paths: Vec<PathBuf>,
        /// Conflict choice passed to `svn resolve --accept`
        #[arg(long)]
        accept: Option<String>,
    },
    /// Set an svn property on files.
    Propset { paths: Vec<PathBuf> },
    /// Add files to svn:ignore of their folder.
    Ignore {
        paths: Vec<PathBuf>,
        /// Ignore every file with the same extension
        #[arg(long, default_value_t = false)]
        by_extension: bool,
    },
    /// Print a patch of the local changes.
    Patch { paths: Vec<PathBuf> },
    /// Print the base side of a changed file.
    Show {
        path: PathBuf,
        /// BASE, HEAD, or empty for the working copy baseline
        #[arg(long)]
        against: Option<String>,
    },
    /// Run svn cleanup.
    Cleanup { path: Option<PathBuf> },
    /// List the working copies that were found.
    Repositories,
}

impl Commands {
    fn into_invocation(self) -> (&'static str, CommandArgs) {
        let mut args = CommandArgs::default();
        let id = match self {
            Commands::Status { path } => { args.paths.extend(path); "svn.status" },
            Commands::Add { paths } => { args.paths = paths; "svn.add" },
            Commands::Remove { paths, keep_local } => { args.paths = paths; args.flag = keep_local; "svn.remove" },
            Commands::Revert { paths, recursive } => { args.paths = paths; args.flag = recursive; "svn.revert" },
            Commands::Changelist { paths, name, remove } => {
                args.paths = paths;
                args.name = name;
                args.flag = remove;
                "svn.changelist"
            },
            Commands::Commit { paths, message } => { args.paths = paths; args.message = message; "svn.commit" },
            Commands::Update { path, revision, ignore_externals } => {
                args.paths.extend(path);
                args.revision = revision;
                args.flag = ignore_externals;
                "svn.update"
            },
            Commands::Switch { name, path } => { args.paths.extend(path); args.name = name; "svn.switchBranch" },
            Commands::Branch { name, path } => { args.paths.extend(path); args.name = name; "svn.branch" },
            Commands::Branches { path } => { args.paths.extend(path); "svn.branches" },
            Commands::Log { path, limit } => { args.paths.extend(path); args.limit = limit; "svn.log" },
            Commands::Resolve { paths, accept } => { args.paths = paths; args.accept = accept; "svn.resolve" },
            Commands::Propset { paths } => { args.paths = paths; "svn.propset" },
            Commands::Ignore { paths, by_extension } => { args.paths = paths; args.flag = by_extension; "svn.addToIgnore" },
            Commands::Patch { paths } => { args.paths = paths; "svn.patch" },
            Commands::Show { path, against } => { args.paths.push(path); args.against = against; "svn.show" },
            Commands::Cleanup { path } => { args.paths.extend(path); "svn.cleanup" },
            Commands::Repositories => "svn.repositories",
        };
        (id, args)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_app(cli: &Cli) -> AppResult<App> {
    let folder = std::env::current_dir()?;
    let settings = Settings::load(cli.config.as_deref(), &folder)?;
    App::new(settings, &folder, cli.verbose)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    init_tracing(cli.verbose);

    let app = match open_app(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", user_message(&e));
            std::process::exit(1);
        }
    };

    let (id, args) = cli.command.into_invocation();
    if let Err(e) = registry::execute(&app, id, &args) {
        if e.is_cancelled() {
            app.ui.success("Operation cancelled by user.");
            return;
        }
        app.ui.error(&user_message(&e));
        drop(app);
        std::process::exit(1);
    }
}
