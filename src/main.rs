use anyhow::{Context, Result};
use bitstore::Layout;
use bitstore::Repository;
use bitstore::commands::plumbing::cat_file::CatFileMode;
use bitstore::commands::porcelain::log::LogOptions;
use clap::{ArgGroup, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bitstore",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A content-addressable object store in the git on-disk format",
    long_about = "Plumbing commands over a git-compatible object database and branch refs. \
    Objects written here can be read by git and vice versa.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        Running it again on an existing repository leaves HEAD untouched."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
        #[arg(short = 'b', long = "initial-branch", help = "The branch HEAD points at")]
        initial_branch: Option<String>,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object kind")]
        kind: String,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content, kind or size of an object",
        group(ArgGroup::new("mode").required(true).args(["pretty", "kind", "size"]))
    )]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object content")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object kind")]
        kind: bool,
        #[arg(short = 's', help = "Print the payload size")]
        size: bool,
        #[arg(index = 1, help = "The object to show")]
        object: String,
    },
    #[command(
        name = "mktree",
        about = "Build a tree object from ls-tree formatted text on stdin"
    )]
    Mktree,
    #[command(name = "commit-tree", about = "Create a new commit object")]
    CommitTree {
        #[arg(index = 1, help = "The tree the commit snapshots")]
        tree: String,
        #[arg(short = 'p', help = "A parent commit, may be repeated")]
        parents: Vec<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "update-ref", about = "Point a branch at a commit")]
    UpdateRef {
        #[arg(index = 1)]
        branch: String,
        #[arg(index = 2)]
        revision: String,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to an object id")]
    RevParse {
        #[arg(index = 1)]
        revision: String,
    },
    #[command(name = "branch", about = "List branches")]
    Branch,
    #[command(name = "log", about = "Show the commit history")]
    Log {
        #[arg(index = 1, help = "Where to start, HEAD by default")]
        revision: Option<String>,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(long = "first-parent", help = "Follow only the first parent of merges")]
        first_parent: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    colored::control::set_override(std::io::stdout().is_terminal());

    let cli = Cli::parse();
    let layout = Layout::from_env()?;
    let pwd = std::env::current_dir().context("could not determine the current directory")?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Init {
            path,
            initial_branch,
        } => {
            let layout = match initial_branch {
                Some(branch) => layout.with_default_branch(&branch)?,
                None => layout,
            };
            let root = path.map(|path| pwd.join(path)).unwrap_or(pwd);

            Repository::open(root, layout).init_command(&mut stdout)?
        }
        Commands::HashObject { write, kind, file } => {
            Repository::open(pwd, layout).hash_object(&file, &kind, write, &mut stdout)?
        }
        Commands::CatFile {
            pretty,
            kind,
            size,
            object,
        } => {
            let mode = match (pretty, kind, size) {
                (true, _, _) => CatFileMode::Pretty,
                (_, true, _) => CatFileMode::Type,
                _ => CatFileMode::Size,
            };

            Repository::open(pwd, layout).cat_file(&object, mode, &mut stdout)?
        }
        Commands::Mktree => {
            let stdin = std::io::stdin().lock();
            Repository::open(pwd, layout).mktree(stdin, &mut stdout)?
        }
        Commands::CommitTree {
            tree,
            parents,
            message,
        } => Repository::open(pwd, layout).commit_tree(&tree, &parents, &message, &mut stdout)?,
        Commands::UpdateRef { branch, revision } => {
            Repository::open(pwd, layout).update_ref(&branch, &revision)?
        }
        Commands::RevParse { revision } => {
            Repository::open(pwd, layout).rev_parse(&revision, &mut stdout)?
        }
        Commands::Branch => Repository::open(pwd, layout).branch(&mut stdout)?,
        Commands::Log {
            revision,
            oneline,
            first_parent,
        } => {
            let opts = LogOptions {
                oneline,
                first_parent,
            };

            Repository::open(pwd, layout).log(revision.as_deref(), &opts, &mut stdout)?
        }
    }

    Ok(())
}
