use std::path::{Path, PathBuf};

use clap::Parser;
use treematch::{EntryAttributes, MatchHandler, MatchingError, MatchingWalker};

/// Treematch - find files by glob pattern
///
/// Walks a directory tree and prints entries matching the given patterns,
/// honouring repository ignore files the way version control does.
#[derive(Parser, Debug)]
#[command(name = "treematch")]
#[command(about = "Find files by glob pattern, honouring ignore files", long_about = None)]
#[command(version)]
struct Cli {
    /// Glob patterns to match (ignore-file grammar; later patterns win).
    /// With no patterns, every entry matches.
    patterns: Vec<String>,

    /// Directory to start the walk from
    #[arg(short = 'C', long, default_value = ".")]
    directory: PathBuf,

    /// Include hidden files and directories
    #[arg(long)]
    hidden: bool,

    /// Don't honour .gitignore and related ignore files
    #[arg(long)]
    no_ignore: bool,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    follow: bool,

    /// Maximum directory depth to descend (the start directory is depth 0)
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Print matched directories as well as files
    #[arg(long)]
    directories: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Streams matches to stdout as the walk produces them.
struct PrintHandler {
    directories: bool,
    count: usize,
}

impl MatchHandler for PrintHandler {
    fn file(&mut self, file: &Path, _attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        println!("{}", file.display());
        self.count += 1;
        Ok(true)
    }

    fn directory(&mut self, dir: &Path, _attrs: &EntryAttributes) -> Result<bool, MatchingError> {
        if self.directories {
            println!("{}", dir.display());
            self.count += 1;
        }
        Ok(true)
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let mut walker = MatchingWalker::new(cli.directory.clone(), cli.patterns.clone())
        .exclude_hidden(!cli.hidden)
        .respect_ignore_files(!cli.no_ignore)
        .follow_links(cli.follow);
    if let Some(max_depth) = cli.max_depth {
        walker = walker.max_depth(max_depth);
    }

    let mut handler = PrintHandler {
        directories: cli.directories,
        count: 0,
    };

    match walker.walk(&mut handler) {
        Ok(_) => {
            if handler.count == 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(2);
        }
    }
}
