//! gvfs-meta CLI
//!
//! Command-line explorer for GVfs metadata trees.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gvfsmeta::{Config, LoadMode, MetaRegistry, MetaTree, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// gvfs-meta
#[derive(Parser, Debug)]
#[command(name = "gvfs-meta")]
#[command(about = "Explore GVfs metadata tree files")]
#[command(version)]
struct Args {
    /// Metadata directory (default: ~/.local/share/gvfs-metadata)
    #[arg(short = 'd', long)]
    metadata_dir: Option<PathBuf>,

    /// Maximum tree depth before a file is treated as corrupt
    #[arg(long, default_value_t = gvfsmeta::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Read files into memory instead of mapping them
    #[arg(long)]
    read: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the node names of a tree, indented by level
    Tree {
        /// Tree file (absolute, or relative to the metadata directory)
        file: PathBuf,

        /// Also print each node's metadata
        #[arg(short, long)]
        metadata: bool,
    },

    /// Print the header of a tree file
    Header {
        /// Tree file (absolute, or relative to the metadata directory)
        file: PathBuf,
    },

    /// List the valid tree files in the metadata directory
    Files,

    /// List a directory, e.g. `/home/home/user`
    Ls {
        /// Path below the metadata directory
        path: String,
    },

    /// Print the metadata of a node as key=value lines
    Cat {
        /// Path below the metadata directory
        path: String,
    },

    /// Print the attributes of a path
    Stat {
        /// Path below the metadata directory
        path: String,
    },

    /// Mount the metadata directory read-only (blocks until unmounted)
    #[cfg(feature = "fuse")]
    Mount {
        /// Empty directory to mount on
        mountpoint: PathBuf,

        /// Let other users see the mount
        #[arg(long)]
        allow_other: bool,

        /// Unmount when the process exits
        #[arg(long)]
        auto_unmount: bool,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,gvfsmeta=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder().max_depth(args.max_depth);
    if let Some(dir) = &args.metadata_dir {
        builder = builder.metadata_dir(dir);
    }
    if args.read {
        builder = builder.load_mode(LoadMode::Read);
    }
    let config = builder.build();

    tracing::debug!("gvfs-meta v{}", gvfsmeta::VERSION);
    tracing::debug!("Metadata directory: {}", config.metadata_dir.display());

    if let Err(e) = run(args.command, config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Tree { file, metadata } => {
            let tree = MetaTree::open(&resolve_file(&config, &file), &config)?;
            print_tree(&tree, metadata)
        }
        Commands::Header { file } => {
            let tree = MetaTree::open(&resolve_file(&config, &file), &config)?;
            println!("{}", tree.header());
            println!("size={} attributes={}", tree.size(), tree.attributes().len());
            for (id, name) in tree.attributes().iter().enumerate() {
                println!("  [{}] {}", id, String::from_utf8_lossy(name));
            }
            Ok(())
        }
        Commands::Files => {
            let registry = MetaRegistry::new(config);
            for name in registry.list_files()? {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Ls { path } => {
            let registry = MetaRegistry::new(config);
            for name in registry.readdir(&path)? {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Cat { path } => {
            let registry = MetaRegistry::new(config);
            println!("{}", registry.contents(&path)?);
            Ok(())
        }
        Commands::Stat { path } => {
            let registry = MetaRegistry::new(config);
            println!("{}: {}", path, registry.getattr(&path)?);
            Ok(())
        }
        #[cfg(feature = "fuse")]
        Commands::Mount {
            mountpoint,
            allow_other,
            auto_unmount,
        } => {
            let options = gvfsmeta::vfs::MountOptions {
                allow_other,
                auto_unmount,
            };
            gvfsmeta::vfs::mount(MetaRegistry::new(config), &mountpoint, &options)
        }
    }
}

/// Relative names that do not exist here are looked up in the metadata dir
fn resolve_file(config: &Config, file: &Path) -> PathBuf {
    if file.is_relative() && !file.exists() {
        config.metadata_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn print_tree(tree: &MetaTree, with_metadata: bool) -> Result<()> {
    tree.walk(|node| {
        let indent = "  ".repeat(node.depth());
        println!("{}{}", indent, node.name_lossy()?);
        if with_metadata {
            for (key, value) in node.metadata_lossy()? {
                println!("{}  = {}={}", indent, key, value);
            }
        }
        Ok(())
    })
}
