//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use cardex_catalog::ImageSize;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cardex")]
#[command(about = "Parse, resolve, and cache Magic: The Gathering deck lists", long_about = None)]
pub(crate) struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Card database path (overrides config and CARDEX_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Parse a deck list file ("-" reads stdin)
    Parse {
        file: PathBuf,

        /// Also resolve every entry against the card catalog
        #[arg(short, long)]
        resolve: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a deck from Moxfield and preview its resolution
    Import {
        /// Moxfield deck URL or deck id
        deck: String,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a card by catalog id
    Card {
        id: String,

        /// Refresh from the catalog even if the cached record is fresh
        #[arg(long)]
        refresh: bool,

        /// Also list every printing of the card
        #[arg(long)]
        printings: bool,
    },

    /// Look up a card by name
    Named {
        name: String,

        /// Allow approximate matches
        #[arg(long)]
        fuzzy: bool,
    },

    /// Search the catalog, or only the local cache
    Search {
        query: String,

        /// Result page (catalog search only)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Search cached card names by prefix instead of the catalog
        #[arg(long)]
        cached: bool,
    },

    /// Print the image URL for a card, mirroring it if storage is configured
    Image {
        id: String,

        #[arg(long, value_enum, default_value_t = SizeArg::Normal)]
        size: SizeArg,

        /// The back face of a double-faced card
        #[arg(long)]
        back: bool,

        /// Read the stored record only; never touches the network
        #[arg(long)]
        fast: bool,
    },

    /// Mirror images for every card id listed in a file (one per line)
    CacheImages {
        ids_file: PathBuf,

        #[arg(long, value_enum, default_value_t = SizeArg::Normal)]
        size: SizeArg,

        /// Also mirror back faces of double-faced cards
        #[arg(long)]
        back_faces: bool,
    },

    /// Refresh the oldest stale records in one batch
    RefreshStale {
        #[arg(short, long, default_value_t = 75)]
        limit: usize,
    },

    /// Show card cache statistics
    Stats,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and where each came from
    Show,

    /// Print the config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum SizeArg {
    Small,
    Normal,
    Large,
}

impl From<SizeArg> for ImageSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Small => ImageSize::Small,
            SizeArg::Normal => ImageSize::Normal,
            SizeArg::Large => ImageSize::Large,
        }
    }
}
