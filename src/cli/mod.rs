//! CLI interface for memorial.
//!
//! Provides command-line argument parsing using clap.

use clap::{Parser, Subcommand};

use crate::corpus::Category;
use crate::search::SortOrder;

/// Default number of search results per page.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Default number of featured testimonies.
pub const DEFAULT_FEATURED_COUNT: usize = 6;

/// Command-line interface for memorial.
#[derive(Parser)]
#[command(name = "memorial")]
#[command(author, version, about = "Search the testimonies of Tony's memorial book", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fuzzy-search testimonies by title, author, content and tags.
    Search {
        /// The search query. An empty query lists every testimony.
        query: String,

        /// Only testimonies in this category.
        #[arg(short, long)]
        category: Option<Category>,

        /// Only testimonies with exactly this relationship (e.g., "Sister").
        #[arg(short, long)]
        relationship: Option<String>,

        /// Only testimonies whose author contains this text.
        #[arg(short, long)]
        author: Option<String>,

        /// Only testimonies with a tag containing this text (repeatable).
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Result ordering.
        #[arg(short, long, value_enum, default_value_t = SortOrder::Relevance)]
        sort: SortOrder,

        /// Page of results to show (1-based).
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Results per page.
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List testimonies in corpus order.
    List {
        /// Only testimonies in this category.
        #[arg(short, long)]
        category: Option<Category>,

        /// Only testimonies in this chapter.
        #[arg(long)]
        chapter: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List chapters with their testimonies.
    Chapters {
        #[arg(long)]
        json: bool,
    },

    /// Show one testimony and its images.
    Get {
        /// Testimony id (e.g., "rare-soul").
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show the distinct values available for each filter.
    Options {
        #[arg(long)]
        json: bool,
    },

    /// Show testimony counts per category.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Show the featured testimonies.
    Featured {
        /// Maximum number to show.
        #[arg(short = 'n', long, default_value_t = DEFAULT_FEATURED_COUNT)]
        count: usize,

        #[arg(long)]
        json: bool,
    },

    /// List the images printed on a page or range of pages.
    Images {
        /// First (or only) page.
        #[arg(required_unless_present = "all")]
        page: Option<u32>,

        /// Last page of the range, inclusive.
        #[arg(long, requires = "page")]
        to: Option<u32>,

        /// List every known image instead.
        #[arg(long, conflicts_with_all = ["page", "to"])]
        all: bool,

        #[arg(long)]
        json: bool,
    },

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}
