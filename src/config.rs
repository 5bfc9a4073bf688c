use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{Catalog, DEFAULT_API_BASE, DEFAULT_SPRITE_BASE};
use crate::handoff::{FileStore, MemoryStore, SelectionHandoff};

const APP_DIR: &str = "pokedex";

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the PokeAPI catalog
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Base URL sprites are served from (`<base>/<id>.png`)
    #[arg(long, default_value = DEFAULT_SPRITE_BASE)]
    pub sprite_base: String,

    /// Entries fetched per page
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// File holding the selection handoff
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// Keep the selection handoff in memory instead of on disk
    #[arg(long, conflicts_with = "store_path")]
    pub memory_store: bool,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

impl Config {
    pub fn catalog(&self) -> Catalog {
        Catalog::http(&self.api_base, &self.sprite_base)
    }

    pub fn handoff(&self) -> SelectionHandoff {
        if self.memory_store {
            return SelectionHandoff::new(Arc::new(MemoryStore::new()));
        }
        SelectionHandoff::new(Arc::new(FileStore::new(self.resolved_store_path())))
    }

    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs_next::data_dir()
                .unwrap_or_else(|| home_dir().join(".local").join("share"))
                .join(APP_DIR)
                .join("handoff.json")
        })
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs_next::cache_dir()
                .unwrap_or_else(|| home_dir().join(".cache"))
                .join(APP_DIR)
                .join("logs")
        })
    }
}

fn home_dir() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
