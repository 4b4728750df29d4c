//! The process-wide asset table and the meaning of `/`.
//!
//! A registry is built and configured during startup, then shared behind an
//! `Arc`. `set_active_table` needs `&mut self`, so once the registry is
//! shared the table can no longer change.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::asset::{default_table, AssetTable};

const INDEX_HTML: &str = "/index.html";
const CLASSIC_ROOT: &str = "/";

#[derive(Debug, Default)]
pub struct AssetRegistry {
    table: Option<AssetTable>,
    root_alias: OnceCell<Option<String>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: AssetTable) -> Self {
        Self {
            table: Some(table),
            root_alias: OnceCell::new(),
        }
    }

    /// Replace the active table. Last writer wins.
    ///
    /// An alias that was already resolved stays as it is.
    pub fn set_active_table(&mut self, table: AssetTable) {
        self.table = Some(table);
    }

    /// The installed table, or the built-in placeholder if none was set.
    pub fn active_table(&self) -> &AssetTable {
        match &self.table {
            Some(table) => table,
            None => default_table(),
        }
    }

    /// Concrete URL served for `/`, computed on the first call only.
    ///
    /// Concurrent first calls are serialised; every caller sees the same
    /// answer.
    pub fn resolve_root_if_needed(&self) -> Option<&str> {
        self.root_alias
            .get_or_init(|| {
                let alias = resolve_root_alias(self.active_table());
                match &alias {
                    Some(url) => info!("Will use [{}] for default root /", url),
                    None => info!("No default document, / will 404"),
                }
                alias
            })
            .as_deref()
    }

    /// Resolve the root alias now, at the end of startup, instead of on the
    /// first request.
    pub fn freeze(self) -> Self {
        self.resolve_root_if_needed();
        self
    }
}

/// Pick the URL that `/` stands for in `table`.
///
/// An explicit `/index.html` or `/` entry wins, first in table order.
/// Failing that, a lone `.html` asset is used. Otherwise there is no alias.
pub fn resolve_root_alias(table: &AssetTable) -> Option<String> {
    if let Some(asset) = table
        .iter()
        .find(|asset| asset.url() == INDEX_HTML || asset.url() == CLASSIC_ROOT)
    {
        return Some(asset.url().to_string());
    }

    let mut html = table.iter().filter(|asset| asset.url().ends_with(".html"));
    match (html.next(), html.next()) {
        (Some(only), None) => Some(only.url().to_string()),
        _ => None,
    }
}
