use std::borrow::Cow;

use once_cell::sync::Lazy;

/// One static resource: URL, verbatim header block and payload.
///
/// Assets are immutable once built. Changed content means a new `Asset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    url: Cow<'static, str>,
    header_block: Cow<'static, str>,
    content: Cow<'static, [u8]>,
}

impl Asset {
    /// # Panics
    ///
    /// When `url` does not start with `/`, or the payload does not fit the
    /// `u32` size field. Both are programming errors in table construction.
    pub fn new(
        url: impl Into<Cow<'static, str>>,
        header_block: impl Into<Cow<'static, str>>,
        content: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        let url = url.into();
        let content = content.into();
        assert!(url.starts_with('/'), "asset url must start with '/': {url:?}");
        assert!(
            u32::try_from(content.len()).is_ok(),
            "asset {url} exceeds u32 size"
        );
        Self {
            url,
            header_block: header_block.into(),
            content,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header_block(&self) -> &str {
        &self.header_block
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn size(&self) -> u32 {
        // Checked in `new`.
        self.content.len() as u32
    }
}

/// Ordered set of assets. Order only matters for deterministic output and
/// for "first match wins" lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTable {
    assets: Vec<Asset>,
}

impl AssetTable {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    /// Build a table from the parallel arrays written by the compiler.
    ///
    /// # Panics
    ///
    /// When the arrays differ in length or a declared size disagrees with
    /// its payload; generated artifacts never do either.
    pub fn from_static(
        urls: &'static [&'static str],
        header_blocks: &'static [&'static str],
        content: &'static [&'static [u8]],
        sizes: &'static [u32],
    ) -> Self {
        assert!(
            urls.len() == header_blocks.len()
                && urls.len() == content.len()
                && urls.len() == sizes.len(),
            "asset arrays differ in length"
        );
        let assets = urls
            .iter()
            .zip(header_blocks)
            .zip(content)
            .zip(sizes)
            .map(|(((&url, &header_block), &bytes), &size)| {
                assert_eq!(bytes.len(), size as usize, "size mismatch for {url}");
                Asset::new(url, header_block, bytes)
            })
            .collect();
        Self { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }

    /// First asset whose URL equals `path` exactly.
    pub fn get(&self, path: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.url() == path)
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

const DEFAULT_PAGE: &str = concat!(
    "<html><head><title>STATICS OK</title></head><body>",
    "Success<br>",
    "statics ",
    env!("CARGO_PKG_VERSION"),
    "</body></html>"
);

static DEFAULT_TABLE: Lazy<AssetTable> = Lazy::new(|| {
    AssetTable::new(vec![Asset::new(
        "/",
        "text/html; charset=utf-8",
        DEFAULT_PAGE.as_bytes(),
    )])
});

/// Placeholder table served when no table was installed: a single page
/// at `/`.
pub fn default_table() -> &'static AssetTable {
    &DEFAULT_TABLE
}
