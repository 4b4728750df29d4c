//! Build-time asset compiler.
//!
//! Scans the top level of a directory, keeps regular files with an
//! allow-listed extension, and turns each into an [`Asset`] whose ETag is the
//! digest of the raw bytes and whose payload is gzip-framed. The result can
//! be used directly as an [`AssetTable`] or written out as Rust source for
//! embedding into another binary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::asset::{Asset, AssetTable};
use crate::compress::gzip;
use crate::digest::content_etag;
use crate::error::CompileError;
use crate::header::{asset_header_block, Encoding};
use crate::mime::mime_for;

pub const DEFAULT_PREFIX: &str = "/";

/// Compiler settings. The prefix is always normalized on the way in, so
/// every URL it produces starts with `/`.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    prefix: String,
    encoding: Encoding,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            encoding: Encoding::Gzip,
        }
    }
}

impl CompileOptions {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            ..Self::default()
        }
    }

    /// How payloads are stored. `Identity` keeps raw bytes and drops the
    /// `Content-Encoding` line.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Prepended to every file name to form its URL.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Empty means `/`; a missing leading slash is added so URLs stay absolute.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{}", prefix)
    }
}

/// One compiled file, before it is frozen into an [`Asset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAsset {
    pub file_name: String,
    pub url: String,
    pub etag: String,
    pub header_block: String,
    pub content: Vec<u8>,
}

impl CompiledAsset {
    pub fn size(&self) -> u32 {
        // Checked in `compile_file`.
        self.content.len() as u32
    }
}

impl From<CompiledAsset> for Asset {
    fn from(compiled: CompiledAsset) -> Self {
        Asset::new(compiled.url, compiled.header_block, compiled.content)
    }
}

/// Accepted file names in `dir` with their MIME types, sorted bytewise.
///
/// Subdirectories, non-regular files, unknown extensions and names that are
/// not valid UTF-8 are skipped.
pub fn scan_dir(dir: &Path) -> Result<Vec<(String, &'static str)>, CompileError> {
    let entries = fs::read_dir(dir).map_err(|source| CompileError::OpenDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut accepted = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CompileError::OpenDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        let Some(mime) = mime_for(Path::new(&name)) else {
            continue;
        };
        // Follows symlinks, like stat(2).
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => accepted.push((name, mime)),
            _ => continue,
        }
    }

    accepted.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    Ok(accepted)
}

fn compile_file(
    dir: &Path,
    name: String,
    mime: &str,
    options: &CompileOptions,
) -> Result<CompiledAsset, CompileError> {
    let path = dir.join(&name);
    let raw = fs::read(&path).map_err(|source| CompileError::Read {
        path: path.clone(),
        source,
    })?;

    let etag = content_etag(&raw);
    let content = match options.encoding {
        Encoding::Gzip => gzip(&raw).map_err(|source| CompileError::Compress {
            path: path.clone(),
            source,
        })?,
        Encoding::Identity => raw,
    };
    if u32::try_from(content.len()).is_err() {
        return Err(CompileError::TooLarge {
            path,
            size: content.len(),
        });
    }

    let header_block = asset_header_block(&etag, options.encoding, mime);
    let url = format!("{}{}", options.prefix, name);
    debug!("Compiled {} as {} ({} bytes, etag {})", name, url, content.len(), etag);

    Ok(CompiledAsset {
        file_name: name,
        url,
        etag,
        header_block,
        content,
    })
}

/// Compile every accepted file in `dir`, in table order.
pub fn compile_dir(dir: &Path, options: &CompileOptions) -> Result<Vec<CompiledAsset>, CompileError> {
    let compiled = scan_dir(dir)?
        .into_iter()
        .map(|(name, mime)| compile_file(dir, name, mime, options))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Compiled {} assets from {}", compiled.len(), dir.display());
    Ok(compiled)
}

/// Compile `dir` straight into a table, for serving without an embedding
/// step.
pub fn compile_table(dir: &Path, options: &CompileOptions) -> Result<AssetTable, CompileError> {
    let assets = compile_dir(dir, options)?
        .into_iter()
        .map(Asset::from)
        .collect();
    Ok(AssetTable::new(assets))
}

/// Rust identifier fragment for a file's byte array.
fn ident_from_file_name(index: usize, name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() {
        ident.push_str("FILE");
    }
    format!("DATA_{}_{}", index, ident)
}

fn write_bytes(out: &mut String, ident: &str, data: &[u8]) {
    let _ = write!(out, "    static {}: [u8; {}] = [", ident, data.len());
    for (i, byte) in data.iter().enumerate() {
        if i % 16 == 0 {
            let _ = write!(out, "\n        /* {:04X} */ ", i);
        }
        let _ = write!(out, "0x{:02x},", byte);
    }
    if data.is_empty() {
        out.push_str("\n        /* empty */");
    }
    out.push_str("\n    ];\n\n");
}

/// Render the compiled assets as a Rust source unit.
///
/// The declarations (`ASSET_COUNT`, `URLS`, `HEADERS`, `SIZES`) are always
/// visible. The byte arrays and `asset_table()` form the implementation
/// region; with `gate` set they only exist when the including crate enables
/// that feature.
pub fn render_artifact(assets: &[CompiledAsset], source: &Path, gate: Option<&str>) -> String {
    let total: usize = assets.iter().map(|a| a.content.len()).sum();
    let mut out = String::with_capacity(total * 6 + 1024);

    let _ = writeln!(
        out,
        "// @generated by statics compile from `{}`. Do not edit.",
        source.display()
    );
    out.push_str(
        "//\n\
         // Include from exactly one module:\n\
         //\n\
         //     mod assets {\n\
         //         include!(concat!(env!(\"OUT_DIR\"), \"/assets.rs\"));\n\
         //     }\n\
         //\n\
         // then install `assets::asset_table()` with `AssetRegistry::set_active_table`\n\
         // before serving.\n\n",
    );

    let _ = writeln!(out, "pub const ASSET_COUNT: usize = {};\n", assets.len());

    out.push_str("pub static URLS: [&str; ASSET_COUNT] = [\n");
    for asset in assets {
        let _ = writeln!(out, "    {:?},", asset.url);
    }
    out.push_str("];\n\n");

    out.push_str("pub static HEADERS: [&str; ASSET_COUNT] = [\n");
    for asset in assets {
        let _ = writeln!(out, "    // {}", asset.file_name);
        let _ = writeln!(out, "    {:?},", asset.header_block);
    }
    out.push_str("];\n\n");

    out.push_str("pub static SIZES: [u32; ASSET_COUNT] = [\n");
    for asset in assets {
        let _ = writeln!(out, "    {},", asset.size());
    }
    out.push_str("];\n\n");

    let cfg = gate
        .map(|feature| format!("#[cfg(feature = {:?})]\n", feature))
        .unwrap_or_default();

    out.push_str(&cfg);
    out.push_str("mod embedded {\n");
    let idents: Vec<String> = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| ident_from_file_name(i, &asset.file_name))
        .collect();
    for (asset, ident) in assets.iter().zip(&idents) {
        write_bytes(&mut out, ident, &asset.content);
    }
    out.push_str("    pub static CONTENT: [&[u8]; super::ASSET_COUNT] = [\n");
    for ident in &idents {
        let _ = writeln!(out, "        &{},", ident);
    }
    out.push_str("    ];\n\n");
    out.push_str(
        "    pub fn asset_table() -> ::statics::AssetTable {\n\
         \x20       ::statics::AssetTable::from_static(&super::URLS, &super::HEADERS, &CONTENT, &super::SIZES)\n\
         \x20   }\n",
    );
    out.push_str("}\n\n");

    out.push_str(&cfg);
    out.push_str("#[allow(unused_imports)]\n");
    out.push_str("pub use self::embedded::{asset_table, CONTENT};\n");
    out
}

/// Write `contents` to `output` through a temporary sibling, so a failed run
/// never leaves a partial artifact.
pub fn write_artifact(output: &Path, contents: &str) -> Result<(), CompileError> {
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "assets.rs".to_string());
    let tmp: PathBuf = output.with_file_name(format!(".{}.tmp", file_name));

    let result = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, output));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(CompileError::Write {
            path: output.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Full compiler run: scan, compile and write the artifact. Returns the
/// number of embedded assets.
pub fn compile(
    input: &Path,
    output: &Path,
    options: &CompileOptions,
    gate: Option<&str>,
) -> Result<usize, CompileError> {
    let assets = compile_dir(input, options)?;
    let rendered = render_artifact(&assets, input, gate);
    write_artifact(output, &rendered)?;
    info!("Wrote {} assets to {}", assets.len(), output.display());
    Ok(assets.len())
}
