use flate2::read::GzDecoder;
use statics::compiler::{
    compile, compile_dir, compile_table, normalize_prefix, render_artifact, scan_dir, CompileOptions,
};
use statics::digest::content_etag;
use statics::header::Encoding;
use statics::resolver::resolve;
use statics::response::Status;
use statics::{AssetRegistry, CompileError};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn create_test_files(dir: &Path) -> std::io::Result<()> {
    fs::write(dir.join("index.html"), "<html><body>Home Page</body></html>")?;
    fs::write(dir.join("about.html"), "<html><body>About Us</body></html>")?;
    fs::write(dir.join("app.js"), "console.log('Test app');")?;
    fs::write(dir.join("style.css"), "body { color: blue; }")?;
    fs::write(dir.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2, 3])?;

    // Not embedded
    fs::write(dir.join("README.md"), "# readme")?;
    fs::write(dir.join("Makefile"), "all:")?;
    fs::create_dir(dir.join("css"))?;
    fs::write(dir.join("css/nested.css"), "p { margin: 0; }")?;
    fs::create_dir(dir.join("dir.html"))?;
    Ok(())
}

/// Checked-in artifact, produced by
/// `statics compile tests/fixtures/site tests/fixtures/site.rs --no-gzip`.
mod site {
    include!("fixtures/site.rs");
}

const SITE_DIR: &str = "tests/fixtures/site";

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let names: Vec<String> = scan_dir(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            ["about.html", "app.js", "index.html", "logo.png", "style.css"]
        );
    }

    #[test]
    fn test_scan_reports_mime_types() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let scanned = scan_dir(temp_dir.path()).unwrap();
        let png = scanned.iter().find(|(name, _)| name == "logo.png").unwrap();
        assert_eq!(png.1, "image/png");
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_dir(temp_dir.path()).unwrap().is_empty());
        assert!(compile_table(temp_dir.path(), &CompileOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        match scan_dir(&missing) {
            Err(CompileError::OpenDir { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected OpenDir error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod compile_tests {
    use super::*;

    #[test]
    fn test_urls_use_prefix() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let assets = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        assert_eq!(assets[0].url, "/about.html");

        let assets = compile_dir(temp_dir.path(), &CompileOptions::with_prefix("/static/")).unwrap();
        assert!(assets.iter().all(|a| a.url.starts_with("/static/")));
        assert_eq!(assets[1].url, "/static/app.js");
    }

    #[test]
    fn test_relative_prefix_is_made_absolute() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let options = CompileOptions::with_prefix("static/");
        assert_eq!(options.prefix(), "/static/");
        let table = compile_table(temp_dir.path(), &options).unwrap();
        assert!(table.get("/static/app.js").is_some());
        assert!(table.iter().all(|a| a.url().starts_with("/static/")));
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("assets/"), "/assets/");
        assert_eq!(normalize_prefix("/assets/"), "/assets/");
    }

    #[test]
    fn test_content_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        for asset in compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap() {
            let raw = fs::read(temp_dir.path().join(&asset.file_name)).unwrap();
            assert_eq!(gunzip(&asset.content), raw, "round trip of {}", asset.file_name);
            assert_eq!(asset.etag, content_etag(&raw));
            assert_eq!(asset.size() as usize, asset.content.len());
        }
    }

    #[test]
    fn test_header_block_contents() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let assets = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        let css = assets.iter().find(|a| a.file_name == "style.css").unwrap();
        assert_eq!(
            css.header_block,
            format!(
                "ETag: \"{}\"\r\nContent-Encoding: gzip\r\nContent-Type: text/css; charset=utf-8\r\n",
                css.etag
            )
        );
    }

    #[test]
    fn test_identity_encoding_stores_raw_bytes() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let options = CompileOptions::default().encoding(Encoding::Identity);
        let assets = compile_dir(temp_dir.path(), &options).unwrap();
        let js = assets.iter().find(|a| a.file_name == "app.js").unwrap();
        assert_eq!(js.content, b"console.log('Test app');");
        assert!(!js.header_block.contains("Content-Encoding"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let first = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        let second = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_matches_compiled_assets() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let options = CompileOptions::default();
        let compiled = compile_dir(temp_dir.path(), &options).unwrap();
        let table = compile_table(temp_dir.path(), &options).unwrap();
        assert_eq!(table.len(), compiled.len());
        for (asset, compiled) in table.iter().zip(&compiled) {
            assert_eq!(asset.url(), compiled.url);
            assert_eq!(asset.header_block(), compiled.header_block);
            assert_eq!(asset.content(), &compiled.content[..]);
            assert_eq!(asset.size(), compiled.size());
        }
    }
}

#[cfg(test)]
mod artifact_tests {
    use super::*;

    #[test]
    fn test_artifact_layout() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path()).unwrap();

        let assets = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        let rendered = render_artifact(&assets, Path::new("www"), None);

        assert!(rendered.starts_with("// @generated by statics compile from `www`."));
        assert!(rendered.contains("pub const ASSET_COUNT: usize = 5;"));
        assert!(rendered.contains("    \"/index.html\",\n"));
        assert!(rendered.contains("    // style.css\n"));
        assert!(rendered.contains("static DATA_2_INDEX_HTML: [u8; "));
        assert!(rendered.contains("pub fn asset_table() -> ::statics::AssetTable"));
        assert!(rendered.contains("#[allow(unused_imports)]\npub use self::embedded::{asset_table, CONTENT};"));
        assert!(!rendered.contains("#[cfg(feature"));

        // Header blocks are escaped, not embedded with raw line breaks
        assert!(rendered.contains("\\r\\nContent-Type: text/html; charset=utf-8\\r\\n\","));
    }

    #[test]
    fn test_sizes_are_declared() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

        let assets = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        let rendered = render_artifact(&assets, temp_dir.path(), None);
        let declared = format!("pub static SIZES: [u32; ASSET_COUNT] = [\n    {},\n];", assets[0].size());
        assert!(rendered.contains(&declared));
        assert!(rendered.contains(&format!("static DATA_0_A_TXT: [u8; {}] = [", assets[0].size())));
    }

    #[test]
    fn test_gated_implementation_region() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

        let assets = compile_dir(temp_dir.path(), &CompileOptions::default()).unwrap();
        let rendered = render_artifact(&assets, temp_dir.path(), Some("embedded-assets"));

        assert!(rendered.contains("#[cfg(feature = \"embedded-assets\")]\nmod embedded {"));
        assert!(rendered.contains("#[cfg(feature = \"embedded-assets\")]\n#[allow(unused_imports)]\npub use self::embedded"));
        // Declarations stay visible
        let decl = rendered.find("pub static URLS").unwrap();
        let gate = rendered.find("#[cfg(feature").unwrap();
        assert!(decl < gate);
    }

    #[test]
    fn test_empty_artifact() {
        let rendered = render_artifact(&[], Path::new("empty"), None);
        assert!(rendered.contains("pub const ASSET_COUNT: usize = 0;"));
        assert!(rendered.contains("pub static URLS: [&str; ASSET_COUNT] = [\n];"));
    }

    #[test]
    fn test_compile_writes_identical_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let www = temp_dir.path().join("www");
        fs::create_dir(&www).unwrap();
        create_test_files(&www).unwrap();

        let first = temp_dir.path().join("first.rs");
        let second = temp_dir.path().join("second.rs");
        assert_eq!(compile(&www, &first, &CompileOptions::default(), None).unwrap(), 5);
        assert_eq!(compile(&www, &second, &CompileOptions::default(), None).unwrap(), 5);
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

        // No temporary files left behind
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_compile_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("assets.rs");

        let result = compile(
            &temp_dir.path().join("missing"),
            &output,
            &CompileOptions::default(),
            None,
        );
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();
        let output = temp_dir.path().join("no-such-dir").join("assets.rs");

        match compile(temp_dir.path(), &output, &CompileOptions::default(), None) {
            Err(CompileError::Write { path, .. }) => assert_eq!(path, output),
            other => panic!("expected Write error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod embedded_artifact_tests {
    use super::*;

    #[test]
    fn test_render_reproduces_checked_in_artifact() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(SITE_DIR);
        let options = CompileOptions::default().encoding(Encoding::Identity);
        let assets = compile_dir(&dir, &options).unwrap();

        let rendered = render_artifact(&assets, Path::new(SITE_DIR), None);
        assert_eq!(rendered, include_str!("fixtures/site.rs"));
    }

    #[test]
    fn test_included_artifact_declarations() {
        assert_eq!(site::ASSET_COUNT, 3);
        assert_eq!(site::URLS, ["/app.js", "/index.html", "/style.css"]);
        for (content, size) in site::CONTENT.iter().zip(site::SIZES) {
            assert_eq!(content.len(), size as usize);
        }
    }

    #[test]
    fn test_included_artifact_serves_root() {
        let mut registry = AssetRegistry::new();
        registry.set_active_table(site::asset_table());
        let registry = registry.freeze();
        assert_eq!(registry.resolve_root_if_needed(), Some("/index.html"));

        let index = include_bytes!("fixtures/site/index.html");
        let response = resolve(&registry, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.body(), &index[..]);

        let head = String::from_utf8(response.head().to_vec()).unwrap();
        assert!(head.contains(&format!("ETag: \"{}\"\r\n", content_etag(index))));
        assert!(head.contains(&format!("Content-Length: {}\r\n", index.len())));

        let request = format!(
            "GET /index.html HTTP/1.1\r\nIf-None-Match: \"{}\"\r\n\r\n",
            content_etag(index)
        );
        let response = resolve(&registry, request.as_bytes()).unwrap();
        assert_eq!(response.status(), Status::NotModified);
    }
}
