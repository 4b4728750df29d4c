// @generated by statics compile from `tests/fixtures/site`. Do not edit.
//
// Include from exactly one module:
//
//     mod assets {
//         include!(concat!(env!("OUT_DIR"), "/assets.rs"));
//     }
//
// then install `assets::asset_table()` with `AssetRegistry::set_active_table`
// before serving.

pub const ASSET_COUNT: usize = 3;

pub static URLS: [&str; ASSET_COUNT] = [
    "/app.js",
    "/index.html",
    "/style.css",
];

pub static HEADERS: [&str; ASSET_COUNT] = [
    // app.js
    "ETag: \"9334c451da2532bc399b7489b8028fe148a247ed\"\r\nContent-Type: text/javascript; charset=utf-8\r\n",
    // index.html
    "ETag: \"a532bd87b3894f9c62417826350fe240c70137ef\"\r\nContent-Type: text/html; charset=utf-8\r\n",
    // style.css
    "ETag: \"cfdf05fd8a77843e027878f9352b896d54b182e8\"\r\nContent-Type: text/css; charset=utf-8\r\n",
];

pub static SIZES: [u32; ASSET_COUNT] = [
    22,
    51,
    20,
];

mod embedded {
    static DATA_0_APP_JS: [u8; 22] = [
        /* 0000 */ 0x63,0x6f,0x6e,0x73,0x6f,0x6c,0x65,0x2e,0x6c,0x6f,0x67,0x28,0x27,0x72,0x65,0x61,
        /* 0010 */ 0x64,0x79,0x27,0x29,0x3b,0x0a,
    ];

    static DATA_1_INDEX_HTML: [u8; 51] = [
        /* 0000 */ 0x3c,0x21,0x64,0x6f,0x63,0x74,0x79,0x70,0x65,0x20,0x68,0x74,0x6d,0x6c,0x3e,0x0a,
        /* 0010 */ 0x3c,0x74,0x69,0x74,0x6c,0x65,0x3e,0x73,0x74,0x61,0x74,0x69,0x63,0x73,0x3c,0x2f,
        /* 0020 */ 0x74,0x69,0x74,0x6c,0x65,0x3e,0x0a,0x3c,0x70,0x3e,0x48,0x6f,0x6d,0x65,0x3c,0x2f,
        /* 0030 */ 0x70,0x3e,0x0a,
    ];

    static DATA_2_STYLE_CSS: [u8; 20] = [
        /* 0000 */ 0x62,0x6f,0x64,0x79,0x20,0x7b,0x20,0x6d,0x61,0x72,0x67,0x69,0x6e,0x3a,0x20,0x30,
        /* 0010 */ 0x3b,0x20,0x7d,0x0a,
    ];

    pub static CONTENT: [&[u8]; super::ASSET_COUNT] = [
        &DATA_0_APP_JS,
        &DATA_1_INDEX_HTML,
        &DATA_2_STYLE_CSS,
    ];

    pub fn asset_table() -> ::statics::AssetTable {
        ::statics::AssetTable::from_static(&super::URLS, &super::HEADERS, &CONTENT, &super::SIZES)
    }
}

#[allow(unused_imports)]
pub use self::embedded::{asset_table, CONTENT};
