pub mod asset;
pub mod compiler;
pub mod compress;
pub mod config;
pub mod digest;
pub mod error;
pub mod header;
pub mod mime;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod response;
pub mod server;
pub mod upgrade;

pub use asset::{default_table, Asset, AssetTable};
pub use compiler::{compile, compile_dir, compile_table, CompileOptions};
pub use error::{CompileError, HandshakeError, ResponseError};
pub use registry::AssetRegistry;
pub use resolver::resolve;
pub use response::{Response, Status};
pub use upgrade::{dispatch, looks_like_upgrade, Dispatch, Handshake};
