//! Command-line interface and server settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::compiler::{CompileOptions, DEFAULT_PREFIX};
use crate::header::Encoding;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Embed static files and serve them next to a WebSocket endpoint
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile a directory of static files into a Rust source artifact
    Compile(CompileArgs),

    /// Serve assets over HTTP and accept WebSocket upgrades on the same port
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Directory to embed (top level only)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub input_dir: PathBuf,

    /// Generated Rust file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub output_artifact: PathBuf,

    /// Prefix for every URL
    #[arg(default_value = DEFAULT_PREFIX)]
    pub url_prefix: String,

    /// Only materialise the byte tables when the including crate enables
    /// this feature
    #[arg(long)]
    pub gate: Option<String>,

    /// Store files uncompressed
    #[arg(long)]
    pub no_gzip: bool,
}

impl CompileArgs {
    pub fn options(&self) -> CompileOptions {
        CompileOptions::with_prefix(&self.url_prefix).encoding(if self.no_gzip {
            Encoding::Identity
        } else {
            Encoding::Gzip
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Compile this directory at startup instead of serving the
    /// placeholder page
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// URL prefix for assets loaded with --dir
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Network interface to bind
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port number to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest request head accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_SIZE)]
    pub max_request: usize,

    /// Seconds to wait for a complete request head
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_request_size: usize,
    pub read_timeout: Duration,
    pub asset_dir: Option<PathBuf>,
    pub url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            read_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            asset_dir: None,
            url_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.bind, args.port),
            max_request_size: args.max_request,
            read_timeout: Duration::from_secs(args.timeout),
            asset_dir: args.dir.clone(),
            url_prefix: args.prefix.clone(),
        }
    }
}
