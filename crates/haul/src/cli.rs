use std::path::PathBuf;

use clap::Parser;
use haul::RawRequest;
use haul::logging::{LogFormat, LogLevel};

#[derive(Clone, Debug, Parser)]
#[command(name = "haul", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// URL to download.
    #[arg(long = "src", visible_alias = "source")]
    pub source: Option<String>,

    /// File or directory to place the result at. A trailing `/` names a directory.
    #[arg(long = "dest", visible_alias = "destination")]
    pub destination: Option<PathBuf>,

    /// Octal mode for the destination, e.g. 0644.
    #[arg(long)]
    pub mode: Option<String>,

    /// Owner name or uid.
    #[arg(long)]
    pub owner: Option<String>,

    /// Group name or gid.
    #[arg(long)]
    pub group: Option<String>,

    /// Expected hex digest of the downloaded bytes.
    #[arg(long)]
    pub checksum: Option<String>,

    /// md5, sha1, sha224, sha256, sha384 or sha512.
    #[arg(long)]
    pub checksum_algorithm: Option<String>,

    /// Extract the download instead of placing it as-is.
    #[arg(long)]
    pub decompress: bool,

    /// zip, gz, bz2, xz, tar or auto.
    #[arg(long)]
    pub decompress_format: Option<String>,

    /// Download even if the destination already looks right.
    #[arg(long)]
    pub force: bool,

    /// TOML file with default request fields.
    #[arg(long, short = 'c', env = "HAUL_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Directory for temporary files. Defaults to the system temp dir.
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    #[arg(long)]
    pub log_level: Option<LogLevel>,

    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl App {
    /// Flags given on the command line, as the highest-precedence layer.
    pub fn overrides(&self) -> RawRequest {
        RawRequest {
            source:             self.source.clone(),
            destination:        self.destination.clone(),
            mode:               self.mode.clone(),
            owner:              self.owner.clone(),
            group:              self.group.clone(),
            checksum:           self.checksum.clone(),
            checksum_algorithm: self.checksum_algorithm.clone(),
            decompress:         self.decompress.then_some(true),
            decompress_format:  self.decompress_format.clone(),
            force:              self.force.then_some(true),
            timeout_secs:       self.timeout_secs,
            user_agent:         self.user_agent.clone(),
            staging_dir:        self.staging_dir.clone(),
            log_level:          self.log_level,
            log_format:         self.log_format,
        }
    }
}
