//! Request configuration.
//!
//! A [`RawRequest`] is what the outside world supplies, merged by [`load`] from
//! (lowest to highest precedence) a TOML file, `HAUL_*` environment variables
//! and command-line flags. [`RawRequest::validate`] turns it into an immutable
//! [`DownloadRequest`] before any work starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use haul_archive::FormatHint;
use haul_fetch::ClientConfig;
use haul_fs::{DEFAULT_FILE_MODE, FileAttributes, parse_mode};
use haul_verify::{Checksum, ChecksumAlgorithm};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::logging::{LogConfig, LogFormat, LogLevel};

pub const ENV_PREFIX: &str = "HAUL_";

/// Unvalidated request fields. Every field is optional so layers can be merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source:             Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination:        Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "scalar")]
    pub mode:               Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "scalar")]
    pub owner:              Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "scalar")]
    pub group:              Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "scalar")]
    pub checksum:           Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress:         Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress_format:  Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force:              Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir:  Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level:    Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format:   Option<LogFormat>,
}

/// Accept numbers where strings are expected; environment values such as
/// `HAUL_MODE=0644` or `HAUL_OWNER=1000` arrive as integers.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
    }))
}

/// Merge the TOML file (if any), `HAUL_*` variables and `overrides`.
pub fn load(config_file: Option<&Path>, overrides: &RawRequest) -> figment::Result<RawRequest> {
    let mut figment = Figment::new();
    if let Some(path) = config_file {
        figment = figment.merge(Toml::file_exact(path));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
        .extract()
}

impl RawRequest {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level:  self.log_level.unwrap_or_default(),
            format: self.log_format.unwrap_or_default(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.timeout = self.timeout_secs.map(Duration::from_secs);
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    /// Check every field and build the request the pipeline runs on.
    pub fn validate(&self) -> Result<DownloadRequest> {
        let invalid = |msg: String| Error::Validation(msg);

        let raw_source = self
            .source
            .as_deref()
            .ok_or_else(|| invalid("missing required field 'source'".into()))?;
        let source = Url::parse(raw_source)
            .map_err(|e| invalid(format!("source '{raw_source}' is not an absolute URL: {e}")))?;
        if !matches!(source.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "source '{raw_source}' has unsupported scheme '{}'",
                source.scheme()
            )));
        }

        let destination = self
            .destination
            .clone()
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| invalid("missing required field 'destination'".into()))?;
        let dir_hint = has_trailing_separator(&destination);
        let decompress = self.decompress.unwrap_or(false);
        if dir_hint && !decompress {
            return Err(invalid(format!(
                "destination '{}' names a directory; a plain download needs a file path",
                destination.display()
            )));
        }

        let algorithm = match self.checksum_algorithm.as_deref() {
            Some(name) => name
                .parse::<ChecksumAlgorithm>()
                .map_err(|e| invalid(e.to_string()))?,
            None => ChecksumAlgorithm::default(),
        };
        let checksum = self
            .checksum
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| Checksum::new(algorithm, c))
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        let format = match self.decompress_format.as_deref() {
            Some(name) => name.parse::<FormatHint>().map_err(|e| invalid(e.to_string()))?,
            None => FormatHint::default(),
        };

        let mode = self
            .mode
            .as_deref()
            .map(parse_mode)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(DownloadRequest {
            source,
            destination,
            dir_hint,
            checksum,
            decompress,
            format,
            force: self.force.unwrap_or(false),
            mode,
            owner: self.owner.clone(),
            group: self.group.clone(),
            staging_dir: self.staging_dir.clone(),
        })
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

/// A fully validated request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source:      Url,
    pub destination: PathBuf,
    /// The destination was written with a trailing separator and names a
    /// directory even if it does not exist yet.
    pub dir_hint:    bool,
    pub checksum:    Option<Checksum>,
    pub decompress:  bool,
    pub format:      FormatHint,
    pub force:       bool,
    /// `None` means "default": [`DEFAULT_FILE_MODE`] for files, untouched for directories.
    pub mode:        Option<u32>,
    pub owner:       Option<String>,
    pub group:       Option<String>,
    pub staging_dir: Option<PathBuf>,
}

impl DownloadRequest {
    pub fn new(source: Url, destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        Self {
            dir_hint: has_trailing_separator(&destination),
            source,
            destination,
            checksum: None,
            decompress: false,
            format: FormatHint::default(),
            force: false,
            mode: None,
            owner: None,
            group: None,
            staging_dir: None,
        }
    }

    /// Last path segment of the source URL, without query or fragment.
    pub fn source_name(&self) -> &str {
        self.source
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
    }

    /// Whether extraction should produce a tree rather than one file.
    pub fn wants_directory(&self) -> bool { self.dir_hint || self.destination.is_dir() }

    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Attributes to apply to the destination once it is in its final shape.
    pub fn attributes(&self, is_dir: bool) -> FileAttributes {
        let mode = match (self.mode, is_dir) {
            (Some(mode), _) => Some(mode),
            (None, false) => Some(DEFAULT_FILE_MODE),
            (None, true) => None,
        };
        let mut attributes = FileAttributes::default();
        if let Some(mode) = mode {
            attributes = attributes.with_mode(mode);
        }
        if let Some(owner) = &self.owner {
            attributes = attributes.with_owner(owner);
        }
        if let Some(group) = &self.group {
            attributes = attributes.with_group(group);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str, destination: &str) -> RawRequest {
        RawRequest {
            source: Some(source.into()),
            destination: Some(destination.into()),
            ..RawRequest::default()
        }
    }

    #[test]
    fn test_defaults() {
        let request = raw("https://example.test/a/file.txt", "/srv/file.txt")
            .validate()
            .unwrap();

        assert_eq!(request.format, FormatHint::Auto);
        assert!(!request.decompress);
        assert!(!request.force);
        assert!(!request.dir_hint);
        assert_eq!(request.checksum, None);
        assert_eq!(request.attributes(false).mode, Some(0o644));
        assert_eq!(request.attributes(true).mode, None);
    }

    #[test]
    fn test_source_name_strips_query() {
        let request = raw("https://example.test/dl/pkg.tar.gz?token=abc#frag", "/srv/pkg")
            .validate()
            .unwrap();
        assert_eq!(request.source_name(), "pkg.tar.gz");
    }

    #[test]
    fn test_rejections() {
        let cases = [
            RawRequest {
                destination: Some("/x".into()),
                ..RawRequest::default()
            },
            raw("not a url", "/x"),
            raw("ftp://example.test/x", "/x"),
            raw("https://example.test/x", ""),
            RawRequest {
                checksum_algorithm: Some("crc32".into()),
                ..raw("https://example.test/x", "/x")
            },
            RawRequest {
                decompress_format: Some("rar".into()),
                ..raw("https://example.test/x", "/x")
            },
            RawRequest {
                mode: Some("rwxr-xr-x".into()),
                ..raw("https://example.test/x", "/x")
            },
            RawRequest {
                checksum: Some("abc".into()),
                ..raw("https://example.test/x", "/x")
            },
        ];
        for case in cases {
            assert!(matches!(case.validate(), Err(Error::Validation(_))), "{case:?}");
        }
    }

    #[test]
    fn test_checksum_algorithm_defaults_to_sha1() {
        let request = RawRequest {
            checksum: Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d".into()),
            ..raw("https://example.test/file.txt", "/srv/file.txt")
        }
        .validate()
        .unwrap();

        assert_eq!(request.checksum.unwrap().algorithm(), ChecksumAlgorithm::Sha1);
    }

    #[test]
    fn test_trailing_separator_requires_decompress() {
        let err = raw("https://example.test/file.txt", "/srv/outdir/").validate().unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("/srv/outdir/")));

        let request = RawRequest {
            decompress: Some(true),
            ..raw("https://example.test/bundle.tgz", "/srv/outdir/")
        }
        .validate()
        .unwrap();
        assert!(request.dir_hint);
        assert!(request.wants_directory());
    }

    #[test]
    fn test_checksum_uses_selected_algorithm() {
        let request = RawRequest {
            checksum: Some("2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824".into()),
            checksum_algorithm: Some("SHA256".into()),
            ..raw("https://example.test/x", "/x")
        }
        .validate()
        .unwrap();

        let checksum = request.checksum.unwrap();
        assert_eq!(checksum.algorithm(), ChecksumAlgorithm::Sha256);
        assert_eq!(
            checksum.expected(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_layers_merge_in_order() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "haul.toml",
                r#"
                    source = "https://example.test/from-file.gz"
                    destination = "/from/file"
                    decompress = true
                    mode = "0600"
                "#,
            )?;
            jail.set_env("HAUL_DESTINATION", "/from/env");
            jail.set_env("HAUL_MODE", "0640");
            jail.set_env("HAUL_OWNER", "1000");

            let overrides = RawRequest {
                mode: Some("0700".into()),
                ..RawRequest::default()
            };
            let merged = load(Some(Path::new("haul.toml")), &overrides)?;

            assert_eq!(merged.source.as_deref(), Some("https://example.test/from-file.gz"));
            assert_eq!(merged.destination, Some(PathBuf::from("/from/env")));
            assert_eq!(merged.decompress, Some(true));
            assert_eq!(merged.owner.as_deref(), Some("1000"));
            assert_eq!(merged.mode.as_deref(), Some("0700"));
            Ok(())
        });
    }

    #[test]
    fn test_env_mode_without_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HAUL_SOURCE", "https://example.test/x");
            jail.set_env("HAUL_DESTINATION", "/x");
            jail.set_env("HAUL_MODE", "0640");

            let request = load(None, &RawRequest::default())?
                .validate()
                .map_err(|e| e.to_string())?;
            assert_eq!(request.mode, Some(0o640));
            Ok(())
        });
    }
}
