use std::fmt;
use std::io::{self, Read, Seek};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Container or compression kind handled by the extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    Gz,
    Bz2,
    Xz,
}

impl ArchiveFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gz => "gz",
            Self::Bz2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Requested decompression format: explicit, or inferred from the artifact name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Zip,
    Gz,
    Bz2,
    Xz,
    Tar,
    #[default]
    Auto,
}

impl FormatHint {
    pub fn explicit(self) -> Option<ArchiveFormat> {
        match self {
            Self::Zip => Some(ArchiveFormat::Zip),
            Self::Gz => Some(ArchiveFormat::Gz),
            Self::Bz2 => Some(ArchiveFormat::Bz2),
            Self::Xz => Some(ArchiveFormat::Xz),
            Self::Tar => Some(ArchiveFormat::Tar),
            Self::Auto => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.explicit() {
            Some(format) => format.as_str(),
            None => "auto",
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported decompress format '{0}' (expected one of zip, gz, bz2, xz, tar, auto)")]
pub struct ParseFormatHintError(pub String);

impl FromStr for FormatHint {
    type Err = ParseFormatHintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "gz" => Ok(Self::Gz),
            "bz2" => Ok(Self::Bz2),
            "xz" => Ok(Self::Xz),
            "tar" => Ok(Self::Tar),
            "auto" => Ok(Self::Auto),
            _ => Err(ParseFormatHintError(s.to_string())),
        }
    }
}

/// Compression wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl TarCompress {
    pub fn decoder<R: Read>(self, reader: R) -> Decoder<R> {
        match self {
            Self::None => Decoder::Passthrough(reader),
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            Self::Bzip2 => Decoder::Bzip2(Box::new(bzip2::read::MultiBzDecoder::new(reader))),
            Self::Xz => Decoder::Xz(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader))),
        }
    }
}

/// Decoder wrapper so every codec reads through one concrete type.
pub enum Decoder<R: Read> {
    Passthrough(R),
    Gzip(Box<flate2::read::MultiGzDecoder<R>>),
    Bzip2(Box<bzip2::read::MultiBzDecoder<R>>),
    Xz(Box<xz2::read::XzDecoder<R>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
        }
    }
}

/// Identify a tar stream's outer compression from its leading bytes.
pub fn detect_tar_compress(header: &[u8]) -> TarCompress {
    match header {
        [0x1F, 0x8B, ..] => TarCompress::Gzip,
        [b'B', b'Z', b'h', ..] => TarCompress::Bzip2,
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => TarCompress::Xz,
        _ => TarCompress::None,
    }
}

/// Peek at the first bytes of `reader` and rewind it.
pub fn sniff_tar_compress<R: Read + Seek>(reader: &mut R) -> io::Result<TarCompress> {
    let mut header = [0u8; 6];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    reader.rewind()?;
    Ok(detect_tar_compress(&header[..filled]))
}
