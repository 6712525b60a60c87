#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use haul::{DownloadRequest, Pipeline};
use haul_fetch::{BoxStream, FetchResponse, HttpClient};
use haul_verify::{Checksum, ChecksumAlgorithm, digest_reader};

/// Serves fixed bodies from memory and counts every request.
#[derive(Debug, Default)]
pub struct MemoryClient {
    routes: HashMap<String, (u16, Vec<u8>)>,
    calls:  AtomicUsize,
}

impl MemoryClient {
    pub fn new() -> Self { Self::default() }

    pub fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.to_string(), (200, body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(url.to_string(), (status, Vec::new()));
        self
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl HttpClient for MemoryClient {
    type Error = std::io::Error;

    async fn get(&self, url: &str) -> Result<FetchResponse<Self::Error>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (status, body) = self.routes.get(url).cloned().unwrap_or((404, Vec::new()));
        // Split the body so the fetcher sees more than one chunk.
        let mid = body.len() / 2;
        let chunks = vec![
            Ok(Bytes::copy_from_slice(&body[..mid])),
            Ok(Bytes::copy_from_slice(&body[mid..])),
        ];
        let stream: BoxStream<'static, _> = Box::pin(futures_util::stream::iter(chunks));
        Ok(FetchResponse {
            status,
            reason: if status == 200 { "OK" } else { "Not Found" }.to_string(),
            body: stream,
        })
    }
}

pub struct Sandbox {
    pub root:    tempfile::TempDir,
    pub staging: std::path::PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::Builder::new()
            .prefix("haul-test-")
            .tempdir()
            .expect("Failed to create temp dir");
        let staging = root.path().join("staging");
        std::fs::create_dir(&staging).unwrap();
        Self { root, staging }
    }

    pub fn path(&self, relative: &str) -> std::path::PathBuf { self.root.path().join(relative) }

    pub fn pipeline(&self, client: MemoryClient) -> Pipeline<MemoryClient> {
        Pipeline::new(client).staging_root(&self.staging)
    }

    /// Nothing may be left behind in the staging root after a run.
    pub fn assert_staging_empty(&self) {
        let leftovers: Vec<_> = std::fs::read_dir(&self.staging)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "leftover temporaries: {leftovers:?}");
    }
}

pub fn request(url: &str, destination: impl AsRef<Path>) -> DownloadRequest {
    DownloadRequest::new(url.parse().unwrap(), destination.as_ref())
}

pub fn sha256_of(data: &[u8]) -> Checksum {
    let hex = digest_reader(data, ChecksumAlgorithm::Sha256).unwrap();
    Checksum::new(ChecksumAlgorithm::Sha256, hex).unwrap()
}

pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn gz(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
