mod common;

use common::{MemoryClient, Sandbox, gz, request, sha256_of, tar_gz};
use haul::{Error, execute};

const URL: &str = "http://files.test/file.txt";

#[tokio::test]
async fn existing_destination_without_checksum_is_left_alone() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");
    std::fs::write(&dest, "already here").unwrap();

    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "hello"));
    let report = execute(&pipeline, &request(URL, &dest)).await.unwrap();

    assert_eq!(pipeline.client().calls(), 0);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "already here");
    assert_eq!(report.size, None);
}

#[tokio::test]
async fn matching_checksum_skips_fetch() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");
    std::fs::write(&dest, "hello").unwrap();

    let mut req = request(URL, &dest);
    req.checksum = Some(sha256_of(b"hello"));
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "other"));
    let report = execute(&pipeline, &req).await.unwrap();

    assert_eq!(pipeline.client().calls(), 0);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
    assert_eq!(report.checksum.as_deref(), Some(sha256_of(b"hello").expected()));
}

#[tokio::test]
async fn stale_destination_is_replaced() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");
    std::fs::write(&dest, "stale").unwrap();

    let mut req = request(URL, &dest);
    req.checksum = Some(sha256_of(b"hello"));
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "hello"));
    let report = execute(&pipeline, &req).await.unwrap();

    assert_eq!(pipeline.client().calls(), 1);
    assert!(report.changed);
    assert_eq!(report.size, Some(5));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
    sandbox.assert_staging_empty();
}

#[tokio::test]
async fn force_downloads_even_when_up_to_date() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("nested/dir/file.txt");
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&dest, "hello").unwrap();

    let mut req = request(URL, &dest);
    req.force = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "fresh"));
    execute(&pipeline, &req).await.unwrap();

    assert_eq!(pipeline.client().calls(), 1);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fresh");
}

#[tokio::test]
async fn checksum_mismatch_leaves_destination_untouched() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");
    std::fs::write(&dest, "original").unwrap();

    let mut req = request(URL, &dest);
    req.checksum = Some(sha256_of(b"hello"));
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "tampered"));
    let failure = execute(&pipeline, &req).await.unwrap_err();

    match &failure.error {
        Error::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, sha256_of(b"hello").expected());
            assert_eq!(actual, sha256_of(b"tampered").expected());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!failure.report.changed);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "original");
    sandbox.assert_staging_empty();

    let report = failure.into_report();
    assert!(report.failed);
    assert!(report.msg.unwrap().starts_with("checksum verification failed"));
}

#[tokio::test]
async fn http_error_status_is_a_transport_failure() {
    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");

    let pipeline = sandbox.pipeline(MemoryClient::new().status(URL, 404));
    let failure = execute(&pipeline, &request(URL, &dest)).await.unwrap_err();

    assert!(matches!(failure.error, Error::Transport(_)));
    assert!(!dest.exists());
    sandbox.assert_staging_empty();
}

#[tokio::test]
async fn corrupt_archive_leaves_destination_untouched() {
    let url = "http://files.test/bundle.tar.gz";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("install");
    std::fs::create_dir_all(dest.join("a")).unwrap();
    std::fs::write(dest.join("a/old.txt"), "old").unwrap();

    let mut req = request(url, &dest);
    req.decompress = true;
    req.force = true;
    let corrupt = b"\x1f\x8bthis is not gzip".to_vec();
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, corrupt));
    let failure = execute(&pipeline, &req).await.unwrap_err();

    assert!(matches!(failure.error, Error::Extraction(_)));
    assert_eq!(std::fs::read_to_string(dest.join("a/old.txt")).unwrap(), "old");
    assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 1);
    sandbox.assert_staging_empty();
}

#[tokio::test]
async fn directory_merge_keeps_existing_entries() {
    let url = "http://files.test/bundle.tar.gz";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("install");
    std::fs::create_dir_all(dest.join("a")).unwrap();
    std::fs::write(dest.join("a/old.txt"), "old").unwrap();

    let archive = tar_gz(&[("a/b.txt", b"bee"), ("a/c.txt", b"sea")]);
    let mut req = request(url, &dest);
    req.decompress = true;
    req.force = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, archive));
    let report = execute(&pipeline, &req).await.unwrap();

    assert_eq!(report.decompressed, Some(true));
    assert!(report.changed);
    assert_eq!(std::fs::read_to_string(dest.join("a/old.txt")).unwrap(), "old");
    assert_eq!(std::fs::read_to_string(dest.join("a/b.txt")).unwrap(), "bee");
    assert_eq!(std::fs::read_to_string(dest.join("a/c.txt")).unwrap(), "sea");
    sandbox.assert_staging_empty();
}

#[tokio::test]
async fn trailing_separator_extracts_into_new_directory() {
    let url = "http://files.test/release.tgz";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("fresh/");

    let archive = tar_gz(&[("bin/tool", b"#!/bin/sh\n"), ("README", b"docs")]);
    let mut req = request(url, &dest);
    req.decompress = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, archive));
    execute(&pipeline, &req).await.unwrap();

    let root = sandbox.path("fresh");
    assert!(root.is_dir());
    assert_eq!(std::fs::read_to_string(root.join("README")).unwrap(), "docs");
    assert!(root.join("bin/tool").is_file());
}

#[tokio::test]
async fn gz_to_file_is_decompressed() {
    let url = "http://files.test/notes.txt.gz?sig=abc";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("notes.txt");

    let mut req = request(url, &dest);
    req.decompress = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, gz(b"plain text body")));
    let report = execute(&pipeline, &req).await.unwrap();

    assert_eq!(report.decompressed, Some(true));
    assert_eq!(report.size, Some(15));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "plain text body");
    sandbox.assert_staging_empty();
}

#[tokio::test]
async fn gz_into_directory_uses_stripped_name() {
    let url = "http://files.test/data.csv.gz";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("datasets");
    std::fs::create_dir(&dest).unwrap();

    let mut req = request(url, &dest);
    req.decompress = true;
    req.force = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, gz(b"a,b\n")));
    execute(&pipeline, &req).await.unwrap();

    assert_eq!(std::fs::read_to_string(dest.join("data.csv")).unwrap(), "a,b\n");
}

#[tokio::test]
async fn unknown_format_fails_before_fetching() {
    let url = "http://files.test/blob.bin";
    let sandbox = Sandbox::new();
    let dest = sandbox.path("blob");

    let mut req = request(url, &dest);
    req.decompress = true;
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(url, "bytes"));
    let failure = execute(&pipeline, &req).await.unwrap_err();

    assert!(matches!(failure.error, Error::FormatUndetermined { ref name } if name == "blob.bin"));
    assert_eq!(pipeline.client().calls(), 0);
    assert!(!dest.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn explicit_mode_marks_skipped_run_changed() {
    use std::os::unix::fs::PermissionsExt;

    let sandbox = Sandbox::new();
    let dest = sandbox.path("file.txt");
    std::fs::write(&dest, "hello").unwrap();
    std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o644)).unwrap();

    let mut req = request(URL, &dest);
    req.mode = Some(0o600);
    let pipeline = sandbox.pipeline(MemoryClient::new().serve(URL, "hello"));

    let first = execute(&pipeline, &req).await.unwrap();
    let second = execute(&pipeline, &req).await.unwrap();

    assert_eq!(pipeline.client().calls(), 0);
    assert!(first.changed);
    assert!(!second.changed);
    let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
