//! Binary upload: sources, MIME resolution, disposition headers

mod common;

use std::io::Write;

use common::*;
use fcrepo_sdk::{BinaryOptions, BinarySource, ResourceKind};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_bytes_with_explicit_mime_and_slug() {
    let server = MockServer::start().await;
    let repo = repo_for(&server.uri());
    let assigned = repo.path_to_uri("parent/doc");

    Mock::given(method("POST"))
        .and(path("/rest/parent"))
        .and(header("Content-Type", "application/pdf"))
        .and(header("Content-Disposition", "attachment; filename=\"doc.pdf\""))
        .and(header("Slug", "doc"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", assigned.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    let binary = repo
        .add_binary(
            &repo.path_to_uri("parent"),
            BinarySource::Bytes {
                data: b"%PDF-1.4".to_vec(),
                filename: Some("doc.pdf".to_string()),
            },
            BinaryOptions {
                slug: Some("doc".to_string()),
                mime: Some("application/pdf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(binary.uri(), assigned);
    assert_eq!(binary.kind(), ResourceKind::Binary);
}

#[tokio::test]
async fn test_bytes_without_hints_default_to_octet_stream() {
    let server = MockServer::start().await;
    let repo = repo_for(&server.uri());
    let assigned = repo.path_to_uri("parent/auto1");

    Mock::given(method("POST"))
        .and(path("/rest/parent"))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", assigned.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    let binary = repo
        .add_binary(
            &repo.path_to_uri("parent"),
            BinarySource::Bytes {
                data: vec![0, 1, 2, 3],
                filename: None,
            },
            BinaryOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(binary.uri(), assigned);
}

#[tokio::test]
async fn test_file_source_guesses_mime_from_extension() {
    let server = MockServer::start().await;
    let repo = repo_for(&server.uri());

    let mut file = tempfile::Builder::new()
        .prefix("notes-")
        .suffix(".txt")
        .tempfile()
        .unwrap();
    file.write_all(b"some notes").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/parent/notes"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/rest/parent/notes"))
        .and(header("Content-Type", "text/plain"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let binary = repo
        .add_binary(
            &repo.path_to_uri("parent"),
            BinarySource::File(file.path().to_path_buf()),
            BinaryOptions {
                path: Some("notes".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // deterministic mode: the URI is the constructed path
    assert_eq!(binary.uri(), repo.path_to_uri("parent/notes"));
}

#[tokio::test]
async fn test_url_source_takes_upstream_content_type() {
    let server = MockServer::start().await;
    let repo = repo_for(&server.uri());
    let assigned = repo.path_to_uri("parent/pic.jpg");

    // the payload host; lives outside the repository's /rest tree
    Mock::given(method("GET"))
        .and(path("/files/pic.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .set_body_bytes(vec![0xff, 0xd8, 0xff]),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/parent"))
        .and(header("Content-Type", "image/jpeg"))
        .and(header("Content-Disposition", "attachment; filename=\"pic.jpg\""))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", assigned.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    let binary = repo
        .add_binary(
            &repo.path_to_uri("parent"),
            BinarySource::Url(format!("{}/files/pic.jpg", server.uri())),
            BinaryOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(binary.uri(), assigned);
}
