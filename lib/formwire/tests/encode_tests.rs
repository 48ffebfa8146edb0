//! Integration tests for asynchronous encoding.

use std::path::PathBuf;

use assert2::check;
use bytes::Bytes;
use formwire::{BodyStream, Error, Field, FormData};

fn chunks(parts: Vec<formwire::Result<Bytes>>) -> BodyStream {
    Box::pin(futures_util::stream::iter(parts))
}

fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("formwire-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("temp file");
    path
}

#[tokio::test]
async fn multipart_file_scenario() {
    let path = temp_file("x.txt", b"0123456789");

    let mut form = FormData::with_boundary("b");
    form.set_file("doc", &path);

    let length = form.content_length().expect("length").expect("computable");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");
    check!(errors.is_empty());

    let expected = "--b\r\n\
                    Content-Disposition: form-data; name=\"doc\"; filename=\"x.txt\"\r\n\
                    Content-Type: binary/octet-stream\r\n\r\n\
                    0123456789\r\n\
                    --b--\r\n";
    check!(String::from_utf8(body.clone()).expect("utf8") == expected);
    check!(body.len() as u64 == length);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn multipart_preserves_field_insertion_order() {
    let mut form = FormData::with_boundary("ord");
    form.set("first", "1");
    form.set_stream("middle", chunks(vec![Ok(Bytes::from_static(b"mid"))]));
    form.set("last", "3");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");
    check!(errors.is_empty());

    let text = String::from_utf8(body).expect("utf8");
    let first = text.find("name=\"first\"").expect("first part");
    let middle = text.find("name=\"middle\"").expect("middle part");
    let last = text.find("name=\"last\"").expect("last part");
    check!(first < middle);
    check!(middle < last);
    check!(text.contains("name=\"middle\"\r\n\r\nmid\r\n"));
    check!(text.ends_with("--ord--\r\n"));
}

#[tokio::test]
async fn multipart_file_stream_part() {
    let source = chunks(vec![
        Ok(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ]);

    let mut form = FormData::with_boundary("fs");
    form.set_entry(
        "upload",
        Field::file_stream(source)
            .with_filename("greeting.txt")
            .with_content_type("text/plain"),
    );

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");
    check!(errors.is_empty());

    let text = String::from_utf8(body).expect("utf8");
    check!(text.contains(
        "Content-Disposition: form-data; name=\"upload\"; filename=\"greeting.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello world\r\n"
    ));
}

#[tokio::test]
async fn source_error_does_not_abort_traversal() {
    let failing = chunks(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(Error::from(std::io::Error::other("connection reset"))),
    ]);

    let mut form = FormData::with_boundary("err");
    form.set_stream("broken", failing);
    form.set("after", "still here");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");

    check!(errors.len() == 1);
    let error = errors.first().expect("one error");
    check!(error.is_source_read());
    check!(error.field() == Some("broken"));

    // The failing entry keeps its partial payload and the following
    // field is still encoded, terminated by the closing boundary.
    let text = String::from_utf8(body).expect("utf8");
    check!(text.contains("partial"));
    check!(text.contains("name=\"after\"\r\n\r\nstill here\r\n"));
    check!(text.ends_with("--err--\r\n"));
}

#[tokio::test]
async fn missing_file_reported_but_not_fatal() {
    let mut form = FormData::with_boundary("mf");
    form.set_file("gone", "/definitely/not/here.bin");
    form.set("after", "ok");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");

    check!(errors.len() == 1);
    check!(errors.first().expect("one error").field() == Some("gone"));

    let text = String::from_utf8(body).expect("utf8");
    // The part framing is written, the payload is empty.
    check!(text.contains("name=\"gone\"; filename=\"here.bin\"\r\n"));
    check!(text.contains("name=\"after\"\r\n\r\nok\r\n"));
}

#[tokio::test]
async fn urlencoded_stream_is_encoded_chunk_by_chunk() {
    let source = chunks(vec![
        Ok(Bytes::from_static(b"a b")),
        Ok(Bytes::from_static(b"&c")),
    ]);

    let mut form = FormData::new();
    form.set("name", "Bob");
    form.set_stream("raw", source);
    form.set_content_type("application/x-www-form-urlencoded");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");
    check!(errors.is_empty());

    check!(String::from_utf8(body).expect("utf8") == "name=Bob&raw=a%20b%26c");
}

#[tokio::test]
async fn json_drains_stream_into_string() {
    let source = chunks(vec![Ok(Bytes::from_static(b"streamed text"))]);

    let mut form = FormData::new();
    form.set("tags", serde_json::json!(["a", "b"]));
    form.set_stream("raw", source);
    form.set_entry("doc", Field::file("/tmp/x.txt"));
    form.set_content_type("application/json");

    let mut body = Vec::new();
    let errors = form.pipe(&mut body).await.expect("encode");
    check!(errors.is_empty());

    let parsed: serde_json::Value =
        serde_json::from_slice(&body).expect("valid json");
    check!(parsed == serde_json::json!({"tags": ["a", "b"], "raw": "streamed text", "doc": "x.txt"}));
}

#[tokio::test]
async fn unrecognized_content_type_is_fatal() {
    let mut form = FormData::new();
    form.set("a", 1);
    form.set_content_type("text/plain");

    let mut body = Vec::new();
    let result = form.pipe(&mut body).await;
    check!(matches!(result, Err(Error::UnrecognizedContentType(_))));
    check!(body.is_empty());
}

#[tokio::test]
async fn headers_for_stream_backed_form() {
    let mut form = FormData::with_boundary("hb");
    form.set_file_stream("upload", chunks(vec![Ok(Bytes::from_static(b"x"))]));

    let headers = form.headers(None).expect("headers");
    check!(
        headers.get("content-type").map(String::as_str)
            == Some("multipart/form-data; boundary=hb")
    );
    check!(headers.get("content-length").is_none());
    check!(headers.get("transfer-encoding").map(String::as_str) == Some("chunked"));
}

#[tokio::test]
async fn re_encoding_scalars_is_repeatable() {
    let mut form = FormData::with_boundary("rep");
    form.set("name", "Bob");

    let mut first = Vec::new();
    form.pipe(&mut first).await.expect("first encode");
    let mut second = Vec::new();
    form.pipe(&mut second).await.expect("second encode");

    check!(first == second);
}
