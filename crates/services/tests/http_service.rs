use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use services::{
    AskReply, AskRequest, EvaluationRequest, HttpIntelligenceService, IntelligenceError,
    IntelligenceService, TutorConfig,
};

/// Serve one canned HTTP response on a local port and return the base URL.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}")
}

/// Drain headers and a `Content-Length` body so the client sees a clean exchange.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}

fn client(base_url: String) -> HttpIntelligenceService {
    let config = TutorConfig {
        request_timeout: Duration::from_secs(5),
        ..TutorConfig::default()
    }
    .with_base_url(base_url);
    HttpIntelligenceService::new(&config).unwrap()
}

fn question() -> AskRequest {
    AskRequest {
        question: "What is on screen?".into(),
        summary: "A lecture.".into(),
        context: None,
        history: Vec::new(),
    }
}

#[tokio::test]
async fn error_status_with_json_body_carries_service_message() {
    let base = serve_once(
        "400 Bad Request",
        "application/json",
        r#"{"error":"No screenshot available. Please pause the video first."}"#,
    )
    .await;

    let err = client(base).ask_question(&question()).await.unwrap_err();

    assert!(matches!(
        err,
        IntelligenceError::Rejected {
            status: StatusCode::BAD_REQUEST,
            ..
        }
    ));
    assert_eq!(
        err.user_message(),
        "No screenshot available. Please pause the video first."
    );
}

#[tokio::test]
async fn error_status_with_plain_body_maps_to_status() {
    let base = serve_once("502 Bad Gateway", "text/plain", "upstream down").await;

    let err = client(base).ask_question(&question()).await.unwrap_err();

    assert!(matches!(
        err,
        IntelligenceError::HttpStatus(StatusCode::BAD_GATEWAY)
    ));
    assert_eq!(err.user_message(), services::GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn successful_answer_is_parsed() {
    let base = serve_once(
        "200 OK",
        "application/json",
        r#"{"answer":"A borrow checker."}"#,
    )
    .await;

    let reply = client(base).ask_question(&question()).await.unwrap();

    assert_eq!(reply, AskReply::Answer("A borrow checker.".into()));
}

#[tokio::test]
async fn garbled_success_body_is_malformed() {
    let base = serve_once("200 OK", "application/json", "{not json").await;
    let request = EvaluationRequest {
        question: "Q1".into(),
        answer: "an answer".into(),
        context: "transcript".into(),
    };

    let err = client(base).evaluate_answer(&request).await.unwrap_err();

    assert!(matches!(err, IntelligenceError::MalformedResponse(_)));
}
