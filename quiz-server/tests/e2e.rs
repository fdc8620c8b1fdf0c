//! Runs the real server on an ephemeral port and plays a full quiz over HTTP.

use std::{fs, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use quiz_server::{
    api::AppState,
    question::QuestionBank,
    server::{Retention, Server},
    session::SessionStore,
};

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl RunningServer {
    async fn start() -> Result<Self> {
        Self::start_with(None).await
    }

    async fn start_with(static_dir: Option<PathBuf>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let store = Arc::new(SessionStore::new(Arc::new(QuestionBank::defaults())));
        let mut server = Server::new(listener, AppState::new(store, 10), Retention::default());
        if let Some(dir) = static_dir {
            server = server.with_static_dir(dir);
        }
        let addr = server.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until(async {
            let _ = signal.await;
        }));

        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await.context("server task panicked")?
    }
}

#[tokio::test]
async fn full_quiz_over_http() -> Result<()> {
    let server = RunningServer::start().await?;
    let client = reqwest::Client::new();

    let started: Value = client
        .post(server.url("/api/start-quiz"))
        .json(&json!({ "questionCount": 5 }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(started["totalQuestions"], 5);
    let id = started["sessionId"]
        .as_str()
        .context("missing sessionId")?
        .to_string();

    let mut correct = 0;
    for number in 1..=5u64 {
        let question: Value = client
            .get(server.url(&format!("/api/question/{id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        assert_eq!(question["questionNumber"], number);
        assert_eq!(question["answers"].as_array().map(Vec::len), Some(4));

        let answer: Value = client
            .post(server.url(&format!("/api/answer/{id}")))
            .json(&json!({ "answerIndex": 1 }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if answer["correct"] == true {
            correct += 1;
        }
    }

    let finished = client
        .get(server.url(&format!("/api/question/{id}")))
        .send()
        .await?;
    assert_eq!(finished.status(), reqwest::StatusCode::BAD_REQUEST);

    let results: Value = client
        .get(server.url(&format!("/api/results/{id}")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(results["score"], correct);
    assert_eq!(results["totalQuestions"], 5);
    assert_eq!(results["percentage"], correct * 20);

    server.stop().await
}

#[tokio::test]
async fn cors_headers_are_present() -> Result<()> {
    let server = RunningServer::start().await?;

    let response = reqwest::Client::new()
        .get(server.url("/api/results/unknown"))
        .header("Origin", "http://example.test")
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );

    server.stop().await
}

#[tokio::test]
async fn serves_browser_client_at_root() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("quiz-static-{}", nanoid::nanoid!()));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), "<html>quiz</html>\n")?;

    let server = RunningServer::start_with(Some(dir.clone())).await?;
    let client = reqwest::Client::new();

    let root = client.get(server.url("/")).send().await?;
    assert_eq!(root.status(), reqwest::StatusCode::OK);
    assert_eq!(root.text().await?, "<html>quiz</html>\n");

    let unknown = client.get(server.url("/api/does-not-exist")).send().await?;
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

    let api = client
        .post(server.url("/api/start-quiz"))
        .json(&json!({ "questionCount": 1 }))
        .send()
        .await?;
    assert_eq!(api.status(), reqwest::StatusCode::OK);

    let stopped = server.stop().await;
    let _ = fs::remove_dir_all(&dir);
    stopped
}
