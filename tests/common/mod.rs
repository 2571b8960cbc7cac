use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, Response, StatusCode};

/// A server process on its own port, killed when dropped
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory backends with the demo accounts; no database required
        let child = Command::new(env!("CARGO_BIN_EXE_schoolmate"))
            .env("SCHOOLMATE_DATABASE_BACKEND", "memory")
            .env("SESSION_BACKEND", "memory")
            .env("SCHOOLMATE_BIND_ADDRESS", "127.0.0.1")
            .env("SCHOOLMATE_PORT", port.to_string())
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            port,
            base_url,
            client,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(format!("{}{}", self.base_url, path)).send().await?)
    }

    /// POST with no body at all
    pub async fn post_empty(&self) -> Result<Response> {
        Ok(self.client.post(format!("{}/index.php", self.base_url)).send().await?)
    }

    /// POST form fields to the front controller, optionally with a session cookie
    pub async fn post(&self, fields: &[(&str, &str)], cookie: Option<&str>) -> Result<Response> {
        let mut request = self.client.post(format!("{}/index.php", self.base_url)).form(fields);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        Ok(request.send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// `name=value` part of the response's Set-Cookie header
pub fn session_cookie(resp: &Response) -> Option<String> {
    let value = resp.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(|s| s.trim().to_string())
}
