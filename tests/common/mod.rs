//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use domain_router::config::DomainSeed;
use domain_router::lifecycle::{bootstrap, Shutdown};
use domain_router::RouterConfig;

pub const ADMIN_KEY: &str = "integration-key";

/// Running router with its main and admin addresses.
pub struct TestRouter {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}/admin{}", self.admin_addr, path)
    }
}

impl Drop for TestRouter {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn seed(id: &str, hostname: &str) -> DomainSeed {
    DomainSeed {
        id: id.into(),
        hostname: hostname.into(),
        name: None,
        scheme: None,
        weight: None,
        status: None,
        is_default: false,
        redirect: None,
        canonical: None,
    }
}

/// Bootstrap a router on ephemeral ports and serve it in the background.
pub async fn start_router(mut config: RouterConfig) -> TestRouter {
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();

    let app = bootstrap(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = app.serve(listener, Some(admin_listener), &server_shutdown).await;
    });

    // Wait for the servers to accept connections.
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestRouter {
        addr,
        admin_addr,
        shutdown,
    }
}

/// Start a mock backend answering every request with `status`.
pub async fn start_status_backend(status: u16) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response = format!(
                            "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
