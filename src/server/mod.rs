// Server module entry point
// Listener setup, per-connection serving and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is renamed
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::bind_listener;
pub use server_loop::run_server_loop;
pub use signal::start_signal_handler;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testing::{content, table};
    use crate::config::{AppState, Config, TimeoutConfig};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    fn serve(timeouts: TimeoutConfig) -> (SocketAddr, Arc<Notify>, JoinHandle<std::io::Result<()>>) {
        let content = content("", "/", r#"{"k":1}"#);
        let mut config = Config::from_vars(Some(config::Map::new())).unwrap();
        config.content = content.clone();
        config.timeouts = timeouts;
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config, table(&content)));

        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run_server_loop(listener, state, Arc::clone(&shutdown)));
        (addr, shutdown, server)
    }

    async fn fetch(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        String::from_utf8(raw).unwrap()
    }

    /// Send a keep-alive request and read exactly one response.
    /// `None` means the server closed the connection first.
    async fn exchange(stream: &mut TcpStream, path: &str) -> Option<String> {
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        stream.write_all(request.as_bytes()).await.ok()?;

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8(raw[..end].to_vec()).unwrap();
                let length: usize = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length: "))
                    .unwrap()
                    .parse()
                    .unwrap();
                if raw.len() >= end + 4 + length {
                    return Some(String::from_utf8(raw).unwrap());
                }
            }
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                return None;
            }
            raw.extend_from_slice(&buf[..n]);
        }
    }

    #[tokio::test]
    async fn test_serves_over_tcp_and_shuts_down() {
        let (addr, shutdown, server) = serve(TimeoutConfig { read: 5, write: 10, idle: 120 });

        let config_response = fetch(addr, "/config.json").await;
        assert!(config_response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(config_response.contains("content-type: application/json\r\n"));
        assert!(config_response.contains("cache-control: public, max-age: 60\r\n"));
        assert!(config_response.ends_with("\r\n\r\n{\"k\":1}"));

        let fallback = fetch(addr, "/some/client/route").await;
        assert!(fallback.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(fallback.contains("content-security-policy: default-src 'self';"));
        assert!(fallback.contains("<script nonce=\""));

        shutdown.notify_one();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_keep_alive_outlasts_read_timeout() {
        let (addr, shutdown, server) = serve(TimeoutConfig { read: 1, write: 10, idle: 120 });
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let first = exchange(&mut stream, "/config.json").await.unwrap();
        assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));

        // longer than the read timeout, well inside the idle timeout
        tokio::time::sleep(Duration::from_secs(3)).await;

        let second = exchange(&mut stream, "/assets/app.css").await.unwrap();
        assert!(second.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(second.ends_with("p { color: red; }"));

        drop(stream);
        shutdown.notify_one();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_idle_connection_is_closed() {
        let (addr, shutdown, server) = serve(TimeoutConfig { read: 5, write: 10, idle: 1 });
        let mut stream = TcpStream::connect(addr).await.unwrap();

        assert!(exchange(&mut stream, "/config.json").await.is_some());

        let mut buf = [0u8; 16];
        let closed = tokio::time::timeout(Duration::from_secs(4), stream.read(&mut buf)).await;
        assert_eq!(closed.unwrap().unwrap_or(0), 0);

        shutdown.notify_one();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_zero_timeouts_still_serve() {
        for timeouts in [
            TimeoutConfig { read: 5, write: 10, idle: 0 },
            TimeoutConfig { read: 0, write: 0, idle: 0 },
        ] {
            let (addr, shutdown, server) = serve(timeouts);
            let mut stream = TcpStream::connect(addr).await.unwrap();

            let first = exchange(&mut stream, "/config.json").await.unwrap();
            assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));
            let second = exchange(&mut stream, "/config.json").await.unwrap();
            assert!(second.ends_with("{\"k\":1}"));

            drop(stream);
            shutdown.notify_one();
            server.await.unwrap().unwrap();
        }
    }
}
