// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How often the drain checks the connection counter
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections on `listener` until `shutdown` completes
///
/// Accept errors are logged and the loop keeps going. Once shutdown arrives
/// the listener is closed and connections already accepted get up to
/// `performance.shutdown_grace` seconds to finish before this returns.
pub async fn run<S>(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: S,
) -> std::io::Result<()>
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_server_stop(
                    active_connections.load(Ordering::SeqCst),
                    state.store.len().unwrap_or_default(),
                );
                break;
            }
        }
    }

    drop(listener);
    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    let remaining = drain_connections(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until no connection is open or `grace` elapses; returns how many are left
async fn drain_connections(active: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let open = active.load(Ordering::SeqCst);
        if open == 0 || tokio::time::Instant::now() >= deadline {
            return open;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use crate::server::create_listener;
    use crate::store::WidgetStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    #[tokio::test]
    async fn test_serves_widgets_over_tcp() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        let state = AppState::shared(config, WidgetStore::new());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, Arc::clone(&state), async {
            let _ = stop_rx.await;
        }));

        let body = r#"{"name":"gear","description":"spins"}"#;
        let request = format!(
            "POST /widgets/ HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let response = roundtrip(addr, &request).await;
        assert!(response.starts_with("HTTP/1.1 201"), "{response}");
        assert!(response.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(response.contains(r#""name":"gear""#));
        assert_eq!(state.store.len().unwrap(), 1);

        let response = roundtrip(
            addr,
            "GET /nowhere HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");

        stop_tx.send(()).unwrap();
        assert!(server.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.performance.max_connections = Some(0);
        let state = AppState::shared(config, WidgetStore::new());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async {
            let _ = stop_rx.await;
        }));

        // Rejected connections are closed without a response; the write or
        // read may also see a reset depending on timing
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let _ = stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await;
        let mut response = Vec::new();
        let _ = stream.read_to_end(&mut response).await;
        assert!(response.is_empty());

        stop_tx.send(()).unwrap();
        assert!(server.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_finishes_open_connections() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.performance.shutdown_grace = 10;
        let state = AppState::shared(config, WidgetStore::new());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async {
            let _ = stop_rx.await;
        }));

        // Accepted but idle when shutdown arrives
        let mut stream = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        stop_tx.send(()).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!server.is_finished());

        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(String::from_utf8(response).unwrap().starts_with("HTTP/1.1 200"));

        assert!(server.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(2);
        let started = tokio::time::Instant::now();
        assert_eq!(drain_connections(&active, Duration::from_millis(120)).await, 2);
        assert!(started.elapsed() >= Duration::from_millis(120));

        let idle = AtomicUsize::new(0);
        assert_eq!(drain_connections(&idle, Duration::from_secs(60)).await, 0);
    }
}
