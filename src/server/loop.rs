// Server loop module
// Accepts connections until shutdown, then drains in-flight work

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop on the current `LocalSet`.
///
/// Returns once `shutdown` is notified and either every active connection has
/// finished or `performance.shutdown_grace_secs` has elapsed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
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

            _ = shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on in-flight connections
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_secs);
    let remaining = drain_connections(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait for `active` to reach zero or for `grace` to elapse; returns what is left
async fn drain_connections(active: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::create_reusable_listener;
    use crate::test_support::test_config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_drain_returns_leftovers_after_grace() {
        let active = AtomicUsize::new(2);
        let remaining = drain_connections(&active, Duration::from_millis(120)).await;
        assert_eq!(remaining, 2);

        active.store(0, Ordering::SeqCst);
        let remaining = drain_connections(&active, Duration::from_secs(5)).await;
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_serves_then_shuts_down() {
        let mut config = test_config();
        config.performance.shutdown_grace_secs = 2;
        let state = Arc::new(AppState::new(&config).expect("app state"));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr"), 16).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let active = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::clone(&active),
                    Arc::clone(&shutdown),
                ));

                let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
                stream
                    .write_all(b"GET /healthz HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
                    .await
                    .expect("write request");
                let mut raw = Vec::new();
                stream.read_to_end(&mut raw).await.expect("read response");
                let text = String::from_utf8_lossy(&raw);
                assert!(text.starts_with("HTTP/1.1 200 OK"));
                assert!(text.ends_with("ok"));

                shutdown.notify_one();
                let result = tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .expect("loop stops")
                    .expect("task joins");
                assert!(result.is_ok());
                assert_eq!(active.load(Ordering::SeqCst), 0);
            })
            .await;
    }
}
