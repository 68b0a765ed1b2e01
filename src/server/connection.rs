// Connection handling module
// Serves one accepted TCP connection under the configured timeouts

use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Body, Bytes, Frame, Incoming, SizeHint};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::sync::watch;

use crate::config::{AppState, TimeoutConfig};
use crate::handler;
use crate::logger;

/// Where a connection is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Accepted, first request not yet received
    Reading,
    /// A request was received and its response is not yet fully written
    Writing,
    /// Between requests on a kept-alive connection
    Idle,
}

impl Phase {
    fn limit(self, timeouts: &TimeoutConfig) -> Option<Duration> {
        match self {
            Self::Reading => timeouts.read_limit(),
            Self::Writing => timeouts.write_limit(),
            Self::Idle => timeouts.idle_limit(),
        }
    }
}

/// Moves the connection back to `Idle` once hyper is done with the body
struct ResponseDone(Arc<watch::Sender<Phase>>);

impl Drop for ResponseDone {
    fn drop(&mut self) {
        self.0.send_replace(Phase::Idle);
    }
}

/// Response body that reports its own completion
struct TrackedBody {
    inner: Full<Bytes>,
    _done: ResponseDone,
}

impl Body for TrackedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// Serve a connection in a spawned task.
///
/// Timeouts, each disabled when set to 0:
/// 1. read: the first request must arrive within this long of the accept
/// 2. write: a response must be produced and handed off within this long
///    of its request arriving, otherwise the connection is dropped
/// 3. idle: a kept-alive connection with no new request for this long is
///    closed. 0 falls back to the read timeout.
///
/// The counter is incremented here and decremented when the task ends.
pub fn spawn_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    conn_counter.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let timeouts = state.config.timeouts;
        let io = TokioIo::new(stream);
        let (phase_tx, mut phase_rx) = watch::channel(Phase::Reading);
        let phase_tx = Arc::new(phase_tx);

        let service = {
            let phase_tx = Arc::clone(&phase_tx);
            service_fn(move |req: Request<Incoming>| {
                phase_tx.send_replace(Phase::Writing);
                let done = ResponseDone(Arc::clone(&phase_tx));
                let response = handler::handle_request(req, Arc::clone(&state), peer_addr);
                async move {
                    let response = response.await?;
                    Ok::<_, Infallible>(response.map(|inner| TrackedBody { inner, _done: done }))
                }
            })
        };

        // Header reads are bounded by the phase timers below
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(None)
            .keep_alive(true);

        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        loop {
            let phase = *phase_rx.borrow_and_update();

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }

                Ok(()) = phase_rx.changed() => {}

                () = expire(phase.limit(&timeouts)) => {
                    match phase {
                        Phase::Reading => {}
                        Phase::Writing => logger::log_warning(&format!(
                            "Response to {peer_addr} not written within {} seconds, dropping connection",
                            timeouts.write
                        )),
                        Phase::Idle => {
                            conn.as_mut().graceful_shutdown();
                            close(conn.as_mut(), timeouts.write_limit(), peer_addr).await;
                        }
                    }
                    break;
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

async fn expire(limit: Option<Duration>) {
    match limit {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}

/// Wait for a connection asked to shut down, bounded by `limit`
async fn close<F>(conn: Pin<&mut F>, limit: Option<Duration>, peer_addr: SocketAddr)
where
    F: std::future::Future<Output = hyper::Result<()>>,
{
    let result = match limit {
        Some(limit) => match tokio::time::timeout(limit, conn).await {
            Ok(result) => result,
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} did not close within {} seconds",
                    limit.as_secs()
                ));
                return;
            }
        },
        None => conn.await,
    };

    if let Err(err) = result {
        logger::log_connection_error(&err);
    }
}
