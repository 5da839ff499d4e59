//! Transport lifecycle: attach the server to a byte-stream transport, serve
//! until the peer disconnects or shutdown is requested, then close.
//!
//! Shutdown is best-effort. Cancelling the token closes the transport once;
//! lookups still in flight are not awaited.
//!
//! End of input is different: a client that half-closes stdin after sending
//! its last request still gets every reply. `drain_on_eof` withholds EOF from
//! the protocol loop until each request id read has been answered.

use std::collections::HashSet;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};

use rmcp::ServiceExt;
use rmcp::service::RoleServer;
use rmcp::transport::IntoTransport;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::WhoisMcpError;
use crate::server::WhoisMcpServer;

/// Which termination signal ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Installed SIGINT/SIGTERM handlers (Ctrl-C only on non-unix).
///
/// Handlers are registered by `install`, so a signal that arrives before the
/// first `recv` is still observed instead of killing the process.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Resolve on the first signal received.
    pub async fn recv(&mut self) -> io::Result<ShutdownSignal> {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => Ok(ShutdownSignal::Interrupt),
                _ = self.terminate.recv() => Ok(ShutdownSignal::Terminate),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            Ok(ShutdownSignal::Interrupt)
        }
    }
}

/// Serve MCP over the process's stdin/stdout until cancelled or closed.
///
/// Closing stdin ends the session only after pending calls are answered.
pub async fn serve_stdio(server: WhoisMcpServer, cancel: CancellationToken) -> crate::Result<()> {
    let transport = drain_on_eof(tokio::io::stdin(), tokio::io::stdout());
    serve(server, transport, cancel).await
}

/// Serve MCP over any rmcp-compatible transport until cancelled or closed.
///
/// Cancellation during the initialize handshake returns `Ok(())` without
/// serving. A handshake failure is a `Transport` error.
pub async fn serve<T, E, A>(
    server: WhoisMcpServer,
    transport: T,
    cancel: CancellationToken,
) -> crate::Result<()>
where
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + Send + Sync + 'static,
{
    let running = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("shutdown requested before MCP handshake completed");
            return Ok(());
        }
        result = server.serve_with_ct(transport, cancel.clone()) => {
            result.map_err(|e| WhoisMcpError::Transport(e.to_string()))?
        }
    };

    tracing::info!("MCP transport initialized, waiting for messages");

    let reason = running
        .waiting()
        .await
        .map_err(|e| WhoisMcpError::Transport(e.to_string()))?;
    tracing::info!(?reason, "MCP transport closed");

    Ok(())
}

/// Wrap a newline-delimited JSON-RPC byte stream so EOF on `reader` is only
/// reported once every request read from it has a response on `writer`.
pub fn drain_on_eof<R, W>(reader: R, writer: W) -> (DrainingReader<R>, RecordingWriter<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ledger = Arc::new(RequestLedger::default());
    (
        DrainingReader {
            inner: reader,
            ledger: ledger.clone(),
            lines: LineBuffer::default(),
            state: ReadState::Open,
        },
        RecordingWriter {
            inner: writer,
            ledger,
            lines: LineBuffer::default(),
        },
    )
}

/// Request ids read from the peer that have not been answered yet.
#[derive(Debug, Default)]
struct RequestLedger {
    open: Mutex<HashSet<String>>,
    answered: Notify,
}

impl RequestLedger {
    fn inbound(&self, line: &[u8]) {
        match classify(line) {
            Some(Frame::Request(id)) => {
                self.ids().insert(id);
            }
            // rmcp may drop the reply of a cancelled request.
            Some(Frame::Cancelled(id)) => self.close(&id),
            _ => {}
        }
    }

    fn outbound(&self, line: &[u8]) {
        if let Some(Frame::Response(id)) = classify(line) {
            self.close(&id);
        }
    }

    fn close(&self, id: &str) {
        if self.ids().remove(id) {
            self.answered.notify_waiters();
        }
    }

    fn pending(&self) -> usize {
        self.ids().len()
    }

    fn ids(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.open.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn drained(&self) {
        loop {
            let notified = self.answered.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// What a single JSON-RPC line means for the ledger.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Request(String),
    Response(String),
    Cancelled(String),
}

fn classify(line: &[u8]) -> Option<Frame> {
    let message: Value = serde_json::from_slice(line).ok()?;
    let message = message.as_object()?;
    let id = message.get("id").map(Value::to_string);
    match (message.get("method").and_then(Value::as_str), id) {
        (Some("notifications/cancelled"), None) => message
            .get("params")?
            .get("requestId")
            .map(|id| Frame::Cancelled(id.to_string())),
        (Some(_), Some(id)) => Some(Frame::Request(id)),
        (None, Some(id)) => Some(Frame::Response(id)),
        _ => None,
    }
}

/// Reassembles newline-delimited messages from arbitrary chunks.
#[derive(Debug, Default)]
struct LineBuffer {
    partial: Vec<u8>,
}

impl LineBuffer {
    fn feed(&mut self, mut bytes: &[u8], mut on_line: impl FnMut(&[u8])) {
        while let Some(end) = bytes.iter().position(|&b| b == b'\n') {
            if self.partial.is_empty() {
                on_line(&bytes[..end]);
            } else {
                self.partial.extend_from_slice(&bytes[..end]);
                on_line(&self.partial);
                self.partial.clear();
            }
            bytes = &bytes[end + 1..];
        }
        self.partial.extend_from_slice(bytes);
    }
}

enum ReadState {
    Open,
    Draining(Pin<Box<dyn Future<Output = ()> + Send>>),
    Closed,
}

/// Read half returned by `drain_on_eof`.
pub struct DrainingReader<R> {
    inner: R,
    ledger: Arc<RequestLedger>,
    lines: LineBuffer,
    state: ReadState,
}

impl<R: AsyncRead + Unpin> AsyncRead for DrainingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                ReadState::Closed => return Poll::Ready(Ok(())),
                ReadState::Draining(drained) => {
                    ready!(drained.as_mut().poll(cx));
                    tracing::debug!("pending calls answered, closing input");
                    this.state = ReadState::Closed;
                }
                ReadState::Open => {
                    if buf.remaining() == 0 {
                        return Poll::Ready(Ok(()));
                    }
                    let before = buf.filled().len();
                    ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
                    let fresh = &buf.filled()[before..];
                    if !fresh.is_empty() {
                        let ledger = &this.ledger;
                        this.lines.feed(fresh, |line| ledger.inbound(line));
                        return Poll::Ready(Ok(()));
                    }

                    let pending = this.ledger.pending();
                    if pending > 0 {
                        tracing::info!(pending, "input closed, waiting for pending calls");
                    }
                    let ledger = this.ledger.clone();
                    this.state = ReadState::Draining(Box::pin(async move {
                        ledger.drained().await;
                    }));
                }
            }
        }
    }
}

/// Write half returned by `drain_on_eof`.
pub struct RecordingWriter<W> {
    inner: W,
    ledger: Arc<RequestLedger>,
    lines: LineBuffer,
}

impl<W: AsyncWrite + Unpin> AsyncWrite for RecordingWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let written = ready!(Pin::new(&mut this.inner).poll_write(cx, buf))?;
        let ledger = &this.ledger;
        this.lines.feed(&buf[..written], |line| ledger.outbound(line));
        Poll::Ready(Ok(written))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
