use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use rpclink_proto::{Message, Notification, Request, ResponseError};
use rpclink_transport::PipeTransport;
use serde_json::Value;

use crate::dispatch;
use crate::error::{EndpointError, Result};
use crate::pending::{PendingCalls, Reply};

/// Default per-call deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Endpoint behavior configuration.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Deadline applied by [`Endpoint::call`]. Per call, wall-clock
    /// relative; [`Endpoint::call_with_timeout`] overrides it.
    pub call_timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Hook invoked for inbound requests and notifications from the peer.
pub type InboundHandler = dyn Fn(Message) + Send + Sync;

/// Thread-safe JSON-RPC client endpoint.
///
/// Cheap to clone; all clones share the transport, the correlation
/// table, and the dispatch worker.
pub struct Endpoint<R, W> {
    shared: Arc<Shared<R, W>>,
}

impl<R, W> Clone for Endpoint<R, W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

pub(crate) struct Shared<R, W> {
    pub(crate) transport: PipeTransport<R, W>,
    pending: PendingCalls,
    next_id: AtomicU64,
    shutdown: AtomicBool,
    config: EndpointConfig,
    handler: Mutex<Option<Box<InboundHandler>>>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl<R, W> Shared<R, W> {
    /// Route a response to the one caller waiting on its id.
    ///
    /// Unrouted responses (already timed out, or unsolicited) are
    /// dropped without error.
    pub(crate) fn deliver(
        &self,
        id: u64,
        result: Option<Value>,
        error: Option<ResponseError>,
    ) {
        if !self.pending.complete(id, Reply { result, error }) {
            tracing::debug!(id, "dropping unrouted response");
        }
    }

    /// Hand an inbound request or notification to the application hook.
    pub(crate) fn route_inbound(&self, message: Message) {
        match lock(&self.handler).as_ref() {
            Some(handler) => handler(message),
            None => tracing::debug!(?message, "no inbound handler registered, dropping"),
        }
    }
}

impl<R, W> Endpoint<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Wrap a transport with default configuration.
    pub fn new(transport: PipeTransport<R, W>) -> Self {
        Self::with_config(transport, EndpointConfig::default())
    }

    /// Wrap a transport with explicit configuration.
    pub fn with_config(transport: PipeTransport<R, W>, config: EndpointConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                pending: PendingCalls::default(),
                next_id: AtomicU64::new(0),
                shutdown: AtomicBool::new(false),
                config,
                handler: Mutex::new(None),
                dispatch: Mutex::new(None),
            }),
        }
    }

    /// Install the hook for inbound requests and notifications.
    ///
    /// Runs on the dispatch thread; it must not call back into
    /// [`call`](Self::call) or the loop deadlocks on itself.
    pub fn set_inbound_handler(&self, handler: impl Fn(Message) + Send + Sync + 'static) {
        *lock(&self.shared.handler) = Some(Box::new(handler));
    }

    /// Launch the background dispatch loop. Idempotent.
    pub fn start(&self) -> Result<()> {
        let mut slot = lock(&self.shared.dispatch);
        if slot.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("rpclink-dispatch".to_string())
            .spawn(move || dispatch::run(&shared))
            .map_err(EndpointError::Spawn)?;
        *slot = Some(handle);
        Ok(())
    }

    /// Whether the dispatch loop has been started and has not terminated.
    pub fn is_running(&self) -> bool {
        lock(&self.shared.dispatch)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the dispatch loop to terminate.
    pub fn join(&self) {
        let handle = lock(&self.shared.dispatch).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Issue a call with the configured default timeout.
    pub fn call(&self, method: &str, params: Value) -> Result<Option<Value>> {
        self.call_with_timeout(method, params, self.shared.config.call_timeout)
    }

    /// Issue a call and block until its response, the deadline, or shutdown.
    ///
    /// Returns `Ok(None)` when the endpoint is shutting down — whether
    /// the flag was already raised (nothing is sent) or it transitions
    /// while this caller is blocked.
    pub fn call_with_timeout(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Option<Value>> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Ok(None);
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        // Register before sending so a reply racing the send still
        // finds its waiter.
        let rx = self.shared.pending.register(id);

        let request = Message::from(Request::new(id, method, params));
        if let Err(err) = self.shared.transport.send(&request) {
            self.shared.pending.forget(id);
            return Err(err.into());
        }

        match rx.recv_timeout(timeout) {
            Ok(Reply {
                error: Some(error), ..
            }) => Err(error.into()),
            Ok(Reply { result, .. }) => Ok(Some(result.unwrap_or(Value::Null))),
            Err(RecvTimeoutError::Timeout) => {
                self.shared.pending.forget(id);
                Err(EndpointError::Timeout(timeout))
            }
            // stop() dropped the sender out from under us.
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    /// Send a fire-and-forget notification. No reply is expected or awaited.
    pub fn notify(&self, method: &str, params: Value) -> Result<()> {
        let note = Message::from(Notification::new(method, params));
        self.shared.transport.send(&note)?;
        Ok(())
    }

    /// Best-effort shutdown handshake.
    ///
    /// Sends the `exit` notification without awaiting confirmation,
    /// raises the shutdown flag, and wakes every blocked caller. The
    /// dispatch loop is not guaranteed to have drained when this
    /// returns; shutdown is advisory, not synchronous.
    pub fn stop(&self) {
        let exit = Message::from(Notification::exit());
        if let Err(err) = self.shared.transport.send(&exit) {
            tracing::debug!(error = %err, "exit notification not delivered");
        }
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.pending.abort_all();
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.shared.pending.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Instant;

    use rpclink_frame::{FrameReader, FrameWriter};
    use rpclink_proto::Response;
    use serde_json::json;

    use super::*;

    /// Endpoint wired to an in-process fake server, like a spawned
    /// child's stdin/stdout pair.
    fn endpoint_pair() -> (Endpoint<UnixStream, UnixStream>, UnixStream, UnixStream) {
        let (to_child, child_stdin) = UnixStream::pair().expect("outbound pair should open");
        let (child_stdout, from_child) = UnixStream::pair().expect("inbound pair should open");
        let endpoint = Endpoint::new(PipeTransport::new(child_stdout, to_child));
        (endpoint, child_stdin, from_child)
    }

    #[test]
    fn call_returns_the_correlated_result() {
        let (endpoint, server_in, server_out) = endpoint_pair();
        endpoint.start().expect("dispatch loop should start");

        let server = thread::spawn(move || {
            let mut reader = FrameReader::new(server_in);
            let mut writer = FrameWriter::new(server_out);
            let message = reader
                .read_message()
                .expect("request should decode")
                .expect("request should be present");
            let request = match message {
                Message::Request(request) => request,
                other => panic!("expected request, got {other:?}"),
            };
            assert_eq!(request.method, "ping");
            writer
                .write_message(&Message::from(Response::ok(request.id, json!("pong"))))
                .expect("response should send");
        });

        let result = endpoint
            .call("ping", json!({}))
            .expect("call should succeed");
        assert_eq!(result, Some(json!("pong")));
        assert_eq!(endpoint.pending_len(), 0);

        server.join().expect("server thread should finish");
    }

    #[test]
    fn remote_error_surfaces_code_message_data() {
        let (endpoint, server_in, server_out) = endpoint_pair();
        endpoint.start().expect("dispatch loop should start");

        let server = thread::spawn(move || {
            let mut reader = FrameReader::new(server_in);
            let mut writer = FrameWriter::new(server_out);
            let message = reader
                .read_message()
                .expect("request should decode")
                .expect("request should be present");
            let id = match message {
                Message::Request(request) => request.id,
                other => panic!("expected request, got {other:?}"),
            };
            let mut error = ResponseError::new(-32601, "method not found");
            error.data = Some(json!({"method": "bogus"}));
            writer
                .write_message(&Message::from(Response::err(id, error)))
                .expect("error response should send");
        });

        let err = endpoint.call("bogus", json!(null)).unwrap_err();
        match err {
            EndpointError::Remote {
                code,
                message,
                data,
            } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "method not found");
                assert_eq!(data, Some(json!({"method": "bogus"})));
            }
            other => panic!("expected remote error, got {other:?}"),
        }

        server.join().expect("server thread should finish");
    }

    #[test]
    fn timeout_removes_the_stale_entry() {
        let (endpoint, _server_in, _server_out) = endpoint_pair();
        endpoint.start().expect("dispatch loop should start");

        let err = endpoint
            .call_with_timeout("slow", json!({}), Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, EndpointError::Timeout(_)));
        assert_eq!(endpoint.pending_len(), 0);
    }

    #[test]
    fn stopped_endpoint_rejects_new_calls_without_sending() {
        let (endpoint, server_in, _server_out) = endpoint_pair();
        endpoint.stop();

        let started = Instant::now();
        let result = endpoint
            .call_with_timeout("ping", json!({}), Duration::from_secs(5))
            .expect("shutdown should not be an error");
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_millis(500));

        // Only the exit notification crossed the wire.
        let mut reader = FrameReader::new(server_in);
        let message = reader
            .read_message()
            .expect("exit should decode")
            .expect("exit should be present");
        match message {
            Message::Notification(note) => assert!(note.is_exit()),
            other => panic!("expected exit notification, got {other:?}"),
        }
        drop(endpoint);
        assert!(reader.read_message().expect("stream should close").is_none());
    }

    #[test]
    fn stop_wakes_a_blocked_caller() {
        let (endpoint, _server_in, _server_out) = endpoint_pair();
        endpoint.start().expect("dispatch loop should start");

        let caller = {
            let endpoint = endpoint.clone();
            thread::spawn(move || {
                endpoint.call_with_timeout("hang", json!({}), Duration::from_secs(30))
            })
        };
        thread::sleep(Duration::from_millis(100));

        let started = Instant::now();
        endpoint.stop();

        let result = caller
            .join()
            .expect("caller thread should finish")
            .expect("shutdown should not be an error");
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn notify_carries_no_id() {
        let (endpoint, server_in, _server_out) = endpoint_pair();

        endpoint
            .notify("progress", json!({"pct": 99}))
            .expect("notification should send");

        let mut reader = FrameReader::new(server_in);
        let message = reader
            .read_message()
            .expect("notification should decode")
            .expect("notification should be present");
        assert_eq!(
            message,
            Message::from(Notification::new("progress", json!({"pct": 99})))
        );
        assert_eq!(endpoint.pending_len(), 0);
    }

    #[test]
    fn start_is_idempotent() {
        let (endpoint, _server_in, _server_out) = endpoint_pair();
        endpoint.start().expect("first start should succeed");
        endpoint.start().expect("second start should be a no-op");
        assert!(endpoint.is_running());
    }

    #[test]
    fn inbound_notification_reaches_the_hook() {
        let (endpoint, _server_in, server_out) = endpoint_pair();
        let (tx, rx) = std::sync::mpsc::channel();
        endpoint.set_inbound_handler(move |message| {
            tx.send(message).expect("test channel should accept");
        });
        endpoint.start().expect("dispatch loop should start");

        FrameWriter::new(server_out)
            .write_message(&Message::from(Notification::new("log", json!("hello"))))
            .expect("server should send notification");

        let seen = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("hook should fire");
        assert_eq!(seen, Message::from(Notification::new("log", json!("hello"))));
    }
}
