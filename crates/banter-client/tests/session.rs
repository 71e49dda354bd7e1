//! Session behavior against a scripted transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use banter_client::{ClientConfig, ClientError, ConnectionState, Session};
use banter_protocol::{ChatEvent, EventKind};
use banter_transport::{Connection, Connector, Incoming, TransportError};
use tokio::sync::mpsc;
use tokio::time::Instant;

// ── Mock transport ──────────────────────────────────────────────────

/// Test-side handle to one scripted link.
struct LinkHandle {
    incoming: Mutex<Option<mpsc::UnboundedSender<Incoming>>>,
    sent: Arc<Mutex<Vec<ChatEvent>>>,
}

impl LinkHandle {
    /// Deliver one broadcast frame to the client.
    fn push_event(&self, event: ChatEvent) {
        let guard = self.incoming.lock().unwrap();
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(Incoming::Event(event));
        }
    }

    /// Simulate the server dropping the link.
    fn drop_server(&self) {
        self.incoming.lock().unwrap().take();
    }

    /// Frames the client sent over this link.
    fn sent_events(&self) -> Vec<ChatEvent> {
        self.sent.lock().unwrap().clone()
    }
}

struct PreparedLink {
    rx: mpsc::UnboundedReceiver<Incoming>,
    sent: Arc<Mutex<Vec<ChatEvent>>>,
}

/// A connector that hands out pre-scripted links in order and fails the
/// handshake once the script runs dry.
struct MockConnector {
    links: Mutex<VecDeque<PreparedLink>>,
    attempts: AtomicUsize,
    attempt_times: Mutex<Vec<Instant>>,
}

impl MockConnector {
    fn new() -> Self {
        Self {
            links: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            attempt_times: Mutex::new(Vec::new()),
        }
    }

    /// Script one successful link; returns the test-side handle.
    fn push_link(&self) -> LinkHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));

        self.links.lock().unwrap().push_back(PreparedLink {
            rx,
            sent: Arc::clone(&sent),
        });

        LinkHandle {
            incoming: Mutex::new(Some(tx)),
            sent,
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Connection>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.attempt_times.lock().unwrap().push(Instant::now());

        match self.links.lock().unwrap().pop_front() {
            Some(link) => Ok(Box::new(MockConnection {
                rx: link.rx,
                sent: link.sent,
                open: true,
            })),
            None => Err(TransportError::Handshake("no scripted link".into())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockConnection {
    rx: mpsc::UnboundedReceiver<Incoming>,
    sent: Arc<Mutex<Vec<ChatEvent>>>,
    open: bool,
}

#[async_trait]
impl Connection for MockConnection {
    async fn recv(&mut self) -> Result<Option<Incoming>, TransportError> {
        match self.rx.recv().await {
            Some(item) => Ok(Some(item)),
            // Sender dropped: the server went away
            None => {
                self.open = false;
                Ok(None)
            }
        }
    }

    async fn send(&mut self, event: &ChatEvent) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::ConnectionClosed);
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::ConnectionClosed);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn test_config() -> ClientConfig {
    ClientConfig {
        endpoint: "ws://test.invalid/ws".to_string(),
        ..ClientConfig::default()
    }
}

/// Config with the heartbeat watchdog pushed out of the way, for
/// paused-clock tests where idle time auto-advances.
fn quiet_heartbeat_config() -> ClientConfig {
    let mut config = test_config();
    config.heartbeat.interval_ms = 3_600_000;
    config.heartbeat.timeout_ms = 7_200_000;
    config
}

/// Poll until `cond` holds, yielding to the runtime between checks.
async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// ── Join ────────────────────────────────────────────────────────────

#[tokio::test]
async fn join_rejects_bad_usernames_without_connecting() {
    let connector = Arc::new(MockConnector::new());
    let session = Session::new(test_config(), connector.clone());

    let too_long = "x".repeat(21);
    for name in ["", "a", too_long.as_str(), "bad!name"] {
        let err = session.join(name).await.unwrap_err();
        assert!(
            matches!(err, ClientError::Validation(_)),
            "{name:?} should fail validation"
        );
    }

    // Validation short-circuits before any transport attempt
    assert_eq!(connector.attempts(), 0);
    assert_eq!(session.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn join_connects_and_announces() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    session.join("alice").await.unwrap();

    assert!(session.is_connected());
    // The acting user's own join is the one optimistic roster insertion
    assert_eq!(session.users(), vec!["alice"]);

    wait_until(|| link.sent_events().len() == 1).await;
    let sent = link.sent_events();
    assert_eq!(sent[0].kind, EventKind::Join);
    assert_eq!(sent[0].sender, "alice");
    assert!(sent[0].content.is_empty());
}

#[tokio::test]
async fn duplicate_join_broadcasts_are_absorbed() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    session.join("alice").await.unwrap();

    link.push_event(ChatEvent::join("bob"));
    link.push_event(ChatEvent::join("bob"));
    link.push_event(ChatEvent::join("bob"));
    wait_until(|| session.messages().len() == 3).await;

    assert_eq!(session.users(), vec!["alice", "bob"]);
}

// ── Send ────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_message_validates_and_requires_connection() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    // Invalid content fails without a connection ever existing
    assert!(matches!(
        session.send_message("", "alice"),
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        session.send_message(&"y".repeat(1001), "alice"),
        Err(ClientError::Validation(_))
    ));

    // Valid content while disconnected is an explicit failure
    assert!(matches!(
        session.send_message("hello", "alice"),
        Err(ClientError::NotConnected)
    ));

    session.join("alice").await.unwrap();
    session.send_message("  hi there  ", "alice").unwrap();

    wait_until(|| link.sent_events().len() == 2).await;
    let sent = link.sent_events();
    assert_eq!(sent[1].kind, EventKind::Chat);
    assert_eq!(sent[1].sender, "alice");
    assert_eq!(sent[1].content, "hi there");
    assert!(sent[1].timestamp > 0);
}

// ── Leave ───────────────────────────────────────────────────────────

#[tokio::test]
async fn leave_announces_once_and_is_idempotent() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    session.join("alice").await.unwrap();
    session.leave("alice").await;

    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(session.users().is_empty());

    let leaves = |events: &[ChatEvent]| {
        events
            .iter()
            .filter(|e| e.kind == EventKind::Leave)
            .count()
    };
    assert_eq!(leaves(&link.sent_events()), 1);

    // Leaving again emits nothing and stays disconnected
    session.leave("alice").await;
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(leaves(&link.sent_events()), 1);
}

// ── Inbound ordering and presence ───────────────────────────────────

#[tokio::test]
async fn inbound_events_keep_arrival_order() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    session.join("A").await.unwrap();

    link.push_event(ChatEvent::join("A"));
    link.push_event(ChatEvent::chat("A", "hi"));
    link.push_event(ChatEvent::leave("A"));
    wait_until(|| session.messages().len() == 3).await;

    let messages = session.messages();
    assert_eq!(messages[0].kind, EventKind::Join);
    assert_eq!(messages[1].kind, EventKind::Chat);
    assert_eq!(messages[1].content, "hi");
    assert_eq!(messages[2].kind, EventKind::Leave);
    assert!(messages.iter().all(|m| m.sender == "A"));

    // The broadcast Leave removed A even though A is this session's user
    assert!(session.users().is_empty());
    assert!(session.is_connected());
}

#[tokio::test]
async fn end_to_end_join_echo_and_leave() {
    let connector = Arc::new(MockConnector::new());
    let link = connector.push_link();
    let session = Session::new(test_config(), connector.clone());

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let _sub = session.on_status_change(move |connected| {
        sink.lock().unwrap().push(connected);
    });

    session.join("alice").await.unwrap();
    link.push_event(ChatEvent::join("alice"));
    wait_until(|| !session.messages().is_empty()).await;

    assert_eq!(session.users(), vec!["alice"]);
    assert!(session.is_connected());

    session.leave("alice").await;
    assert!(session.users().is_empty());
    assert!(!session.is_connected());

    let seen = statuses.lock().unwrap().clone();
    assert!(seen.contains(&true));
    assert_eq!(seen.last(), Some(&false));
}

// ── Reconnect ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reconnects_no_earlier_than_the_configured_delay() {
    let connector = Arc::new(MockConnector::new());
    let link1 = connector.push_link();
    let _link2 = connector.push_link();
    let session = Session::new(quiet_heartbeat_config(), connector.clone());

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let _sub = session.on_status_change(move |connected| {
        sink.lock().unwrap().push(connected);
    });

    session.join("alice").await.unwrap();
    link1.push_event(ChatEvent::join("alice"));
    wait_until(|| session.users() == vec!["alice"]).await;

    let lost_at = Instant::now();
    link1.drop_server();

    // Status drops and the roster clears well before the retry delay
    wait_until(|| !session.is_connected()).await;
    assert!(Instant::now() - lost_at < Duration::from_millis(5_000));
    assert!(session.users().is_empty());
    assert_eq!(statuses.lock().unwrap().last(), Some(&false));

    // The new attempt is scheduled no earlier than the fixed delay
    wait_until(|| connector.attempts() == 2).await;
    let attempts = connector.attempt_times();
    assert!(attempts[1] - lost_at >= Duration::from_millis(5_000));

    wait_until(|| session.is_connected()).await;
}

#[tokio::test(start_paused = true)]
async fn failed_handshake_schedules_retries_until_leave() {
    let connector = Arc::new(MockConnector::new()); // no scripted links
    let session = Session::new(quiet_heartbeat_config(), connector.clone());

    let err = session.join("alice").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(session.state(), ConnectionState::Failed);
    assert_eq!(connector.attempts(), 1);

    // Failed is not terminal: a retry fires after the fixed delay
    wait_until(|| connector.attempts() >= 2).await;

    // Leaving cancels the pending retry timer
    session.leave("alice").await;
    assert_eq!(session.state(), ConnectionState::Disconnected);

    let frozen = connector.attempts();
    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(connector.attempts(), frozen);
}

#[tokio::test(start_paused = true)]
async fn retry_ceiling_caps_reconnect_attempts() {
    let connector = Arc::new(MockConnector::new()); // no scripted links
    let mut config = quiet_heartbeat_config();
    config.reconnect.max_attempts = Some(2);
    let session = Session::new(config, connector.clone());

    let err = session.join("alice").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));

    wait_until(|| session.state() == ConnectionState::Disconnected).await;
    assert_eq!(connector.attempts(), 2);

    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(connector.attempts(), 2);
}
