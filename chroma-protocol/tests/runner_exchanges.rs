//! Integration tests for the command runner against an in-memory transport.
//!
//! The mock transport echoes request frames back as responses (checksum and
//! descriptor fields included), so the full send → receive → validate path
//! runs without hardware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use chroma_protocol::{
    compute_checksum, Argument, ChecksumKind, Command, CommandError, CommandRunner, FrameConfig,
    ProtocolError, RunnerOptions, Transport, TransportError,
};

const SET_LED_BRIGHTNESS: Command = Command::new(0x03, 0x03, 0x03);

type Responder = Box<dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync>;

/// Mock transport: records every frame whole, and hands back whatever the
/// responder produces for it on the next `receive`.
struct MockTransport {
    sent: Mutex<Vec<(Instant, Vec<u8>)>>,
    pending: Mutex<Option<Vec<u8>>>,
    responder: Responder,
    overlap_violations: AtomicUsize,
}

impl MockTransport {
    fn new(responder: Responder) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            responder,
            overlap_violations: AtomicUsize::new(0),
        })
    }

    /// Echo the request frame verbatim, like a well-behaved device.
    fn echoing() -> Arc<Self> {
        Self::new(Box::new(|frame| Some(frame.to_vec())))
    }

    fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.sent.lock().iter().map(|(_, f)| f.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, report: &[u8]) -> Result<(), TransportError> {
        // A send while the previous exchange's response is still unread
        // means two callers interleaved their frames.
        if self.pending.lock().is_some() {
            self.overlap_violations.fetch_add(1, Ordering::SeqCst);
        }
        self.sent.lock().push((Instant::now(), report.to_vec()));
        *self.pending.lock() = (self.responder)(report);
        Ok(())
    }

    async fn receive(&self, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        self.pending.lock().take().ok_or(TransportError::Timeout)
    }
}

fn runner(transport: Arc<MockTransport>) -> CommandRunner {
    CommandRunner::new(transport, FrameConfig::default(), RunnerOptions::default())
}

#[tokio::test]
async fn result_bearing_command_round_trips() {
    let transport = MockTransport::echoing();
    let runner = runner(Arc::clone(&transport));

    let result = runner
        .run_with_result(
            &SET_LED_BRIGHTNESS,
            &[Argument::Byte(0x01), Argument::Byte(0x05), Argument::Byte(0xC8)],
        )
        .await
        .unwrap();

    assert_eq!(result, vec![0x01, 0x05, 0xC8]);
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0][5], 0x03);
    assert_eq!(frames[0][6], 0x03);
}

#[tokio::test]
async fn corrupted_response_checksum_is_a_protocol_error() {
    let transport = MockTransport::new(Box::new(|frame| {
        let mut resp = frame.to_vec();
        let last = resp.len() - 1;
        resp[last] ^= 0xFF;
        Some(resp)
    }));
    let runner = runner(transport);

    let err = runner
        .run_with_result(&SET_LED_BRIGHTNESS, &[Argument::Byte(0x01)])
        .await
        .unwrap_err();

    match err {
        CommandError::Protocol { command, source } => {
            assert_eq!(command, SET_LED_BRIGHTNESS);
            assert!(matches!(source, ProtocolError::ChecksumMismatch { .. }));
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_command_echo_is_a_protocol_error() {
    // Device answers with a different command id but a valid checksum.
    let transport = MockTransport::new(Box::new(|frame| {
        let mut resp = frame.to_vec();
        resp[6] ^= 0x80;
        let last = resp.len() - 1;
        resp[last] = compute_checksum(&resp, ChecksumKind::Xor);
        Some(resp)
    }));
    let runner = runner(transport);

    let err = runner
        .run_with_result(&SET_LED_BRIGHTNESS, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Protocol {
            source: ProtocolError::EchoMismatch {
                field: "command id",
                ..
            },
            ..
        }
    ));
}

#[tokio::test]
async fn missing_response_surfaces_as_transport_timeout() {
    let transport = MockTransport::new(Box::new(|_| None));
    let runner = runner(transport);

    let err = runner
        .run_with_result(&SET_LED_BRIGHTNESS, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Transport {
            source: TransportError::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn fire_and_forget_reads_nothing() {
    let transport = MockTransport::echoing();
    let runner = runner(Arc::clone(&transport));

    runner
        .run_command(&SET_LED_BRIGHTNESS, &[Argument::Byte(0)])
        .await
        .unwrap();

    // The echoed response was produced but never consumed
    assert!(transport.pending.lock().is_some());
    assert_eq!(transport.sent_frames().len(), 1);
}

#[tokio::test]
async fn transaction_id_override_is_used_and_validated() {
    let transport = MockTransport::echoing();
    let runner = runner(Arc::clone(&transport));

    runner
        .run_with_result_with(
            &SET_LED_BRIGHTNESS,
            &[],
            chroma_protocol::PackFormat::BYTE,
            Some(0x3F),
        )
        .await
        .unwrap();
    assert_eq!(transport.sent_frames()[0][0], 0x3F);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_are_serialized() {
    let transport = MockTransport::echoing();
    let runner = Arc::new(runner(Arc::clone(&transport)));

    let mut handles = Vec::new();
    for task in 0u8..8 {
        let runner = Arc::clone(&runner);
        handles.push(tokio::spawn(async move {
            for i in 0u8..16 {
                let marker = task.wrapping_mul(16).wrapping_add(i);
                let resp = runner
                    .run_with_result(&SET_LED_BRIGHTNESS, &[Argument::Byte(marker)])
                    .await
                    .unwrap();
                // Each caller must get its own echo back, never a frame
                // belonging to a concurrent exchange.
                assert_eq!(resp, vec![marker]);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(transport.sent_frames().len(), 8 * 16);
    assert_eq!(
        transport.overlap_violations.load(Ordering::SeqCst),
        0,
        "observed interleaved exchanges"
    );
}

#[tokio::test]
async fn pacing_gap_is_enforced_between_sends() {
    let transport = MockTransport::echoing();
    let options = RunnerOptions {
        min_command_gap: Some(Duration::from_millis(30)),
        ..RunnerOptions::default()
    };
    let runner = CommandRunner::new(
        Arc::clone(&transport) as Arc<dyn Transport>,
        FrameConfig::default(),
        options,
    );

    for _ in 0..3 {
        runner
            .run_with_result(&SET_LED_BRIGHTNESS, &[])
            .await
            .unwrap();
    }

    let sent = transport.sent.lock();
    assert_eq!(sent.len(), 3);
    for pair in sent.windows(2) {
        let gap = pair[1].0.duration_since(pair[0].0);
        assert!(
            gap >= Duration::from_millis(25),
            "inter-command gap too small: {gap:?}"
        );
    }
}

#[tokio::test]
async fn oversized_arguments_fail_before_any_io() {
    let transport = MockTransport::echoing();
    let runner = runner(Arc::clone(&transport));

    let big = vec![0u8; FrameConfig::default().arg_capacity() + 1];
    let err = runner
        .run_command(&SET_LED_BRIGHTNESS, &[Argument::Bytes(big)])
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Encode { .. }));
    assert!(transport.sent_frames().is_empty());
}
