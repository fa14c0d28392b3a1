//! Sync engine: request, checksum gate, row streaming, retries
//!
//! The engine owns one row buffer per plane and never holds more than a
//! single row of image data. Rows go to the [`DisplaySink`] as soon as
//! they are complete; the panel is refreshed once, after the last row.

use embedded_hal_async::delay::DelayNs;
use wakeframe_protocol::{
    check_magic, Checksum, MAX_CHECKSUM_LEN, MAX_PLANES, STATUS_NOT_MODIFIED, STATUS_OK,
};

use super::outcome::{FailureReason, TransferOutcome};
use super::policy::RetryPolicy;
use super::request::FrameRequest;
use super::state::{SyncEvent, SyncState};
use crate::http::{self, MAX_HEADER_LINE};
use crate::state::StoredChecksum;
use crate::traits::{Connector, DisplaySink, Liveness};
use crate::transport::{self, ChunkedReader, ReadTimeouts};

/// Counters from the last [`SyncEngine::synchronize`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncStats {
    /// Attempts made, the first one included
    pub attempts: u8,
    /// Status code of the last response head
    pub last_status: Option<u16>,
    /// Rows handed to the sink in the last attempt
    pub rows_painted: u16,
    /// Body bytes read in the last attempt, header lines included
    pub body_bytes: usize,
    /// Row bytes expected for the requested region
    pub expected_bytes: usize,
}

enum Attempt {
    Unchanged,
    Painted(Checksum),
    Failed(FailureReason),
}

/// Image sync engine
///
/// `ROW` is the row buffer size in bytes and bounds the widest region
/// that can be requested (`ROW * 8` pixels).
pub struct SyncEngine<C, L, D, S, const ROW: usize> {
    connector: C,
    liveness: L,
    delay: D,
    sink: S,
    policy: RetryPolicy,
    timeouts: ReadTimeouts,
    stored: StoredChecksum,
    rows: [[u8; ROW]; MAX_PLANES],
    state: SyncState,
    stats: SyncStats,
}

impl<C, L, D, S, const ROW: usize> SyncEngine<C, L, D, S, ROW>
where
    C: Connector,
    L: Liveness,
    D: DelayNs,
    S: DisplaySink,
{
    /// Create an engine starting from the checksum stored last cycle
    pub fn new(connector: C, liveness: L, delay: D, sink: S, stored: StoredChecksum) -> Self {
        Self {
            connector,
            liveness,
            delay,
            sink,
            policy: RetryPolicy::new(),
            timeouts: ReadTimeouts::default(),
            stored,
            rows: [[0; ROW]; MAX_PLANES],
            state: SyncState::Idle,
            stats: SyncStats::default(),
        }
    }

    /// Replace the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the read timeouts
    pub fn with_timeouts(mut self, timeouts: ReadTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Checksum of the image on the panel, as far as the engine knows
    pub fn stored_checksum(&self) -> &StoredChecksum {
        &self.stored
    }

    /// Current state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Counters from the last sync
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Access the connector
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Take the collaborators back, with the checksum to persist
    pub fn into_parts(self) -> (C, L, D, S, StoredChecksum) {
        (self.connector, self.liveness, self.delay, self.sink, self.stored)
    }

    /// Bring the panel in line with the server's current image
    pub async fn synchronize(&mut self, request: &FrameRequest) -> TransferOutcome {
        self.stats = SyncStats {
            expected_bytes: request.geometry.frame_bytes(),
            ..SyncStats::default()
        };
        self.state = SyncState::Idle;

        if request.row_bytes() > ROW || request.width() == 0 || request.height() == 0 {
            self.state = self.state.transition(SyncEvent::Fault(FailureReason::InvalidRequest));
            return TransferOutcome::Failed(FailureReason::InvalidRequest);
        }

        let get = match request
            .target()
            .ok()
            .and_then(|target| http::build_get(self.connector.host(), &target).ok())
        {
            Some(get) => get,
            None => {
                self.state = self.state.transition(SyncEvent::Fault(FailureReason::InvalidRequest));
                return TransferOutcome::Failed(FailureReason::InvalidRequest);
            }
        };

        let mut last = FailureReason::Connection;
        for attempt in 1..=self.policy.attempts() {
            if attempt > 1 {
                transport::pause(&mut self.liveness, &mut self.delay, self.policy.retry_delay_ms)
                    .await;
            }
            self.stats.attempts = attempt;

            match self.attempt(request, get.as_bytes()).await {
                Attempt::Unchanged => return TransferOutcome::Unchanged,
                Attempt::Painted(checksum) => return self.commit(checksum).await,
                Attempt::Failed(reason) => {
                    self.state = self.state.transition(SyncEvent::Fault(reason));
                    last = reason;
                    if !self.policy.should_retry(reason) {
                        break;
                    }
                }
            }
        }

        self.give_up(last)
    }

    async fn attempt(&mut self, request: &FrameRequest, get: &[u8]) -> Attempt {
        let Self {
            connector,
            liveness,
            delay,
            sink,
            policy,
            timeouts,
            stored,
            rows,
            state,
            stats,
        } = self;

        stats.rows_painted = 0;
        stats.body_bytes = 0;
        liveness.tick().await;
        let stream = match connector.open(get).await {
            Ok(stream) => stream,
            Err(_) => return Attempt::Failed(FailureReason::Connection),
        };
        *state = state.transition(SyncEvent::RequestIssued);

        let mut reader = ChunkedReader::new(stream, liveness, delay, *timeouts);

        let head = match http::read_response_head(&mut reader).await {
            Ok(head) => head,
            Err(_) => {
                reader.abort();
                return Attempt::Failed(FailureReason::Connection);
            }
        };
        stats.last_status = Some(head.status);

        if head.status == STATUS_NOT_MODIFIED && policy.honor_not_modified {
            reader.abort();
            *state = state.transition(SyncEvent::NotModified);
            return Attempt::Unchanged;
        }
        if head.status != STATUS_OK {
            reader.abort();
            return Attempt::Failed(FailureReason::Status(head.status));
        }

        let body_start = reader.consumed();

        let magic = reader.read_line_until::<MAX_HEADER_LINE>(b'\n').await;
        if magic.capped {
            // no line break anywhere near the start: not our format
            reader.abort();
            return Attempt::Failed(FailureReason::MalformedHeader);
        }
        if !magic.terminated {
            reader.abort();
            return Attempt::Failed(FailureReason::Connection);
        }
        if check_magic(&magic.bytes).is_err() {
            reader.abort();
            return Attempt::Failed(FailureReason::MalformedHeader);
        }

        let line = reader.read_line_until::<MAX_CHECKSUM_LEN>(b'\n').await;
        if !line.terminated {
            reader.abort();
            return Attempt::Failed(FailureReason::Connection);
        }
        let incoming = Checksum::from_bytes(&line.bytes);
        *state = state.transition(SyncEvent::HeaderAccepted);

        if stored.matches(&incoming) {
            reader.abort();
            *state = state.transition(SyncEvent::ChecksumMatched);
            return Attempt::Unchanged;
        }
        *state = state.transition(SyncEvent::ChecksumChanged);

        let header_len = reader.consumed() - body_start;
        let row_bytes = request.row_bytes();
        let planes = request.planes().count();
        let mut row_data = 0usize;

        for row in 0..request.height() {
            reader.tick().await;

            for plane in rows.iter_mut().take(planes) {
                let buf = &mut plane[..row_bytes];
                let got = reader.read_exact(buf).await;
                row_data += got;
                if got < row_bytes {
                    stats.body_bytes = header_len + row_data;
                    reader.abort();
                    return Attempt::Failed(FailureReason::ShortRead);
                }
            }

            let views = [&rows[0][..row_bytes], &rows[1][..row_bytes]];
            let y = request.y.saturating_add(row);
            if sink
                .paint_row(&views[..planes], request.x, y, request.width())
                .await
                .is_err()
            {
                reader.abort();
                return Attempt::Failed(FailureReason::Display);
            }
            stats.rows_painted += 1;
        }

        let body_len = header_len + row_data;
        stats.body_bytes = body_len;

        let complete = match head.content_length {
            Some(declared) => declared == body_len,
            None => row_data == request.geometry.frame_bytes(),
        };
        if !complete {
            reader.abort();
            return Attempt::Failed(FailureReason::ByteCountMismatch);
        }

        Attempt::Painted(incoming)
    }

    async fn commit(&mut self, checksum: Checksum) -> TransferOutcome {
        self.liveness.tick().await;
        match self.sink.commit_frame().await {
            Ok(()) => {
                self.stored.set(checksum);
                self.state = self.state.transition(SyncEvent::FrameCommitted);
                TransferOutcome::Updated
            }
            Err(_) => {
                self.state = self.state.transition(SyncEvent::Fault(FailureReason::Display));
                self.give_up(FailureReason::Display)
            }
        }
    }

    fn give_up(&mut self, reason: FailureReason) -> TransferOutcome {
        if self.policy.clear_on_failure {
            self.stored.clear();
        }
        TransferOutcome::Failed(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        frame_body, frame_response, patterned_rows, response, CountingLiveness, RecordingDelay,
        RecordingSink, Reply, ScriptedConnector,
    };
    use embassy_futures::block_on;
    use proptest::prelude::*;
    use std::vec;
    use std::vec::Vec;
    use wakeframe_protocol::PlaneCount;

    const ROW: usize = 100;

    type Engine<'a> = SyncEngine<
        ScriptedConnector,
        &'a mut CountingLiveness,
        &'a mut RecordingDelay,
        &'a mut RecordingSink,
        ROW,
    >;

    #[derive(Default)]
    struct Rig {
        liveness: CountingLiveness,
        delay: RecordingDelay,
        sink: RecordingSink,
    }

    impl Rig {
        fn engine(&mut self, replies: Vec<Reply>, stored: StoredChecksum) -> Engine<'_> {
            self.engine_with(ScriptedConnector::new(replies), stored)
        }

        fn engine_with(
            &mut self,
            connector: ScriptedConnector,
            stored: StoredChecksum,
        ) -> Engine<'_> {
            SyncEngine::new(
                connector,
                &mut self.liveness,
                &mut self.delay,
                &mut self.sink,
                stored,
            )
            .with_timeouts(ReadTimeouts::new(50, 10))
        }
    }

    fn known(checksum: &str) -> StoredChecksum {
        StoredChecksum::Known(Checksum::from_bytes(checksum.as_bytes()))
    }

    fn mono(width: u16, height: u16) -> FrameRequest {
        FrameRequest::new("/bitmap", "AA:BB:CC:DD:EE:FF", 0, 0, width, height, PlaneCount::Mono)
            .unwrap()
    }

    #[test]
    fn test_checksum_match_paints_nothing() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(frame_response("abc", &rows))];
        let mut engine = rig.engine(replies, known("abc"));

        let outcome = block_on(engine.synchronize(&mono(16, 4)));
        assert_eq!(outcome, TransferOutcome::Unchanged);
        assert_eq!(engine.stored_checksum(), &known("abc"));
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.stats().attempts, 1);

        assert_eq!(engine.connector().opened, 1);
        assert_eq!(engine.connector().aborts, 1);

        assert!(rig.sink.rows.is_empty());
        assert_eq!(rig.sink.commits, 0);
    }

    #[test]
    fn test_not_modified_is_unchanged() {
        let mut rig = Rig::default();
        let mut engine = rig.engine(vec![Reply::Respond(response(304, None, b""))], known("abc"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Unchanged);
        assert_eq!(engine.stored_checksum(), &known("abc"));

        assert_eq!(engine.connector().opened, 1);
        assert!(rig.sink.rows.is_empty());
    }

    #[test]
    fn test_not_modified_ignored_when_disabled() {
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 2,
            honor_not_modified: false,
            ..RetryPolicy::new()
        };
        let replies = vec![Reply::Respond(response(304, None, b""))];
        let mut engine = rig.engine(replies, known("abc")).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::Status(304))
        );
    }

    #[test]
    fn test_update_paints_rows_in_order_then_commits() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        let request =
            FrameRequest::new("/bitmap", "id", 8, 16, 16, 4, PlaneCount::Mono).unwrap();
        let replies = vec![Reply::Respond(frame_response("new", &rows))];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(block_on(engine.synchronize(&request)), TransferOutcome::Updated);
        assert_eq!(engine.stored_checksum(), &known("new"));
        assert_eq!(engine.state(), SyncState::Committed);
        assert_eq!(engine.stats().rows_painted, 4);
        assert_eq!(engine.stats().body_bytes, 3 + 4 + 8);
        assert!(engine.connector().requests[0].starts_with("GET /bitmap?mac=id HTTP/1.1\r\n"));

        assert_eq!(rig.sink.commits, 1);
        assert_eq!(rig.sink.rows.len(), 4);
        for (i, painted) in rig.sink.rows.iter().enumerate() {
            assert_eq!(painted.x, 8);
            assert_eq!(painted.y, 16 + i as u16);
            assert_eq!(painted.width, 16);
            assert_eq!(painted.planes, vec![vec![i as u8; 2]]);
        }
    }

    #[test]
    fn test_cold_boot_always_downloads() {
        let rows = patterned_rows(1, 2, 1);
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(frame_response("", &rows))];
        let mut engine = rig.engine(replies, StoredChecksum::Undefined);

        // Even an empty checksum must not match an undefined one
        assert_eq!(block_on(engine.synchronize(&mono(8, 2))), TransferOutcome::Updated);
    }

    #[test]
    fn test_two_plane_rows() {
        let rows = patterned_rows(2, 3, 2);
        let mut rig = Rig::default();
        let request = FrameRequest::new("/b", "id", 0, 0, 12, 3, PlaneCount::MonoAccent).unwrap();
        let replies = vec![Reply::Respond(frame_response("c", &rows))];
        let mut engine = rig.engine(replies, StoredChecksum::Undefined);

        assert_eq!(block_on(engine.synchronize(&request)), TransferOutcome::Updated);

        assert_eq!(rig.sink.rows.len(), 3);
        assert_eq!(rig.sink.rows[1].planes, vec![vec![2u8; 2], vec![3u8; 2]]);
    }

    #[test]
    fn test_bad_magic_is_terminal_and_clears() {
        let body = b"<html>\nnope\n".to_vec();
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(response(200, Some(body.len()), &body))];
        let mut engine = rig.engine(replies, known("abc"));

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::MalformedHeader)
        );
        assert_eq!(engine.stored_checksum(), &StoredChecksum::Cleared);
        assert_eq!(
            engine.state(),
            SyncState::Failed(FailureReason::MalformedHeader)
        );

        assert_eq!(engine.connector().opened, 1);
        assert!(rig.sink.rows.is_empty());
        assert_eq!(rig.delay.total_ms, 0);
    }

    #[test]
    fn test_binary_body_without_header_is_malformed() {
        let body = vec![0x00u8; 4096];
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(response(200, Some(body.len()), &body))];
        let mut engine = rig.engine(replies, known("abc"));

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::MalformedHeader)
        );
        assert_eq!(engine.connector().opened, 1);
        assert!(engine.stats().body_bytes < 512);
        assert!(rig.liveness.ticks < 512);
        assert!(rig.sink.rows.is_empty());
    }

    #[test]
    fn test_bad_magic_retried_when_configured() {
        let body = b"MX\nabc\n".to_vec();
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 3,
            retry_on_bad_magic: true,
            ..RetryPolicy::new()
        };
        let replies = vec![Reply::Respond(response(200, None, &body))];
        let mut engine = rig.engine(replies, StoredChecksum::Undefined).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::MalformedHeader)
        );

        assert_eq!(engine.connector().opened, 3);
    }

    #[test]
    fn test_retry_then_success() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        let replies = vec![
            Reply::Refuse,
            Reply::Respond(response(500, None, b"")),
            Reply::Respond(frame_response("new", &rows)),
        ];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Updated);
        assert_eq!(engine.stats().attempts, 3);
        assert_eq!(engine.stats().last_status, Some(200));
        assert_eq!(engine.stored_checksum(), &known("new"));

        assert_eq!(engine.connector().opened, 3);
        assert_eq!(rig.delay.total_ms, 2000);
        assert_eq!(rig.sink.commits, 1);
    }

    #[test]
    fn test_exhausted_retries_clear_checksum() {
        let mut rig = Rig::default();
        let mut engine = rig.engine(vec![Reply::Refuse], known("abc"));

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::Connection)
        );
        assert_eq!(engine.stats().attempts, 5);
        assert_eq!(engine.stored_checksum(), &StoredChecksum::Cleared);

        assert_eq!(engine.connector().opened, 5);
        assert_eq!(rig.delay.total_ms, 4000);
    }

    #[test]
    fn test_exhausted_retries_keep_checksum_when_configured() {
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 2,
            clear_on_failure: false,
            ..RetryPolicy::new()
        };
        let mut engine = rig.engine(vec![Reply::Refuse], known("abc")).with_policy(policy);

        block_on(engine.synchronize(&mono(16, 4)));
        assert_eq!(engine.stored_checksum(), &known("abc"));
    }

    #[test]
    fn test_short_read_fails_and_retries() {
        let rows = patterned_rows(2, 4, 1);
        let full = frame_response("new", &rows);
        // Cut the stream two rows into the body
        let cut = full[..full.len() - 4].to_vec();
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::new()
        };
        let mut engine = rig.engine(vec![Reply::Respond(cut)], known("old")).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::ShortRead)
        );
        assert_eq!(engine.stored_checksum(), &StoredChecksum::Cleared);

        assert_eq!(engine.connector().opened, 2);
        assert_eq!(rig.sink.commits, 0);
        assert_eq!(rig.sink.rows.len(), 4);
    }

    #[test]
    fn test_checksum_kept_until_attempt_succeeds() {
        let rows = patterned_rows(2, 4, 1);
        let full = frame_response("new", &rows);
        let cut = full[..full.len() - 4].to_vec();
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(cut), Reply::Respond(full)];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Updated);
        assert_eq!(engine.stats().attempts, 2);
        assert_eq!(engine.stored_checksum(), &known("new"));

        // two rows from the cut attempt, then the full frame
        assert_eq!(rig.sink.rows.len(), 6);
        assert_eq!(rig.sink.commits, 1);
    }

    #[test]
    fn test_failed_attempt_leaves_checksum_alone() {
        let rows = patterned_rows(2, 4, 1);
        let cut_new = frame_response("new", &rows);
        let cut_new = cut_new[..cut_new.len() - 4].to_vec();
        let mut rig = Rig::default();
        // The retry only matches if the failed attempt left "old" in place
        let replies = vec![
            Reply::Respond(cut_new),
            Reply::Respond(frame_response("old", &rows)),
        ];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Unchanged);
        assert_eq!(engine.stored_checksum(), &known("old"));

        assert_eq!(rig.sink.commits, 0);
    }

    #[test]
    fn test_unchanged_twice_has_no_side_effects() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(frame_response("abc", &rows))];
        let mut engine = rig.engine(replies, known("abc"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Unchanged);
        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Unchanged);
        assert_eq!(engine.stored_checksum(), &known("abc"));

        assert_eq!(engine.connector().opened, 2);
        assert!(rig.sink.rows.is_empty());
        assert_eq!(rig.sink.commits, 0);
    }

    #[test]
    fn test_stalled_server_is_bounded() {
        let rows = patterned_rows(2, 4, 1);
        let full = frame_response("new", &rows);
        let stall = full.len() - 3;
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::new()
        };
        let replies = vec![Reply::Stall(full, stall)];
        let mut engine = rig.engine(replies, known("old")).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::ShortRead)
        );

        assert_eq!(rig.delay.total_ms, 50);
        assert!(rig.liveness.ticks >= 5);
    }

    #[test]
    fn test_truncated_header_line_is_connection_failure() {
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::new()
        };
        let replies = vec![Reply::Respond(response(200, None, b"MM\nabc"))];
        let mut engine = rig.engine(replies, StoredChecksum::Undefined).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::Connection)
        );

        assert_eq!(engine.connector().opened, 2);
    }

    #[test]
    fn test_byte_count_mismatch_with_content_length() {
        let rows = patterned_rows(2, 4, 1);
        let mut body = frame_body("new", &rows);
        body.extend_from_slice(b"trailing");
        let mut rig = Rig::default();
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::new()
        };
        let replies = vec![Reply::Respond(response(200, Some(body.len()), &body))];
        let mut engine = rig.engine(replies, known("old")).with_policy(policy);

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::ByteCountMismatch)
        );

        assert_eq!(rig.sink.commits, 0);
    }

    #[test]
    fn test_no_content_length_checks_frame_size() {
        let rows = patterned_rows(2, 4, 1);
        let body = frame_body("new", &rows);
        let mut rig = Rig::default();
        let mut engine = rig.engine(vec![Reply::Respond(response(200, None, &body))], known("old"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Updated);
    }

    #[test]
    fn test_carriage_returns_in_header() {
        let rows = patterned_rows(2, 1, 1);
        let mut body = b"MM\r\nabc\r\n".to_vec();
        body.extend_from_slice(&rows);
        let mut rig = Rig::default();
        let replies = vec![Reply::Respond(response(200, Some(body.len()), &body))];
        let mut engine = rig.engine(replies, StoredChecksum::Undefined);

        assert_eq!(block_on(engine.synchronize(&mono(16, 1))), TransferOutcome::Updated);
        assert_eq!(engine.stored_checksum(), &known("abc"));
    }

    #[test]
    fn test_paint_failure_retries() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        rig.sink.fail_paint_at = Some(1);
        let replies = vec![Reply::Respond(frame_response("new", &rows))];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(block_on(engine.synchronize(&mono(16, 4))), TransferOutcome::Updated);
        assert_eq!(engine.stats().attempts, 2);

        assert_eq!(rig.sink.commits, 1);
    }

    #[test]
    fn test_commit_failure_is_terminal() {
        let rows = patterned_rows(2, 4, 1);
        let mut rig = Rig::default();
        rig.sink.fail_commit = true;
        let replies = vec![Reply::Respond(frame_response("new", &rows))];
        let mut engine = rig.engine(replies, known("old"));

        assert_eq!(
            block_on(engine.synchronize(&mono(16, 4))),
            TransferOutcome::Failed(FailureReason::Display)
        );
        assert_eq!(engine.stored_checksum(), &StoredChecksum::Cleared);

        assert_eq!(engine.connector().opened, 1);
    }

    #[test]
    fn test_region_wider_than_row_buffer() {
        let mut rig = Rig::default();
        let mut engine = rig.engine(vec![Reply::Refuse], known("abc"));

        assert_eq!(
            block_on(engine.synchronize(&mono((ROW as u16) * 8 + 1, 4))),
            TransferOutcome::Failed(FailureReason::InvalidRequest)
        );
        assert_eq!(engine.stored_checksum(), &known("abc"));

        assert_eq!(engine.connector().opened, 0);
    }

    #[test]
    fn test_liveness_ticks_every_row() {
        let height = 40;
        let rows = patterned_rows(1, height, 1);
        let mut rig = Rig::default();
        let mut engine = rig.engine(
            vec![Reply::Respond(frame_response("new", &rows))],
            StoredChecksum::Undefined,
        );

        assert_eq!(
            block_on(engine.synchronize(&mono(8, height as u16))),
            TransferOutcome::Updated
        );

        assert!(rig.liveness.ticks >= height as u32);
    }

    #[test]
    fn test_long_checksum_truncated_before_compare() {
        let long_a = [b'a'; 80];
        let mut long_b = [b'a'; 90];
        long_b[70] = b'z';
        let header = std::string::String::from_utf8(long_b.to_vec()).unwrap();
        let rows = patterned_rows(1, 1, 1);

        let mut rig = Rig::default();
        let stored = StoredChecksum::Known(Checksum::from_bytes(&long_a));
        let mut engine = rig.engine(vec![Reply::Respond(frame_response(&header, &rows))], stored);

        assert_eq!(block_on(engine.synchronize(&mono(8, 1))), TransferOutcome::Unchanged);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn test_any_region_paints_every_row_once(
            width in 1u16..=(ROW as u16 * 8),
            height in 1u16..24,
            x in 0u16..400,
            y in 0u16..400,
            accent in any::<bool>(),
            chunk in 1usize..64,
        ) {
            let planes = if accent { PlaneCount::MonoAccent } else { PlaneCount::Mono };
            let request = FrameRequest::new("/b", "id", x, y, width, height, planes).unwrap();
            let rows = patterned_rows(request.row_bytes(), height as usize, planes.count());

            let connector =
                ScriptedConnector::new(vec![Reply::Respond(frame_response("p", &rows))])
                    .with_chunk(chunk);
            let mut rig = Rig::default();
            let mut engine = rig.engine_with(connector, StoredChecksum::Undefined);

            prop_assert_eq!(block_on(engine.synchronize(&request)), TransferOutcome::Updated);

            prop_assert_eq!(rig.sink.commits, 1);
            prop_assert_eq!(rig.sink.rows.len(), height as usize);
            for (i, painted) in rig.sink.rows.iter().enumerate() {
                prop_assert_eq!(painted.y, y + i as u16);
                prop_assert_eq!(painted.x, x);
                prop_assert_eq!(painted.planes.len(), planes.count());
                prop_assert!(painted.planes.iter().all(|p| p.len() == request.row_bytes()));
            }
        }
    }
}
