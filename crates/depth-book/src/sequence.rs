//! Sequence continuity tracking
//!
//! Venues that number their frames say which sequence each incremental frame
//! follows. A frame whose `previous` differs from the last applied sequence
//! means something was lost and the local book can no longer be trusted.

use depth_types::{FeedError, FeedResult, SequenceInfo, Venue};
use tracing::warn;

/// Tracks the last applied sequence of one subscription
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    venue: Venue,
    last: Option<i64>,
}

impl SequenceTracker {
    pub fn new(venue: Venue) -> Self {
        Self { venue, last: None }
    }

    /// Check a frame against the last applied sequence and advance
    ///
    /// - frames without sequencing are accepted
    /// - a snapshot always (re)starts tracking
    /// - increments before the first snapshot pass unchecked
    /// - an increment without `previous` is accepted and advances
    ///
    /// On a gap tracking stops until the next snapshot.
    pub fn observe(&mut self, is_snapshot: bool, sequence: Option<SequenceInfo>) -> FeedResult<()> {
        let Some(info) = sequence else {
            return Ok(());
        };

        if is_snapshot {
            self.last = Some(info.sequence);
            return Ok(());
        }

        let Some(last) = self.last else {
            return Ok(());
        };

        match info.previous {
            Some(previous) if previous != last => {
                warn!(
                    venue = %self.venue,
                    expected = last,
                    received = previous,
                    "Sequence gap detected"
                );
                self.last = None;
                Err(FeedError::SequenceGap {
                    venue: self.venue,
                    expected: last,
                    received: previous,
                })
            }
            _ => {
                self.last = Some(info.sequence);
                Ok(())
            }
        }
    }

    /// Last applied sequence
    pub fn last(&self) -> Option<i64> {
        self.last
    }

    /// Forget the current position
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_frames() {
        let mut tracker = SequenceTracker::new(Venue::Okx);
        tracker.observe(true, Some(SequenceInfo::new(100, Some(-1)))).unwrap();
        tracker.observe(false, Some(SequenceInfo::new(105, Some(100)))).unwrap();
        tracker.observe(false, Some(SequenceInfo::new(109, Some(105)))).unwrap();
        assert_eq!(tracker.last(), Some(109));
    }

    #[test]
    fn test_heartbeat_with_same_sequence() {
        let mut tracker = SequenceTracker::new(Venue::Okx);
        tracker.observe(true, Some(SequenceInfo::new(100, None))).unwrap();
        tracker.observe(false, Some(SequenceInfo::new(100, Some(100)))).unwrap();
        assert_eq!(tracker.last(), Some(100));
    }

    #[test]
    fn test_gap_reported_then_tracking_stops() {
        let mut tracker = SequenceTracker::new(Venue::Deribit);
        tracker.observe(true, Some(SequenceInfo::new(10, None))).unwrap();

        let err = tracker
            .observe(false, Some(SequenceInfo::new(13, Some(12))))
            .unwrap_err();
        assert_eq!(
            err,
            FeedError::SequenceGap {
                venue: Venue::Deribit,
                expected: 10,
                received: 12,
            }
        );
        assert!(tracker.last().is_none());

        tracker.observe(false, Some(SequenceInfo::new(20, Some(19)))).unwrap();
    }

    #[test]
    fn test_unsequenced_and_pre_snapshot_frames_pass() {
        let mut tracker = SequenceTracker::new(Venue::Bybit);
        tracker.observe(false, None).unwrap();
        tracker.observe(false, Some(SequenceInfo::new(5, Some(4)))).unwrap();
        assert!(tracker.last().is_none());
    }
}
