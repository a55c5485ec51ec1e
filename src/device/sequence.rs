// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate suppression for retransmitted trigger packets.
//!
//! Nodes resend each trigger several times over the lossy broadcast medium,
//! stamping all copies with the same 8-bit sequence number.

use parking_lot::Mutex;

/// How far behind the last accepted sequence a packet counts as stale.
const STALE_WINDOW: u8 = 16;

/// Tracks the last trigger sequence number accepted for a sensor.
///
/// - Sequence `0` means "unsequenced" and is always accepted.
/// - A repeat of the last accepted sequence, or one at most 16 steps behind
///   it (modulo 256), is stale.
/// - Anything else is accepted and becomes the new reference. Large
///   backwards jumps are accepted so that a rebooted node is heard again.
///
/// # Examples
///
/// ```
/// use artbus_lib::device::SequenceTracker;
///
/// let tracker = SequenceTracker::new();
/// assert!(tracker.accept(5));
/// assert!(!tracker.accept(5)); // retransmission
/// assert!(!tracker.accept(3)); // late copy of an older packet
/// assert!(tracker.accept(6));
/// ```
#[derive(Debug, Default)]
pub struct SequenceTracker {
    last: Mutex<Option<u8>>,
}

impl SequenceTracker {
    /// Creates a tracker that has not seen any packet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a packet with this sequence should be ignored.
    #[must_use]
    pub fn should_ignore(&self, seq: u8) -> bool {
        is_stale(*self.last.lock(), seq)
    }

    /// Records `seq` unless it is stale, returning whether it was accepted.
    pub fn accept(&self, seq: u8) -> bool {
        let mut last = self.last.lock();
        if is_stale(*last, seq) {
            return false;
        }
        if seq != 0 {
            *last = Some(seq);
        }
        true
    }

    /// Returns the last accepted sequence number.
    #[must_use]
    pub fn last(&self) -> Option<u8> {
        *self.last.lock()
    }
}

fn is_stale(last: Option<u8>, seq: u8) -> bool {
    let Some(last) = last else {
        return false;
    };
    if seq == 0 {
        return false;
    }
    last.wrapping_sub(seq) < STALE_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_packet_is_accepted() {
        let tracker = SequenceTracker::new();
        assert!(!tracker.should_ignore(200));
        assert!(tracker.accept(200));
        assert_eq!(tracker.last(), Some(200));
    }

    #[test]
    fn duplicates_are_ignored() {
        let tracker = SequenceTracker::new();
        assert!(tracker.accept(9));
        assert!(tracker.should_ignore(9));
        assert!(!tracker.accept(9));
    }

    #[test]
    fn unsequenced_packets_always_pass() {
        let tracker = SequenceTracker::new();
        assert!(tracker.accept(4));
        assert!(tracker.accept(0));
        assert!(tracker.accept(0));
        assert_eq!(tracker.last(), Some(4));
    }

    #[test]
    fn wraps_around() {
        let tracker = SequenceTracker::new();
        assert!(tracker.accept(255));
        assert!(tracker.accept(1));
        assert!(!tracker.accept(250));
    }

    #[test]
    fn reboot_is_accepted() {
        let tracker = SequenceTracker::new();
        assert!(tracker.accept(120));
        assert!(tracker.accept(1));
        assert_eq!(tracker.last(), Some(1));
    }
}
