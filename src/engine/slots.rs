use crate::model::{AvailabilityWindow, Min, Span};

// ── Slot generation ──────────────────────────────────────────────

/// Lazy iterator over bookable slot start times.
///
/// Slots are laid out strictly back-to-back from the start of each
/// contiguous run of positive-capacity coverage; a slot is emitted only when
/// it fits entirely before the run's end. Runs are independent — no slot
/// straddles a zero-capacity gap.
///
/// The iterator is a pure function of its inputs: cloning it restarts the
/// walk.
#[derive(Debug, Clone)]
pub struct SlotIter {
    spans: Vec<Span>,
    duration: Min,
    span_idx: usize,
    cursor: Min,
}

impl Iterator for SlotIter {
    type Item = Min;

    fn next(&mut self) -> Option<Min> {
        while self.span_idx < self.spans.len() {
            let span = self.spans[self.span_idx];
            let start = self.cursor.max(span.start);
            if start + self.duration <= span.end {
                self.cursor = start + self.duration;
                return Some(start);
            }
            self.span_idx += 1;
            self.cursor = Min::MIN;
        }
        None
    }
}

/// Walk `windows` in `duration`-minute steps.
///
/// Adjacent windows are one stepping unit: a capacity change inside a
/// working window (capacity still >= 1 on both sides) must not restart the
/// grid — only a fully saturated hole does. `duration` must be positive; the
/// caller-facing engine validates range bounds before calling.
pub fn generate_slots(windows: &[AvailabilityWindow], duration: Min) -> SlotIter {
    debug_assert!(duration > 0, "slot duration must be positive");

    // Overlay output only contains positive-capacity segments, so merging
    // adjacent spans yields the bookable coverage with saturated gaps kept.
    let mut spans: Vec<Span> = Vec::new();
    for w in windows {
        if let Some(last) = spans.last_mut()
            && w.span.start <= last.end
        {
            last.end = last.end.max(w.span.end);
            continue;
        }
        spans.push(w.span);
    }

    SlotIter {
        spans,
        duration,
        span_idx: 0,
        cursor: Min::MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: Min, end: Min) -> AvailabilityWindow {
        AvailabilityWindow {
            span: Span::new(start, end),
            capacity_remaining: 1,
        }
    }

    #[test]
    fn back_to_back_within_window() {
        let windows = vec![window(540, 720)]; // 09:00-12:00
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540, 600, 660]);
    }

    #[test]
    fn no_partial_slot_at_window_end() {
        let windows = vec![window(540, 710)]; // 2h50m
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540, 600]); // 11:00 slot would overrun
    }

    #[test]
    fn duration_longer_than_window_emits_nothing() {
        let windows = vec![window(540, 600)]; // exactly 60 min
        let slots: Vec<Min> = generate_slots(&windows, 90).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn exact_fit_emits_one() {
        let windows = vec![window(540, 600)];
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540]);
    }

    #[test]
    fn windows_are_independent() {
        // Gap 12:00-13:00; the 11:30 remainder must not bleed into 13:00
        let windows = vec![window(540, 720), window(780, 900)];
        let slots: Vec<Min> = generate_slots(&windows, 90).collect();
        assert_eq!(slots, vec![540, 630, 780]);
    }

    #[test]
    fn empty_windows_empty_slots() {
        let slots: Vec<Min> = generate_slots(&[], 60).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn restartable_by_clone() {
        let windows = vec![window(540, 720)];
        let mut iter = generate_slots(&windows, 60);
        let fresh = iter.clone();
        assert_eq!(iter.next(), Some(540));
        assert_eq!(fresh.collect::<Vec<_>>(), vec![540, 600, 660]);
    }

    #[test]
    fn capacity_change_does_not_restart_the_grid() {
        // One working window segmented by a partial booking at limit 2:
        // reduced capacity 09:00-09:30, full capacity 09:30-11:00. A 60-min
        // slot at 09:00 spans the boundary and must still be offered.
        let windows = vec![
            AvailabilityWindow {
                span: Span::new(540, 570),
                capacity_remaining: 1,
            },
            AvailabilityWindow {
                span: Span::new(570, 660),
                capacity_remaining: 2,
            },
        ];
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540, 600]);
    }

    #[test]
    fn saturated_hole_still_splits_coverage() {
        // [10:00,10:30) fully saturated: not in the overlay output at all
        let windows = vec![
            AvailabilityWindow {
                span: Span::new(540, 600),
                capacity_remaining: 1,
            },
            AvailabilityWindow {
                span: Span::new(630, 720),
                capacity_remaining: 1,
            },
        ];
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540, 630]);
    }

    #[test]
    fn scenario_booked_hour_shifts_following_slots() {
        // 09:00-17:00 working day with a 10:00-11:00 booking removed:
        // windows [09:00,10:00) and [11:00,17:00), 60-minute service.
        let windows = vec![window(540, 600), window(660, 1020)];
        let slots: Vec<Min> = generate_slots(&windows, 60).collect();
        assert_eq!(slots, vec![540, 660, 720, 780, 840, 900, 960]);
        assert_eq!(slots.len(), 7);
        assert!(!slots.contains(&600)); // 10:00 is taken
    }
}
