use crate::model::{AvailabilityWindow, Min, Span};

// ── Interval set operations ──────────────────────────────────────
//
// All functions take spans sorted by start and return sorted, disjoint
// output. Everything is minute-granularity day-local arithmetic.

/// Merge sorted overlapping/adjacent spans into disjoint spans.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// Interval difference: remove `to_remove` from `base`. A removed span may
/// split one base span into two, or delete it entirely.
pub fn subtract_spans(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut cursor = b.start;

        while ri < to_remove.len() && to_remove[ri].end <= cursor {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < b.end {
            let r = &to_remove[j];
            if r.start > cursor {
                result.push(Span::new(cursor, r.start));
            }
            cursor = cursor.max(r.end);
            j += 1;
        }

        if cursor < b.end {
            result.push(Span::new(cursor, b.end));
        }
    }

    result
}

/// Sweep line: time ranges where the concurrent-allocation count reaches
/// `capacity`. Returns sorted, merged spans.
pub fn saturated_spans(allocs: &[Span], capacity: u32) -> Vec<Span> {
    if allocs.is_empty() || capacity == 0 {
        return Vec::new();
    }
    if capacity == 1 {
        return merge_overlapping(allocs);
    }

    let mut events: Vec<(Min, i32)> = Vec::with_capacity(allocs.len() * 2);
    for a in allocs {
        events.push((a.start, 1));
        events.push((a.end, -1));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut result = Vec::new();
    let mut count: u32 = 0;
    let mut saturated_start: Option<Min> = None;

    for (time, delta) in &events {
        if *delta > 0 {
            count += *delta as u32;
        } else {
            count -= (-*delta) as u32;
        }

        if count >= capacity && saturated_start.is_none() {
            saturated_start = Some(*time);
        } else if count < capacity
            && let Some(start) = saturated_start.take()
            && *time > start
        {
            result.push(Span::new(start, *time));
        }
    }

    result
}

/// Segment one window by concurrent-allocation count, keeping only segments
/// with remaining capacity. Adjacent equal-capacity segments are merged.
pub fn capacity_profile(
    window: Span,
    allocs: &[Span],
    capacity: u32,
) -> Vec<AvailabilityWindow> {
    if capacity == 0 {
        return Vec::new();
    }

    // Clip allocations to the window; anything outside cannot change the
    // count inside it.
    let mut events: Vec<(Min, i32)> = Vec::new();
    for a in allocs {
        if !a.overlaps(&window) {
            continue;
        }
        events.push((a.start.max(window.start), 1));
        events.push((a.end.min(window.end), -1));
    }

    if events.is_empty() {
        return vec![AvailabilityWindow {
            span: window,
            capacity_remaining: capacity,
        }];
    }

    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut result: Vec<AvailabilityWindow> = Vec::new();
    let mut count: u32 = 0;
    let mut cursor = window.start;

    let emit = |from: Min, to: Min, count: u32, out: &mut Vec<AvailabilityWindow>| {
        if from >= to || count >= capacity {
            return;
        }
        let remaining = capacity - count;
        if let Some(last) = out.last_mut()
            && last.span.end == from
            && last.capacity_remaining == remaining
        {
            last.span.end = to;
            return;
        }
        out.push(AvailabilityWindow {
            span: Span::new(from, to),
            capacity_remaining: remaining,
        });
    };

    let mut i = 0;
    while i < events.len() {
        let time = events[i].0;
        emit(cursor, time, count, &mut result);
        // Apply every event at this timestamp before emitting the next segment.
        while i < events.len() && events[i].0 == time {
            if events[i].1 > 0 {
                count += 1;
            } else {
                count -= 1;
            }
            i += 1;
        }
        cursor = cursor.max(time);
    }
    emit(cursor, window.end, count, &mut result);

    result
}
