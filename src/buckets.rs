//! Minute-of-day bucket tables and circular window selection.
//!
//! A [`MinuteBuckets`] table holds one list per minute of the day. It is
//! filled once at load time and then queried with a [`TimeFilter`]; a
//! query only touches the slots inside the window, never the whole trip
//! list.

use serde::Deserialize;
use std::ops::Range;

use crate::time::{MINUTES_PER_DAY, TimeFilter};

const SLOTS: usize = MINUTES_PER_DAY as usize;

/// Default distance in minutes from the window centre to its edges.
pub const DEFAULT_HALF_WIDTH: u16 = 60;

/// Where the window edges fall relative to the centre minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBounds {
    /// `[m - w, m + w)`: `2w` minutes wide, lower edge included.
    #[default]
    HalfOpen,
    /// `[m - w, m + w]`: `2w + 1` minutes wide, centred on `m`.
    Inclusive,
}

/// Shape of the circular window around the selected minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub half_width: u16,
    pub bounds: WindowBounds,
}

impl Default for Window {
    fn default() -> Self {
        Window {
            half_width: DEFAULT_HALF_WIDTH,
            bounds: WindowBounds::HalfOpen,
        }
    }
}

/// Slot ranges covered by a window centred on `center`.
///
/// The second range is empty unless the window wraps past midnight, in
/// which case the first range runs to the end of the day and the second
/// starts at minute 0. `half_width` must be below 720.
pub fn window_ranges(center: u16, window: &Window) -> (Range<usize>, Range<usize>) {
    let day = SLOTS as i32;
    let m = center as i32 % day;
    let w = window.half_width as i32;
    let upper = match window.bounds {
        WindowBounds::HalfOpen => m + w,
        WindowBounds::Inclusive => m + w + 1,
    };

    let lo = (m - w).rem_euclid(day) as usize;
    let hi = upper.rem_euclid(day) as usize;

    if lo > hi {
        (lo..SLOTS, 0..hi)
    } else {
        (lo..hi, 0..0)
    }
}

/// Fixed table of 1440 append-only slots indexed by minute-of-day.
#[derive(Debug, Clone)]
pub struct MinuteBuckets<T> {
    slots: Vec<Vec<T>>,
}

impl<T> Default for MinuteBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MinuteBuckets<T> {
    pub fn new() -> Self {
        MinuteBuckets {
            slots: (0..SLOTS).map(|_| Vec::new()).collect(),
        }
    }

    /// Appends `item` to the slot for `minute`.
    pub fn push(&mut self, minute: u16, item: T) {
        self.slots[minute as usize % SLOTS].push(item);
    }

    pub fn slot(&self, minute: u16) -> &[T] {
        &self.slots[minute as usize % SLOTS]
    }

    /// Total number of items across all slots.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Items inside the window for `filter`, in slot order then insertion order.
    ///
    /// [`TimeFilter::Any`] yields every slot.
    pub fn select<'a>(
        &'a self,
        filter: TimeFilter,
        window: Window,
    ) -> impl Iterator<Item = &'a T> + 'a {
        let (first, second) = match filter {
            TimeFilter::Any => (0..SLOTS, 0..0),
            TimeFilter::At(m) => window_ranges(m, &window),
        };

        self.slots[first]
            .iter()
            .chain(self.slots[second].iter())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_without_wrap() {
        assert_eq!(window_ranges(485, &Window::default()), (425..545, 0..0));
        assert_eq!(window_ranges(60, &Window::default()), (0..120, 0..0));
    }

    #[test]
    fn test_window_wraps_after_midnight() {
        // minutes 1390..=1439 then 0..=69
        assert_eq!(window_ranges(10, &Window::default()), (1390..1440, 0..70));
    }

    #[test]
    fn test_window_wraps_before_midnight() {
        assert_eq!(window_ranges(1400, &Window::default()), (1340..1440, 0..20));
        assert_eq!(window_ranges(1380, &Window::default()), (1320..1440, 0..0));
    }

    #[test]
    fn test_half_open_width_is_constant() {
        let window = Window::default();
        for m in 0..MINUTES_PER_DAY {
            let (a, b) = window_ranges(m, &window);
            assert_eq!(a.len() + b.len(), 120, "minute {m}");
        }
    }

    #[test]
    fn test_inclusive_window() {
        let window = Window {
            half_width: 60,
            bounds: WindowBounds::Inclusive,
        };
        assert_eq!(window_ranges(485, &window), (425..546, 0..0));
        assert_eq!(window_ranges(1379, &window), (1319..1440, 0..0));
        assert_eq!(window_ranges(59, &window), (1439..1440, 0..120));
        for m in 0..MINUTES_PER_DAY {
            let (a, b) = window_ranges(m, &window);
            assert_eq!(a.len() + b.len(), 121, "minute {m}");
        }
    }

    #[test]
    fn test_select_any_returns_everything_in_slot_order() {
        let mut buckets = MinuteBuckets::new();
        buckets.push(900, "late");
        buckets.push(5, "early");
        buckets.push(5, "early-second");

        let all: Vec<_> = buckets.select(TimeFilter::Any, Window::default()).collect();
        assert_eq!(all, vec![&"early", &"early-second", &"late"]);
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn test_select_window_edges() {
        let mut buckets = MinuteBuckets::new();
        for m in 0..MINUTES_PER_DAY {
            buckets.push(m, m);
        }

        let selected: Vec<u16> = buckets
            .select(TimeFilter::At(10), Window::default())
            .copied()
            .collect();

        assert_eq!(selected.len(), 120);
        assert_eq!(selected.first(), Some(&1390));
        assert_eq!(selected.last(), Some(&69));
        assert!(!selected.contains(&70));
        assert!(selected.contains(&1439));
        assert!(selected.contains(&0));
    }

    #[test]
    fn test_empty_table() {
        let buckets: MinuteBuckets<u32> = MinuteBuckets::new();
        assert!(buckets.is_empty());
        assert_eq!(buckets.select(TimeFilter::At(0), Window::default()).count(), 0);
    }
}
