use tracing::{debug, warn};

/// Vertical extent of one item in the reference list, in rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub top: u32,
    pub bottom: u32,
}

/// Visible window over the reference list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub top: u32,
    pub height: u32,
}

impl Viewport {
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Recompute cumulative offsets from `from` to the end.
///
/// `offset[p] = offset[p - 1] + height[p]` with `offset[-1] = 0`. An offset is
/// only known when every height up to and including `p` is known; anything past
/// the first gap stays `None`. Entries before `from` are taken from `previous`.
pub fn recompute_offsets(
    heights: &[Option<u32>],
    previous: &[Option<u32>],
    from: usize,
) -> Vec<Option<u32>> {
    let from = from.min(heights.len());
    let mut offsets: Vec<Option<u32>> = previous.iter().copied().take(from).collect();
    offsets.resize(from, None);

    let mut running = if from == 0 {
        Some(0)
    } else {
        offsets[from - 1]
    };
    for height in &heights[from..] {
        running = match (running, height) {
            (Some(offset), Some(h)) => Some(offset.saturating_add(*h)),
            _ => None,
        };
        offsets.push(running);
    }
    offsets
}

pub fn cumulative_offsets(heights: &[Option<u32>]) -> Vec<Option<u32>> {
    recompute_offsets(heights, &[], 0)
}

/// Measured heights and derived offsets of the reference list items, plus the
/// viewport they are shown through.
#[derive(Clone, Debug, Default)]
pub struct LayoutTracker {
    heights: Vec<Option<u32>>,
    offsets: Vec<Option<u32>>,
    scroll_offset: u32,
    viewport_height: u32,
}

impl LayoutTracker {
    pub fn new(item_count: usize) -> Self {
        Self {
            heights: vec![None; item_count],
            offsets: vec![None; item_count],
            scroll_offset: 0,
            viewport_height: 0,
        }
    }

    pub fn item_count(&self) -> usize {
        self.heights.len()
    }

    /// Record (or overwrite) the measured height of `position`. Returns whether
    /// anything changed.
    pub fn report_height(&mut self, position: usize, height: u32) -> bool {
        if position >= self.heights.len() {
            warn!(position, height, "layout report for unknown item ignored");
            return false;
        }
        if self.heights[position] == Some(height) {
            return false;
        }
        debug!(position, height, "item measured");
        self.heights[position] = Some(height);
        self.offsets = recompute_offsets(&self.heights, &self.offsets, position);
        true
    }

    pub fn height(&self, position: usize) -> Option<u32> {
        self.heights.get(position).copied().flatten()
    }

    pub fn offset(&self, position: usize) -> Option<u32> {
        self.offsets.get(position).copied().flatten()
    }

    pub fn offsets(&self) -> &[Option<u32>] {
        &self.offsets
    }

    /// `None` until both the item and everything above it have been measured.
    pub fn item_span(&self, position: usize) -> Option<Span> {
        let height = self.height(position)?;
        let top = if position == 0 {
            0
        } else {
            self.offset(position - 1)?
        };
        Some(Span {
            top,
            bottom: top.saturating_add(height),
        })
    }

    /// Total height of the list once every item is measured.
    pub fn content_height(&self) -> Option<u32> {
        match self.offsets.last() {
            Some(last) => *last,
            None => Some(0),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            top: self.scroll_offset,
            height: self.viewport_height,
        }
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_all(tracker: &mut LayoutTracker, reports: &[(usize, u32)]) {
        for &(position, height) in reports {
            tracker.report_height(position, height);
        }
    }

    #[test]
    fn test_offsets_are_prefix_sums() {
        let mut tracker = LayoutTracker::new(3);
        report_all(&mut tracker, &[(0, 2), (1, 3), (2, 1)]);
        assert_eq!(tracker.offsets(), &[Some(2), Some(5), Some(6)]);
        assert_eq!(tracker.content_height(), Some(6));
    }

    #[test]
    fn test_offsets_independent_of_report_order() {
        let heights = [(0, 2), (1, 3), (2, 1), (3, 4)];
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];
        for order in orders {
            let mut tracker = LayoutTracker::new(4);
            for i in order {
                let (p, h) = heights[i];
                tracker.report_height(p, h);
            }
            assert_eq!(
                tracker.offsets(),
                &[Some(2), Some(5), Some(6), Some(10)],
                "order {order:?}"
            );
        }
    }

    #[test]
    fn test_gap_leaves_tail_unset() {
        let mut tracker = LayoutTracker::new(4);
        report_all(&mut tracker, &[(0, 2), (2, 3), (3, 1)]);
        assert_eq!(tracker.offsets(), &[Some(2), None, None, None]);
        assert_eq!(tracker.item_span(2), None);
        assert_eq!(tracker.content_height(), None);

        tracker.report_height(1, 4);
        assert_eq!(tracker.offsets(), &[Some(2), Some(6), Some(9), Some(10)]);
    }

    #[test]
    fn test_overwrite_propagates_forward() {
        let mut tracker = LayoutTracker::new(3);
        report_all(&mut tracker, &[(0, 1), (1, 1), (2, 1)]);
        // reflow: item 0 now wraps onto three rows
        assert!(tracker.report_height(0, 3));
        assert_eq!(tracker.offsets(), &[Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_repeated_report_is_idempotent() {
        let mut tracker = LayoutTracker::new(2);
        assert!(tracker.report_height(1, 2));
        assert!(tracker.report_height(0, 5));
        let before = tracker.offsets().to_vec();
        assert!(!tracker.report_height(0, 5));
        assert_eq!(tracker.offsets(), before.as_slice());
    }

    #[test]
    fn test_out_of_range_report_ignored() {
        let mut tracker = LayoutTracker::new(2);
        assert!(!tracker.report_height(5, 3));
        assert_eq!(tracker.offsets(), &[None, None]);
    }

    #[test]
    fn test_item_span_uses_previous_offset() {
        let mut tracker = LayoutTracker::new(3);
        report_all(&mut tracker, &[(0, 2), (1, 3)]);
        assert_eq!(tracker.item_span(0), Some(Span { top: 0, bottom: 2 }));
        assert_eq!(tracker.item_span(1), Some(Span { top: 2, bottom: 5 }));
        assert_eq!(tracker.item_span(2), None);
    }

    #[test]
    fn test_recompute_is_pure() {
        let heights = vec![Some(1), Some(2), None, Some(4)];
        let first = cumulative_offsets(&heights);
        let second = recompute_offsets(&heights, &first, 1);
        assert_eq!(first, second);
        assert_eq!(first, vec![Some(1), Some(3), None, None]);
    }

    #[test]
    fn test_empty_list() {
        let tracker = LayoutTracker::new(0);
        assert_eq!(tracker.content_height(), Some(0));
        assert_eq!(tracker.item_span(0), None);
    }
}
