use tracing::debug;

use crate::session::layout::{LayoutTracker, Span, Viewport};

/// A layout callback from the renderer, consumed in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutEvent {
    ItemMeasured { position: usize, height: u32 },
    ViewportResized { height: u32 },
    Scrolled { offset: u32 },
}

/// Smallest scroll that brings `span` fully into `viewport`, or `None` when it
/// is already fully visible.
pub fn plan_scroll(span: Span, viewport: Viewport) -> Option<u32> {
    if span.top < viewport.top {
        Some(span.top)
    } else if span.bottom > viewport.bottom() {
        Some(span.bottom.saturating_sub(viewport.height))
    } else {
        None
    }
}

/// Keeps the reference list scrolled to the active sentence.
///
/// Scroll requests for items that have not been measured yet are parked and
/// retried after each layout event, so a jump issued before the renderer has
/// caught up still lands once the heights arrive.
#[derive(Clone, Debug, Default)]
pub struct ScrollCoordinator {
    tracker: LayoutTracker,
    pending: Option<usize>,
}

impl ScrollCoordinator {
    pub fn new(item_count: usize) -> Self {
        Self {
            tracker: LayoutTracker::new(item_count),
            pending: None,
        }
    }

    pub fn tracker(&self) -> &LayoutTracker {
        &self.tracker
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn scroll_offset(&self) -> u32 {
        self.tracker.scroll_offset()
    }

    /// Apply one layout event. Returns the new scroll offset if a parked
    /// request could now be resolved and required movement.
    pub fn apply(&mut self, event: LayoutEvent) -> Option<u32> {
        match event {
            LayoutEvent::ItemMeasured { position, height } => {
                if !self.tracker.report_height(position, height) {
                    return None;
                }
            }
            LayoutEvent::ViewportResized { height } => {
                if self.tracker.viewport_height() == height {
                    return None;
                }
                self.tracker.set_viewport_height(height);
            }
            LayoutEvent::Scrolled { offset } => {
                self.tracker.set_scroll_offset(offset);
            }
        }
        let position = self.pending?;
        self.scroll_to_if_needed(position)
    }

    /// Scroll the minimum distance needed to show `position` in full.
    pub fn scroll_to_if_needed(&mut self, position: usize) -> Option<u32> {
        let viewport = self.tracker.viewport();
        let span = match self.tracker.item_span(position) {
            Some(span) if viewport.height > 0 => span,
            _ => {
                debug!(position, "scroll deferred until item is measured");
                self.pending = Some(position);
                return None;
            }
        };
        self.pending = None;

        let target = plan_scroll(span, viewport)?;
        debug!(
            position,
            from = viewport.top,
            to = target,
            "scrolling reference list"
        );
        self.tracker.set_scroll_offset(target);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(heights: &[u32], viewport_height: u32) -> ScrollCoordinator {
        let mut coord = ScrollCoordinator::new(heights.len());
        for (position, &height) in heights.iter().enumerate() {
            coord.apply(LayoutEvent::ItemMeasured { position, height });
        }
        coord.apply(LayoutEvent::ViewportResized {
            height: viewport_height,
        });
        coord
    }

    #[test]
    fn test_fully_visible_item_does_not_scroll() {
        let mut coord = coordinator(&[2, 2, 2, 2, 2], 6);
        coord.apply(LayoutEvent::Scrolled { offset: 2 });
        // item 1 spans [2, 4], item 2 spans [4, 6], viewport [2, 8]
        assert_eq!(coord.scroll_to_if_needed(1), None);
        assert_eq!(coord.scroll_to_if_needed(2), None);
        assert_eq!(coord.scroll_offset(), 2);
    }

    #[test]
    fn test_item_above_viewport_aligns_top() {
        let mut coord = coordinator(&[2, 2, 2, 2, 2], 4);
        coord.apply(LayoutEvent::Scrolled { offset: 5 });
        assert_eq!(coord.scroll_to_if_needed(1), Some(2));
        assert_eq!(coord.scroll_offset(), 2);
    }

    #[test]
    fn test_item_below_viewport_aligns_bottom() {
        let mut coord = coordinator(&[2, 2, 2, 2, 2], 4);
        // item 3 spans [6, 8], viewport [0, 4]
        assert_eq!(coord.scroll_to_if_needed(3), Some(4));
        assert_eq!(coord.tracker().viewport(), Viewport { top: 4, height: 4 });
    }

    #[test]
    fn test_partially_cut_item_scrolls_minimum() {
        let mut coord = coordinator(&[3, 3, 3], 5);
        // item 1 spans [3, 6], viewport [0, 5]: one row hidden
        assert_eq!(coord.scroll_to_if_needed(1), Some(1));
    }

    #[test]
    fn test_item_taller_than_viewport_prefers_top() {
        let mut coord = coordinator(&[1, 10], 4);
        coord.apply(LayoutEvent::Scrolled { offset: 3 });
        assert_eq!(coord.scroll_to_if_needed(1), Some(1));
    }

    #[test]
    fn test_unmeasured_item_defers_then_resolves() {
        let mut coord = ScrollCoordinator::new(3);
        coord.apply(LayoutEvent::ViewportResized { height: 3 });
        coord.apply(LayoutEvent::ItemMeasured { position: 0, height: 2 });

        assert_eq!(coord.scroll_to_if_needed(2), None);
        assert_eq!(coord.pending(), Some(2));
        assert_eq!(coord.scroll_offset(), 0);

        // item 2 measured but item 1 still missing: still deferred
        assert_eq!(
            coord.apply(LayoutEvent::ItemMeasured { position: 2, height: 2 }),
            None
        );
        assert_eq!(coord.pending(), Some(2));

        // item 2 spans [4, 6] once item 1 arrives; viewport [0, 3]
        assert_eq!(
            coord.apply(LayoutEvent::ItemMeasured { position: 1, height: 2 }),
            Some(3)
        );
        assert_eq!(coord.pending(), None);
    }

    #[test]
    fn test_unknown_viewport_defers() {
        let mut coord = ScrollCoordinator::new(2);
        coord.apply(LayoutEvent::ItemMeasured { position: 0, height: 2 });
        coord.apply(LayoutEvent::ItemMeasured { position: 1, height: 2 });
        assert_eq!(coord.scroll_to_if_needed(1), None);
        assert_eq!(coord.pending(), Some(1));
        assert_eq!(
            coord.apply(LayoutEvent::ViewportResized { height: 3 }),
            Some(1)
        );
    }

    #[test]
    fn test_newer_request_replaces_pending() {
        let mut coord = ScrollCoordinator::new(3);
        coord.apply(LayoutEvent::ViewportResized { height: 2 });
        coord.scroll_to_if_needed(2);
        coord.apply(LayoutEvent::ItemMeasured { position: 0, height: 1 });
        assert_eq!(coord.scroll_to_if_needed(0), None);
        assert_eq!(coord.pending(), None);
    }

    #[test]
    fn test_plan_scroll_boundaries() {
        let viewport = Viewport { top: 4, height: 4 };
        assert_eq!(plan_scroll(Span { top: 4, bottom: 8 }, viewport), None);
        assert_eq!(plan_scroll(Span { top: 3, bottom: 5 }, viewport), Some(3));
        assert_eq!(plan_scroll(Span { top: 7, bottom: 9 }, viewport), Some(5));
    }
}
