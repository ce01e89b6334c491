use lge_common::{DirtyRect, FrameView, ScreenSize};

use crate::tracker::DamageTracker;

/// Dirty-rectangle strategy.
///
/// Marks are appended without merging. At present time the current and
/// previous frame's rects are merged into a covering set in which no two
/// rects overlap or sit within one pixel of each other.
///
/// Marks accumulate until `end_frame`; a caller that never presents grows
/// the current list without bound.
#[derive(Debug, Clone)]
pub struct RectMerger {
    screen: ScreenSize,
    current: Vec<DirtyRect>,
    previous: Vec<DirtyRect>,
}

impl RectMerger {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            current: Vec::new(),
            previous: Vec::new(),
        }
    }

    /// Rects marked so far this frame.
    pub fn current(&self) -> &[DirtyRect] {
        &self.current
    }

    /// Rects marked during the previous frame.
    pub fn previous(&self) -> &[DirtyRect] {
        &self.previous
    }
}

impl DamageTracker for RectMerger {
    fn mark_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if let Some(rect) = DirtyRect::clipped(x, y, w, h, self.screen) {
            self.current.push(rect);
        }
    }

    fn compute_update_regions(&mut self, _frame: Option<&FrameView<'_>>) -> Vec<DirtyRect> {
        let mut rects = Vec::with_capacity(self.current.len() + self.previous.len());
        rects.extend_from_slice(&self.current);
        rects.extend_from_slice(&self.previous);
        let input = rects.len();
        merge_rects(&mut rects);
        tracing::trace!(input, output = rects.len(), "merged dirty rects");
        rects
    }

    fn end_frame(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
    }

    fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }

    fn name(&self) -> &'static str {
        "rects"
    }
}

/// Merge touching rects in place until a full pass merges nothing.
///
/// O(n²) per pass; per-frame rect counts are in the tens.
pub fn merge_rects(rects: &mut Vec<DirtyRect>) {
    if rects.len() <= 1 {
        return;
    }
    let mut merged = true;
    while merged {
        merged = false;
        let mut i = 0;
        while i < rects.len() {
            let mut j = i + 1;
            while j < rects.len() {
                if rects[i].touches(&rects[j]) {
                    rects[i] = rects[i].union(&rects[j]);
                    rects.swap_remove(j);
                    merged = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ScreenSize = ScreenSize::new(240, 320);

    fn assert_no_mergeable_pairs(rects: &[DirtyRect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.touches(b), "{a:?} and {b:?} should have merged");
            }
        }
    }

    fn covered(rects: &[DirtyRect], x: i32, y: i32) -> bool {
        rects.iter().any(|r| r.contains_point(x, y))
    }

    #[test]
    fn overlapping_marks_merge_into_one() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(10, 10, 5, 5);
        merger.mark_region(14, 14, 5, 5);
        let rects = merger.compute_update_regions(None);
        assert_eq!(rects, vec![DirtyRect::new(10, 10, 18, 18)]);
    }

    #[test]
    fn one_pixel_gap_still_merges() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(0, 0, 10, 10);
        merger.mark_region(11, 0, 10, 10);
        assert_eq!(
            merger.compute_update_regions(None),
            vec![DirtyRect::new(0, 0, 20, 9)]
        );
    }

    #[test]
    fn distant_marks_stay_separate() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(0, 0, 10, 10);
        merger.mark_region(100, 100, 10, 10);
        let rects = merger.compute_update_regions(None);
        assert_eq!(rects.len(), 2);
    }

    #[test]
    fn zero_or_one_rect_returned_unmodified() {
        let mut merger = RectMerger::new(SCREEN);
        assert!(merger.compute_update_regions(None).is_empty());
        merger.mark_region(5, 6, 7, 8);
        assert_eq!(
            merger.compute_update_regions(None),
            vec![DirtyRect::new(5, 6, 11, 13)]
        );
    }

    #[test]
    fn marks_are_clipped_and_empty_ones_dropped() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(-10, -10, 20, 20);
        merger.mark_region(500, 0, 10, 10);
        merger.mark_region(0, 0, 0, 0);
        assert_eq!(merger.current(), &[DirtyRect::new(0, 0, 9, 9)]);
    }

    #[test]
    fn chain_merges_reach_fixpoint() {
        // Each rect touches only its neighbour; a single pass is not enough
        // when the order is scrambled.
        let mut merger = RectMerger::new(SCREEN);
        for x in [60, 0, 40, 20, 80] {
            merger.mark_region(x, 0, 19, 5);
        }
        let rects = merger.compute_update_regions(None);
        assert_eq!(rects, vec![DirtyRect::new(0, 0, 98, 4)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut merger = RectMerger::new(SCREEN);
        for (x, y) in [(5, 5), (30, 8), (12, 40), (100, 100), (104, 90), (200, 300)] {
            merger.mark_region(x, y, 15, 12);
        }
        let first = merger.compute_update_regions(None);
        let second = merger.compute_update_regions(None);
        assert_eq!(first, second);
        assert_no_mergeable_pairs(&first);

        let mut again = first.clone();
        merge_rects(&mut again);
        assert_eq!(again, first);
    }

    #[test]
    fn previous_frame_is_repainted() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(0, 0, 10, 10);
        merger.compute_update_regions(None);
        merger.end_frame();

        merger.mark_region(100, 100, 10, 10);
        let rects = merger.compute_update_regions(None);
        assert!(covered(&rects, 5, 5), "old position must be erased");
        assert!(covered(&rects, 105, 105));

        merger.end_frame();
        merger.end_frame();
        assert!(merger.compute_update_regions(None).is_empty());
    }

    #[test]
    fn output_covers_every_marked_pixel() {
        let marks = [(3, 4, 20, 9), (50, 50, 1, 1), (22, 12, 6, 30), (200, 0, 40, 40)];
        let mut merger = RectMerger::new(SCREEN);
        for &(x, y, w, h) in &marks {
            merger.mark_region(x, y, w, h);
        }
        let rects = merger.compute_update_regions(None);
        for &(x, y, w, h) in &marks {
            for py in y..y + h {
                for px in x..x + w {
                    assert!(covered(&rects, px, py), "({px}, {py})");
                }
            }
        }
        assert_no_mergeable_pairs(&rects);
    }

    #[test]
    fn clear_drops_both_frames() {
        let mut merger = RectMerger::new(SCREEN);
        merger.mark_region(0, 0, 10, 10);
        merger.end_frame();
        merger.mark_region(20, 20, 10, 10);
        merger.clear();
        assert!(merger.compute_update_regions(None).is_empty());
    }
}
