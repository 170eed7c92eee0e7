//! Directional intervals over buffer positions.
//!
//! A [`Region`] is the currency of the rest of the editor: cursors (empty regions), selections,
//! search matches and highlighter output all use it. It is a plain pair of codepoint offsets; `a`
//! is the anchor and `b` the moving end, so `a > b` is a perfectly valid backward selection.

use std::fmt;
use std::ops::Range;

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`Ord::clamp`] this never panics when `min > max`; `min` wins in that case, which is
/// what out-of-range requests against an empty or shrinking buffer need.
pub fn clamp(min: usize, max: usize, value: usize) -> usize {
    min.max(max.min(value))
}

/// An ordered pair of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(usize, usize)", into = "(usize, usize)"))]
pub struct Region {
    /// Anchor position.
    pub a: usize,
    /// Moving position (the caret end of a selection).
    pub b: usize,
}

impl Region {
    /// Create a region from its two ends.
    pub const fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Create an empty region (a caret) at `point`.
    pub const fn point(point: usize) -> Self {
        Self { a: point, b: point }
    }

    /// Smaller of the two ends.
    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    /// Larger of the two ends.
    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    /// Number of positions covered.
    pub fn size(&self) -> usize {
        self.end() - self.begin()
    }

    /// `true` for carets.
    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }

    /// `true` when `a > b`.
    pub fn is_reversed(&self) -> bool {
        self.a > self.b
    }

    /// Half-open containment: `begin <= point < end`.
    pub fn contains(&self, point: usize) -> bool {
        point >= self.begin() && point < self.end()
    }

    /// `true` when both ends of `other` fall within `[begin, end]`.
    pub fn covers(&self, other: Region) -> bool {
        other.begin() >= self.begin() && other.end() <= self.end()
    }

    /// `true` when the regions overlap or merely touch.
    pub fn intersects(&self, other: Region) -> bool {
        self.begin() <= other.end() && other.begin() <= self.end()
    }

    /// Smallest forward region covering both.
    pub fn cover(&self, other: Region) -> Region {
        Region::new(
            self.begin().min(other.begin()),
            self.end().max(other.end()),
        )
    }

    /// Overlap of the two regions, if they intersect.
    pub fn intersection(&self, other: Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        Some(Region::new(
            self.begin().max(other.begin()),
            self.end().min(other.end()),
        ))
    }

    /// Clamp both ends into `bounds`, preserving direction.
    pub fn clip(&self, bounds: Region) -> Region {
        Region::new(
            clamp(bounds.begin(), bounds.end(), self.a),
            clamp(bounds.begin(), bounds.end(), self.b),
        )
    }

    /// The same span with `a` and `b` swapped.
    pub fn reversed(&self) -> Region {
        Region::new(self.b, self.a)
    }

    /// The covered span as a half-open range.
    pub fn range(&self) -> Range<usize> {
        self.begin()..self.end()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

impl From<(usize, usize)> for Region {
    fn from((a, b): (usize, usize)) -> Self {
        Region::new(a, b)
    }
}

impl From<Region> for (usize, usize) {
    fn from(region: Region) -> Self {
        (region.a, region.b)
    }
}

impl From<Range<usize>> for Region {
    fn from(range: Range<usize>) -> Self {
        Region::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0, 10, 5), 5);
        assert_eq!(clamp(0, 10, 15), 10);
        assert_eq!(clamp(3, 10, 1), 3);
        // Degenerate bounds prefer the lower one.
        assert_eq!(clamp(5, 2, 4), 5);
    }

    #[test]
    fn test_begin_end_size() {
        let r = Region::new(10, 3);
        assert_eq!(r.begin(), 3);
        assert_eq!(r.end(), 10);
        assert_eq!(r.size(), 7);
        assert!(r.is_reversed());
        assert!(!r.is_empty());
        assert!(Region::point(4).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Region::new(2, 5);
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert!(!Region::point(3).contains(3));
    }

    #[test]
    fn test_intersects_includes_touching() {
        let r = Region::new(5, 10);
        assert!(r.intersects(Region::new(10, 12)));
        assert!(r.intersects(Region::new(0, 5)));
        assert!(r.intersects(Region::new(7, 8)));
        assert!(!r.intersects(Region::new(11, 12)));
        assert!(Region::point(3).intersects(Region::point(3)));
    }

    #[test]
    fn test_cover_and_intersection() {
        let r = Region::new(8, 2);
        assert_eq!(r.cover(Region::new(6, 12)), Region::new(2, 12));
        assert_eq!(r.intersection(Region::new(6, 12)), Some(Region::new(6, 8)));
        assert_eq!(r.intersection(Region::new(9, 12)), None);
        assert_eq!(r.intersection(Region::new(8, 12)), Some(Region::point(8)));
    }

    #[test]
    fn test_clip_preserves_direction() {
        let bounds = Region::new(0, 11);
        assert_eq!(Region::new(15, 3).clip(bounds), Region::new(11, 3));
        assert_eq!(Region::new(12, 12).clip(bounds), Region::point(11));
    }

    #[test]
    fn test_conversions() {
        let r: Region = (4, 1).into();
        assert_eq!(r, Region::new(4, 1));
        let pair: (usize, usize) = r.into();
        assert_eq!(pair, (4, 1));
        assert_eq!(Region::from(2..6), Region::new(2, 6));
        assert_eq!(Region::new(6, 2).range(), 2..6);
        assert_eq!(r.to_string(), "(4, 1)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_as_pair() {
        let json = serde_json::to_string(&Region::new(7, 3)).unwrap();
        assert_eq!(json, "[7,3]");
        let back: Region = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(back, Region::new(1, 2));
    }
}
