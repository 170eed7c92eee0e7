//! Normalized region collections that follow buffer edits.
//!
//! A [`RegionSet`] is kept sorted by `(begin, end)` and never holds two members that overlap or
//! touch: after every mutation such members are merged into their covering union. Attached to a
//! [`Buffer`] (see [`RegionSet::attach`]) it adjusts itself on every edit so cursors, selections and
//! markers stay where the user expects them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::buffer::{Buffer, SubscriptionId};
use crate::region::Region;

/// A region set shared between its owner and the buffer subscription that keeps it current.
pub type SharedRegionSet = Rc<RefCell<RegionSet>>;

/// A sorted set of disjoint, non-adjacent regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region and renormalize.
    pub fn add(&mut self, region: Region) {
        self.regions.push(region);
        self.normalize();
    }

    /// Add several regions and renormalize once.
    pub fn add_all(&mut self, regions: impl IntoIterator<Item = Region>) {
        self.regions.extend(regions);
        self.normalize();
    }

    /// Remove every region.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` if the set holds no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region at `index` in sorted order.
    pub fn get(&self, index: usize) -> Option<Region> {
        self.regions.get(index).copied()
    }

    /// The regions in sorted order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Iterate over the regions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.iter().copied()
    }

    /// `true` if some member equals `region` or covers both of its ends.
    pub fn contains(&self, region: Region) -> bool {
        self.regions
            .iter()
            .any(|member| *member == region || member.covers(region))
    }

    /// Shift every endpoint for a buffer change of `delta` codepoints reported at `position`.
    ///
    /// Endpoints at or after `position` move by `delta`. Endpoints before it that fall inside a
    /// deleted span (`position + delta < endpoint`) collapse onto the deletion point.
    pub fn adjust(&mut self, position: usize, delta: isize) {
        let floor = position.saturating_add_signed(delta);
        let shift = |point: usize| {
            if point >= position {
                point.saturating_add_signed(delta)
            } else if floor < point {
                floor
            } else {
                point
            }
        };
        for region in &mut self.regions {
            region.a = shift(region.a);
            region.b = shift(region.b);
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.regions.sort_by_key(|r| (r.begin(), r.end()));
        let mut merged: Vec<Region> = Vec::with_capacity(self.regions.len());
        for region in self.regions.drain(..) {
            match merged.last_mut() {
                Some(last) if *last == region => {}
                Some(last) if last.intersects(region) => *last = last.cover(region),
                _ => merged.push(region),
            }
        }
        self.regions = merged;
    }

    /// Move this set behind a shared handle and subscribe it to `buffer`'s changes.
    ///
    /// The buffer only holds a weak link: once every [`SharedRegionSet`] handle is dropped the
    /// subscription stays registered but does nothing.
    pub fn attach(self, buffer: &mut Buffer) -> SharedRegionSet {
        let (shared, _) = self.attach_with_id(buffer);
        shared
    }

    /// Like [`attach`](Self::attach), also returning the subscription for explicit removal.
    pub fn attach_with_id(self, buffer: &mut Buffer) -> (SharedRegionSet, SubscriptionId) {
        let shared = Rc::new(RefCell::new(self));
        let link: Weak<RefCell<RegionSet>> = Rc::downgrade(&shared);
        let id = buffer.subscribe(move |position, delta| {
            if let Some(set) = link.upgrade() {
                set.borrow_mut().adjust(position, delta);
            }
        });
        (shared, id)
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut set = RegionSet::new();
        set.add_all(iter);
        set
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
