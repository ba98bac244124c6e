use anyhow::{anyhow, Result};

use crate::geometry::{Point, Segment};

/// An axis-aligned bounding box, the initial full region of a trapezoidal map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Constructs a new `BoundingBox`.
    ///
    /// Fails if the bounds are not strictly increasing on both axes.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        if xmin >= xmax || ymin >= ymax {
            return Err(anyhow!("The bounds should be strictly increasing."));
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Returns `true` if `point` lies inside the box or on its boundary.
    pub fn contains(&self, point: Point) -> bool {
        (self.xmin..=self.xmax).contains(&point.x) && (self.ymin..=self.ymax).contains(&point.y)
    }

    /// The single trapezoid covering the whole box: its top and bottom edges as supporting
    /// segments, the bottom-left corner as left point and the top-right corner as right point.
    pub(crate) fn as_trapezoid(&self) -> Trapezoid {
        Trapezoid::new(
            Segment::new([self.xmin, self.ymax], [self.xmax, self.ymax]),
            Segment::new([self.xmin, self.ymin], [self.xmax, self.ymin]),
            Point::new(self.xmin, self.ymin),
            Point::new(self.xmax, self.ymax),
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            xmin: 0.,
            xmax: 1.,
            ymin: 0.,
            ymax: 1.,
        }
    }
}

/// A cell of the trapezoidal map.
///
/// A trapezoid is bounded by one segment above (`top`), one below (`bot`), and two vertical
/// lines through `leftp` and `rightp`. It can have up to four neighbors, one per corner, each
/// sharing the corresponding vertical boundary. `dag_link` is the index of the search-structure
/// leaf that currently represents this trapezoid; it is `None` only for freshly split cells,
/// between an arena split and the matching search-structure update.
#[derive(Debug, Clone, PartialEq)]
pub struct Trapezoid {
    pub top: Segment,
    pub bot: Segment,
    pub leftp: Point,
    pub rightp: Point,
    pub upper_left: Option<usize>,
    pub upper_right: Option<usize>,
    pub lower_left: Option<usize>,
    pub lower_right: Option<usize>,
    pub(crate) dag_link: Option<usize>,
}

impl Trapezoid {
    pub(crate) fn new(top: Segment, bot: Segment, leftp: Point, rightp: Point) -> Self {
        Self {
            top,
            bot,
            leftp,
            rightp,
            upper_left: None,
            upper_right: None,
            lower_left: None,
            lower_right: None,
            dag_link: None,
        }
    }

    /// The corners of the trapezoid in counter-clockwise order, starting from the bottom-left
    /// one.
    ///
    /// Cells capped by a vertex on one side degenerate into triangles; the two coincident
    /// corners are still both reported.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.leftp.x, self.bot.y_at(self.leftp.x)),
            Point::new(self.rightp.x, self.bot.y_at(self.rightp.x)),
            Point::new(self.rightp.x, self.top.y_at(self.rightp.x)),
            Point::new(self.leftp.x, self.top.y_at(self.leftp.x)),
        ]
    }
}

/// The arena owning all the trapezoids of a map.
///
/// Trapezoids are kept in a [`Vec`] and referenced by index. A merge logically deletes one
/// trapezoid; its slot is remembered in `free_slot` and handed out again by the next
/// allocation, so the arena stays dense instead of growing by one slot per merge. At most one
/// slot is ever pending: a merge is always followed within the same insertion either by an
/// allocation or by the end of the insertion.
#[derive(Debug)]
pub(crate) struct Trapezoids {
    traps: Vec<Trapezoid>,
    free_slot: Option<usize>,
    initial: Trapezoid,
}

impl Trapezoids {
    /// Initializes the arena with a single trapezoid covering `bbox`, linked to search node 0.
    pub(crate) fn new(bbox: &BoundingBox) -> Self {
        let initial = bbox.as_trapezoid();
        let mut first = initial.clone();
        first.dag_link = Some(0);
        Self {
            traps: vec![first],
            free_slot: None,
            initial,
        }
    }

    /// A shared reference to the trapezoid at `idx`.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range index: that is a broken invariant of the insertion engine,
    /// not a runtime condition to recover from.
    pub(crate) fn get(&self, idx: usize) -> &Trapezoid {
        &self.traps[idx]
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Trapezoid {
        &mut self.traps[idx]
    }

    /// Replaces the trapezoid at `idx` with `trap`.
    fn update(&mut self, idx: usize, trap: Trapezoid) {
        self.traps[idx] = trap;
    }

    /// Adds a trapezoid to the arena and returns its index.
    ///
    /// Reuses the slot freed by the last merge if there is one.
    fn add(&mut self, trap: Trapezoid) -> usize {
        match self.free_slot.take() {
            Some(idx) => {
                self.traps[idx] = trap;
                idx
            }
            None => {
                self.traps.push(trap);
                self.traps.len() - 1
            }
        }
    }

    /// The number of slots in the arena, including the pending free slot if any.
    pub(crate) fn len(&self) -> usize {
        self.traps.len()
    }

    /// An iterator over the live trapezoids and their indices, skipping the pending free slot
    /// if any.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &Trapezoid)> {
        let free_slot = self.free_slot;
        self.traps
            .iter()
            .enumerate()
            .filter(move |(idx, _)| Some(*idx) != free_slot)
    }

    /// The slot freed by the most recent merge, if it has not been reused yet.
    pub(crate) fn free_slot(&self) -> Option<usize> {
        self.free_slot
    }

    /// Discards every trapezoid and reinstalls the initial full-region one at index 0.
    pub(crate) fn clear(&mut self) {
        self.traps.clear();
        let mut first = self.initial.clone();
        first.dag_link = Some(0);
        self.traps.push(first);
        self.free_slot = None;
    }

    /// Splits the trapezoid at `target` in 4 around a segment lying fully in its interior.
    ///
    /// The left cap keeps `target`'s index; the returned indices are
    /// `[left cap, top, bottom, right cap]`. All neighbor links, including the back-pointers of
    /// `target`'s pre-existing right neighbors, are rewired.
    pub(crate) fn split4(&mut self, target: usize, s: Segment) -> [usize; 4] {
        let origin = self.traps[target].clone();

        let t1 = Trapezoid::new(origin.top, origin.bot, origin.leftp, s.p);
        let t2 = Trapezoid::new(origin.top, s, s.p, s.q);
        let t3 = Trapezoid::new(s, origin.bot, s.p, s.q);
        let t4 = Trapezoid::new(origin.top, origin.bot, s.q, origin.rightp);

        self.update(target, t1);
        let t1_idx = target;
        let t2_idx = self.add(t2);
        let t3_idx = self.add(t3);
        let t4_idx = self.add(t4);

        let cap_l = &mut self.traps[t1_idx];
        cap_l.upper_left = origin.upper_left;
        cap_l.lower_left = origin.lower_left;
        cap_l.upper_right = Some(t2_idx);
        cap_l.lower_right = Some(t3_idx);

        let top = &mut self.traps[t2_idx];
        top.upper_left = Some(t1_idx);
        top.upper_right = Some(t4_idx);

        let bot = &mut self.traps[t3_idx];
        bot.lower_left = Some(t1_idx);
        bot.lower_right = Some(t4_idx);

        let cap_r = &mut self.traps[t4_idx];
        cap_r.upper_left = Some(t2_idx);
        cap_r.lower_left = Some(t3_idx);
        cap_r.upper_right = origin.upper_right;
        cap_r.lower_right = origin.lower_right;

        // The old right neighbors now face the right cap
        if let Some(idx) = origin.upper_right {
            self.traps[idx].upper_left = Some(t4_idx);
        }
        if let Some(idx) = origin.lower_right {
            self.traps[idx].lower_left = Some(t4_idx);
        }

        [t1_idx, t2_idx, t3_idx, t4_idx]
    }

    /// Splits the trapezoid at `target` in 3 around a segment whose right endpoint coincides
    /// with `target`'s right point.
    ///
    /// The left cap keeps `target`'s index; the returned indices are `[left cap, top, bottom]`.
    pub(crate) fn split3_left(&mut self, target: usize, s: Segment) -> [usize; 3] {
        let origin = self.traps[target].clone();

        let t1 = Trapezoid::new(origin.top, origin.bot, origin.leftp, s.p);
        let t2 = Trapezoid::new(origin.top, s, s.p, origin.rightp);
        let t3 = Trapezoid::new(s, origin.bot, s.p, origin.rightp);

        self.update(target, t1);
        let t1_idx = target;
        let t2_idx = self.add(t2);
        let t3_idx = self.add(t3);

        let cap = &mut self.traps[t1_idx];
        cap.upper_left = origin.upper_left;
        cap.lower_left = origin.lower_left;
        cap.upper_right = Some(t2_idx);
        cap.lower_right = Some(t3_idx);

        let top = &mut self.traps[t2_idx];
        top.upper_left = Some(t1_idx);
        top.upper_right = origin.upper_right;

        let bot = &mut self.traps[t3_idx];
        bot.lower_left = Some(t1_idx);
        bot.lower_right = origin.lower_right;

        if let Some(idx) = origin.upper_right {
            self.traps[idx].upper_left = Some(t2_idx);
        }
        if let Some(idx) = origin.lower_right {
            self.traps[idx].lower_left = Some(t3_idx);
        }

        [t1_idx, t2_idx, t3_idx]
    }

    /// Splits the trapezoid at `target` in 3 around a segment whose left endpoint coincides
    /// with `target`'s left point.
    ///
    /// The right cap keeps `target`'s index; the returned indices are `[top, bottom, right cap]`.
    /// `prev_top`/`prev_bot` are the halves produced by the previous split of a multi-cell
    /// insertion (or `None` on a single-cell insertion) and become the left neighbors of the new
    /// halves.
    pub(crate) fn split3_right(
        &mut self,
        target: usize,
        s: Segment,
        prev_top: Option<usize>,
        prev_bot: Option<usize>,
    ) -> [usize; 3] {
        let origin = self.traps[target].clone();

        let t1 = Trapezoid::new(origin.top, s, origin.leftp, s.q);
        let t2 = Trapezoid::new(s, origin.bot, origin.leftp, s.q);
        let t3 = Trapezoid::new(origin.top, origin.bot, s.q, origin.rightp);

        let t1_idx = self.add(t1);
        let t2_idx = self.add(t2);
        self.update(target, t3);
        let t3_idx = target;

        let top = &mut self.traps[t1_idx];
        top.upper_left = origin.upper_left;
        top.lower_left = prev_top;
        top.upper_right = Some(t3_idx);

        let bot = &mut self.traps[t2_idx];
        bot.upper_left = prev_bot;
        bot.lower_left = origin.lower_left;
        bot.lower_right = Some(t3_idx);

        let cap = &mut self.traps[t3_idx];
        cap.upper_left = Some(t1_idx);
        cap.lower_left = Some(t2_idx);
        cap.upper_right = origin.upper_right;
        cap.lower_right = origin.lower_right;

        if let Some(idx) = prev_top {
            self.traps[idx].lower_right = Some(t1_idx);
        }
        if let Some(idx) = prev_bot {
            self.traps[idx].upper_right = Some(t2_idx);
        }
        if let Some(idx) = origin.upper_left {
            self.traps[idx].upper_right = Some(t1_idx);
        }
        if let Some(idx) = origin.lower_left {
            self.traps[idx].lower_right = Some(t2_idx);
        }

        [t1_idx, t2_idx, t3_idx]
    }

    /// Splits the trapezoid at `target` in 2 around a segment crossing it from side to side.
    ///
    /// The top half keeps `target`'s index; the returned indices are `[top, bottom]`.
    /// `prev_top`/`prev_bot` as in [`Self::split3_right`].
    pub(crate) fn split2(
        &mut self,
        target: usize,
        s: Segment,
        prev_top: Option<usize>,
        prev_bot: Option<usize>,
    ) -> [usize; 2] {
        let origin = self.traps[target].clone();

        let t1 = Trapezoid::new(origin.top, s, origin.leftp, origin.rightp);
        let t2 = Trapezoid::new(s, origin.bot, origin.leftp, origin.rightp);

        self.update(target, t1);
        let t1_idx = target;
        let t2_idx = self.add(t2);

        let top = &mut self.traps[t1_idx];
        top.upper_left = origin.upper_left;
        top.upper_right = origin.upper_right;
        top.lower_left = prev_top;

        let bot = &mut self.traps[t2_idx];
        bot.upper_left = prev_bot;
        bot.lower_left = origin.lower_left;
        bot.lower_right = origin.lower_right;

        if let Some(idx) = prev_top {
            self.traps[idx].lower_right = Some(t1_idx);
        }
        if let Some(idx) = prev_bot {
            self.traps[idx].upper_right = Some(t2_idx);
        }
        // The bottom half took over the old lower boundary
        if let Some(idx) = origin.lower_left {
            self.traps[idx].lower_right = Some(t2_idx);
        }
        if let Some(idx) = origin.lower_right {
            self.traps[idx].lower_left = Some(t2_idx);
        }

        [t1_idx, t2_idx]
    }

    /// Merges two trapezoids facing each other on the same side of a segment being inserted.
    ///
    /// `right` is absorbed into `left`: the left one takes over the right one's right point and
    /// right neighbors, whose back-pointers are retargeted. `right`'s slot becomes the pending
    /// free slot.
    pub(crate) fn merge(&mut self, left: usize, right: usize) {
        let absorbed = self.traps[right].clone();

        self.free_slot = Some(right);

        let kept = &mut self.traps[left];
        kept.rightp = absorbed.rightp;
        kept.upper_right = absorbed.upper_right;
        kept.lower_right = absorbed.lower_right;

        if let Some(idx) = absorbed.upper_right {
            self.traps[idx].upper_left = Some(left);
        }
        if let Some(idx) = absorbed.lower_right {
            self.traps[idx].lower_left = Some(left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::default()
    }

    #[test]
    fn invalid_bounding_box_returns_error() {
        assert!(BoundingBox::new(1., 0., 0., 1.).is_err());
        assert!(BoundingBox::new(0., 1., 1., 1.).is_err());
    }

    #[test]
    fn initialize_arena_with_one_trapezoid() {
        let traps = Trapezoids::new(&unit_box());

        assert_eq!(traps.len(), 1);
        assert_eq!(traps.free_slot(), None);
        assert_eq!(traps.get(0).dag_link, Some(0));
        assert_eq!(traps.get(0).leftp, Point::new(0., 0.));
        assert_eq!(traps.get(0).rightp, Point::new(1., 1.));
    }

    #[test]
    fn split4_wires_all_neighbors() {
        let mut traps = Trapezoids::new(&unit_box());
        let s = Segment::new([0.25, 0.5], [0.75, 0.5]);

        let [cap_l, top, bot, cap_r] = traps.split4(0, s);

        assert_eq!(cap_l, 0);
        assert_eq!(traps.len(), 4);

        assert_eq!(traps.get(cap_l).upper_right, Some(top));
        assert_eq!(traps.get(cap_l).lower_right, Some(bot));
        assert_eq!(traps.get(top).upper_left, Some(cap_l));
        assert_eq!(traps.get(top).upper_right, Some(cap_r));
        assert_eq!(traps.get(bot).lower_left, Some(cap_l));
        assert_eq!(traps.get(bot).lower_right, Some(cap_r));
        assert_eq!(traps.get(cap_r).upper_left, Some(top));
        assert_eq!(traps.get(cap_r).lower_left, Some(bot));
        assert_eq!(traps.get(cap_r).upper_right, None);

        assert_eq!(traps.get(cap_l).rightp, s.p);
        assert_eq!(traps.get(cap_r).leftp, s.q);
        assert_eq!(traps.get(top).bot, s);
        assert_eq!(traps.get(bot).top, s);
    }

    #[test]
    fn merge_sets_the_free_slot_and_add_reuses_it() {
        let mut traps = Trapezoids::new(&unit_box());
        let s = Segment::new([0.25, 0.5], [0.75, 0.5]);
        let [_, top, _, cap_r] = traps.split4(0, s);

        traps.merge(top, cap_r);

        assert_eq!(traps.free_slot(), Some(cap_r));
        assert_eq!(traps.get(top).rightp, Point::new(1., 1.));

        // The next allocation consumes the pending slot
        let s2 = Segment::new([0.3, 0.45], [0.75, 0.5]);
        let [_, top2, bot2] = traps.split3_left(2, s2);
        assert_eq!(traps.free_slot(), None);
        assert_eq!(top2, cap_r);
        assert_eq!(bot2, 4);
        assert_eq!(traps.len(), 5);
    }

    #[test]
    fn clear_restores_the_initial_trapezoid() {
        let mut traps = Trapezoids::new(&unit_box());
        let fresh = traps.get(0).clone();
        traps.split4(0, Segment::new([0.25, 0.5], [0.75, 0.5]));

        traps.clear();

        assert_eq!(traps.len(), 1);
        assert_eq!(traps.free_slot(), None);
        assert_eq!(traps.get(0), &fresh);
    }

    #[test]
    fn trapezoid_corners() {
        let traps = Trapezoids::new(&unit_box());

        let corners = traps.get(0).corners();

        assert_eq!(
            corners,
            [
                Point::new(0., 0.),
                Point::new(1., 0.),
                Point::new(1., 1.),
                Point::new(0., 1.),
            ]
        );
    }
}
