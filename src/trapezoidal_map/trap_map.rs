use anyhow::{bail, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use smallvec::{smallvec, SmallVec};

use crate::geometry::{Point, Positioning, Segment};
use crate::point_locator::PointLocator;
use crate::trapezoidal_map::search::{NodeData, SearchDag};
use crate::trapezoidal_map::trapezoids::{BoundingBox, Trapezoid, Trapezoids};

/// Trapezoidal map data structure.
///
/// The map subdivides a bounding region into trapezoids, using the pairwise non-crossing
/// segments inserted so far as boundaries. It is made of two mutually synchronized parts:
/// the arena owning the trapezoids, and a directed acyclic search structure whose inner
/// nodes are decisions (on a vertex x-coordinate or on the side of a segment) and whose
/// leaves reference live trapezoids.
///
/// This data structure is one of four known ones that have the optimal *O*(log(*n*)) search
/// time with *O*(*n*) storage, although in the case of the trapezoidal map those are
/// *expected* results (see [De Berg et al.]).
///
/// The construction is *randomized incremental*: segments are added one at a time, and at
/// each step the search structure answers point-location queries for the subdivision built
/// so far. Adding a segment finds the trapezoids it crosses using said search structure,
/// splits them around the segment, and merges the halves that no vertex separates. Shuffling
/// the segments before insertion is really important for the performance of the resulting
/// data structure, which is what [`TrapMap::from_segments`] does.
///
/// [De Berg et al.]: https://doi.org/10.1007/978-3-540-77974-2
#[derive(Debug)]
pub struct TrapMap {
    traps: Trapezoids,
    dag: SearchDag,
    bbox: BoundingBox,
}

impl TrapMap {
    /// Creates a trapezoidal map covering `bbox`, with a single trapezoid and a single
    /// search leaf.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            traps: Trapezoids::new(&bbox),
            dag: SearchDag::new(0),
            bbox,
        }
    }

    /// Creates a trapezoidal map covering the unit square.
    pub fn empty() -> Self {
        Self::new(BoundingBox::default())
    }

    /// Creates a trapezoidal map from a set of segments.
    ///
    /// The segments are shuffled with a fixed seed before insertion (this is a randomized
    /// incremental algorithm after all!), so the expected-logarithmic query bound holds
    /// regardless of the order in which the caller produced them.
    pub fn from_segments<I>(bbox: BoundingBox, segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut segments: Vec<_> = segments.into_iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        segments.shuffle(&mut rng);

        let mut trap_map = Self::new(bbox);
        for segment in segments {
            trap_map.insert(segment)?;
        }
        Ok(trap_map)
    }

    /// Inserts a segment, splitting every trapezoid it crosses and updating the search
    /// structure accordingly.
    ///
    /// The segment must not cross any previously inserted segment, must not be vertical, and
    /// its endpoints must not lie in the interior of an existing segment (they may coincide
    /// with existing endpoints). Vertical and out-of-bounds segments are rejected with an
    /// error; the other preconditions are the caller's responsibility.
    pub fn insert(&mut self, segment: Segment) -> Result<()> {
        let s = segment.oriented();
        if s.p.x == s.q.x {
            bail!("Vertical segments are not supported.");
        }
        if !(self.bbox.contains(s.p) && self.bbox.contains(s.q)) {
            bail!("Segment endpoints should lie inside the bounding box.");
        }

        let trap_ids = self.follow_segment(s);
        if let [single] = trap_ids.as_slice() {
            self.insert_in_one(s, *single);
        } else {
            self.insert_across(s, &trap_ids);
        }
        Ok(())
    }

    /// Finds the trapezoid containing `point`.
    ///
    /// `tiebreak` is only consulted when `point` coincides with the left endpoint of an
    /// inserted segment: the descent then tests `tiebreak` against that segment instead,
    /// resolving the ambiguity in the direction `point -> tiebreak`. For a plain query use
    /// the point itself as tie-break.
    pub fn locate(&self, point: Point, tiebreak: Point) -> usize {
        self.dag.locate(point, tiebreak)
    }

    /// A shared reference to the trapezoid at `idx`.
    pub fn trap(&self, idx: usize) -> &Trapezoid {
        self.traps.get(idx)
    }

    /// An iterator over the live trapezoids and their indices, skipping the pending free
    /// slot if any.
    pub fn iter_traps(&self) -> impl Iterator<Item = (usize, &Trapezoid)> {
        self.traps.iter()
    }

    /// The number of live trapezoids.
    pub fn trap_count(&self) -> usize {
        self.traps.len() - usize::from(self.traps.free_slot().is_some())
    }

    /// The number of slots in the arena, including the pending free slot if any.
    pub fn slot_count(&self) -> usize {
        self.traps.len()
    }

    /// The slot freed by the most recent merge, if it has not been reused yet.
    pub fn free_slot(&self) -> Option<usize> {
        self.traps.free_slot()
    }

    /// The bounding box the map was created with.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Removes every segment, restoring the single-trapezoid, single-leaf initial state.
    pub fn clear(&mut self) {
        self.traps.clear();
        self.dag.clear(0);
    }

    /// The ordered list of trapezoids crossed by `s`, from left to right.
    ///
    /// Starts at the trapezoid containing the left endpoint, then repeatedly moves to the
    /// lower- or upper-right neighbor depending on which side of the segment the current
    /// trapezoid's right point lies, until the right endpoint is reached.
    fn follow_segment(&self, s: Segment) -> SmallVec<[usize; 4]> {
        let mut trap_ids: SmallVec<[usize; 4]> = smallvec![self.dag.locate(s.p, s.q)];

        let mut trap = self.traps.get(trap_ids[0]);
        while s.q.x > trap.rightp.x {
            let rightp_above_s = !matches!(trap.rightp.position(s.p, s.q), Positioning::Right);
            let next = if rightp_above_s {
                trap.lower_right
                    .expect("There should be a lower right trap")
            } else {
                trap.upper_right
                    .expect("There should be an upper right trap")
            };
            trap_ids.push(next);
            trap = self.traps.get(next);
        }

        trap_ids
    }

    /// Splits the single trapezoid containing the whole segment.
    ///
    /// The old trapezoid is replaced by 2, 3 or 4 new ones, depending on whether the
    /// segment's endpoints coincide with the old trapezoid's left and right points or not.
    fn insert_in_one(&mut self, s: Segment, target: usize) {
        let old = self.traps.get(target).clone();
        let old_leaf = old.dag_link.expect("Live trapezoids have a search leaf");

        if old.leftp == s.p {
            if old.rightp == s.q {
                let pair = self.traps.split2(target, s, None, None);
                self.dag.split2(&mut self.traps, s, old_leaf, pair);
            } else {
                let triple = self.traps.split3_right(target, s, None, None);
                self.dag.split3_right(&mut self.traps, s, old_leaf, triple);
            }
        } else if old.rightp == s.q {
            let triple = self.traps.split3_left(target, s);
            self.dag.split3_left(&mut self.traps, s, old_leaf, triple);
        } else {
            let quad = self.traps.split4(target, s);
            self.dag.split4(&mut self.traps, s, old_leaf, quad);
        }
    }

    /// Splits every trapezoid crossed by a segment spanning several of them.
    ///
    /// The first trapezoid gets a left-boundary split, each interior one a 2-way split, and
    /// the last one a right-boundary split. From the second trapezoid on, the half lying on
    /// the side where no vertex separates it from the previous trapezoid's half is merged
    /// with it: that is the case for the top halves exactly when the previous trapezoid's
    /// recorded upper-right neighbor is the trapezoid being split, and for the bottom halves
    /// otherwise. Every arena split is immediately followed by the matching search-structure
    /// update, so the two stay synchronized step by step.
    fn insert_across(&mut self, s: Segment, trap_ids: &[usize]) {
        let first = trap_ids[0];
        let mut prev = self.traps.get(first).clone();
        let old_leaf = prev.dag_link.expect("Live trapezoids have a search leaf");

        let mut prev_top;
        let mut prev_bot;
        if prev.leftp == s.p {
            let pair = self.traps.split2(first, s, None, None);
            self.dag.split2(&mut self.traps, s, old_leaf, pair);
            prev_top = pair[0];
            prev_bot = pair[1];
        } else {
            let triple = self.traps.split3_left(first, s);
            self.dag.split3_left(&mut self.traps, s, old_leaf, triple);
            prev_top = triple[1];
            prev_bot = triple[2];
        }

        for (pos, &target) in trap_ids.iter().enumerate().skip(1) {
            let merge_top = prev.upper_right == Some(target);
            let replaced = self.traps.get(target).clone();
            let old_leaf = replaced
                .dag_link
                .expect("Live trapezoids have a search leaf");
            let last = pos == trap_ids.len() - 1;

            if !last || replaced.rightp == s.q {
                let [mut top, mut bot] =
                    self.traps
                        .split2(target, s, Some(prev_top), Some(prev_bot));
                self.merge_halves(merge_top, &mut top, &mut bot);
                self.dag.split2(&mut self.traps, s, old_leaf, [top, bot]);
                prev_top = top;
                prev_bot = bot;
            } else {
                let [mut top, mut bot, cap] =
                    self.traps
                        .split3_right(target, s, Some(prev_top), Some(prev_bot));
                self.merge_halves(merge_top, &mut top, &mut bot);
                self.dag
                    .split3_right(&mut self.traps, s, old_leaf, [top, bot, cap]);
            }

            prev = replaced;
        }
    }

    /// Merges one of the freshly split halves with the matching half from the previous split.
    fn merge_halves(&mut self, merge_top: bool, top: &mut usize, bot: &mut usize) {
        if merge_top {
            let kept = self
                .traps
                .get(*top)
                .lower_left
                .expect("The previous top half should be recorded as a neighbor");
            self.traps.merge(kept, *top);
            *top = kept;
        } else {
            let kept = self
                .traps
                .get(*bot)
                .upper_left
                .expect("The previous bottom half should be recorded as a neighbor");
            self.traps.merge(kept, *bot);
            *bot = kept;
        }
    }

    /// Checks the structural invariants of the map.
    ///
    /// This is meant for debugging purposes.
    ///
    /// # Panics
    ///
    /// Panics if a trapezoid's boundary points are out of order, if a neighbor link is not
    /// reciprocated or does not share the claimed boundary, or if the search structure has an
    /// inner node without two children, a leaf that is not a trapezoid node, or a leaf out of
    /// sync with the arena.
    pub fn check(&self) {
        for (idx, trap) in self.traps.iter() {
            assert!(
                trap.leftp.x <= trap.rightp.x,
                "Boundary points should be ordered"
            );

            for (neighbor, shares_top, backlink) in [
                (trap.upper_right, true, false),
                (trap.lower_right, false, false),
                (trap.upper_left, true, true),
                (trap.lower_left, false, true),
            ] {
                let Some(other_idx) = neighbor else {
                    continue;
                };
                let other = self.traps.get(other_idx);
                if backlink {
                    assert_eq!(other.rightp, trap.leftp, "Neighbors should share a boundary");
                } else {
                    assert_eq!(other.leftp, trap.rightp, "Neighbors should share a boundary");
                }
                if shares_top {
                    assert_eq!(other.top, trap.top, "Upper neighbors should share their top");
                } else {
                    assert_eq!(other.bot, trap.bot, "Lower neighbors should share their bot");
                }
                let back = match (shares_top, backlink) {
                    (true, false) => other.upper_left,
                    (false, false) => other.lower_left,
                    (true, true) => other.upper_right,
                    (false, true) => other.lower_right,
                };
                assert_eq!(back, Some(idx), "Neighbor links should be reciprocal");
            }

            let leaf = trap.dag_link.expect("Live trapezoids should have a leaf");
            let node = self.dag.node(leaf);
            assert_eq!(node.data, NodeData::Trap(idx), "Leaves should be in sync");
            assert!(node.children.is_empty(), "Leaves should not have children");
        }

        for node in self.dag.iter() {
            if node.children.is_empty() {
                assert!(
                    matches!(node.data, NodeData::Trap(..)),
                    "All leaf nodes should be trapezoids"
                );
            } else {
                assert_eq!(
                    node.children.len(),
                    2,
                    "Decision nodes should have 2 children"
                );
            }
        }
    }

    /// Returns the number of x-nodes in the search structure.
    pub fn x_node_count(&self) -> usize {
        self.dag
            .iter()
            .filter(|node| matches!(node.data, NodeData::X(..)))
            .count()
    }

    /// Returns the number of y-nodes in the search structure.
    pub fn y_node_count(&self) -> usize {
        self.dag
            .iter()
            .filter(|node| matches!(node.data, NodeData::Y(..)))
            .count()
    }

    /// Returns the number of leaves in the search structure.
    pub fn leaf_count(&self) -> usize {
        self.dag
            .iter()
            .filter(|node| matches!(node.data, NodeData::Trap(..)))
            .count()
    }

    /// Returns the number of (x, y, leaf) nodes in the search structure.
    pub fn node_count(&self) -> (usize, usize, usize) {
        self.dag.iter().fold(
            (0, 0, 0),
            |(mut x_count, mut y_count, mut leaf_count), node| {
                match node.data {
                    NodeData::X(..) => x_count += 1,
                    NodeData::Y(..) => y_count += 1,
                    NodeData::Trap(..) => leaf_count += 1,
                };
                (x_count, y_count, leaf_count)
            },
        )
    }

    /// Prints some statistics of the search structure.
    ///
    /// Useful for debugging purposes.
    ///
    /// These statistics are:
    /// - Number of x-, y- and leaf nodes
    /// - Average and max leaf depth
    pub fn print_stats(&self) {
        let (x_node_count, y_node_count, leaf_count) = self.node_count();
        println!(
            "Trapezoidal map counts:\n\t{} X node(s)\n\t{} Y node(s)\n\t{} trapezoid(s)",
            x_node_count, y_node_count, leaf_count,
        );
        println!();
        let (avg, max) = self.depth_stats();
        println!("Depth:\n\tmax {}\n\taverage {}", max, avg);
    }

    fn depth_stats(&self) -> (f64, usize) {
        let mut leaf_count = 0;
        let mut avg = 0;
        let mut max = 0;
        for (idx, node) in self.dag.iter().enumerate() {
            if matches!(node.data, NodeData::Trap(..)) {
                leaf_count += 1;
                let depth = self
                    .dag
                    .depth(idx)
                    .expect("Should be in the DAG and have a depth");
                avg += depth;
                if depth > max {
                    max = depth;
                }
            }
        }
        let avg = avg as f64 / leaf_count as f64;
        (avg, max)
    }
}

impl PointLocator for TrapMap {
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize> {
        let point = Point::from(point);
        if !self.bbox.contains(point) {
            return None;
        }
        Some(self.locate(point, point))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    prop_compose! {
        fn coords_in_range(xmin: f64, xmax: f64, ymin: f64, ymax: f64)
                          (x in xmin..xmax, y in ymin..ymax) -> [f64; 2] {
           [x, y]
        }
    }

    fn ten_by_ten() -> BoundingBox {
        BoundingBox::new(0., 10., 0., 10.).unwrap()
    }

    #[test]
    fn initialize_empty_trapezoidal_map() {
        let trap_map = TrapMap::empty();

        assert_eq!(trap_map.trap_count(), 1);
        assert_eq!(trap_map.leaf_count(), 1);
        assert_eq!(trap_map.free_slot(), None);
        trap_map.check();
    }

    #[test]
    fn locate_one_in_empty_trapezoidal_map() {
        let trap_map = TrapMap::empty();

        assert_eq!(trap_map.locate_one(&[0.5, 0.5]), Some(0));
        assert_eq!(trap_map.locate_one(&[1.5, 0.5]), None);
        assert_eq!(trap_map.locate_one(&[0.5, -0.5]), None);
    }

    #[test]
    fn reject_invalid_segments() {
        let mut trap_map = TrapMap::new(ten_by_ten());

        // Vertical
        assert!(trap_map.insert(Segment::new([2., 1.], [2., 5.])).is_err());
        // Out of bounds
        assert!(trap_map.insert(Segment::new([-1., 1.], [5., 5.])).is_err());
        // The map is left untouched
        assert_eq!(trap_map.trap_count(), 1);
    }

    #[test]
    fn insert_a_segment_interior_to_a_trapezoid() -> Result<()> {
        // The segment touches neither the left nor the right boundary, so the trapezoid is
        // split in 4
        let mut trap_map = TrapMap::new(ten_by_ten());

        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;

        assert_eq!(trap_map.trap_count(), 4);
        assert_eq!(trap_map.x_node_count(), 2);
        assert_eq!(trap_map.y_node_count(), 1);
        assert_eq!(trap_map.leaf_count(), 4);

        // The leftmost cell is capped by the segment's left endpoint, the rightmost one by
        // its right endpoint
        let leftmost = trap_map
            .iter_traps()
            .min_by(|(_, a), (_, b)| a.rightp.x.total_cmp(&b.rightp.x))
            .map(|(_, t)| t)
            .unwrap();
        assert_eq!(leftmost.rightp, Point::new(3., 3.));
        let rightmost = trap_map
            .iter_traps()
            .max_by(|(_, a), (_, b)| a.leftp.x.total_cmp(&b.leftp.x))
            .map(|(_, t)| t)
            .unwrap();
        assert_eq!(rightmost.leftp, Point::new(7., 7.));

        trap_map.check();

        Ok(())
    }

    #[test]
    fn insert_a_segment_sharing_its_left_endpoint() -> Result<()> {
        // The second segment starts at an existing vertex, so there is no left cap and the
        // trapezoid is split in 3
        let mut trap_map = TrapMap::new(ten_by_ten());
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;

        trap_map.insert(Segment::new([7., 7.], [9., 2.]))?;

        assert_eq!(trap_map.trap_count(), 6);
        assert_eq!(trap_map.x_node_count(), 3);
        assert_eq!(trap_map.y_node_count(), 2);
        assert_eq!(trap_map.free_slot(), None);
        trap_map.check();

        Ok(())
    }

    #[test]
    fn insert_a_segment_crossing_two_trapezoids() -> Result<()> {
        // The segment spans two cells; the bottom halves face each other across the crossing
        // with no vertex in between, so they are merged and the freed slot stays pending at
        // the end of the insertion
        let mut trap_map = TrapMap::new(ten_by_ten());
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;

        trap_map.insert(Segment::new([1., 2.], [5., 1.]))?;

        // 2 + 2 new trapezoids, 1 merged away
        assert_eq!(trap_map.slot_count(), 8);
        assert_eq!(trap_map.free_slot(), Some(7));
        assert_eq!(trap_map.trap_count(), 7);
        assert_eq!(trap_map.x_node_count(), 4);
        assert_eq!(trap_map.y_node_count(), 3);
        assert_eq!(trap_map.leaf_count(), 7);
        trap_map.check();

        Ok(())
    }

    #[test]
    fn two_merges_within_one_insertion() -> Result<()> {
        // The segment passes below the existing vertices and crosses 3 cells, so both the
        // interior and the last split trigger a merge. The slot freed by the first merge is
        // consumed by the allocation of the next split, so a single pending slot suffices.
        let mut trap_map = TrapMap::new(ten_by_ten());
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;

        trap_map.insert(Segment::new([1., 2.], [9., 1.]))?;

        assert_eq!(trap_map.slot_count(), 8);
        assert_eq!(trap_map.free_slot(), Some(7));
        assert_eq!(trap_map.trap_count(), 7);
        assert_eq!(trap_map.x_node_count(), 4);
        assert_eq!(trap_map.y_node_count(), 4);
        assert_eq!(trap_map.leaf_count(), 7);
        trap_map.check();

        // The cell below the new segment spans its full length: its halves were merged
        let below = trap_map.locate(Point::new(5., 1.), Point::new(5., 1.));
        assert_eq!(trap_map.trap(below).leftp, Point::new(1., 2.));
        assert_eq!(trap_map.trap(below).rightp, Point::new(9., 1.));

        Ok(())
    }

    #[rstest]
    // A single interior segment: 4-way split
    #[case(&[[[3., 3.], [7., 7.]]], 4, 2, 1)]
    // Sharing the left endpoint of the second segment with an existing vertex: 3-way split
    #[case(&[[[3., 3.], [7., 7.]], [[7., 7.], [9., 2.]]], 6, 3, 2)]
    // Both endpoints shared: 2-way split
    #[case(
        &[[[2., 2.], [4., 4.]], [[6., 1.], [8., 3.]], [[4., 4.], [6., 1.]]],
        8, 4, 3
    )]
    fn split_cases(
        #[case] segments: &[[[f64; 2]; 2]],
        #[case] traps: usize,
        #[case] x_nodes: usize,
        #[case] y_nodes: usize,
    ) -> Result<()> {
        let mut trap_map = TrapMap::new(ten_by_ten());

        for [p, q] in segments {
            trap_map.insert(Segment::new(*p, *q))?;
        }

        assert_eq!(trap_map.trap_count(), traps);
        assert_eq!(trap_map.x_node_count(), x_nodes);
        assert_eq!(trap_map.y_node_count(), y_nodes);
        trap_map.check();

        Ok(())
    }

    #[test]
    fn locate_an_endpoint_with_different_tiebreaks() -> Result<()> {
        // Two queries on the same vertex must land in different cells when the tie-break
        // points represent segments departing in different directions
        let mut trap_map = TrapMap::new(ten_by_ten());
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;
        trap_map.insert(Segment::new([7., 7.], [9., 2.]))?;

        let vertex = Point::new(7., 7.);
        let above = trap_map.locate(vertex, Point::new(9., 9.));
        let below = trap_map.locate(vertex, Point::new(8., 0.));

        assert_ne!(above, below);
        assert_eq!(trap_map.trap(above).leftp, vertex);
        assert_eq!(trap_map.trap(below).leftp, vertex);

        Ok(())
    }

    #[test]
    fn locate_registered_endpoints() -> Result<()> {
        let mut trap_map = TrapMap::new(ten_by_ten());
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;
        trap_map.insert(Segment::new([7., 7.], [9., 2.]))?;

        for p in [Point::new(3., 3.), Point::new(7., 7.), Point::new(9., 2.)] {
            let idx = trap_map.locate(p, p);
            let trap = trap_map.trap(idx);
            assert!(
                trap.leftp == p || trap.rightp == p,
                "The cell at a registered endpoint should be bounded by it"
            );
        }

        Ok(())
    }

    #[test]
    fn clear_restores_the_initial_state() -> Result<()> {
        let bbox = ten_by_ten();
        let mut trap_map = TrapMap::new(bbox);
        trap_map.insert(Segment::new([3., 3.], [7., 7.]))?;
        trap_map.insert(Segment::new([1., 2.], [5., 1.]))?;

        trap_map.clear();

        let fresh = TrapMap::new(bbox);
        assert_eq!(trap_map.slot_count(), 1);
        assert_eq!(trap_map.free_slot(), None);
        assert_eq!(trap_map.leaf_count(), 1);
        assert_eq!(trap_map.trap(0), fresh.trap(0));
        assert_eq!(trap_map.locate_one(&[5., 5.]), fresh.locate_one(&[5., 5.]));
        trap_map.check();

        Ok(())
    }

    #[test]
    fn from_segments_shuffles_and_inserts_everything() -> Result<()> {
        let segments = vec![
            Segment::new([0.5, 2.1], [9.3, 2.9]),
            Segment::new([0.7, 4.2], [9.1, 4.8]),
            Segment::new([0.4, 6.1], [9.5, 6.9]),
            Segment::new([1.0, 8.2], [8.9, 8.6]),
        ];

        let trap_map = TrapMap::from_segments(ten_by_ten(), segments)?;

        trap_map.check();
        // A map of n segments in general position has 3n + 1 cells and 2n x-nodes, whatever
        // the insertion order
        assert_eq!(trap_map.trap_count(), 13);
        assert_eq!(trap_map.x_node_count(), 8);
        assert_eq!(trap_map.leaf_count(), trap_map.trap_count());

        Ok(())
    }

    #[test]
    fn locate_many_matches_par_locate_many() -> Result<()> {
        let segments = vec![
            Segment::new([0.5, 2.1], [9.3, 2.9]),
            Segment::new([0.7, 4.2], [9.1, 4.8]),
        ];
        let trap_map = TrapMap::from_segments(ten_by_ten(), segments)?;
        let points = vec![[1., 1.], [5., 3.5], [8., 9.], [11., 1.]];

        assert_eq!(
            trap_map.locate_many(&points),
            trap_map.par_locate_many(&points)
        );

        Ok(())
    }

    #[test]
    fn trapezoidal_map_proptest() -> Result<()> {
        let (xmin, xmax) = (0., 10.);
        let (ymin, ymax) = (0., 10.);

        let segments = vec![
            Segment::new([0.5, 2.1], [9.3, 2.9]),
            Segment::new([0.7, 4.2], [9.1, 4.8]),
            Segment::new([0.4, 6.1], [9.5, 6.9]),
            Segment::new([1.0, 8.2], [8.9, 8.6]),
        ];
        let trap_map = TrapMap::from_segments(BoundingBox::new(xmin, xmax, ymin, ymax)?, segments)?;
        trap_map.check();

        // Select the number of points generated. The higher it is, the more time the test takes.
        let np = 20;
        proptest!(|(points in proptest::collection::vec(coords_in_range(xmin, xmax, ymin, ymax), np))| {
            for point in &points {
                let Some(idx) = trap_map.locate_one(point) else {
                    panic!("All points should be in a trapezoid but {:?} is not", point);
                };

                // Check the result using the winding number
                let corners = trap_map.trap(idx).corners();
                assert!(Point::from(point).is_inside(corners));
            }
        });

        Ok(())
    }
}
