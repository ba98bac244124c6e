use crate::geometry::{Point, Positioning, Segment};
use crate::trapezoidal_map::dag::{Dag, Node};
use crate::trapezoidal_map::trapezoids::Trapezoids;

/// A node of the search structure.
///
/// The inner nodes are decisions: `X` nodes compare the query point against a vertex
/// x-coordinate, `Y` nodes test on which side of a segment the query point falls. Leaves are
/// `Trap` nodes referencing a live trapezoid of the arena. Children live on the enclosing
/// [`Dag`] node: `children[0]` is the left (resp. above) side, `children[1]` the right
/// (resp. below) side.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NodeData {
    X(Point),
    Y(Segment),
    Trap(usize),
}

/// The search structure of a trapezoidal map.
///
/// The root is always node 0. Splitting rewrites the leaf of the replaced trapezoid in place
/// into the decision pattern of the split, so every path that used to reach the old trapezoid
/// now reaches the new ones without touching the parents. When a half produced by a previous
/// split survives a merge, its existing leaf is appended as a child again instead of being
/// duplicated, which is what makes the structure a DAG rather than a tree.
#[derive(Debug)]
pub(crate) struct SearchDag {
    dag: Dag<NodeData>,
}

impl SearchDag {
    /// Constructs the search structure of a fresh map: a single leaf for trapezoid
    /// `root_trap`.
    pub(crate) fn new(root_trap: usize) -> Self {
        let mut dag = Dag::new();
        dag.add(NodeData::Trap(root_trap));
        Self { dag }
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Node<NodeData>> {
        self.dag.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.dag.len()
    }

    /// A shared reference to the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range index.
    pub(crate) fn node(&self, idx: usize) -> &Node<NodeData> {
        self.dag.get(idx).expect("Should be a valid node")
    }

    pub(crate) fn depth(&self, idx: usize) -> Option<usize> {
        self.dag.depth(idx)
    }

    /// Restores the single-leaf initial state.
    pub(crate) fn clear(&mut self, root_trap: usize) {
        self.dag.clear();
        self.dag.add(NodeData::Trap(root_trap));
    }

    /// Finds the trapezoid containing `point` by descending from the root.
    ///
    /// `tiebreak` is only used when `point` coincides with the left endpoint of a segment
    /// stored in a `Y` node, which happens whenever the query point is itself the left endpoint
    /// of a segment being inserted at an already-placed vertex. The side test is then performed
    /// on `tiebreak` (the other endpoint of the incoming segment) instead, which resolves the
    /// ambiguity in the direction the new segment takes.
    pub(crate) fn locate(&self, point: Point, tiebreak: Point) -> usize {
        let mut node_id = 0;
        loop {
            let node = self.dag.get(node_id).expect("Should be a valid node");
            match &node.data {
                NodeData::Trap(idx) => return *idx,
                NodeData::X(vertex) => {
                    node_id = if point.x < vertex.x {
                        node.children[0]
                    } else {
                        node.children[1]
                    };
                }
                NodeData::Y(s) => {
                    let probe = if point == s.p { tiebreak } else { point };
                    let above = !matches!(probe.position(s.p, s.q), Positioning::Right);
                    node_id = if above {
                        node.children[0]
                    } else {
                        node.children[1]
                    };
                }
            }
        }
    }

    /// The leaf representing trapezoid `trap`, creating and linking a new one if the trapezoid
    /// does not have one yet.
    ///
    /// A trapezoid that kept its leaf through a merge gets that leaf appended again under the
    /// new decision nodes, sharing the subtree between several parents.
    fn leaf(&mut self, traps: &mut Trapezoids, trap: usize) -> usize {
        if let Some(leaf) = traps.get(trap).dag_link {
            leaf
        } else {
            let leaf = self.dag.add(NodeData::Trap(trap));
            traps.get_mut(trap).dag_link = Some(leaf);
            leaf
        }
    }

    /// Rewrites the leaf `old` to reflect a 4-way split: an `X` node on the segment's left
    /// endpoint, an `X` node on its right endpoint, and a `Y` node on the segment itself, with
    /// the four trapezoids `[left cap, top, bottom, right cap]` as leaves.
    pub(crate) fn split4(
        &mut self,
        traps: &mut Trapezoids,
        s: Segment,
        old: usize,
        t: [usize; 4],
    ) {
        self.dag.entry(old).and_modify(|data| *data = NodeData::X(s.p));
        let cap_l = self.leaf(traps, t[0]);
        self.dag.entry(old).append(cap_l);
        let qi = self
            .dag
            .entry(old)
            .append_new(NodeData::X(s.q))
            .expect("Should be a valid node");
        let si = self
            .dag
            .entry(qi)
            .append_new(NodeData::Y(s))
            .expect("Should be a valid node");
        let cap_r = self.leaf(traps, t[3]);
        self.dag.entry(qi).append(cap_r);
        let above = self.leaf(traps, t[1]);
        self.dag.entry(si).append(above);
        let below = self.leaf(traps, t[2]);
        self.dag.entry(si).append(below);
    }

    /// Rewrites the leaf `old` to reflect a 3-way split with a left cap:
    /// `X(segment.p)` branching to the cap leaf and to `Y(segment)` over the top/bottom leaves.
    pub(crate) fn split3_left(
        &mut self,
        traps: &mut Trapezoids,
        s: Segment,
        old: usize,
        t: [usize; 3],
    ) {
        self.dag.entry(old).and_modify(|data| *data = NodeData::X(s.p));
        let cap = self.leaf(traps, t[0]);
        self.dag.entry(old).append(cap);
        let si = self
            .dag
            .entry(old)
            .append_new(NodeData::Y(s))
            .expect("Should be a valid node");
        let above = self.leaf(traps, t[1]);
        self.dag.entry(si).append(above);
        let below = self.leaf(traps, t[2]);
        self.dag.entry(si).append(below);
    }

    /// Rewrites the leaf `old` to reflect a 3-way split with a right cap:
    /// `X(segment.q)` branching to `Y(segment)` over the top/bottom leaves and to the cap leaf.
    ///
    /// The top/bottom trapezoids may carry a leaf from a previous split step of the same
    /// insertion; those leaves are reused.
    pub(crate) fn split3_right(
        &mut self,
        traps: &mut Trapezoids,
        s: Segment,
        old: usize,
        t: [usize; 3],
    ) {
        self.dag.entry(old).and_modify(|data| *data = NodeData::X(s.q));
        let si = self
            .dag
            .entry(old)
            .append_new(NodeData::Y(s))
            .expect("Should be a valid node");
        let cap = self.leaf(traps, t[2]);
        self.dag.entry(old).append(cap);
        let above = self.leaf(traps, t[0]);
        self.dag.entry(si).append(above);
        let below = self.leaf(traps, t[1]);
        self.dag.entry(si).append(below);
    }

    /// Rewrites the leaf `old` to reflect a 2-way split: a single `Y(segment)` decision over
    /// the top/bottom leaves, reusing existing leaves like [`Self::split3_right`].
    pub(crate) fn split2(
        &mut self,
        traps: &mut Trapezoids,
        s: Segment,
        old: usize,
        t: [usize; 2],
    ) {
        self.dag.entry(old).and_modify(|data| *data = NodeData::Y(s));
        let above = self.leaf(traps, t[0]);
        self.dag.entry(old).append(above);
        let below = self.leaf(traps, t[1]);
        self.dag.entry(old).append(below);
    }
}
