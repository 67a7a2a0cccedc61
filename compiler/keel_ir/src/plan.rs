//! Dispatch plans: the lowered form of a switch.
//!
//! A [`DispatchPlan`] is a tree of [`DispatchNode`]s. Every path through the
//! tree ends in a [`Leaf`](DispatchNode::Leaf) naming a case target or the
//! default target. The variant set is closed; the instruction emitter matches
//! it exhaustively and is free to pick any encoding (computed branch,
//! compare-and-branch chains, hash lookups) that implements the semantics.
//!
//! # Semantics
//!
//! - `EqualityTest` uses [`ConstValue::pattern_eq`]. A `Null` value is the
//!   nullable `HasValue` test.
//! - `RelationalTest` compares `scrutinee <op> value`. Null and NaN
//!   scrutinees fail every relational test.
//! - `JumpTable` indexes `entries` by `scrutinee - base`. Entry counts always
//!   fit a 32-bit index even when `base` needs 64 bits.
//! - `HashDispatch`, `LengthDispatch` and `CharDispatch` apply to strings.
//!   Every candidate they reach is guarded by full string equality.

use smallvec::SmallVec;

use crate::constant::ConstValue;
use crate::label::CaseTarget;

/// Relational operator of a [`DispatchNode::RelationalTest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        }
    }

    /// Apply to the ordering of `scrutinee` relative to the test value.
    pub fn holds(self, ord: std::cmp::Ordering) -> bool {
        match self {
            RelOp::Lt => ord.is_lt(),
            RelOp::Le => ord.is_le(),
            RelOp::Gt => ord.is_gt(),
            RelOp::Ge => ord.is_ge(),
        }
    }
}

/// Hash function computed over the scrutinee of a [`DispatchNode::HashDispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StringHash {
    /// 32-bit FNV-1a over UTF-16 code units. Null hashes to the offset basis.
    Fnv1a32,
}

/// One string candidate inside a hash bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StringCandidate {
    pub value: Box<str>,
    /// Taken when the scrutinee equals `value`.
    pub on_match: DispatchNode,
}

/// All candidates sharing one hash value, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct HashBucket {
    pub hash: u32,
    pub candidates: SmallVec<[StringCandidate; 2]>,
}

/// Candidates of one UTF-16 length.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LengthBucket {
    pub length: u32,
    pub node: DispatchNode,
}

/// One arm of a [`DispatchNode::CharDispatch`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CharArm {
    /// UTF-16 code unit at the dispatch index.
    pub unit: u16,
    pub node: DispatchNode,
}

/// A node of a dispatch plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchNode {
    /// Unconditional jump to a case or the default.
    Leaf(CaseTarget),
    EqualityTest {
        value: ConstValue,
        on_true: Box<DispatchNode>,
        on_false: Box<DispatchNode>,
    },
    RelationalTest {
        op: RelOp,
        value: ConstValue,
        on_true: Box<DispatchNode>,
        on_false: Box<DispatchNode>,
    },
    JumpTable {
        base: i128,
        entries: Vec<DispatchNode>,
        on_out_of_range: Box<DispatchNode>,
    },
    /// Buckets are sorted by `hash` and unique, so the emitter can
    /// binary-search them.
    HashDispatch {
        hash: StringHash,
        buckets: Vec<HashBucket>,
        on_miss: Box<DispatchNode>,
    },
    /// Buckets are sorted by `length` and unique.
    LengthDispatch {
        buckets: Vec<LengthBucket>,
        on_null: Box<DispatchNode>,
        on_miss: Box<DispatchNode>,
    },
    /// Arms are sorted by `unit` and unique.
    CharDispatch {
        index: u32,
        arms: Vec<CharArm>,
        on_miss: Box<DispatchNode>,
    },
}

impl DispatchNode {
    pub fn leaf(target: CaseTarget) -> Self {
        DispatchNode::Leaf(target)
    }

    /// Equality test that collapses to `on_false` when both arms are the
    /// same leaf.
    pub fn equality(value: ConstValue, on_true: DispatchNode, on_false: DispatchNode) -> Self {
        if matches!((&on_true, &on_false), (DispatchNode::Leaf(a), DispatchNode::Leaf(b)) if a == b)
        {
            return on_false;
        }
        DispatchNode::EqualityTest {
            value,
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        }
    }

    /// Relational test that collapses to `on_false` when both arms are the
    /// same leaf.
    pub fn relational(
        op: RelOp,
        value: ConstValue,
        on_true: DispatchNode,
        on_false: DispatchNode,
    ) -> Self {
        if matches!((&on_true, &on_false), (DispatchNode::Leaf(a), DispatchNode::Leaf(b)) if a == b)
        {
            return on_false;
        }
        DispatchNode::RelationalTest {
            op,
            value,
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        }
    }

    /// The target if this node is a leaf.
    pub fn as_leaf(&self) -> Option<CaseTarget> {
        match self {
            DispatchNode::Leaf(target) => Some(*target),
            _ => None,
        }
    }

    /// Direct children, in a fixed order.
    pub fn children(&self) -> Vec<&DispatchNode> {
        match self {
            DispatchNode::Leaf(_) => Vec::new(),
            DispatchNode::EqualityTest {
                on_true, on_false, ..
            }
            | DispatchNode::RelationalTest {
                on_true, on_false, ..
            } => vec![on_true, on_false],
            DispatchNode::JumpTable {
                entries,
                on_out_of_range,
                ..
            } => {
                let mut out: Vec<&DispatchNode> = entries.iter().collect();
                out.push(on_out_of_range);
                out
            }
            DispatchNode::HashDispatch {
                buckets, on_miss, ..
            } => {
                let mut out: Vec<&DispatchNode> = buckets
                    .iter()
                    .flat_map(|b| b.candidates.iter().map(|c| &c.on_match))
                    .collect();
                out.push(on_miss);
                out
            }
            DispatchNode::LengthDispatch {
                buckets,
                on_null,
                on_miss,
            } => {
                let mut out: Vec<&DispatchNode> = buckets.iter().map(|b| &b.node).collect();
                out.push(on_null);
                out.push(on_miss);
                out
            }
            DispatchNode::CharDispatch { arms, on_miss, .. } => {
                let mut out: Vec<&DispatchNode> = arms.iter().map(|a| &a.node).collect();
                out.push(on_miss);
                out
            }
        }
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DispatchNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for child in node.children() {
                stack.push((child, depth + 1));
            }
        }
        max
    }

    /// Distinct leaf targets, sorted.
    pub fn targets(&self) -> Vec<CaseTarget> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let DispatchNode::Leaf(target) = node {
                out.push(*target);
            }
        });
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Which planner strategy produced a plan's root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// No non-null labels: the plan is a leaf, possibly behind a null test.
    Trivial,
    /// Integral buckets with jump tables and equality tests.
    JumpTable,
    /// Balanced relational search over disjoint intervals.
    SearchTree,
    StringLinear,
    StringHash,
    StringLength,
}

/// The result of planning one switch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchPlan {
    pub root: DispatchNode,
    pub strategy: Strategy,
}

impl DispatchPlan {
    pub fn new(root: DispatchNode, strategy: Strategy) -> Self {
        Self { root, strategy }
    }

    /// Number of jump tables anywhere in the plan.
    pub fn jump_table_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |node| {
            if matches!(node, DispatchNode::JumpTable { .. }) {
                count += 1;
            }
        });
        count
    }
}
