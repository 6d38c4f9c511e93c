//! Arena-allocated search tree. Nodes refer to each other by index into a
//! single vector, which keeps the tree in one allocation and avoids
//! reference-counted parent links. The whole arena is dropped at once when
//! the search returns.

use std::ops::Index;

use arrayvec::ArrayVec;

use crate::combat::core::Move;
use crate::combat::state::CombatState;

pub(super) type NodeIndex = usize;
// Special value that indicates that the node has no parent.
const TOMBSTONE_PARENT: NodeIndex = usize::MAX;

pub(super) const ROOT: NodeIndex = 0;

#[derive(Debug)]
pub(super) struct Node {
    /// State reached after the player move and the sampled enemy move.
    pub(super) state: CombatState,
    parent: NodeIndex,
    /// Player move that leads from the parent to this node, `None` for the
    /// root.
    pub(super) player_move: Option<Move>,
    pub(super) children: ArrayVec<NodeIndex, 3>,
    /// Number of iterations that went through this node.
    pub(super) visits: u32,
    /// Sum of playout rewards of these iterations, exact up to 2^53 wins.
    pub(super) wins: f64,
}

impl Node {
    const fn new(state: CombatState, parent: NodeIndex, player_move: Option<Move>) -> Self {
        Self {
            state,
            parent,
            player_move,
            children: ArrayVec::new_const(),
            visits: 0,
            wins: 0.0,
        }
    }

    #[must_use]
    pub(super) const fn visited(&self) -> bool {
        self.visits > 0
    }

    /// Share of won playouts, 0 for unvisited nodes.
    #[must_use]
    pub(super) fn win_rate(&self) -> f32 {
        if self.visited() {
            (self.wins / f64::from(self.visits)) as f32
        } else {
            0.0
        }
    }
}

#[derive(Debug)]
pub(super) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(super) fn new(root: CombatState) -> Self {
        Self {
            nodes: vec![Node::new(root, TOMBSTONE_PARENT, None)],
        }
    }

    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn root(&self) -> &Node {
        &self[ROOT]
    }

    /// Children of the root node in the order they were created.
    pub(super) fn root_children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.root().children.iter().map(|&child| &self[child])
    }

    /// Legal player moves of `parent` that no child has been created for
    /// yet, in Rock, Paper, Scissor order.
    pub(super) fn untried_moves(&self, parent: NodeIndex) -> ArrayVec<Move, 3> {
        let node = &self[parent];
        node.state
            .player
            .charges
            .legal_moves()
            .into_iter()
            .filter(|&m| {
                !node
                    .children
                    .iter()
                    .any(|&child| self[child].player_move == Some(m))
            })
            .collect()
    }

    /// A node is fully expanded once every legal player move has a child.
    pub(super) fn is_fully_expanded(&self, index: NodeIndex) -> bool {
        self.untried_moves(index).is_empty()
    }

    /// Appends a new child of `parent` reached by `m`.
    pub(super) fn add_child(&mut self, parent: NodeIndex, m: Move, state: CombatState) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new(state, parent, Some(m)));
        self.nodes[parent].children.push(index);
        index
    }

    /// Records the playout `reward` on every node from `leaf` up to the root.
    pub(super) fn backpropagate(&mut self, leaf: NodeIndex, reward: f32) {
        let mut current = leaf;
        while current != TOMBSTONE_PARENT {
            let node = &mut self.nodes[current];
            node.visits += 1;
            node.wins += f64::from(reward);
            current = node.parent;
        }
    }
}

impl Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}
