use crate::str_utils::{byte_of_char_idx, char_len};

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Leaf {
        value: String,
        /// Character count of `value`.
        weight: usize,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        /// Character count of the entire left subtree's text.
        weight: usize,
        /// Longest path (in nodes) down to a leaf. Leaves count as 1.
        height: usize,
    },
}

impl Node {
    /// Invariant: leaves are never empty. Callers drop empty fragments
    /// instead of constructing a leaf for them.
    pub(crate) fn leaf(text: &str) -> Box<Node> {
        Box::new(Node::Leaf {
            weight: char_len(text),
            value: text.to_string(),
        })
    }

    fn leaf_owned(value: String) -> Box<Node> {
        Box::new(Node::Leaf {
            weight: char_len(&value),
            value,
        })
    }

    fn internal(left: Box<Node>, right: Box<Node>) -> Box<Node> {
        let weight = left.len();
        let height = 1 + left.height().max(right.height());
        Box::new(Node::Internal {
            left,
            right,
            weight,
            height,
        })
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, right, .. } => weight + right.len(),
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { height, .. } => *height,
        }
    }

    fn balance_factor(&self) -> isize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => {
                left.height() as isize - right.height() as isize
            }
        }
    }

    pub(crate) fn flatten_into(&self, out: &mut String) {
        match self {
            Node::Leaf { value, .. } => out.push_str(value),
            Node::Internal { left, right, .. } => {
                left.flatten_into(out);
                right.flatten_into(out);
            }
        }
    }

    /// Combines two subtrees in document order. Both sides present means
    /// both are flattened into a single fresh leaf; the O(combined length)
    /// cost is the intended trade against structural bookkeeping, and the
    /// result is trivially balanced.
    pub(crate) fn merge(
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    ) -> Option<Box<Node>> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(left), Some(right)) => {
                let mut value = String::new();
                left.flatten_into(&mut value);
                right.flatten_into(&mut value);
                Some(Node::leaf_owned(value))
            }
        }
    }

    /// Partitions `node` at character `offset` into two independent trees
    /// whose concatenated text reproduces the original. `None` in, `None`s
    /// out. `offset` must not exceed the subtree's length.
    pub(crate) fn split(
        node: Option<Box<Node>>,
        offset: usize,
    ) -> (Option<Box<Node>>, Option<Box<Node>>) {
        let node = match node {
            Some(node) => node,
            None => return (None, None),
        };

        match *node {
            Node::Leaf { value, .. } => {
                let at = byte_of_char_idx(&value, offset).unwrap_or_else(|| value.len());
                let (before, after) = value.split_at(at);
                (
                    if before.is_empty() { None } else { Some(Node::leaf(before)) },
                    if after.is_empty() { None } else { Some(Node::leaf(after)) },
                )
            }
            Node::Internal {
                left,
                right,
                weight,
                ..
            } => {
                if offset <= weight {
                    let (split_left, split_right) = Node::split(Some(left), offset);
                    (split_left, Node::merge(split_right, Some(right)))
                } else {
                    let (split_left, split_right) = Node::split(Some(right), offset - weight);
                    (Node::merge(Some(left), split_left), split_right)
                }
            }
        }
    }

    /// Inserts `text` before character `offset`, splitting the target leaf
    /// when the offset falls mid-leaf and rebalancing every node on the way
    /// back up. `offset` must not exceed the subtree's length.
    pub(crate) fn insert(self: Box<Self>, offset: usize, text: &str) -> Box<Node> {
        match *self {
            Node::Leaf { value, .. } => {
                let at = byte_of_char_idx(&value, offset).unwrap_or_else(|| value.len());
                let (before, after) = value.split_at(at);
                match (before.is_empty(), after.is_empty()) {
                    (true, true) => Node::leaf(text),
                    (true, false) => Node::internal(Node::leaf(text), Node::leaf(after)),
                    (false, true) => Node::internal(Node::leaf(before), Node::leaf(text)),
                    (false, false) => Node::internal(
                        Node::internal(Node::leaf(before), Node::leaf(text)),
                        Node::leaf(after),
                    ),
                }
            }
            Node::Internal {
                left,
                right,
                weight,
                ..
            } => {
                let node = if offset <= weight {
                    Node::internal(left.insert(offset, text), right)
                } else {
                    Node::internal(left, right.insert(offset - weight, text))
                };
                node.balance()
            }
        }
    }

    /// The four standard AVL cases. Weight and height are recomputed by
    /// `internal` as nodes are rebuilt.
    fn balance(self: Box<Self>) -> Box<Node> {
        match self.balance_factor() {
            bf if bf > 1 => match *self {
                Node::Internal { left, right, .. } => {
                    let left = if left.balance_factor() < 0 {
                        left.rotate_left()
                    } else {
                        left
                    };
                    Node::internal(left, right).rotate_right()
                }
                leaf => Box::new(leaf),
            },
            bf if bf < -1 => match *self {
                Node::Internal { left, right, .. } => {
                    let right = if right.balance_factor() > 0 {
                        right.rotate_right()
                    } else {
                        right
                    };
                    Node::internal(left, right).rotate_left()
                }
                leaf => Box::new(leaf),
            },
            _ => self,
        }
    }

    // A rotation whose pivot child is a leaf has nothing to hoist; the node
    // is rebuilt unchanged. Unreachable while the AVL invariant holds.
    fn rotate_left(self: Box<Self>) -> Box<Node> {
        match *self {
            Node::Internal { left: a, right, .. } => match *right {
                Node::Internal {
                    left: b, right: c, ..
                } => Node::internal(Node::internal(a, b), c),
                pivot => Node::internal(a, Box::new(pivot)),
            },
            leaf => Box::new(leaf),
        }
    }

    fn rotate_right(self: Box<Self>) -> Box<Node> {
        match *self {
            Node::Internal { left, right: c, .. } => match *left {
                Node::Internal {
                    left: a, right: b, ..
                } => Node::internal(a, Node::internal(b, c)),
                pivot => Node::internal(Box::new(pivot), c),
            },
            leaf => Box::new(leaf),
        }
    }
}

#[cfg(test)]
impl Node {
    fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    pub(crate) fn assert_invariants(&self) {
        match self {
            Node::Leaf { value, weight } => {
                assert!(!value.is_empty(), "empty leaf in reachable tree");
                assert_eq!(*weight, char_len(value), "stale leaf weight");
            }
            Node::Internal {
                left,
                right,
                weight,
                height,
            } => {
                assert_eq!(
                    *weight,
                    char_len(&left.flatten()),
                    "internal weight does not match left subtree text"
                );
                assert_eq!(*height, 1 + left.height().max(right.height()));
                assert!(
                    self.balance_factor().abs() <= 1,
                    "balance factor {} out of bounds",
                    self.balance_factor()
                );
                left.assert_invariants();
                right.assert_invariants();
            }
        }
    }

    pub(crate) fn subtree_height(&self) -> usize {
        self.height()
    }
}
