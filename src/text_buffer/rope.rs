use snafu::ensure;
use std::fmt;
use std::ops::Range;

use crate::text_buffer::node::Node;
use crate::text_buffer::{EditError, InvalidRangeSnafu, OffsetOutOfBoundsSnafu, TextBuffer};

/// A balanced-tree text buffer. Leaves hold text fragments; internal nodes
/// route character offsets through left-subtree weights. All offsets are
/// character counts. An empty buffer is a `None` root.
///
/// Single-writer: callers serialize mutation against an instance.
#[derive(Clone, Debug, Default)]
pub struct Rope {
    root: Option<Box<Node>>,
}

impl Rope {
    pub fn new() -> Rope {
        Rope { root: None }
    }

    /// Partitions the buffer at character `offset` into two independent
    /// ropes whose concatenated contents reproduce this one. The original
    /// is left untouched, which costs a deep copy of the text up front.
    pub fn split(&self, offset: usize) -> Result<(Rope, Rope), EditError> {
        let length = self.len();
        ensure!(offset <= length, OffsetOutOfBoundsSnafu { offset, length });

        let (left, right) = Node::split(self.root.clone(), offset);
        Ok((Rope { root: left }, Rope { root: right }))
    }
}

impl TextBuffer for Rope {
    fn insert(&mut self, s: &str, offset: usize) -> Result<(), EditError> {
        let length = self.len();
        ensure!(offset <= length, OffsetOutOfBoundsSnafu { offset, length });

        if s.is_empty() {
            return Ok(());
        }

        self.root = Some(match self.root.take() {
            Some(root) => root.insert(offset, s),
            None => Node::leaf(s),
        });

        Ok(())
    }

    fn remove(&mut self, range: Range<usize>) -> Result<(), EditError> {
        let length = self.len();
        ensure!(
            range.start <= range.end,
            InvalidRangeSnafu {
                start: range.start,
                end: range.end,
            }
        );
        ensure!(
            range.end <= length,
            OffsetOutOfBoundsSnafu {
                offset: range.end,
                length,
            }
        );

        if range.start == range.end {
            return Ok(());
        }

        let (left, rest) = Node::split(self.root.take(), range.start);
        let (_, right) = Node::split(rest, range.end - range.start);
        self.root = Node::merge(left, right);

        Ok(())
    }

    fn all_content(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            root.flatten_into(&mut out);
        }
        out
    }

    fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }
}

impl From<&str> for Rope {
    fn from(s: &str) -> Rope {
        if s.is_empty() {
            Rope::new()
        } else {
            Rope {
                root: Some(Node::leaf(s)),
            }
        }
    }
}

impl From<String> for Rope {
    fn from(s: String) -> Rope {
        Rope::from(s.as_str())
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.all_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_tree(rope: &Rope) {
        if let Some(root) = &rope.root {
            root.assert_invariants();
        }
    }

    #[test]
    fn seeded_content_round_trips() {
        let rope = Rope::from("Hello World");
        assert_eq!(rope.all_content(), "Hello World");
        assert_eq!(rope.to_string(), "Hello World");
        assert_eq!(rope.len(), 11);
    }

    #[test]
    fn empty_rope() {
        let rope = Rope::new();
        assert_eq!(rope.all_content(), "");
        assert_eq!(rope.len(), 0);
        assert!(rope.is_empty());

        assert_eq!(Rope::from("").all_content(), "");
    }

    #[test]
    fn insert_mid_buffer() {
        let mut rope = Rope::from("Hello World");
        rope.insert(",", 5).unwrap();

        assert_eq!(rope.all_content(), "Hello, World");
        assert_tree(&rope);
    }

    #[test]
    fn insert_into_empty() {
        let mut rope = Rope::from("");
        rope.insert("x", 0).unwrap();

        assert_eq!(rope.all_content(), "x");
        assert_tree(&rope);
    }

    #[test]
    fn insert_empty_string_is_noop() {
        let mut rope = Rope::from("abc");
        rope.insert("", 1).unwrap();
        assert_eq!(rope.all_content(), "abc");
    }

    #[test]
    fn split_mid_buffer() {
        let rope = Rope::from("Hello World");
        let (left, right) = rope.split(5).unwrap();

        assert_eq!(left.all_content(), "Hello");
        assert_eq!(right.all_content(), " World");
        // Original untouched.
        assert_eq!(rope.all_content(), "Hello World");
        assert_tree(&left);
        assert_tree(&right);
    }

    #[test]
    fn split_concat_identity_at_every_offset() {
        let mut rope = Rope::from("Hello World");
        rope.insert(", again", 11).unwrap();
        let content = rope.all_content();

        for offset in 0..=rope.len() {
            let (left, right) = rope.split(offset).unwrap();
            assert_eq!(
                format!("{}{}", left.all_content(), right.all_content()),
                content
            );
        }
    }

    #[test]
    fn remove_prefix() {
        let mut rope = Rope::from("Hello World");
        rope.remove(0..6).unwrap();

        assert_eq!(rope.all_content(), "World");
        assert_tree(&rope);
    }

    #[test]
    fn remove_interior_and_suffix() {
        let mut rope = Rope::from("Hello, World!");
        rope.remove(5..12).unwrap();
        assert_eq!(rope.all_content(), "Hello!");

        rope.remove(5..6).unwrap();
        assert_eq!(rope.all_content(), "Hello");
        assert_tree(&rope);
    }

    #[test]
    fn remove_everything() {
        let mut rope = Rope::from("abc");
        rope.remove(0..3).unwrap();

        assert_eq!(rope.all_content(), "");
        assert!(rope.is_empty());
    }

    #[test]
    fn empty_range_remove_is_noop() {
        let mut rope = Rope::from("Hello World");
        for offset in 0..=rope.len() {
            rope.remove(offset..offset).unwrap();
            assert_eq!(rope.all_content(), "Hello World");
        }
    }

    #[test]
    fn insert_offset_out_of_bounds() {
        let mut rope = Rope::from("abc");
        let err = rope.insert("x", 4).unwrap_err();

        assert_eq!(err, EditError::OffsetOutOfBounds { offset: 4, length: 3 });
        assert_eq!(rope.all_content(), "abc");
    }

    #[test]
    fn split_offset_out_of_bounds() {
        let rope = Rope::from("abc");
        let err = rope.split(4).unwrap_err();

        assert_eq!(err, EditError::OffsetOutOfBounds { offset: 4, length: 3 });
    }

    #[test]
    fn remove_inverted_range() {
        let mut rope = Rope::from("abc");
        let err = rope.remove(2..1).unwrap_err();

        assert_eq!(err, EditError::InvalidRange { start: 2, end: 1 });
        assert_eq!(rope.all_content(), "abc");
    }

    #[test]
    fn remove_end_out_of_bounds() {
        let mut rope = Rope::from("abc");
        let err = rope.remove(1..5).unwrap_err();

        assert_eq!(err, EditError::OffsetOutOfBounds { offset: 5, length: 3 });
        assert_eq!(rope.all_content(), "abc");
    }

    #[test]
    fn multibyte_offsets() {
        let mut rope = Rope::from("héllo wörld");
        assert_eq!(rope.len(), 11);

        rope.insert("ß", 5).unwrap();
        assert_eq!(rope.all_content(), "hélloß wörld");

        rope.remove(1..6).unwrap();
        assert_eq!(rope.all_content(), "h wörld");
        assert_tree(&rope);

        let (left, right) = rope.split(4).unwrap();
        assert_eq!(left.all_content(), "h wö");
        assert_eq!(right.all_content(), "rld");
    }

    #[test]
    fn repeated_front_inserts_keep_height_logarithmic() {
        let mut rope = Rope::new();
        for _ in 0..1000 {
            rope.insert("a", 0).unwrap();
        }

        assert_eq!(rope.len(), 1000);
        assert_tree(&rope);
        // 1000 leaves, ~2000 nodes; AVL bounds height by ~1.44 * log2(n).
        let height = rope.root.as_ref().unwrap().subtree_height();
        assert!(height <= 16, "height {} exceeds AVL bound", height);
    }

    #[test]
    fn random_edits_match_string_splicing() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rope = Rope::from("Hello World");
        let mut mirror = String::from("Hello World");

        for round in 0..500 {
            // ASCII only so mirror byte offsets equal char offsets.
            if mirror.is_empty() || rng.gen_range(0, 3) > 0 {
                let offset = rng.gen_range(0, mirror.len() + 1);
                let s = match rng.gen_range(0, 3) {
                    0 => "x",
                    1 => "yz",
                    _ => "longer fragment",
                };
                rope.insert(s, offset).unwrap();
                mirror.insert_str(offset, s);
            } else {
                let start = rng.gen_range(0, mirror.len() + 1);
                let end = rng.gen_range(start, mirror.len() + 1);
                rope.remove(start..end).unwrap();
                mirror.replace_range(start..end, "");
            }

            assert_eq!(rope.all_content(), mirror, "diverged at round {}", round);
            assert_eq!(rope.len(), mirror.len());
            assert_tree(&rope);
        }
    }
}
