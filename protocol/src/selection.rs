use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }

    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// A single selection range. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub anchor: usize,
    pub head: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn range(&self) -> Range<usize> {
        self.from()..self.to()
    }

    /// Move the head; keeps the anchor when `extend` is set, otherwise collapses to a caret.
    pub fn with_head(self, head: usize, extend: bool) -> Self {
        if extend {
            Self {
                anchor: self.anchor,
                head,
            }
        } else {
            Self::caret(head)
        }
    }
}

/// The full selection owned by the host. Always holds at least one range, and `main` indexes
/// one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectionParts")]
pub struct Selection {
    ranges: Vec<SelectionRange>,
    main: usize,
}

#[derive(Deserialize)]
struct SelectionParts {
    ranges: Vec<SelectionRange>,
    main: usize,
}

impl TryFrom<SelectionParts> for Selection {
    type Error = String;

    fn try_from(parts: SelectionParts) -> Result<Self, Self::Error> {
        let SelectionParts { ranges, main } = parts;
        if ranges.is_empty() {
            return Err("selection must hold at least one range".to_string());
        }
        if main >= ranges.len() {
            return Err(format!(
                "main range {main} is out of bounds for {} ranges",
                ranges.len()
            ));
        }
        Ok(Self { ranges, main })
    }
}

impl Selection {
    pub fn single(range: SelectionRange) -> Self {
        Self {
            ranges: vec![range],
            main: 0,
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self::single(SelectionRange::caret(pos))
    }

    /// Build a multi-range selection. An empty `ranges` collapses to a caret at 0.
    pub fn new(ranges: Vec<SelectionRange>, main: usize) -> Self {
        if ranges.is_empty() {
            return Self::caret(0);
        }
        let main = main.min(ranges.len() - 1);
        Self { ranges, main }
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn main(&self) -> SelectionRange {
        self.ranges[self.main]
    }

    pub fn main_index(&self) -> usize {
        self.main
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn backwards_range_normalizes_bounds() {
        let range = SelectionRange::new(12, 6);
        assert_eq!(range.from(), 6);
        assert_eq!(range.to(), 12);
        assert_eq!(range.range(), 6..12);
        assert!(!range.is_empty());
    }

    #[test]
    fn with_head_extends_or_collapses() {
        let range = SelectionRange::new(3, 6);
        assert_eq!(range.with_head(12, true), SelectionRange::new(3, 12));
        assert_eq!(range.with_head(12, false), SelectionRange::caret(12));
    }

    #[test]
    fn empty_selection_falls_back_to_origin_caret() {
        let selection = Selection::new(Vec::new(), 4);
        assert_eq!(selection.ranges(), &[SelectionRange::caret(0)]);
        assert_eq!(selection.main_index(), 0);
    }

    #[test]
    fn deserialize_rejects_selections_without_a_valid_main_range() {
        let empty = serde_json::from_str::<Selection>(r#"{"ranges": [], "main": 0}"#)
            .expect_err("no ranges");
        assert!(empty.to_string().contains("at least one range"), "{empty}");

        let out_of_bounds = serde_json::from_str::<Selection>(
            r#"{"ranges": [{"anchor": 0, "head": 6}], "main": 1}"#,
        )
        .expect_err("main out of bounds");
        assert!(
            out_of_bounds.to_string().contains("out of bounds"),
            "{out_of_bounds}"
        );

        let selection = serde_json::from_str::<Selection>(
            r#"{"ranges": [{"anchor": 0, "head": 6}, {"anchor": 9, "head": 9}], "main": 1}"#,
        )
        .expect("valid selection");
        assert_eq!(selection.main(), SelectionRange::caret(9));
    }
}
