//! Range edits over an original text, applied in one deterministic pass
//!
//! Edits accumulate during a traversal and are only materialized at the
//! end. Nothing is mutated incrementally: the buffer keeps the original
//! text plus a typed list of operations, then renders once. That makes the
//! ordering rules explicit and the overlap invariant mechanically
//! checkable:
//!
//! - replace/delete ranges registered against one run must not overlap, and
//!   no insert may land strictly inside a replaced range. Violations are
//!   engine bugs and surface as [`OrigamiError::EditConflict`].
//! - at a given offset the output order is: insert-after text in
//!   registration order, then insert-before text in reverse registration
//!   order, then the replacement or original text starting there.
//!   Insert-after is "left-sticky" (it attaches to what precedes the
//!   offset), insert-before is "right-sticky".
//!
//! Materialization also produces a [`PositionMap`] that sends output byte
//! offsets back to original offsets for every preserved run of text.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{OrigamiError, Result};

/// A run of output text copied verbatim from the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Byte offset of the run in the output text
    pub out_start: usize,
    /// Byte offset of the run in the original text
    pub src_start: usize,
    /// Length of the run in bytes
    pub len: usize,
}

/// Maps output positions back to original source positions
///
/// Only preserved original text is mapped; offsets that fall inside
/// generated text resolve to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap {
    segments: Vec<Segment>,
}

impl PositionMap {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Map an output byte offset to its original offset
    pub fn map_offset(&self, out: usize) -> Option<usize> {
        let idx = self
            .segments
            .partition_point(|seg| seg.out_start <= out)
            .checked_sub(1)?;
        let seg = &self.segments[idx];
        (out < seg.out_start + seg.len).then(|| seg.src_start + (out - seg.out_start))
    }

    /// Map an original byte offset to its output offset, when that byte was
    /// preserved
    pub fn map_source_offset(&self, src: usize) -> Option<usize> {
        // segments are ascending in both coordinates (edits never reorder)
        let idx = self
            .segments
            .partition_point(|seg| seg.src_start <= src)
            .checked_sub(1)?;
        let seg = &self.segments[idx];
        (src < seg.src_start + seg.len).then(|| seg.out_start + (src - seg.src_start))
    }

    fn push(&mut self, out_start: usize, src_start: usize, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(last) = self.segments.last_mut()
            && last.out_start + last.len == out_start
            && last.src_start + last.len == src_start
        {
            last.len += len;
            return;
        }
        self.segments.push(Segment {
            out_start,
            src_start,
            len,
        });
    }
}

#[derive(Debug, Clone)]
struct ReplaceOp {
    range: Range<usize>,
    text: String,
    seq: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sticky {
    /// insert_after: attaches to the text preceding the offset
    Left,
    /// insert_before: attaches to the text at the offset
    Right,
}

#[derive(Debug, Clone)]
struct InsertOp {
    pos: usize,
    text: String,
    sticky: Sticky,
    seq: usize,
}

/// Accumulates typed edits against an original text
#[derive(Debug)]
pub struct EditBuffer<'s> {
    source: &'s str,
    replaces: Vec<ReplaceOp>,
    inserts: Vec<InsertOp>,
    seq: usize,
}

impl<'s> EditBuffer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            replaces: Vec::new(),
            inserts: Vec::new(),
            seq: 0,
        }
    }

    /// The whole original text
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Read back a range of the ORIGINAL text, regardless of pending edits
    pub fn slice(&self, range: Range<usize>) -> &'s str {
        &self.source[range]
    }

    /// Replace `range` with `text`
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        let seq = self.next_seq();
        self.replaces.push(ReplaceOp {
            range,
            text: text.into(),
            seq,
        });
    }

    /// Delete `range`
    pub fn delete(&mut self, range: Range<usize>) {
        self.replace(range, "");
    }

    /// Insert `text` at `pos`, attached to the preceding content
    pub fn insert_after(&mut self, pos: usize, text: impl Into<String>) {
        let seq = self.next_seq();
        self.inserts.push(InsertOp {
            pos,
            text: text.into(),
            sticky: Sticky::Left,
            seq,
        });
    }

    /// Insert `text` at `pos`, attached to the content at `pos`
    pub fn insert_before(&mut self, pos: usize, text: impl Into<String>) {
        let seq = self.next_seq();
        self.inserts.push(InsertOp {
            pos,
            text: text.into(),
            sticky: Sticky::Right,
            seq,
        });
    }

    /// Whether any edit has been registered
    pub fn has_edits(&self) -> bool {
        !self.replaces.is_empty() || !self.inserts.is_empty()
    }

    /// Apply every edit and produce the output text plus its position map
    pub fn materialize(&self) -> Result<(String, PositionMap)> {
        let (text, map) = self.render(0..self.source.len(), true, true, true)?;
        Ok((text, map.unwrap_or_default()))
    }

    /// Render only `range` of the edited text. Inserts exactly at the range
    /// start are included only when right-sticky, at the range end only
    /// when left-sticky; edits crossing the boundary are conflicts.
    pub fn render_range(&self, range: Range<usize>) -> Result<String> {
        let (text, _) = self.render(range, false, false, false)?;
        Ok(text)
    }

    fn next_seq(&mut self) -> usize {
        self.seq += 1;
        self.seq
    }

    fn validate(&self, sorted: &[&ReplaceOp], bounds: &Range<usize>) -> Result<()> {
        for pair in sorted.windows(2) {
            if pair[1].range.start < pair[0].range.end {
                return Err(OrigamiError::edit_conflict(format!(
                    "overlapping replacements at {:?} and {:?}",
                    pair[0].range, pair[1].range
                )));
            }
        }
        for op in sorted {
            if op.range.start < bounds.start || op.range.end > bounds.end {
                return Err(OrigamiError::edit_conflict(format!(
                    "replacement {:?} crosses render bounds {bounds:?}",
                    op.range
                )));
            }
        }
        for ins in &self.inserts {
            if ins.pos < bounds.start || ins.pos > bounds.end {
                continue;
            }
            for op in sorted {
                if ins.pos > op.range.start && ins.pos < op.range.end {
                    return Err(OrigamiError::edit_conflict(format!(
                        "insert at {} lands inside replacement {:?}",
                        ins.pos, op.range
                    )));
                }
            }
        }
        Ok(())
    }

    fn render(
        &self,
        bounds: Range<usize>,
        left_at_start: bool,
        right_at_end: bool,
        want_map: bool,
    ) -> Result<(String, Option<PositionMap>)> {
        let mut sorted: Vec<&ReplaceOp> = self.replaces.iter().collect();
        sorted.sort_by_key(|op| (op.range.start, op.seq));
        self.validate(&sorted, &bounds)?;

        // gap position -> (left-sticky inserts, right-sticky inserts)
        let mut gaps: BTreeMap<usize, (Vec<&InsertOp>, Vec<&InsertOp>)> = BTreeMap::new();
        for ins in &self.inserts {
            if ins.pos < bounds.start || ins.pos > bounds.end {
                continue;
            }
            if ins.pos == bounds.start && ins.sticky == Sticky::Left && !left_at_start {
                continue;
            }
            if ins.pos == bounds.end && ins.sticky == Sticky::Right && !right_at_end {
                continue;
            }
            let slot = gaps.entry(ins.pos).or_default();
            match ins.sticky {
                Sticky::Left => slot.0.push(ins),
                Sticky::Right => slot.1.push(ins),
            }
        }
        for slot in gaps.values_mut() {
            slot.0.sort_by_key(|ins| ins.seq);
            // right-sticky inserts compose in reverse registration order:
            // the latest registered wraps outermost
            slot.1.sort_by_key(|ins| std::cmp::Reverse(ins.seq));
        }

        type Gaps<'op> = BTreeMap<usize, (Vec<&'op InsertOp>, Vec<&'op InsertOp>)>;

        fn flush_gap(gaps: &mut Gaps<'_>, out: &mut String, pos: usize) {
            if let Some((left, right)) = gaps.remove(&pos) {
                for ins in left.iter().chain(right.iter()) {
                    out.push_str(&ins.text);
                }
            }
        }

        // copy original text [from..to), flushing gaps at their offsets
        fn copy_original(
            src: &str,
            gaps: &mut Gaps<'_>,
            out: &mut String,
            map: &mut Option<PositionMap>,
            from: usize,
            to: usize,
        ) {
            let mut cursor = from;
            let positions: Vec<usize> = gaps.range(from..to).map(|(p, _)| *p).collect();
            for pos in positions {
                if pos > cursor {
                    if let Some(map) = map {
                        map.push(out.len(), cursor, pos - cursor);
                    }
                    out.push_str(&src[cursor..pos]);
                }
                flush_gap(gaps, out, pos);
                cursor = pos;
            }
            if to > cursor {
                if let Some(map) = map {
                    map.push(out.len(), cursor, to - cursor);
                }
                out.push_str(&src[cursor..to]);
            }
        }

        let mut out = String::new();
        let mut map = want_map.then(PositionMap::default);

        let mut cursor = bounds.start;
        for op in &sorted {
            copy_original(self.source, &mut gaps, &mut out, &mut map, cursor, op.range.start);
            flush_gap(&mut gaps, &mut out, op.range.start);
            out.push_str(&op.text);
            cursor = op.range.end;
        }
        copy_original(self.source, &mut gaps, &mut out, &mut map, cursor, bounds.end);
        flush_gap(&mut gaps, &mut out, bounds.end);

        Ok((out, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edits_materializes_identity() {
        let buf = EditBuffer::new("hello world");
        assert!(!buf.has_edits());
        let (text, map) = buf.materialize().expect("materialize");
        assert_eq!(text, "hello world");
        assert_eq!(map.map_offset(6), Some(6));
    }

    #[test]
    fn replace_and_delete() {
        let mut buf = EditBuffer::new("one two three");
        buf.replace(4..7, "2");
        buf.delete(7..8);
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "one 2three");
    }

    #[test]
    fn insert_ordering_at_same_offset() {
        // left-sticky in registration order, then right-sticky reversed,
        // then the original text
        let mut buf = EditBuffer::new("ab");
        buf.insert_after(1, "<>");
        buf.insert_before(1, "(");
        buf.insert_before(1, "{");
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "a<>{(b");
    }

    #[test]
    fn insert_at_replacement_start_precedes_it() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(2..4, "XY");
        buf.insert_before(2, "{");
        buf.insert_after(4, "}");
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "ab{XY}ef");
    }

    #[test]
    fn overlapping_replacements_fail_loudly() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(1..4, "x");
        buf.replace(3..5, "y");
        let err = buf.materialize().expect_err("must conflict");
        assert!(matches!(err, OrigamiError::EditConflict { .. }));
    }

    #[test]
    fn insert_inside_replacement_fails_loudly() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(1..4, "x");
        buf.insert_before(2, "y");
        let err = buf.materialize().expect_err("must conflict");
        assert!(matches!(err, OrigamiError::EditConflict { .. }));
    }

    #[test]
    fn adjacent_replacements_are_fine() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(1..3, "x");
        buf.replace(3..5, "y");
        let (text, _) = buf.materialize().expect("materialize");
        assert_eq!(text, "axyf");
    }

    #[test]
    fn position_map_tracks_preserved_runs() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(2..4, "XYZ");
        let (text, map) = buf.materialize().expect("materialize");
        assert_eq!(text, "abXYZef");
        // preserved prefix
        assert_eq!(map.map_offset(0), Some(0));
        assert_eq!(map.map_offset(1), Some(1));
        // generated text is unmapped
        assert_eq!(map.map_offset(2), None);
        assert_eq!(map.map_offset(4), None);
        // preserved suffix
        assert_eq!(map.map_offset(5), Some(4));
        assert_eq!(map.map_offset(6), Some(5));
        // reverse direction
        assert_eq!(map.map_source_offset(4), Some(5));
        assert_eq!(map.map_source_offset(2), None);
    }

    #[test]
    fn render_range_excludes_outer_sticky_inserts() {
        let mut buf = EditBuffer::new("abcdef");
        // edits belonging to the region [2..4]
        buf.insert_before(2, "{");
        buf.replace(2..3, "C");
        buf.insert_after(4, "}");
        // edits belonging to the surrounding text
        buf.insert_after(2, "outer-left");
        buf.insert_before(4, "outer-right");
        let text = buf.render_range(2..4).expect("render");
        assert_eq!(text, "{Cd}");
    }

    #[test]
    fn slice_reads_original_text() {
        let mut buf = EditBuffer::new("abcdef");
        buf.replace(0..6, "zzz");
        assert_eq!(buf.slice(1..3), "bc");
    }
}
