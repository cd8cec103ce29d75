//! Tag regions attached to the buffer.
//!
//! Each tag owns a sorted list of disjoint, non-adjacent half-open
//! ranges. Keeping the list normalized after every change means two
//! buffers with the same formatting always compare equal, whatever
//! sequence of edits produced them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::Tag;

/// One contiguous run of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRegion {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl TagRegion {
    pub fn new(tag: Tag, range: Range<usize>) -> Self {
        Self {
            tag,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The formatting layer of a buffer, keyed by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegions {
    spans: BTreeMap<Tag, Vec<Range<usize>>>,
}

impl TagRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tag` over `range`.
    ///
    /// Returns the sub-ranges that were not tagged before, in order.
    pub fn apply(&mut self, tag: Tag, range: Range<usize>) -> Vec<Range<usize>> {
        if range.is_empty() {
            return Vec::new();
        }

        let spans = self.spans.entry(tag).or_default();
        let added = gaps(spans, &range);
        if added.is_empty() {
            return added;
        }

        let mut merged = range;
        let mut kept = Vec::with_capacity(spans.len() + 1);
        for span in spans.drain(..) {
            if span.end < merged.start || span.start > merged.end {
                kept.push(span);
            } else {
                merged = merged.start.min(span.start)..merged.end.max(span.end);
            }
        }
        kept.push(merged);
        kept.sort_by_key(|span| span.start);
        *spans = kept;

        added
    }

    /// Strips `tag` from `range`.
    ///
    /// Returns the sub-ranges that were tagged before, in order.
    pub fn remove(&mut self, tag: Tag, range: Range<usize>) -> Vec<Range<usize>> {
        if range.is_empty() {
            return Vec::new();
        }
        let Some(spans) = self.spans.get_mut(&tag) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(spans.len() + 1);
        for span in spans.drain(..) {
            if span.end <= range.start || span.start >= range.end {
                kept.push(span);
                continue;
            }
            removed.push(span.start.max(range.start)..span.end.min(range.end));
            if span.start < range.start {
                kept.push(span.start..range.start);
            }
            if span.end > range.end {
                kept.push(range.end..span.end);
            }
        }

        if kept.is_empty() {
            self.spans.remove(&tag);
        } else {
            *spans = kept;
        }
        removed
    }

    /// Moves regions to account for `len` characters inserted at `at`.
    ///
    /// Text inserted strictly inside a region joins it; text inserted
    /// at a region boundary does not.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        if len == 0 {
            return;
        }
        for spans in self.spans.values_mut() {
            for span in spans.iter_mut() {
                if span.start >= at {
                    span.start += len;
                    span.end += len;
                } else if span.end > at {
                    span.end += len;
                }
            }
        }
    }

    /// Moves regions to account for `range` being deleted.
    ///
    /// Regions wholly inside the deleted range disappear.
    pub fn shift_for_delete(&mut self, range: &Range<usize>) {
        if range.is_empty() {
            return;
        }
        let map = |offset: usize| {
            if offset <= range.start {
                offset
            } else if offset >= range.end {
                offset - range.len()
            } else {
                range.start
            }
        };

        for spans in self.spans.values_mut() {
            let shifted: Vec<Range<usize>> = spans
                .iter()
                .map(|span| map(span.start)..map(span.end))
                .filter(|span| !span.is_empty())
                .collect();
            *spans = coalesce(shifted);
        }
        self.spans.retain(|_, spans| !spans.is_empty());
    }

    /// Returns the parts of every region that fall inside `range`.
    pub fn within(&self, range: &Range<usize>) -> Vec<TagRegion> {
        self.spans
            .iter()
            .flat_map(|(tag, spans)| {
                spans
                    .iter()
                    .filter(|span| span.end > range.start && span.start < range.end)
                    .map(move |span| {
                        TagRegion::new(*tag, span.start.max(range.start)..span.end.min(range.end))
                    })
            })
            .collect()
    }

    /// Strips every tag from `range`.
    pub fn clear(&mut self, range: &Range<usize>) {
        let tags: Vec<Tag> = self.spans.keys().copied().collect();
        for tag in tags {
            self.remove(tag, range.clone());
        }
    }

    /// Returns the tags covering the character at `offset`.
    pub fn tags_at(&self, offset: usize) -> Vec<Tag> {
        self.spans
            .iter()
            .filter(|(_, spans)| spans.iter().any(|span| span.contains(&offset)))
            .map(|(tag, _)| *tag)
            .collect()
    }

    /// Returns true if `tag` covers every character of a non-empty `range`.
    pub fn covers(&self, tag: Tag, range: &Range<usize>) -> bool {
        if range.is_empty() {
            return false;
        }
        self.spans
            .get(&tag)
            .is_some_and(|spans| gaps(spans, range).is_empty())
    }

    /// Returns every region, ordered by tag then start.
    pub fn regions(&self) -> Vec<TagRegion> {
        self.spans
            .iter()
            .flat_map(|(tag, spans)| spans.iter().map(|span| TagRegion::new(*tag, span.clone())))
            .collect()
    }

    /// Returns the regions of a single tag.
    pub fn spans(&self, tag: Tag) -> &[Range<usize>] {
        self.spans.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Returns the parts of `range` not covered by the sorted `spans`.
fn gaps(spans: &[Range<usize>], range: &Range<usize>) -> Vec<Range<usize>> {
    let mut gaps = Vec::new();
    let mut cursor = range.start;
    for span in spans
        .iter()
        .filter(|span| span.end > range.start && span.start < range.end)
    {
        if span.start > cursor {
            gaps.push(cursor..span.start);
        }
        cursor = cursor.max(span.end);
    }
    if cursor < range.end {
        gaps.push(cursor..range.end);
    }
    gaps
}

/// Merges overlapping or touching ranges of an already sorted list.
fn coalesce(spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut out: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match out.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => out.push(span),
        }
    }
    out
}
