use crate::classifier::{classify, Neighbours, ParseState};
use crate::error::{EditError, EditResult};
use crate::line::{Line, LineType};
use crate::outline::{build_outline, OutlineScene};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::{debug, error, instrument, trace};

/// Result of an incremental edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Post-edit indices of lines whose text or classification changed
    pub changed: BTreeSet<usize>,
    /// Number of lines the edit replaced
    pub lines_removed: usize,
    /// Number of lines the edit produced in their place
    pub lines_added: usize,
    /// Net change of the document length in bytes
    pub delta: isize,
    /// A heading, section or synopsis appeared, disappeared or changed
    pub outline_changed: bool,
}

impl ChangeSet {
    /// First line index a consumer has to recompute from
    pub fn first_changed(&self) -> Option<usize> {
        self.changed.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.lines_removed == self.lines_added && self.delta == 0
    }
}

/// Screenplay parser holding the live line model
///
/// The line sequence is the source of truth: [`Parser::apply_edit`] patches
/// it in place and the result is always identical to [`Parser::parse`] on the
/// edited text.
#[derive(Debug, Clone)]
pub struct Parser {
    lines: Vec<Line>,
    /// Parse state after each line, parallel to `lines`
    states: Vec<ParseState>,
    outline: Option<Vec<OutlineScene>>,
    scene_number_start: usize,
    /// Most recently edited line, checked first when locating an offset
    last_touched: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::parse("")
    }
}

impl Parser {
    /// Full parse of a document
    #[instrument(skip(text), fields(bytes = text.len()))]
    pub fn parse(text: &str) -> Self {
        let lines = split_lines(text, 0);
        let count = lines.len();
        let mut parser = Self {
            states: vec![ParseState::default(); count],
            lines,
            outline: None,
            scene_number_start: 1,
            last_touched: 0,
        };

        let mut changed = BTreeSet::new();
        parser.reclassify(0, count - 1, 0..count, &mut changed);
        parser.assign_scene_indices();
        debug!(lines = count, "Parsed document");
        parser
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Total document length in bytes
    pub fn len(&self) -> usize {
        self.lines.last().map_or(0, Line::end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild the full document text
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.len());
        for line in &self.lines {
            text.push_str(&line.string);
            if line.owns_newline() {
                text.push('\n');
            }
        }
        text
    }

    /// Index of the line containing `offset`
    pub fn line_index_at(&self, offset: usize) -> Option<usize> {
        if offset > self.len() {
            return None;
        }
        if self.lines.get(self.last_touched).is_some_and(|line| line.contains(offset)) {
            return Some(self.last_touched);
        }
        let after = self.lines.partition_point(|line| line.position <= offset);
        Some(after.saturating_sub(1))
    }

    pub fn line_at(&self, offset: usize) -> Option<&Line> {
        self.line_index_at(offset).and_then(|index| self.lines.get(index))
    }

    /// Type of the element at `offset`
    pub fn line_type_at(&self, offset: usize) -> Option<LineType> {
        self.line_at(offset).map(|line| line.line_type)
    }

    pub fn scene_number_start(&self) -> usize {
        self.scene_number_start
    }

    pub fn set_scene_number_start(&mut self, start: usize) {
        if start != self.scene_number_start {
            self.scene_number_start = start;
            self.outline = None;
        }
    }

    /// Outline entries, rebuilt lazily after outline-affecting edits
    pub fn outline(&mut self) -> &[OutlineScene] {
        let lines = &self.lines;
        let start = self.scene_number_start;
        self.outline.get_or_insert_with(|| build_outline(lines, start))
    }

    pub fn outline_is_dirty(&self) -> bool {
        self.outline.is_none()
    }

    /// Outline entry owning the line at `offset`
    pub fn scene_at(&mut self, offset: usize) -> Option<OutlineScene> {
        let index = self.line_index_at(offset)?;
        self.outline()
            .iter()
            .filter(|scene| scene.line_type == LineType::Heading)
            .find(|scene| scene.range.contains(&index))
            .cloned()
    }

    /// Replace `range` (byte offsets) with `replacement`.
    ///
    /// Offsets beyond the document are rejected, never clamped.
    #[instrument(skip(self, replacement), fields(start = range.start, end = range.end, inserted = replacement.len()))]
    pub fn apply_edit(&mut self, range: Range<usize>, replacement: &str) -> EditResult<ChangeSet> {
        self.validate(&range)?;

        if range.is_empty() && replacement.is_empty() {
            return Ok(ChangeSet::default());
        }

        let first = self.locate(range.start);
        let last = self.locate(range.end);
        self.last_touched = first;

        let line = &self.lines[first];
        let inside_line = first == last && range.end <= line.position + line.string.len();

        let change = if inside_line && !replacement.contains('\n') {
            self.edit_in_place(first, range, replacement)
        } else {
            self.splice(first, last, range, replacement)
        };

        trace!(changed = ?change.changed, "Applied edit");
        Ok(change)
    }

    /// Insert text at `offset`
    pub fn insert(&mut self, offset: usize, text: &str) -> EditResult<ChangeSet> {
        self.apply_edit(offset..offset, text)
    }

    /// Delete a byte range
    pub fn delete(&mut self, range: Range<usize>) -> EditResult<ChangeSet> {
        self.apply_edit(range, "")
    }

    fn validate(&self, range: &Range<usize>) -> EditResult<()> {
        if range.start > range.end {
            error!(start = range.start, end = range.end, "Rejected inverted edit range");
            return Err(EditError::inverted(range.start, range.end));
        }
        let len = self.len();
        if range.end > len {
            error!(start = range.start, end = range.end, len, "Rejected out-of-bounds edit");
            return Err(EditError::out_of_bounds(range.start, range.end, len));
        }
        for offset in [range.start, range.end] {
            let line = &self.lines[self.locate(offset)];
            let local = offset - line.position;
            if local <= line.string.len() && !line.string.is_char_boundary(local) {
                return Err(EditError::not_char_boundary(offset));
            }
        }
        Ok(())
    }

    fn locate(&self, offset: usize) -> usize {
        self.line_index_at(offset).unwrap_or(self.lines.len() - 1)
    }

    /// Fast path: the edit stays inside one line and adds no line breaks
    fn edit_in_place(&mut self, index: usize, range: Range<usize>, replacement: &str) -> ChangeSet {
        let line = &mut self.lines[index];
        let local = range.start - line.position..range.end - line.position;
        let old_type = line.line_type;
        let old_text_changed = &line.string[local.clone()] != replacement;
        line.string.replace_range(local, replacement);

        let delta = replacement.len() as isize - range.len() as isize;
        self.shift_positions(index + 1, delta);

        let mut changed = BTreeSet::new();
        let fresh = if old_text_changed { index..index + 1 } else { index..index };
        let retyped = self.reclassify(index.saturating_sub(1), index, fresh, &mut changed);

        let edited_outline_line =
            old_type.is_outline_element() || self.lines[index].is_outline_element();
        let outline_changed = (old_text_changed && edited_outline_line) || retyped;
        if outline_changed {
            self.invalidate_outline();
        }

        ChangeSet { changed, lines_removed: 1, lines_added: 1, delta, outline_changed }
    }

    /// General path: rebuild lines `first..=last` from the edited text
    fn splice(&mut self, first: usize, last: usize, range: Range<usize>, replacement: &str) -> ChangeSet {
        let block_start = self.lines[first].position;
        let block_end = self.lines[last].end();
        let trailing_newline = self.lines[last].owns_newline();

        let mut combined = String::with_capacity(block_end - block_start + replacement.len());
        for line in &self.lines[first..=last] {
            combined.push_str(&line.string);
            if line.owns_newline() {
                combined.push('\n');
            }
        }
        combined.replace_range(range.start - block_start..range.end - block_start, replacement);

        let body = if trailing_newline {
            combined.strip_suffix('\n').unwrap_or(&combined)
        } else {
            combined.as_str()
        };
        let mut fresh_lines = split_lines(body, block_start);
        if let Some(last_line) = fresh_lines.last_mut() {
            last_line.newline = trailing_newline;
        }
        if let Some(first_line) = fresh_lines.first_mut() {
            first_line.revision = self.lines[first].revision.clone();
            first_line.tags = self.lines[first].tags.clone();
        }

        let removed_outline = self.lines[first..=last].iter().any(Line::is_outline_element);
        let inserted = fresh_lines.len();
        let removed = last - first + 1;

        self.lines.splice(first..=last, fresh_lines);
        self.states
            .splice(first..=last, std::iter::repeat(ParseState::default()).take(inserted));

        let delta = combined.len() as isize - (block_end - block_start) as isize;
        self.shift_positions(first + inserted, delta);

        let mut changed = BTreeSet::new();
        let retyped = self.reclassify(
            first.saturating_sub(1),
            first + inserted - 1,
            first..first + inserted,
            &mut changed,
        );

        let outline_changed = removed_outline
            || self.lines[first..first + inserted].iter().any(Line::is_outline_element)
            || retyped;
        if outline_changed || removed != inserted {
            self.invalidate_outline();
        }

        debug!(removed, inserted, "Spliced lines");
        ChangeSet { changed, lines_removed: removed, lines_added: inserted, delta, outline_changed }
    }

    fn invalidate_outline(&mut self) {
        self.outline = None;
        self.assign_scene_indices();
    }

    fn shift_positions(&mut self, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for line in &mut self.lines[from..] {
            line.position = line.position.wrapping_add_signed(delta);
        }
    }

    /// Reclassify from `from`, visiting at least every line up to `through`
    /// and then continuing only while classifications keep changing.
    ///
    /// Lines in `fresh` always count as changed. Returns whether an outline
    /// line was reclassified (type or visibility).
    fn reclassify(
        &mut self,
        from: usize,
        through: usize,
        fresh: Range<usize>,
        changed: &mut BTreeSet<usize>,
    ) -> bool {
        let mut outline_touched = false;
        let mut index = from;
        while index < self.lines.len() {
            let previous = index.checked_sub(1).map(|p| self.lines[p].line_type);
            let state_in = index.checked_sub(1).map_or_else(ParseState::default, |p| self.states[p]);
            let next_is_blank = self.lines.get(index + 1).map(Line::is_blank);

            let result = classify(
                &self.lines[index].string,
                Neighbours { previous, next_is_blank },
                state_in,
            );

            let line = &mut self.lines[index];
            let visible_change = line.line_type != result.line_type
                || line.paragraph_continuation != result.paragraph_continuation
                || line.omitted != result.omitted
                || line.note != result.note;
            let state_change = self.states[index] != result.state;
            if visible_change
                && (line.line_type.is_outline_element() || result.line_type.is_outline_element())
            {
                outline_touched = true;
            }

            line.line_type = result.line_type;
            line.paragraph_continuation = result.paragraph_continuation;
            line.omitted = result.omitted;
            line.note = result.note;
            self.states[index] = result.state;

            if visible_change || fresh.contains(&index) {
                changed.insert(index);
            }

            // Past the edited region, stop once the classification converges
            if index >= through && !fresh.contains(&index) && !visible_change && !state_change {
                break;
            }
            index += 1;
        }
        outline_touched
    }

    fn assign_scene_indices(&mut self) {
        let mut scene_index = 0;
        for line in &mut self.lines {
            if line.is_outline_element() {
                line.scene_index = Some(scene_index);
                scene_index += 1;
            } else {
                line.scene_index = None;
            }
        }
    }
}

/// Split text into unclassified lines starting at `position`
fn split_lines(text: &str, mut position: usize) -> Vec<Line> {
    let mut lines: Vec<Line> = text
        .split('\n')
        .map(|piece| {
            let line = Line::new(piece, LineType::Empty, position);
            position += piece.len() + 1;
            line
        })
        .collect();
    if let Some(last) = lines.last_mut() {
        last.newline = false;
    }
    lines
}

/// Convenience: full parse
pub fn parse(text: &str) -> Parser {
    Parser::parse(text)
}
