//! # Page Layout
//!
//! Blocks are placed in order while a running `remaining_space` counter
//! tracks the current page. Rules, strongest first:
//!
//! 1. Page breaks start a new page (a break on an empty page is ignored)
//! 2. A heading is never the last element on a non-empty page
//! 3. A cue stays with its first dialogue line
//! 4. Dialogue split across pages gets `(MORE)` below and the cue repeated
//!    with `(CONT'D)` above; a parenthetical never sits right above `(MORE)`
//! 5. Dual dialogue is as tall as its taller column; each column splits on
//!    its own
//! 6. Paragraphs split between wrapped lines, leaving at least two lines on
//!    either side
//!
//! Anything taller than an empty page is placed anyway so layout always
//! terminates.

use crate::block::{Block, DialogueBlock};
use crate::cancel::{CancelToken, Cancelled};
use crate::measure::Unit;
use crate::page::{ElementKind, Page, PageElement};
use crate::settings::PaginationSettings;
use scriptform_parser::LineType;
use scriptform_styles::Styles;
use tracing::trace;

/// Lines kept together on each side of a paragraph split
const MIN_SPLIT_LINES: usize = 2;

/// Position inside a dialogue block's body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    unit: usize,
    line: usize,
}

impl Cursor {
    const START: Cursor = Cursor { unit: 0, line: 0 };
}

/// Part of a dialogue block still to be placed
#[derive(Debug, Clone, Copy)]
struct Remainder {
    from: Cursor,
    /// The cue is repeated with the continuation label
    continued: bool,
}

/// Outcome of fitting one dialogue column into the space left
enum ColumnFit {
    /// Everything from the remainder fits
    All,
    /// Break before this position
    Split(Cursor),
    /// Not even the cue and one line fit
    Impossible,
}

pub(crate) struct Layout<'a> {
    settings: &'a PaginationSettings,
    styles: &'a Styles,
    cancel: &'a dyn CancelToken,
    max_height: f64,
    pages: Vec<Page>,
    current: Page,
}

impl<'a> Layout<'a> {
    pub fn new(
        settings: &'a PaginationSettings,
        styles: &'a Styles,
        cancel: &'a dyn CancelToken,
        first_page_number: usize,
    ) -> Self {
        let max_height = styles.page_height(settings.paper_size);
        Self {
            settings,
            styles,
            cancel,
            max_height,
            pages: Vec::new(),
            current: Page::new(max_height, first_page_number),
        }
    }

    pub fn run(mut self, blocks: &[Block<'_>]) -> Result<Vec<Page>, Cancelled> {
        for (index, block) in blocks.iter().enumerate() {
            self.place(block, &blocks[index + 1..])?;
        }
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        Ok(self.pages)
    }

    fn at_top(&self) -> bool {
        self.current.is_empty()
    }

    fn break_page(&mut self) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let number = self.current.page_number + 1;
        let finished = std::mem::replace(&mut self.current, Page::new(self.max_height, number));
        trace!(page = finished.page_number, elements = finished.elements.len(), "Finished page");
        self.pages.push(finished);
        Ok(())
    }

    fn place(&mut self, block: &Block<'_>, following: &[Block<'_>]) -> Result<(), Cancelled> {
        match block {
            Block::PageBreak => {
                if !self.at_top() {
                    self.break_page()?;
                }
            }
            Block::Heading(unit) => {
                let needed = unit.height(self.at_top()) + self.kept_height(following);
                if !self.at_top() && !self.follows_heading() && !self.current.fits(needed) {
                    self.break_page()?;
                }
                let top = self.at_top();
                self.current.push(unit.whole(ElementKind::Line, top));
            }
            Block::Fixed(unit) => {
                if !self.at_top() && !self.current.fits(unit.height(false)) {
                    self.break_page()?;
                }
                let top = self.at_top();
                self.current.push(unit.whole(ElementKind::Line, top));
            }
            Block::Paragraph(unit) => self.place_paragraph(unit)?,
            Block::Dialogue(dialogue) => self.place_dialogue(dialogue)?,
            Block::Dual { left, right } => self.place_dual(left, right)?,
        }
        Ok(())
    }

    /// The page ends with a heading whose group was already placed
    fn follows_heading(&self) -> bool {
        self.current
            .elements
            .last()
            .is_some_and(|element| matches!(element.line_type, LineType::Heading | LineType::Section))
    }

    /// Height a heading has to keep on its page: any headings directly
    /// after it plus the smallest part of the first other block
    fn kept_height(&self, following: &[Block<'_>]) -> f64 {
        let mut height = 0.0;
        for block in following {
            match block {
                Block::Heading(unit) => height += unit.height(false),
                other => return height + self.min_height(other),
            }
        }
        height
    }

    /// Smallest part of a block that must follow a heading on the same page
    fn min_height(&self, block: &Block<'_>) -> f64 {
        match block {
            Block::PageBreak => 0.0,
            Block::Heading(unit) | Block::Fixed(unit) => unit.height(false),
            Block::Paragraph(unit) if unit.line_count() >= MIN_SPLIT_LINES * 2 => {
                unit.height_of(MIN_SPLIT_LINES, false, false)
            }
            Block::Paragraph(unit) => unit.height(false),
            Block::Dialogue(dialogue) => self.min_dialogue_height(dialogue, false),
            Block::Dual { left, right } => self
                .min_dialogue_height(left, true)
                .max(self.min_dialogue_height(right, true)),
        }
    }

    /// Cue, body up to the first spoken line and `(MORE)`, or the whole
    /// block when that is shorter
    fn min_dialogue_height(&self, dialogue: &DialogueBlock<'_>, dual: bool) -> f64 {
        let whole = dialogue.cue.height(false)
            + dialogue.body.iter().map(|unit| unit.height(false)).sum::<f64>();

        let mut split = dialogue.cue.height(false) + self.more_unit(dialogue, dual).height(false);
        for unit in &dialogue.body {
            if is_parenthetical(unit.line_type) {
                split += unit.height(false);
            } else {
                split += unit.height_of(1, false, false);
                break;
            }
        }
        whole.min(split)
    }

    fn place_paragraph(&mut self, unit: &Unit<'_>) -> Result<(), Cancelled> {
        let total = unit.line_count();
        let mut start = 0;

        loop {
            let top = self.at_top();
            let split = start > 0;
            let left = total - start;

            if self.current.fits(unit.height_of(left, top, split)) {
                self.current.push(unit.element(start..total, ElementKind::Line, top, split));
                return Ok(());
            }

            let fitting = unit.lines_fitting(self.current.remaining_space, top, split);
            let take = if left >= MIN_SPLIT_LINES * 2 {
                Some(fitting.min(left - MIN_SPLIT_LINES)).filter(|k| *k >= MIN_SPLIT_LINES)
            } else {
                None
            };

            let take = match take {
                Some(take) => take,
                None if !top => {
                    self.break_page()?;
                    continue;
                }
                // Empty page and still too tall: relax the split rules
                None => fitting.clamp(1, left),
            };

            self.current.push(unit.element(start..start + take, ElementKind::Line, top, split));
            start += take;
            if start >= total {
                return Ok(());
            }
            self.break_page()?;
        }
    }

    fn place_dialogue(&mut self, dialogue: &DialogueBlock<'_>) -> Result<(), Cancelled> {
        let mut remainder = Remainder { from: Cursor::START, continued: false };

        loop {
            let top = self.at_top();
            let elements = self.column_elements(dialogue, remainder, None, top);
            let height: f64 = elements.iter().map(|e| e.height).sum();

            if self.current.fits(height) {
                self.push_all(elements);
                return Ok(());
            }

            match self.fit_column(dialogue, remainder, top, self.current.remaining_space, false) {
                ColumnFit::Split(at) => {
                    let mut placed = self.column_elements(dialogue, remainder, Some(at), top);
                    placed.push(self.more_element(dialogue, false));
                    self.push_all(placed);
                    self.break_page()?;
                    remainder = Remainder { from: at, continued: true };
                }
                ColumnFit::All => {
                    self.push_all(elements);
                    return Ok(());
                }
                ColumnFit::Impossible if !top => self.break_page()?,
                ColumnFit::Impossible => {
                    self.push_all(elements);
                    return Ok(());
                }
            }
        }
    }

    fn place_dual(&mut self, left: &DialogueBlock<'_>, right: &DialogueBlock<'_>) -> Result<(), Cancelled> {
        let mut left_rest = Some(Remainder { from: Cursor::START, continued: false });
        let mut right_rest = Some(Remainder { from: Cursor::START, continued: false });

        loop {
            let top = self.at_top();
            let left_all = self.optional_column(left, left_rest, None, top);
            let right_all = self.optional_column(right, right_rest, None, top);
            let full = column_height(&left_all).max(column_height(&right_all));

            if self.current.fits(full) {
                self.current.push(dual_element(left, left_all, right_all));
                return Ok(());
            }

            let available = self.current.remaining_space;
            let left_fit = left_rest.map(|rest| self.fit_column(left, rest, top, available, true));
            let right_fit = right_rest.map(|rest| self.fit_column(right, rest, top, available, true));

            let impossible = matches!(left_fit, Some(ColumnFit::Impossible))
                || matches!(right_fit, Some(ColumnFit::Impossible));
            if impossible {
                if !top {
                    self.break_page()?;
                    continue;
                }
                self.current.push(dual_element(left, left_all, right_all));
                return Ok(());
            }

            let (left_part, next_left) = self.dual_part(left, left_rest, left_fit, top);
            let (right_part, next_right) = self.dual_part(right, right_rest, right_fit, top);
            self.current.push(dual_element(left, left_part, right_part));

            if next_left.is_none() && next_right.is_none() {
                return Ok(());
            }
            self.break_page()?;
            left_rest = next_left;
            right_rest = next_right;
        }
    }

    /// Elements a dual column places on this page and what is left for the next
    fn dual_part(
        &self,
        dialogue: &DialogueBlock<'_>,
        rest: Option<Remainder>,
        fit: Option<ColumnFit>,
        top: bool,
    ) -> (Vec<PageElement>, Option<Remainder>) {
        match (rest, fit) {
            (Some(rest), Some(ColumnFit::Split(at))) => {
                let mut placed = self.column_elements(dialogue, rest, Some(at), top);
                placed.push(self.more_element(dialogue, true));
                (placed, Some(Remainder { from: at, continued: true }))
            }
            (Some(rest), _) => (self.column_elements(dialogue, rest, None, top), None),
            (None, _) => (Vec::new(), None),
        }
    }

    fn optional_column(
        &self,
        dialogue: &DialogueBlock<'_>,
        rest: Option<Remainder>,
        until: Option<Cursor>,
        top: bool,
    ) -> Vec<PageElement> {
        rest.map(|rest| self.column_elements(dialogue, rest, until, top))
            .unwrap_or_default()
    }

    /// Where a dialogue column has to break to fit in `available`
    fn fit_column(
        &self,
        dialogue: &DialogueBlock<'_>,
        rest: Remainder,
        top: bool,
        available: f64,
        dual: bool,
    ) -> ColumnFit {
        let all: f64 = column_height(&self.column_elements(dialogue, rest, None, top));
        if all <= available + 1e-6 {
            return ColumnFit::All;
        }

        let more = self.more_unit(dialogue, dual);
        let budget = available - more.height(false);
        let mut used = self.cue_unit(dialogue, rest.continued).height(top);
        if used > budget + 1e-6 {
            return ColumnFit::Impossible;
        }

        // Last break position and whether the unit before it is a parenthetical
        let mut last: Option<(Cursor, bool)> = None;
        let mut candidates: Vec<(Cursor, bool)> = Vec::new();

        for (index, unit) in dialogue.body.iter().enumerate().skip(rest.from.unit) {
            let first_line = if index == rest.from.unit { rest.from.line } else { 0 };
            let split = first_line > 0;
            let lines = unit.line_count() - first_line;
            let height = unit.height_of(lines, false, split);

            if used + height <= budget + 1e-6 {
                used += height;
                let at = Cursor { unit: index + 1, line: 0 };
                let parenthetical = is_parenthetical(unit.line_type);
                candidates.push((at, parenthetical));
                last = Some((at, parenthetical));
                continue;
            }

            if !is_parenthetical(unit.line_type) {
                let fitting = unit.lines_fitting(budget - used, false, split);
                if fitting >= 1 && fitting < lines {
                    let at = Cursor { unit: index, line: first_line + fitting };
                    candidates.push((at, false));
                    last = Some((at, false));
                }
            }
            break;
        }

        // Step back over a trailing parenthetical
        while let Some((_, true)) = last {
            candidates.pop();
            last = candidates.last().copied();
        }

        match last {
            Some((at, _)) if at != rest.from => ColumnFit::Split(at),
            _ => ColumnFit::Impossible,
        }
    }

    fn cue_unit<'s>(&self, dialogue: &DialogueBlock<'s>, continued: bool) -> Unit<'s> {
        if !continued {
            return dialogue.cue.clone();
        }
        let label = format!("{} {}", dialogue.cue.text, self.settings.contd_label);
        Unit::generated(
            dialogue.cue.line_index,
            dialogue.cue.line_type,
            dialogue.cue.style,
            label,
            self.settings.paper_size,
        )
    }

    fn more_unit<'s>(&'s self, dialogue: &DialogueBlock<'_>, dual: bool) -> Unit<'s> {
        let (line_type, style) = if dual {
            (LineType::DualDialogueMore, "dualDialogueMore")
        } else {
            (LineType::More, "more")
        };
        Unit::generated(
            dialogue.cue.line_index,
            line_type,
            self.styles.style_for(style),
            self.settings.more_label.clone(),
            self.settings.paper_size,
        )
    }

    fn more_element(&self, dialogue: &DialogueBlock<'_>, dual: bool) -> PageElement {
        self.more_unit(dialogue, dual).whole(ElementKind::More, false)
    }

    /// Elements of a dialogue column from `rest.from` up to `until`
    fn column_elements(
        &self,
        dialogue: &DialogueBlock<'_>,
        rest: Remainder,
        until: Option<Cursor>,
        top: bool,
    ) -> Vec<PageElement> {
        let kind = if rest.continued { ElementKind::Continued } else { ElementKind::Line };
        let mut elements = vec![self.cue_unit(dialogue, rest.continued).whole(kind, top)];
        let end = until.unwrap_or(Cursor { unit: dialogue.body.len(), line: 0 });

        for (index, unit) in dialogue.body.iter().enumerate().skip(rest.from.unit) {
            if index > end.unit || (index == end.unit && end.line == 0) {
                break;
            }
            let first = if index == rest.from.unit { rest.from.line } else { 0 };
            let last = if index == end.unit { end.line } else { unit.line_count() };
            if first >= last {
                continue;
            }
            elements.push(unit.element(first..last, ElementKind::Line, false, first > 0));
        }

        stack(&mut elements);
        elements
    }

    fn push_all(&mut self, elements: Vec<PageElement>) {
        for element in elements {
            self.current.push(element);
        }
    }
}

fn is_parenthetical(line_type: LineType) -> bool {
    matches!(line_type, LineType::Parenthetical | LineType::DualDialogueParenthetical)
}

fn column_height(elements: &[PageElement]) -> f64 {
    elements.iter().map(|element| element.height).sum()
}

/// Assign column-relative offsets
fn stack(elements: &mut [PageElement]) {
    let mut y = 0.0;
    for element in elements {
        element.y = y;
        y += element.height;
    }
}

fn dual_element(left: &DialogueBlock<'_>, left_column: Vec<PageElement>, right_column: Vec<PageElement>) -> PageElement {
    let height = column_height(&left_column).max(column_height(&right_column));
    let continuation = left_column.first().map_or(true, |e| e.kind == ElementKind::Continued)
        && right_column.first().map_or(true, |e| e.kind == ElementKind::Continued);
    PageElement {
        kind: ElementKind::DualDialogue { left: left_column, right: right_column },
        line_type: LineType::DualDialogue,
        style: "dualDialogue".to_string(),
        line_index: Some(left.cue.line_index),
        text: String::new(),
        wrapped: Vec::new(),
        y: 0.0,
        margin_top: 0.0,
        height,
        scene_number: None,
        continuation,
    }
}
