//! Grouping of screenplay lines into layout blocks.
//!
//! A block is the smallest run of lines the layout reasons about: a heading,
//! a paragraph line, a dialogue block (cue plus body) or a pair of dialogue
//! blocks printed side by side.

use crate::measure::Unit;
use scriptform_parser::{Line, LineType, Screenplay};
use scriptform_styles::{PaperSize, Styles};

#[derive(Debug, Clone)]
pub(crate) struct DialogueBlock<'s> {
    pub cue: Unit<'s>,
    pub body: Vec<Unit<'s>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Block<'s> {
    PageBreak,
    /// Headings and sections are kept with the block that follows
    Heading(Unit<'s>),
    /// Breakable at wrapped-line granularity
    Paragraph(Unit<'s>),
    /// Never broken
    Fixed(Unit<'s>),
    Dialogue(DialogueBlock<'s>),
    Dual {
        left: DialogueBlock<'s>,
        right: DialogueBlock<'s>,
    },
}

/// Column a dialogue block is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Full,
    Dual,
}

fn column_style_name(line_type: LineType, column: Column) -> &'static str {
    match (column, line_type) {
        (Column::Full, LineType::Character | LineType::DualDialogueCharacter) => "character",
        (Column::Full, LineType::Parenthetical | LineType::DualDialogueParenthetical) => {
            "parenthetical"
        }
        (Column::Full, _) => "dialogue",
        (Column::Dual, LineType::Character | LineType::DualDialogueCharacter) => {
            "dualDialogueCharacter"
        }
        (Column::Dual, LineType::Parenthetical | LineType::DualDialogueParenthetical) => {
            "dualDialogueParenthetical"
        }
        (Column::Dual, _) => "dualDialogue",
    }
}

pub(crate) struct BlockBuilder<'a, 's> {
    screenplay: &'a Screenplay,
    styles: &'s Styles,
    paper: PaperSize,
}

impl<'a, 's> BlockBuilder<'a, 's> {
    pub fn new(screenplay: &'a Screenplay, styles: &'s Styles, paper: PaperSize) -> Self {
        Self { screenplay, styles, paper }
    }

    fn lines(&self) -> &'a [Line] {
        &self.screenplay.lines
    }

    /// Lines that produce no output
    fn is_hidden(&self, line: &Line) -> bool {
        line.is_invisible()
            || line.line_type == LineType::Empty
            || line.line_type.is_title_page()
            || matches!(line.line_type, LineType::More | LineType::DualDialogueMore)
            || !self.styles.style_for(line.line_type.style_name()).visible
    }

    fn unit(&self, index: usize, style_name: &str) -> Unit<'s> {
        let line = &self.lines()[index];
        let mut unit = Unit::new(index, line, self.styles.style_for(style_name), self.paper);
        if line.line_type == LineType::Heading {
            unit.scene_number = self.screenplay.scene_number(index).map(str::to_string);
        }
        unit
    }

    /// Blocks for every body line from `from` on
    pub fn build(&self, from: usize) -> Vec<Block<'s>> {
        let lines = self.lines();
        let mut blocks = Vec::new();
        let mut index = from.max(self.screenplay.body_start);

        while index < lines.len() {
            let line = &lines[index];
            if line.line_type == LineType::PageBreak && !line.is_invisible() {
                blocks.push(Block::PageBreak);
                index += 1;
                continue;
            }
            if self.is_hidden(line) {
                index += 1;
                continue;
            }

            let style = self.styles.style_for(line.line_type.style_name());
            if style.begins_page {
                blocks.push(Block::PageBreak);
            }

            match line.line_type {
                LineType::Heading | LineType::Section => {
                    blocks.push(Block::Heading(self.unit(index, line.line_type.style_name())));
                    index += 1;
                }
                LineType::Action | LineType::Lyrics => {
                    blocks.push(Block::Paragraph(self.unit(index, line.line_type.style_name())));
                    index += 1;
                }
                LineType::Character => {
                    let (left, next) = self.dialogue(index, Column::Full);
                    match self.dual_partner(next) {
                        Some(partner) => {
                            let (left, _) = self.dialogue(index, Column::Dual);
                            let (right, after) = self.dialogue(partner, Column::Dual);
                            blocks.push(Block::Dual { left, right });
                            index = after;
                        }
                        None => {
                            blocks.push(Block::Dialogue(left));
                            index = next;
                        }
                    }
                }
                LineType::DualDialogueCharacter => {
                    // No block to pair with: print as ordinary dialogue
                    let (block, next) = self.dialogue(index, Column::Full);
                    blocks.push(Block::Dialogue(block));
                    index = next;
                }
                _ => {
                    blocks.push(Block::Fixed(self.unit(index, line.line_type.style_name())));
                    index += 1;
                }
            }
        }

        blocks
    }

    /// Cue at `cue` and its body; returns the block and the next line index
    fn dialogue(&self, cue: usize, column: Column) -> (DialogueBlock<'s>, usize) {
        let lines = self.lines();
        let cue_unit = self.unit(cue, column_style_name(lines[cue].line_type, column));
        let mut body = Vec::new();
        let mut index = cue + 1;

        while index < lines.len() && lines[index].line_type.is_dialogue_body() {
            let style_name = column_style_name(lines[index].line_type, column);
            if !lines[index].is_invisible() && self.styles.style_for(style_name).visible {
                body.push(self.unit(index, style_name));
            }
            index += 1;
        }

        (DialogueBlock { cue: cue_unit, body }, index)
    }

    /// A dual dialogue cue following the block that ended before `from`
    fn dual_partner(&self, from: usize) -> Option<usize> {
        let lines = self.lines();
        let mut index = from;
        while index < lines.len()
            && (lines[index].line_type == LineType::Empty || lines[index].is_invisible())
        {
            index += 1;
        }
        let line = lines.get(index)?;
        (line.line_type == LineType::DualDialogueCharacter).then_some(index)
    }
}
