use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Element type of a screenplay line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    Empty,
    Section,
    Synopsis,
    TitlePageTitle,
    TitlePageCredit,
    TitlePageAuthor,
    TitlePageSource,
    TitlePageDraftDate,
    TitlePageContact,
    TitlePageUnknown,
    Heading,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    DualDialogueCharacter,
    DualDialogueParenthetical,
    DualDialogue,
    Transition,
    Lyrics,
    Centered,
    PageBreak,
    /// Generated by the paginator, never by the parser
    More,
    /// Generated by the paginator, never by the parser
    DualDialogueMore,
}

impl LineType {
    /// Stylesheet selector used to look up the render style for this type
    pub fn style_name(self) -> &'static str {
        match self {
            LineType::Empty => "empty",
            LineType::Section => "section",
            LineType::Synopsis => "synopsis",
            LineType::TitlePageTitle => "titlePageTitle",
            LineType::TitlePageCredit => "titlePageCredit",
            LineType::TitlePageAuthor => "titlePageAuthor",
            LineType::TitlePageSource => "titlePageSource",
            LineType::TitlePageDraftDate => "titlePageDraftDate",
            LineType::TitlePageContact => "titlePageContact",
            LineType::TitlePageUnknown => "titlePageUnknown",
            LineType::Heading => "heading",
            LineType::Action => "action",
            LineType::Character => "character",
            LineType::Parenthetical => "parenthetical",
            LineType::Dialogue => "dialogue",
            LineType::DualDialogueCharacter => "dualDialogueCharacter",
            LineType::DualDialogueParenthetical => "dualDialogueParenthetical",
            LineType::DualDialogue => "dualDialogue",
            LineType::Transition => "transition",
            LineType::Lyrics => "lyrics",
            LineType::Centered => "centered",
            LineType::PageBreak => "pageBreak",
            LineType::More => "more",
            LineType::DualDialogueMore => "dualDialogueMore",
        }
    }

    /// Headings, sections and synopses open an outline entry
    pub fn is_outline_element(self) -> bool {
        matches!(self, LineType::Heading | LineType::Section | LineType::Synopsis)
    }

    pub fn is_title_page(self) -> bool {
        matches!(
            self,
            LineType::TitlePageTitle
                | LineType::TitlePageCredit
                | LineType::TitlePageAuthor
                | LineType::TitlePageSource
                | LineType::TitlePageDraftDate
                | LineType::TitlePageContact
                | LineType::TitlePageUnknown
        )
    }

    pub fn is_character(self) -> bool {
        matches!(self, LineType::Character | LineType::DualDialogueCharacter)
    }

    /// Any line that belongs to a dialogue block, cue included
    pub fn is_any_dialogue(self) -> bool {
        self.is_dialogue() || self.is_dual_dialogue()
    }

    pub fn is_dialogue(self) -> bool {
        matches!(
            self,
            LineType::Character | LineType::Parenthetical | LineType::Dialogue | LineType::More
        )
    }

    pub fn is_dual_dialogue(self) -> bool {
        matches!(
            self,
            LineType::DualDialogueCharacter
                | LineType::DualDialogueParenthetical
                | LineType::DualDialogue
                | LineType::DualDialogueMore
        )
    }

    /// Body lines (parenthetical or speech) that may follow a cue
    pub fn is_dialogue_body(self) -> bool {
        matches!(
            self,
            LineType::Parenthetical
                | LineType::Dialogue
                | LineType::DualDialogueParenthetical
                | LineType::DualDialogue
        )
    }

    /// Types whose consecutive lines form one paragraph
    pub fn joins_paragraphs(self) -> bool {
        matches!(
            self,
            LineType::Action
                | LineType::Dialogue
                | LineType::DualDialogue
                | LineType::Lyrics
                | LineType::Centered
        )
    }

    /// Lines after which a new block (cue, heading, transition) may start
    pub fn ends_block(self) -> bool {
        matches!(
            self,
            LineType::Empty
                | LineType::Heading
                | LineType::Transition
                | LineType::Section
                | LineType::Synopsis
                | LineType::PageBreak
        )
    }
}

/// Scene number marker at the end of a heading (`#12A#`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneNumberMarker {
    /// `#12A#`
    Custom(String),
    /// `##`: the heading is deliberately left unnumbered
    Omitted,
}

/// One logical screenplay line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Raw text, without the trailing newline
    pub string: String,
    pub line_type: LineType,
    /// Absolute byte offset of the line in the document
    pub position: usize,
    /// Monotonic index of outline lines (heading, section, synopsis)
    pub scene_index: Option<usize>,
    /// Same type as a non-empty predecessor: part of a split paragraph
    pub paragraph_continuation: bool,
    /// Entirely inside a `/* */` boneyard range
    pub omitted: bool,
    /// Entirely inside a `[[ ]]` note range
    pub note: bool,
    /// Opaque revision marker carried for external consumers
    pub revision: Option<String>,
    /// Opaque tags carried for external consumers
    pub tags: Vec<String>,
    /// Whether this line owns a trailing newline (all but the final line do)
    pub(crate) newline: bool,
}

impl Line {
    pub fn new(string: impl Into<String>, line_type: LineType, position: usize) -> Self {
        Self {
            string: string.into(),
            line_type,
            position,
            scene_index: None,
            paragraph_continuation: false,
            omitted: false,
            note: false,
            revision: None,
            tags: Vec::new(),
            newline: true,
        }
    }

    /// Text length plus the newline the line owns
    pub fn length(&self) -> usize {
        self.string.len() + usize::from(self.newline)
    }

    pub fn end(&self) -> usize {
        self.position + self.length()
    }

    pub fn range(&self) -> Range<usize> {
        self.position..self.end()
    }

    pub fn owns_newline(&self) -> bool {
        self.newline
    }

    /// Whether `offset` falls inside this line (the final line also owns the end of text)
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.position && (offset < self.end() || (!self.newline && offset == self.end()))
    }

    pub fn is_blank(&self) -> bool {
        self.string.trim().is_empty()
    }

    /// Hidden from output: boneyard or note-only lines
    pub fn is_invisible(&self) -> bool {
        self.omitted || self.note
    }

    pub fn is_outline_element(&self) -> bool {
        self.line_type.is_outline_element()
    }

    /// Section depth, counted from the leading `#` characters
    pub fn section_depth(&self) -> usize {
        if self.line_type != LineType::Section {
            return 0;
        }
        self.string.trim_start().chars().take_while(|c| *c == '#').count()
    }

    /// Scene number marker of a heading, if any
    pub fn scene_number_marker(&self) -> Option<SceneNumberMarker> {
        if self.line_type != LineType::Heading {
            return None;
        }
        let trimmed = self.string.trim_end();
        let body = trimmed.strip_suffix('#')?;
        let open = body.rfind('#')?;
        let number = body[open + 1..].trim();
        if number.is_empty() {
            Some(SceneNumberMarker::Omitted)
        } else if number.chars().all(|c| c.is_alphanumeric() || matches!(c, '.' | '-')) {
            Some(SceneNumberMarker::Custom(number.to_string()))
        } else {
            None
        }
    }

    /// Character name of a cue, without extensions or the dual marker
    pub fn character_name(&self) -> Option<String> {
        if !self.line_type.is_character() {
            return None;
        }
        let cue = strip_cue_markers(&self.string);
        let name = match cue.find('(') {
            Some(paren) => &cue[..paren],
            None => cue,
        };
        Some(name.trim().to_string())
    }

    /// Display text with markup removed: notes, boneyard, forcing prefixes,
    /// scene number markers and the dual-dialogue caret
    pub fn stripped(&self) -> String {
        let visible = strip_inline_markup(&self.string);
        let trimmed = visible.trim();
        let text = match self.line_type {
            LineType::Heading => {
                let without_number = match (self.scene_number_marker(), trimmed.strip_suffix('#')) {
                    (Some(_), Some(body)) => match body.rfind('#') {
                        Some(open) => body[..open].trim_end(),
                        None => trimmed,
                    },
                    _ => trimmed,
                };
                strip_forced_heading(without_number)
            }
            LineType::Character | LineType::DualDialogueCharacter => {
                strip_cue_markers(trimmed)
            }
            LineType::Action => trimmed.strip_prefix('!').unwrap_or(trimmed),
            LineType::Lyrics => trimmed.strip_prefix('~').unwrap_or(trimmed).trim_start(),
            LineType::Transition => trimmed.strip_prefix('>').unwrap_or(trimmed).trim_start(),
            LineType::Centered => trimmed
                .strip_prefix('>')
                .and_then(|t| t.strip_suffix('<'))
                .unwrap_or(trimmed)
                .trim(),
            LineType::Section => trimmed.trim_start_matches('#').trim_start(),
            LineType::Synopsis => trimmed.trim_start_matches('=').trim_start(),
            _ => trimmed,
        };
        text.to_string()
    }
}

fn strip_forced_heading(text: &str) -> &str {
    match text.strip_prefix('.') {
        Some(rest) if !rest.starts_with('.') => rest,
        _ => text,
    }
}

fn strip_cue_markers(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('@').unwrap_or(text);
    text.strip_suffix('^').unwrap_or(text).trim()
}

/// Remove `[[notes]]` and `/* boneyard */` spans that open and close on this line
pub fn strip_inline_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let note = rest.find("[[");
        let omit = rest.find("/*");
        let (open, close) = match (note, omit) {
            (Some(n), Some(o)) if o < n => (o, "*/"),
            (Some(n), _) => (n, "]]"),
            (None, Some(o)) => (o, "*/"),
            (None, None) => break,
        };
        out.push_str(&rest[..open]);
        match rest[open + 2..].find(close) {
            Some(end) => rest = &rest[open + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
