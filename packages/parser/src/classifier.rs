//! # Line Classification
//!
//! Pure classification of a single line. The result depends only on:
//!
//! - the line's own text
//! - the type of the immediately preceding line
//! - whether the immediately following line is blank
//! - the [`ParseState`] carried out of the preceding line
//!
//! Full and incremental parsing both go through [`classify`], which is what
//! keeps them observably identical.

use crate::line::LineType;

/// Context carried from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseState {
    /// Inside an unterminated `/*` boneyard range
    pub in_omit: bool,
    /// Inside an unterminated `[[` note
    pub in_note: bool,
    pub title_page: TitlePageState,
}

/// Progress through the leading title page block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitlePageState {
    /// Nothing parsed yet
    #[default]
    Start,
    /// Inside the title page; continuation lines inherit this key type
    Field(LineType),
    /// The body has started
    Done,
}

/// Inputs describing a line's neighbourhood
#[derive(Debug, Clone, Copy)]
pub struct Neighbours {
    pub previous: Option<LineType>,
    /// `None` when the line is the last one in the document
    pub next_is_blank: Option<bool>,
}

/// Classification output for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub line_type: LineType,
    pub paragraph_continuation: bool,
    pub omitted: bool,
    pub note: bool,
    /// State to hand to the following line
    pub state: ParseState,
}

/// Classify one line
pub fn classify(text: &str, neighbours: Neighbours, state: ParseState) -> Classification {
    let (omitted, note, in_omit, in_note) = scan_ranges(text, state.in_omit, state.in_note);
    let mut next_state = ParseState { in_omit, in_note, title_page: state.title_page };

    let line_type = match state.title_page {
        TitlePageState::Start | TitlePageState::Field(_) => {
            match classify_title_page(text, state.title_page) {
                Some((line_type, title_state)) => {
                    next_state.title_page = title_state;
                    Some(line_type)
                }
                None => {
                    next_state.title_page = TitlePageState::Done;
                    None
                }
            }
        }
        TitlePageState::Done => None,
    }
    .unwrap_or_else(|| classify_body(text, neighbours));

    let paragraph_continuation = line_type.joins_paragraphs()
        && neighbours.previous == Some(line_type);

    Classification { line_type, paragraph_continuation, omitted, note, state: next_state }
}

/// Title page handling. `None` means the line belongs to the body.
fn classify_title_page(text: &str, state: TitlePageState) -> Option<(LineType, TitlePageState)> {
    if let Some(key_type) = title_page_key(text) {
        // Only a recognised key opens a title page
        let opens = key_type != LineType::TitlePageUnknown || is_untyped_title_key(text);
        if state != TitlePageState::Start || opens {
            return Some((key_type, TitlePageState::Field(key_type)));
        }
        return None;
    }

    match state {
        TitlePageState::Field(_) if text.trim().is_empty() => {
            // The blank line closing the title page still belongs to it
            Some((LineType::Empty, TitlePageState::Done))
        }
        TitlePageState::Field(current) => Some((current, TitlePageState::Field(current))),
        _ => None,
    }
}

/// Recognise `Key: value` title page syntax
pub(crate) fn title_page_key(text: &str) -> Option<LineType> {
    if text.starts_with(' ') || text.starts_with('\t') {
        return None;
    }
    let colon = text.find(':')?;
    let key = &text[..colon];
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == ' ' || c == '_') {
        return None;
    }
    if !key.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }

    let line_type = match key.trim().to_lowercase().as_str() {
        "title" => LineType::TitlePageTitle,
        "credit" => LineType::TitlePageCredit,
        "author" | "authors" => LineType::TitlePageAuthor,
        "source" => LineType::TitlePageSource,
        "draft date" => LineType::TitlePageDraftDate,
        "contact" => LineType::TitlePageContact,
        _ => LineType::TitlePageUnknown,
    };
    Some(line_type)
}

/// Title page keys printed without a line type of their own
fn is_untyped_title_key(text: &str) -> bool {
    let key = text.split(':').next().unwrap_or_default().trim().to_lowercase();
    matches!(key.as_str(), "notes" | "copyright" | "revision" | "date")
}

fn classify_body(text: &str, neighbours: Neighbours) -> LineType {
    let previous = neighbours.previous;
    let trimmed = text.trim();

    if trimmed.is_empty() {
        // Two or more spaces keep a dialogue block open
        if text.len() >= 2 {
            match previous {
                Some(LineType::Dialogue | LineType::Parenthetical) => return LineType::Dialogue,
                Some(LineType::DualDialogue | LineType::DualDialogueParenthetical) => {
                    return LineType::DualDialogue
                }
                _ => {}
            }
        }
        return LineType::Empty;
    }

    if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '=') {
        return LineType::PageBreak;
    }

    match trimmed.as_bytes()[0] {
        b'#' => return LineType::Section,
        b'=' => return LineType::Synopsis,
        b'!' => return LineType::Action,
        b'~' => return LineType::Lyrics,
        b'>' if trimmed.ends_with('<') && trimmed.len() > 1 => return LineType::Centered,
        b'>' => return LineType::Transition,
        b'.' if is_forced_heading(trimmed) => return LineType::Heading,
        b'@' => {
            return if trimmed.ends_with('^') {
                LineType::DualDialogueCharacter
            } else {
                LineType::Character
            };
        }
        _ => {}
    }

    // Inside a dialogue block
    match previous {
        Some(LineType::Character | LineType::Parenthetical | LineType::Dialogue) => {
            return if trimmed.starts_with('(') {
                LineType::Parenthetical
            } else {
                LineType::Dialogue
            };
        }
        Some(
            LineType::DualDialogueCharacter
            | LineType::DualDialogueParenthetical
            | LineType::DualDialogue,
        ) => {
            return if trimmed.starts_with('(') {
                LineType::DualDialogueParenthetical
            } else {
                LineType::DualDialogue
            };
        }
        _ => {}
    }

    let block_start = previous.map_or(true, LineType::ends_block);
    if !block_start {
        return LineType::Action;
    }

    if previous != Some(LineType::Heading) && is_heading(trimmed) {
        return LineType::Heading;
    }

    if is_transition(trimmed) {
        return LineType::Transition;
    }

    // A cue needs something to say
    if neighbours.next_is_blank == Some(false) && is_character_cue(trimmed) {
        return if trimmed.ends_with('^') {
            LineType::DualDialogueCharacter
        } else {
            LineType::Character
        };
    }

    LineType::Action
}

fn is_forced_heading(trimmed: &str) -> bool {
    trimmed[1..].chars().next().is_some_and(char::is_alphanumeric)
}

const HEADING_PREFIXES: &[&str] = &["int./ext", "int/ext", "i./e", "i/e", "int", "ext", "est"];

fn is_heading(trimmed: &str) -> bool {
    let lower = trimmed.to_lowercase();
    HEADING_PREFIXES.iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with(' '))
    })
}

const TRANSITION_PHRASES: &[&str] = &["FADE OUT.", "FADE TO BLACK.", "CUT TO BLACK.", "FADE IN:"];

fn is_transition(trimmed: &str) -> bool {
    if !is_upper_case(trimmed) {
        return false;
    }
    trimmed.ends_with("TO:") || TRANSITION_PHRASES.contains(&trimmed)
}

fn is_character_cue(trimmed: &str) -> bool {
    let cue = trimmed.strip_suffix('^').unwrap_or(trimmed).trim_end();
    let name = match cue.find('(') {
        Some(paren) => &cue[..paren],
        None => cue,
    };
    is_upper_case(name) && !name.trim().is_empty()
}

/// At least one letter and no lowercase letters
fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Scan boneyard and note delimiters.
///
/// Returns `(omitted, note, in_omit_after, in_note_after)`. A line is omitted
/// (or a note) when all of its visible characters fall inside such a range.
fn scan_ranges(text: &str, mut in_omit: bool, mut in_note: bool) -> (bool, bool, bool, bool) {
    let mut visible = false;
    let mut saw_omit = in_omit;
    let mut saw_note = in_note;
    let mut previous = '\0';

    for c in text.chars() {
        let pair = (previous, c);
        let mut consumed = true;
        match pair {
            ('/', '*') if !in_omit && !in_note => {
                in_omit = true;
                saw_omit = true;
            }
            ('*', '/') if in_omit => in_omit = false,
            ('[', '[') if !in_omit && !in_note => {
                in_note = true;
                saw_note = true;
            }
            (']', ']') if in_note => in_note = false,
            _ => consumed = false,
        }

        if consumed {
            previous = '\0';
            continue;
        }
        // A delimiter half is only visible once we know it is not part of a pair
        if !in_omit && !in_note && !c.is_whitespace() && !matches!(c, '/' | '*' | '[' | ']') {
            visible = true;
        }
        previous = c;
    }

    let has_content = !text.trim().is_empty();
    let hidden = has_content && !visible;
    let omitted = hidden && saw_omit;
    let note = hidden && !saw_omit && saw_note;
    (omitted, note, in_omit, in_note)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str, previous: Option<LineType>, next_is_blank: Option<bool>) -> LineType {
        let state = ParseState { title_page: TitlePageState::Done, ..Default::default() };
        classify(text, Neighbours { previous, next_is_blank }, state).line_type
    }

    #[test]
    fn test_heading_detection() {
        assert_eq!(body("INT. ROOM - DAY", None, Some(false)), LineType::Heading);
        assert_eq!(body("ext. road", Some(LineType::Empty), None), LineType::Heading);
        assert_eq!(body("I/E CAR - NIGHT", Some(LineType::Empty), None), LineType::Heading);
        assert_eq!(body(".MONTAGE", Some(LineType::Empty), None), LineType::Heading);
        assert_eq!(body("INTERIOR", Some(LineType::Empty), None), LineType::Action);
    }

    #[test]
    fn test_character_requires_following_line() {
        assert_eq!(body("JOHN", Some(LineType::Empty), Some(false)), LineType::Character);
        assert_eq!(body("JOHN", Some(LineType::Empty), Some(true)), LineType::Action);
        assert_eq!(body("JOHN", Some(LineType::Empty), None), LineType::Action);
        assert_eq!(body("JOHN", Some(LineType::Heading), Some(false)), LineType::Character);
        assert_eq!(body("JOHN", Some(LineType::Action), Some(false)), LineType::Action);
        assert_eq!(body("MARY (O.S.) ^", None, Some(false)), LineType::DualDialogueCharacter);
        assert_eq!(body("JOHN (cont'd)", None, Some(false)), LineType::Character);
    }

    #[test]
    fn test_dialogue_block() {
        assert_eq!(body("Hello.", Some(LineType::Character), None), LineType::Dialogue);
        assert_eq!(body("(quietly)", Some(LineType::Character), None), LineType::Parenthetical);
        assert_eq!(body("Yes.", Some(LineType::Parenthetical), None), LineType::Dialogue);
        assert_eq!(
            body("Hi.", Some(LineType::DualDialogueCharacter), None),
            LineType::DualDialogue
        );
        assert_eq!(body("  ", Some(LineType::Dialogue), None), LineType::Dialogue);
    }

    #[test]
    fn test_forced_elements() {
        assert_eq!(body("!JOHN", Some(LineType::Empty), Some(false)), LineType::Action);
        assert_eq!(body("@McCLANE", Some(LineType::Empty), Some(true)), LineType::Character);
        assert_eq!(body("> CUT TO:", Some(LineType::Empty), None), LineType::Transition);
        assert_eq!(body("> THE END <", Some(LineType::Empty), None), LineType::Centered);
        assert_eq!(body("~La la la", Some(LineType::Empty), None), LineType::Lyrics);
        assert_eq!(body("===", Some(LineType::Empty), None), LineType::PageBreak);
        assert_eq!(body("# Act One", None, None), LineType::Section);
        assert_eq!(body("= The hero arrives", None, None), LineType::Synopsis);
    }

    #[test]
    fn test_transition() {
        assert_eq!(body("CUT TO:", Some(LineType::Empty), Some(true)), LineType::Transition);
        assert_eq!(body("FADE OUT.", Some(LineType::Empty), None), LineType::Transition);
        assert_eq!(body("Cut to:", Some(LineType::Empty), None), LineType::Action);
    }

    #[test]
    fn test_paragraph_continuation() {
        let state = ParseState { title_page: TitlePageState::Done, ..Default::default() };
        let result = classify(
            "more action",
            Neighbours { previous: Some(LineType::Action), next_is_blank: None },
            state,
        );
        assert_eq!(result.line_type, LineType::Action);
        assert!(result.paragraph_continuation);
    }

    #[test]
    fn test_title_page_fields() {
        let start = ParseState::default();
        let neighbours = Neighbours { previous: None, next_is_blank: Some(false) };

        let title = classify("Title: Big Fish", neighbours, start);
        assert_eq!(title.line_type, LineType::TitlePageTitle);

        let continuation = classify(
            "    by John August",
            Neighbours { previous: Some(LineType::TitlePageTitle), next_is_blank: Some(true) },
            title.state,
        );
        assert_eq!(continuation.line_type, LineType::TitlePageTitle);

        let closing = classify("", neighbours, continuation.state);
        assert_eq!(closing.line_type, LineType::Empty);
        assert_eq!(closing.state.title_page, TitlePageState::Done);

        // No title page: the first line is body text
        let body_line = classify("INT. ROOM - DAY", neighbours, start);
        assert_eq!(body_line.line_type, LineType::Heading);
        assert_eq!(body_line.state.title_page, TitlePageState::Done);
    }

    #[test]
    fn test_unknown_key_does_not_open_title_page() {
        let start = ParseState::default();
        let neighbours = Neighbours { previous: None, next_is_blank: Some(true) };

        let opening = classify("FADE IN:", neighbours, start);
        assert_eq!(opening.line_type, LineType::Transition);
        assert_eq!(opening.state.title_page, TitlePageState::Done);

        let notes = classify("Notes: second draft", neighbours, start);
        assert_eq!(notes.line_type, LineType::TitlePageUnknown);

        // Inside a title page any key is a field
        let title = classify("Title: Big Fish", neighbours, start);
        let extra = classify("Format: Feature", neighbours, title.state);
        assert_eq!(extra.line_type, LineType::TitlePageUnknown);
    }

    #[test]
    fn test_boneyard_and_notes() {
        let state = ParseState { title_page: TitlePageState::Done, ..Default::default() };
        let neighbours = Neighbours { previous: Some(LineType::Empty), next_is_blank: None };

        let open = classify("/* cut this", neighbours, state);
        assert!(open.omitted);
        assert!(open.state.in_omit);

        let inside = classify("and this", neighbours, open.state);
        assert!(inside.omitted);

        let close = classify("done */ visible", neighbours, inside.state);
        assert!(!close.omitted);
        assert!(!close.state.in_omit);

        let note = classify("[[just a note]]", neighbours, state);
        assert!(note.note);
        assert!(!note.omitted);

        let mixed = classify("Text [[note]]", neighbours, state);
        assert!(!mixed.note);
    }
}
