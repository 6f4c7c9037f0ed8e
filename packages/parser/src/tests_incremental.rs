//! Incremental edits must always agree with a full parse of the edited text.

use crate::{LineType, Parser};

const SAMPLE: &str = "Title: The Lighthouse
Author: R. Keeper

INT. LIGHTHOUSE - NIGHT

Rain lashes the glass.
The lamp turns.

KEEPER
(to himself)
Another storm.

Always another storm.

MARY ^
Come down!

/* An old scene
INT. CELLAR - DAY
*/

> CUT TO:

# Act Two

= The keeper descends.

EXT. ROCKS - DAWN #12A#

[[remember the gulls]]
~Sea shanty
===
";

const FRAGMENTS: &[&str] = &[
    "", "\n", "\n\n", "JOHN", "INT. ", "EXT. PIER - DAY", "/*", "*/", "[[", "]]", "(beat)",
    "  ", "Title: X\n", "===", ".", "@", "^", "# ", "= ", "> ", "<", "CUT TO:", "hello", "!",
];

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next_value(&mut self) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize
    }

    fn below(&mut self, bound: usize) -> usize {
        self.next_value() % bound.max(1)
    }
}

fn assert_matches_full_parse(parser: &Parser, context: &str) {
    let text = parser.text();
    let full = Parser::parse(&text);
    assert_eq!(
        parser.lines(),
        full.lines(),
        "incremental result diverged from a full parse after {context}\ntext: {text:?}"
    );
}

fn assert_contiguous(parser: &Parser) {
    let mut expected = 0;
    for line in parser.lines() {
        assert_eq!(line.position, expected);
        expected = line.end();
    }
    assert_eq!(expected, parser.len());
}

#[test]
fn test_typing_document_character_by_character() {
    let mut parser = Parser::parse("");
    for (offset, c) in SAMPLE.char_indices() {
        let mut buffer = [0u8; 4];
        parser.insert(offset, c.encode_utf8(&mut buffer)).unwrap();
        assert_matches_full_parse(&parser, &format!("typing {c:?} at {offset}"));
    }
    assert_eq!(parser.text(), SAMPLE);
}

#[test]
fn test_deleting_document_from_the_front() {
    let mut parser = Parser::parse(SAMPLE);
    while !parser.is_empty() {
        parser.delete(0..1).unwrap();
        assert_matches_full_parse(&parser, "deleting the first character");
    }
    assert_eq!(parser.lines().len(), 1);
}

#[test]
fn test_random_edits_match_full_parse() {
    let mut rng = Lcg(0x5eed);
    let mut parser = Parser::parse(SAMPLE);

    for step in 0..600 {
        let len = parser.len();
        let start = rng.below(len + 1);
        let end = (start + rng.below(12)).min(len);
        let replacement = FRAGMENTS[rng.below(FRAGMENTS.len())];

        let change = parser.apply_edit(start..end, replacement).unwrap();
        assert_eq!(change.delta, replacement.len() as isize - (end - start) as isize);
        assert_matches_full_parse(&parser, &format!("step {step}: {start}..{end} -> {replacement:?}"));
        assert_contiguous(&parser);
    }
}

#[test]
fn test_scene_indices_follow_structure_edits() {
    let mut parser = Parser::parse("INT. A - DAY\n\nAction.\n\nINT. B - DAY");
    // Fill the blank line after the first heading
    parser.insert(13, "x").unwrap();
    assert_matches_full_parse(&parser, "filling a blank line");

    // Text right above the second heading demotes it to action
    let blank = parser.lines()[3].position;
    parser.insert(blank, "more").unwrap();
    assert_eq!(parser.lines()[4].line_type, LineType::Action);
    assert_eq!(parser.lines()[4].scene_index, None);
    assert_matches_full_parse(&parser, "demoting a heading");
}

#[test]
fn test_change_locality_for_unrelated_edit() {
    let mut parser = Parser::parse(SAMPLE);
    let before = parser.lines().to_vec();
    let target = parser
        .lines()
        .iter()
        .position(|line| line.string == "Rain lashes the glass.")
        .unwrap();
    let offset = parser.lines()[target].position + 4;

    let change = parser.insert(offset, "ing").unwrap();
    assert_eq!(change.changed.iter().copied().collect::<Vec<_>>(), vec![target]);
    assert!(!change.outline_changed);
    for (index, (old, new)) in before.iter().zip(parser.lines()).enumerate() {
        if index < target {
            assert_eq!(old, new);
        } else if index > target {
            assert_eq!(old.line_type, new.line_type);
            assert_eq!(old.position + 3, new.position);
        }
    }
}

#[test]
fn test_opening_boneyard_propagates_until_closed() {
    let mut parser = Parser::parse("Action one.\n\nAction two.\n\nAction three.\n\nEnd. */");
    let change = parser.insert(0, "/*").unwrap();
    assert!(parser.lines()[..6]
        .iter()
        .filter(|line| !line.is_blank())
        .all(|line| line.omitted));
    assert!(change.changed.contains(&2));
    assert!(change.changed.contains(&4));
    assert_matches_full_parse(&parser, "opening a boneyard");
}
