use crate::cancel::NeverCancel;
use crate::pagination::Pagination;
use crate::paginator::{paginate, Paginator};
use crate::settings::PaginationSettings;
use scriptform_parser::{LineType, Parser, Screenplay, ScreenplayOptions};
use scriptform_styles::{NoSettings, PaperSize, Styles};

const SHEET: &str = "
page { width-a4: 60ch; width-letter: 61ch; page-height-a4: 14l; page-height-letter: 12l; line-height: 1l }
action { margin-top: 1l }
heading { margin-top: 2l }
character { margin-top: 1l; width: 38ch }
parenthetical { width: 25ch }
dialogue { width: 35ch }
dualDialogueCharacter { margin-top: 1l; width: 20ch }
dualDialogue { width: 28ch }
section, synopsis { visible: false }
";

const FRAGMENTS: &[&str] = &[
    "", "\n", "\n\n", "JOHN\n", "INT. PIER - DAY\n\n", "(beat)\n", "more words here ", "===\n",
    "MARY ^\n", "# ", "x", "A much longer sentence that wraps across the column edge. ",
];

struct Lcg(u64);

impl Lcg {
    fn next_value(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_value() % bound.max(1) as u64) as usize
    }
}

fn script() -> String {
    let mut text = String::from("Title: Harbour\nAuthor: Someone\n\n");
    for scene in 0..14 {
        text.push_str(&format!("INT. HARBOUR {scene} - NIGHT\n\n"));
        text.push_str("Boats creak against the pier while the tide comes in slowly.\n\n");
        text.push_str("JOHN\n(quietly)\nWe should go.\nBefore the fog.\n\n");
        text.push_str("MARY\nNot yet.\n\nJOHN ^\nNow.\n\n");
        if scene % 5 == 4 {
            text.push_str("===\n\n");
        }
    }
    text
}

fn snapshot(parser: &Parser) -> Screenplay {
    Screenplay::from_parser(parser, &ScreenplayOptions::default())
}

/// First line a consumer has to redo after an edit starting at `offset`
fn change_at(parser: &Parser, first_changed: Option<usize>, offset: usize) -> usize {
    let edited = parser.line_index_at(offset).unwrap_or(parser.lines().len() - 1);
    first_changed.map_or(edited, |line| line.min(edited))
}

fn assert_incremental_matches(
    styles: &Styles,
    settings: &PaginationSettings,
    cache: &Pagination,
    screenplay: &Screenplay,
    change: usize,
    context: &str,
) -> Pagination {
    let paginator = Paginator::new(styles, settings);
    let incremental = paginator
        .paginate_incremental(screenplay, cache, change, &NeverCancel)
        .unwrap();
    let full = paginate(screenplay, styles, settings);
    assert_eq!(incremental.pages, full.pages, "{context}");
    incremental
}

#[test]
fn test_incremental_matches_full_after_random_edits() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let mut parser = Parser::parse(&script());
    let mut cache = paginate(&snapshot(&parser), &styles, &settings);
    assert!(cache.page_count() > 6);

    let mut rng = Lcg(0x5eed);
    for round in 0..200 {
        let text = parser.text();
        let start = rng.below(text.len() + 1);
        let end = (start + rng.below(12)).min(text.len());
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        let fragment = FRAGMENTS[rng.below(FRAGMENTS.len())];
        let change = parser.apply_edit(start..end, fragment).unwrap();

        let screenplay = snapshot(&parser);
        let at = change_at(&parser, change.first_changed(), start);
        let context = format!("round {round}: {start}..{end} -> {fragment:?}");
        cache = assert_incremental_matches(&styles, &settings, &cache, &screenplay, at, &context);
    }
}

#[test]
fn test_pages_before_edit_are_reused() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let mut parser = Parser::parse(&script());
    let cache = paginate(&snapshot(&parser), &styles, &settings);

    let offset = parser.text().rfind("Now.").unwrap();
    let change = parser.insert(offset, "Right ").unwrap();
    let screenplay = snapshot(&parser);
    let at = change_at(&parser, change.first_changed(), offset);
    let updated = assert_incremental_matches(&styles, &settings, &cache, &screenplay, at, "late edit");

    let unaffected = cache.page_index_for_line(at).saturating_sub(1);
    assert!(unaffected > 0);
    assert_eq!(updated.pages[..unaffected], cache.pages[..unaffected]);
}

#[test]
fn test_stale_cache_is_ignored() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let parser = Parser::parse(&script());
    let screenplay = snapshot(&parser);
    let cache = paginate(&screenplay, &styles, &settings);

    let letter = settings.clone().with_paper_size(PaperSize::Letter);
    let paginator = Paginator::new(&styles, &letter);
    assert!(!paginator.can_reuse(&screenplay, &cache));
    let result = paginator
        .paginate_incremental(&screenplay, &cache, screenplay.lines.len() - 1, &NeverCancel)
        .unwrap();
    assert_eq!(result.pages, paginate(&screenplay, &styles, &letter).pages);

    let other_styles = Styles::parse(&SHEET.replace("14l", "20l"), &NoSettings);
    assert!(!Paginator::new(&other_styles, &settings).can_reuse(&screenplay, &cache));

    let relabelled = PaginationSettings { header: Some("Draft".to_string()), ..settings.clone() };
    assert!(Paginator::new(&styles, &relabelled).can_reuse(&screenplay, &cache));
}

#[test]
fn test_title_page_edit_repaginates_everything() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let mut parser = Parser::parse(&script());
    let cache = paginate(&snapshot(&parser), &styles, &settings);

    let change = parser.insert(7, "Grand ").unwrap();
    let screenplay = snapshot(&parser);
    let at = change_at(&parser, change.first_changed(), 7);
    assert_eq!(at, 0);
    assert_incremental_matches(&styles, &settings, &cache, &screenplay, at, "title edit");
}

#[test]
fn test_scene_number_start_change_renumbers_reused_pages() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let parser = Parser::parse(&script());
    let cache = paginate(&snapshot(&parser), &styles, &settings);
    assert!(cache.page_count() > 4);

    let renumbered = Screenplay::from_parser(
        &parser,
        &ScreenplayOptions { scene_number_start: 10, ..ScreenplayOptions::default() },
    );
    let last_line = renumbered.lines.len() - 1;
    let updated = assert_incremental_matches(&styles, &settings, &cache, &renumbered, last_line, "renumbered");

    let first_heading = updated.pages[0]
        .elements
        .iter()
        .find(|element| element.line_type == LineType::Heading)
        .and_then(|element| element.scene_number.clone());
    assert_eq!(first_heading.as_deref(), Some("10"));
}

#[test]
fn test_printing_scene_numbers_keeps_layout_cache() {
    let styles = Styles::parse(SHEET, &NoSettings);
    let settings = PaginationSettings::default();
    let parser = Parser::parse(&script());
    let screenplay = snapshot(&parser);
    let cache = paginate(&screenplay, &styles, &settings);

    let hidden = PaginationSettings { print_scene_numbers: !settings.print_scene_numbers, ..settings.clone() };
    assert!(Paginator::new(&styles, &hidden).can_reuse(&screenplay, &cache));
    assert_incremental_matches(&styles, &hidden, &cache, &screenplay, screenplay.lines.len() - 1, "print flag");
}
