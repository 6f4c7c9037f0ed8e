use crate::cancel::{Cancelled, NeverCancel};
use crate::page::{ElementKind, Page};
use crate::pagination::{Pagination, SceneLength};
use crate::paginator::{paginate, Paginator};
use crate::settings::PaginationSettings;
use scriptform_parser::{LineType, Parser, Screenplay, ScreenplayOptions};
use scriptform_styles::{builtin_family, NoSettings, Styles};

/// Plain metrics: every style one line tall, page height set per test
const TEST_SHEET: &str = "
page { width-a4: 60ch; page-height-a4: PAGE_LINESl; line-height: 1l }
action { margin-top: 1l }
heading { margin-top: 1l; uppercase: true }
character { margin-top: 1l; width: 38ch; uppercase: true }
parenthetical { width: 25ch }
dialogue { width: 35ch }
more { width: 20ch }
dualDialogueCharacter { margin-top: 1l; width: 20ch; uppercase: true }
dualDialogueParenthetical { width: 22ch }
dualDialogue { width: 28ch }
dualDialogueMore { width: 20ch }
section, synopsis { visible: false }
";

fn test_styles(page_lines: usize) -> Styles {
    Styles::parse(&TEST_SHEET.replace("PAGE_LINES", &page_lines.to_string()), &NoSettings)
}

fn screenplay(text: &str) -> Screenplay {
    Screenplay::from_parser(&Parser::parse(text), &ScreenplayOptions::default())
}

fn layout(text: &str, page_lines: usize) -> Pagination {
    paginate(&screenplay(text), &test_styles(page_lines), &PaginationSettings::default())
}

fn kinds(page: &Page) -> Vec<LineType> {
    page.elements.iter().map(|e| e.line_type).collect()
}

fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

#[test]
fn test_cue_and_dialogue_move_together_without_markers() {
    let pagination = layout("INT. ROOM - DAY\nJOHN\nHello.\n", 3);

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(kinds(&pagination.pages[0]), vec![LineType::Heading]);
    assert_eq!(kinds(&pagination.pages[1]), vec![LineType::Character, LineType::Dialogue]);
    assert!(pagination.pages[1].elements.iter().all(|e| e.kind == ElementKind::Line));
    assert_eq!(pagination.pages[1].range, 1..3);
}

#[test]
fn test_pages_never_overflow() {
    let mut text = String::new();
    for scene in 0..12 {
        text.push_str(&format!("INT. ROOM {scene} - DAY\n\n{}\n\nJOHN\n(quietly)\n", words(40)));
        text.push_str("First line.\nSecond line.\nThird line.\n\nMARY\nShort.\n\nBOB ^\nAlso short.\n\n");
    }
    let styles = test_styles(9);
    let pagination = paginate(&screenplay(&text), &styles, &PaginationSettings::default());

    assert!(pagination.page_count() > 5);
    for page in &pagination.pages {
        assert!(page.used_height() <= page.max_height + 1e-6, "page {} overflows", page.page_number);
        let mut y = 0.0;
        for element in &page.elements {
            assert!((element.y - y).abs() < 1e-9);
            y += element.height;
        }
    }
    let numbers: Vec<usize> = pagination.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, (1..=pagination.page_count()).collect::<Vec<_>>());
}

#[test]
fn test_pagination_is_deterministic() {
    let text = format!("INT. A - DAY\n\n{}\n\nJOHN\nHello.\n\nEXT. B - NIGHT\n\n{}\n", words(90), words(30));
    let styles = builtin_family(&NoSettings).render;
    let settings = PaginationSettings::default();
    let script = screenplay(&text);

    assert_eq!(paginate(&script, &styles, &settings), paginate(&script, &styles, &settings));
}

#[test]
fn test_split_dialogue_gets_more_and_contd() {
    let pagination = layout(
        "Action one.\n\nJOHN\nLine one.\nLine two.\nLine three.\nLine four.\nLine five.\n",
        6,
    );

    assert_eq!(pagination.page_count(), 2);
    let first = &pagination.pages[0];
    let more = first.elements.last().unwrap();
    assert_eq!(more.kind, ElementKind::More);
    assert_eq!(more.text, "(MORE)");
    assert_eq!(more.line_type, LineType::More);
    assert_eq!(first.elements.len(), 5);
    assert!((first.used_height() - first.max_height).abs() < 1e-9);

    let second = &pagination.pages[1];
    assert_eq!(second.elements[0].kind, ElementKind::Continued);
    assert_eq!(second.elements[0].text, "JOHN (CONT'D)");
    assert_eq!(second.elements[1].text, "Line three.");
    assert_eq!(second.elements.len(), 4);
    assert!(!second.starts_block);
}

#[test]
fn test_custom_labels() {
    let settings = PaginationSettings {
        more_label: "(MEHR)".to_string(),
        contd_label: "(FORTS.)".to_string(),
        ..PaginationSettings::default()
    };
    let text = "Action one.\n\nJOHN\nLine one.\nLine two.\nLine three.\nLine four.\nLine five.\n";
    let pagination = paginate(&screenplay(text), &test_styles(6), &settings);

    assert_eq!(pagination.pages[0].elements.last().unwrap().text, "(MEHR)");
    assert_eq!(pagination.pages[1].elements[0].text, "JOHN (FORTS.)");
}

#[test]
fn test_parenthetical_never_precedes_more() {
    let pagination = layout("Action one.\n\nJOHN\nLine one.\n(beat)\nLine two.\nLine three.\n", 6);

    let first = &pagination.pages[0];
    assert_eq!(
        kinds(first),
        vec![LineType::Action, LineType::Character, LineType::Dialogue, LineType::More]
    );
    let second = &pagination.pages[1];
    assert_eq!(second.elements[1].line_type, LineType::Parenthetical);
    assert_eq!(second.elements.len(), 4);
}

#[test]
fn test_dual_dialogue_columns() {
    let pagination = layout("BRICK\nHi.\nHow are you?\n\nSTEEL ^\nHello.\n", 20);

    let page = &pagination.pages[0];
    assert_eq!(page.elements.len(), 1);
    let element = &page.elements[0];
    let ElementKind::DualDialogue { left, right } = &element.kind else {
        panic!("expected dual dialogue, got {:?}", element.kind);
    };
    assert_eq!(left.len(), 3);
    assert_eq!(right.len(), 2);
    assert_eq!(left[0].style, "dualDialogueCharacter");
    assert_eq!(right[0].text, "STEEL");
    assert_eq!(right[1].y, 12.0);
    assert_eq!(element.height, 36.0);
    assert_eq!(page.range, 0..6);
}

#[test]
fn test_dual_dialogue_splits_each_column() {
    let text = "Opening.\n\nBRICK\nOne.\nTwo.\nThree.\nFour.\n\nSTEEL ^\nShort.\n";
    let pagination = layout(text, 5);

    assert_eq!(pagination.page_count(), 2);
    let ElementKind::DualDialogue { left, right } = &pagination.pages[0].elements[1].kind else {
        panic!("expected dual dialogue on the first page");
    };
    assert_eq!(left.last().map(|e| e.kind.clone()), Some(ElementKind::More));
    assert_eq!(left.last().map(|e| e.line_type), Some(LineType::DualDialogueMore));
    assert_eq!(right.len(), 2);

    let ElementKind::DualDialogue { left, right } = &pagination.pages[1].elements[0].kind else {
        panic!("expected dual dialogue on the second page");
    };
    assert_eq!(left[0].text, "BRICK (CONT'D)");
    assert!(right.is_empty());
}

#[test]
fn test_long_paragraph_splits_between_lines() {
    let text = format!("INT. A - DAY\n\n{}", words(120));
    let pagination = layout(&text, 6);

    assert_eq!(pagination.page_count(), 2);
    let first = &pagination.pages[0];
    assert_eq!(first.elements[1].wrapped.len(), 4);
    let second = &pagination.pages[1];
    assert_eq!(second.elements[0].wrapped.len(), 6);
    assert!(second.elements[0].continuation);
    assert_eq!(second.elements[0].margin_top, 0.0);
    assert!(!second.starts_block);
}

#[test]
fn test_short_paragraph_is_not_split() {
    let text = format!("Action.\n\n{}", words(36));
    let pagination = layout(&text, 4);

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(pagination.pages[1].elements[0].wrapped.len(), 3);
    assert!(pagination.pages[1].starts_block);
}

#[test]
fn test_heading_is_kept_with_next_block() {
    let pagination = layout("First.\n\nSecond.\n\nThird.\n\nINT. B - DAY\n\nFourth line here.\n", 7);

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(kinds(&pagination.pages[0]), vec![LineType::Action; 3]);
    assert_eq!(kinds(&pagination.pages[1]), vec![LineType::Heading, LineType::Action]);
}

#[test]
fn test_consecutive_headings_stay_with_following_block() {
    let text = "One.\n\nTwo.\n\nINT. A - DAY\n\nINT. B - DAY\n\nLast line of action here.\n";

    for page_lines in [7, 8] {
        let pagination = layout(text, page_lines);
        assert_eq!(pagination.page_count(), 2);
        assert_eq!(kinds(&pagination.pages[0]), vec![LineType::Action; 2]);
        assert_eq!(
            kinds(&pagination.pages[1]),
            vec![LineType::Heading, LineType::Heading, LineType::Action]
        );
    }

    for page_lines in 5..=12 {
        let pagination = layout(text, page_lines);
        for page in &pagination.pages[..pagination.page_count() - 1] {
            let last = page.elements.last().map(|e| e.line_type);
            assert_ne!(last, Some(LineType::Heading), "heading ends page {} at height {page_lines}", page.page_number);
        }
    }
}

#[test]
fn test_page_breaks() {
    assert_eq!(layout("One.\n\n===\n\nTwo.", 20).page_count(), 2);
    assert_eq!(layout("===\n\nOne.", 20).page_count(), 1);
    assert_eq!(layout("One.\n\n===\n\n===\n\nTwo.", 20).page_count(), 2);
}

#[test]
fn test_oversized_block_is_forced() {
    let pagination = layout("JOHN\nOne.\nTwo.\nThree.\n\nAfter.", 1);

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(pagination.pages[0].elements.len(), 4);
    assert_eq!(kinds(&pagination.pages[1]), vec![LineType::Action]);
}

#[test]
fn test_hidden_lines_produce_no_elements() {
    let pagination = layout("# Act\n\n= Synopsis\n\n[[note]]\n\n/* Cut\nscene */\n", 20);

    assert_eq!(pagination.page_count(), 1);
    assert!(pagination.pages[0].is_empty());
}

#[test]
fn test_title_page_numbering() {
    let text = "Title: Test\n\nAction.";
    let counted = PaginationSettings { count_title_page: true, ..PaginationSettings::default() };
    let styles = test_styles(20);

    let plain = paginate(&screenplay(text), &styles, &PaginationSettings::default());
    assert_eq!(plain.pages[0].page_number, 1);
    assert!(plain.has_title_page());
    assert_eq!(kinds(&plain.pages[0]), vec![LineType::Action]);

    let numbered = paginate(&screenplay(text), &styles, &counted);
    assert_eq!(numbered.pages[0].page_number, 2);
}

#[test]
fn test_scene_numbers_on_headings() {
    let pagination = layout("INT. A - DAY\n\nAction.\n\nEXT. B - DAY #7B#\n\nMore.", 20);
    let numbers: Vec<Option<&str>> = pagination.pages[0]
        .elements
        .iter()
        .filter(|e| e.line_type == LineType::Heading)
        .map(|e| e.scene_number.as_deref())
        .collect();
    assert_eq!(numbers, vec![Some("1"), Some("7B")]);
}

#[test]
fn test_scene_length_and_line_lookup() {
    let text = "INT. A - DAY\n\nWalks.\n\nWalks.\n\nWalks.\n\nWalks.\n\nEXT. B - DAY";
    let pagination = layout(text, 10);

    assert_eq!(pagination.page_count(), 2);
    assert_eq!(pagination.scene_length(0), Some(SceneLength { pages: 1, eighths: 0 }));
    assert_eq!(pagination.scene_length(10), Some(SceneLength { pages: 0, eighths: 1 }));
    assert_eq!(pagination.scene_length(2), None);
    assert_eq!(pagination.page_index_for_line(9), 0);
    assert_eq!(pagination.page_index_for_line(10), 1);
    assert_eq!(pagination.page_index_for_line(500), 1);
}

#[test]
fn test_empty_document_has_one_page() {
    let pagination = layout("", 20);
    assert_eq!(pagination.page_count(), 1);
    assert!(pagination.pages[0].is_empty());
}

#[test]
fn test_cancelled_run_returns_error() {
    let styles = test_styles(20);
    let settings = PaginationSettings::default();
    let paginator = Paginator::new(&styles, &settings);
    let script = screenplay("One.\n\n===\n\nTwo.");

    assert_eq!(paginator.paginate(&script, &|| true).err(), Some(Cancelled));
    assert!(paginator.paginate(&script, &NeverCancel).is_ok());
}

#[test]
fn test_letter_paper_uses_letter_height() {
    let styles = builtin_family(&NoSettings).render;
    let settings = PaginationSettings::default().with_paper_size(scriptform_styles::PaperSize::Letter);
    let pagination = paginate(&screenplay("Action."), &styles, &settings);
    assert_eq!(pagination.pages[0].max_height, 54.0 * 12.0);
}
