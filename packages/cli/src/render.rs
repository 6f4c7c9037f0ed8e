//! # PDF Renderer
//!
//! Draws a finished [`Pagination`] with the standard Courier faces. Element
//! positions come from the pagination; the page rule of the stylesheet
//! supplies the physical margins.
//!
//! Text uses `WinAnsiEncoding`; characters outside it print as `?`.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use scriptform_pagination::{ElementKind, Page, PageElement, Pagination};
use scriptform_parser::TitlePage;
use scriptform_styles::{PaperSize, RenderStyle, TextAlign, CHARACTER_WIDTH};
use tracing::{debug, instrument};

/// Resource name and base font, indexed by `bold as usize | (italic as usize) << 1`
const FONTS: [(&[u8], &[u8]); 4] = [
    (b"F1", b"Courier"),
    (b"F2", b"Courier-Bold"),
    (b"F3", b"Courier-Oblique"),
    (b"F4", b"Courier-BoldOblique"),
];

struct Refs(i32);

impl Refs {
    fn bump(&mut self) -> Ref {
        let reference = Ref::new(self.0);
        self.0 += 1;
        reference
    }
}

/// Physical frame of the text area
struct Frame {
    paper: PaperSize,
    width: f64,
    height: f64,
    left: f64,
    top: f64,
    text_width: f64,
    font_size: f64,
    line_height: f64,
}

impl Frame {
    fn new(pagination: &Pagination) -> Self {
        let paper = pagination.settings.paper_size;
        let (width, height) = paper.dimensions();
        let page = pagination.styles().page();
        Self {
            paper,
            width,
            height,
            left: page.margin_left_for(paper),
            top: page.margin_top,
            text_width: page.width_for(paper),
            font_size: page.font_size,
            line_height: page.line_height,
        }
    }

    /// Baseline for a line whose box starts `y` points below the text area top
    fn baseline(&self, y: f64) -> f32 {
        (self.height - self.top - y - self.font_size * 0.8) as f32
    }
}

/// Render `pagination` into PDF bytes
#[instrument(skip_all, fields(pages = pagination.page_count()))]
pub fn render_pdf(pagination: &Pagination) -> Vec<u8> {
    let frame = Frame::new(pagination);
    let mut refs = Refs(1);
    let catalog_id = refs.bump();
    let pages_id = refs.bump();
    let font_ids: Vec<Ref> = FONTS.iter().map(|_| refs.bump()).collect();

    let mut contents = Vec::new();
    if pagination.has_title_page() {
        contents.push(draw_title_page(&frame, &pagination.title_page));
    }
    for (index, page) in pagination.pages.iter().enumerate() {
        contents.push(draw_page(&frame, pagination, page, index));
    }

    let page_ids: Vec<(Ref, Ref)> = contents.iter().map(|_| (refs.bump(), refs.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for ((name, base_font), font_id) in FONTS.iter().zip(&font_ids) {
        debug!(font = %String::from_utf8_lossy(name), "Registering font");
        pdf.type1_font(*font_id)
            .base_font(Name(base_font))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for ((page_id, content_id), content) in page_ids.iter().zip(contents) {
        {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, frame.width as f32, frame.height as f32))
                .parent(pages_id)
                .contents(*content_id);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for ((name, _), font_id) in FONTS.iter().zip(&font_ids) {
                fonts.pair(Name(name), *font_id);
            }
        }
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}

fn draw_page(frame: &Frame, pagination: &Pagination, page: &Page, index: usize) -> Content {
    let mut content = Content::new();
    let settings = &pagination.settings;

    if index > 0 {
        let number = format!("{}.", page.page_number);
        let x = frame.left + frame.text_width - text_width(&number);
        let y = -frame.line_height * 3.0;
        show(&mut content, frame, &number, x, y, false, false);
        if let Some(header) = settings.header.as_deref().filter(|header| !header.is_empty()) {
            show(&mut content, frame, header, frame.left, y, false, false);
        }
    }

    for element in &page.elements {
        match &element.kind {
            ElementKind::DualDialogue { left, right } => {
                let half = frame.text_width / 2.0;
                for (column, x) in [(left, frame.left), (right, frame.left + half)] {
                    for part in column {
                        draw_element(&mut content, frame, pagination, part, x, element.y);
                    }
                }
            }
            _ => draw_element(&mut content, frame, pagination, element, frame.left, 0.0),
        }

        if settings.print_scene_numbers {
            if let Some(number) = &element.scene_number {
                let y = element.y + element.margin_top;
                let before = frame.left - text_width(number) - 3.0 * CHARACTER_WIDTH;
                let after = frame.left + frame.text_width + 2.0 * CHARACTER_WIDTH;
                show(&mut content, frame, number, before, y, false, false);
                show(&mut content, frame, number, after, y, false, false);
            }
        }
    }
    content
}

fn draw_element(content: &mut Content, frame: &Frame, pagination: &Pagination, element: &PageElement, x: f64, offset: f64) {
    let style = pagination.styles().style_for(&element.style);
    let top = offset + element.y + element.margin_top;
    for (row, line) in element.wrapped.iter().enumerate() {
        let line_x = x + line_x(style, frame.paper, line, row == 0 && !element.continuation);
        let y = top + row as f64 * style.line_height;
        show(content, frame, line, line_x, y, style.bold, style.italic);
        if style.underline && !line.trim().is_empty() {
            underline(content, frame, line_x, y, text_width(line));
        }
    }
}

/// Horizontal offset of one printed line inside its column
fn line_x(style: &RenderStyle, paper: PaperSize, line: &str, first_row: bool) -> f64 {
    let mut x = style.margin_left_for(paper) + style.indent.max(0.0);
    if first_row {
        x += style.first_line_indent;
    }
    let room = style.width_for(paper) - style.indent.max(0.0) - text_width(line);
    match style.text_align {
        TextAlign::Left => x,
        TextAlign::Center => x + (room / 2.0).max(0.0),
        TextAlign::Right => x + room.max(0.0),
    }
}

fn draw_title_page(frame: &Frame, title_page: &TitlePage) -> Content {
    let mut content = Content::new();
    let center = |text: &str| frame.left + (frame.text_width - text_width(text)) / 2.0;

    let mut y = (frame.height - frame.top) / 3.0 - frame.top;
    for key in ["title", "credit", "author", "authors", "source"] {
        let Some(field) = title_page.get(key) else { continue };
        for value in &field.values {
            show(&mut content, frame, value, center(value), y, key == "title", false);
            y += frame.line_height;
        }
        y += frame.line_height;
    }

    let bottom = frame.height - frame.top * 2.0 - frame.line_height * 6.0;
    let mut left_y = bottom;
    for key in ["contact", "notes"] {
        for value in title_page.get(key).map(|field| field.values.as_slice()).unwrap_or_default() {
            show(&mut content, frame, value, frame.left, left_y, false, false);
            left_y += frame.line_height;
        }
    }
    let mut right_y = bottom;
    for key in ["draft date", "copyright"] {
        for value in title_page.get(key).map(|field| field.values.as_slice()).unwrap_or_default() {
            let x = frame.left + frame.text_width - text_width(value);
            show(&mut content, frame, value, x, right_y, false, false);
            right_y += frame.line_height;
        }
    }
    content
}

fn show(content: &mut Content, frame: &Frame, text: &str, x: f64, y: f64, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    let (font, _) = FONTS[usize::from(bold) | usize::from(italic) << 1];
    content.begin_text();
    content.set_font(Name(font), frame.font_size as f32);
    content.next_line(x as f32, frame.baseline(y));
    content.show(Str(&encode(text)));
    content.end_text();
}

fn underline(content: &mut Content, frame: &Frame, x: f64, y: f64, width: f64) {
    let baseline = frame.baseline(y) - 1.5;
    content.set_line_width(0.6);
    content.move_to(x as f32, baseline);
    content.line_to((x + width) as f32, baseline);
    content.stroke();
}

fn text_width(text: &str) -> f64 {
    text.chars().count() as f64 * CHARACTER_WIDTH
}

/// Encode for `WinAnsiEncoding`
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
