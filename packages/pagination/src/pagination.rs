use crate::page::Page;
use crate::settings::PaginationSettings;
use scriptform_parser::{LineType, TitlePage};
use scriptform_styles::Styles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result of a pagination run, also the cache for the next incremental one
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub title_page: TitlePage,
    pub settings: PaginationSettings,
    /// Styles the pages were measured with
    pub(crate) styles: Styles,
    pub(crate) body_start: usize,
    pub(crate) first_page_number: usize,
    /// Scene numbers printed on the headings, by line
    pub(crate) scene_numbers: BTreeMap<usize, String>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn has_title_page(&self) -> bool {
        !self.title_page.is_empty()
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Page showing `line_index`.
    ///
    /// Lines between pages (blank or hidden lines) belong to the page before
    /// them; lines before the first page to page 0.
    pub fn page_index_for_line(&self, line_index: usize) -> usize {
        self.pages
            .iter()
            .rposition(|page| !page.range.is_empty() && page.range.start <= line_index)
            .unwrap_or(0)
    }

    /// Printed length of the scene opened by the heading at `heading_line`.
    ///
    /// A scene runs to the next heading or the end of the script. `None` if
    /// the line isn't a placed heading.
    pub fn scene_length(&self, heading_line: usize) -> Option<SceneLength> {
        let mut headings = self.pages.iter().enumerate().flat_map(|(page_index, page)| {
            page.elements
                .iter()
                .filter(|element| element.line_type == LineType::Heading && !element.continuation)
                .map(move |element| (page_index, element.y, element.line_index))
        });

        let (start_page, start_y, _) = headings.find(|(_, _, line)| *line == Some(heading_line))?;
        let (end_page, end_y) = match headings.next() {
            Some((page, y, _)) => (page, y),
            None => {
                let last = self.pages.len() - 1;
                (last, self.pages[last].used_height())
            }
        };

        let page_height = self.pages[start_page].max_height;
        let height = (end_page - start_page) as f64 * page_height + end_y - start_y;
        Some(SceneLength::from_pages(height / page_height))
    }
}

/// Scene length in pages and eighths of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneLength {
    pub pages: usize,
    pub eighths: u8,
}

impl SceneLength {
    /// Round a fractional page count to the nearest eighth, never below 1/8
    pub fn from_pages(pages: f64) -> Self {
        let pages = pages.max(0.0);
        let mut whole = pages.trunc() as usize;
        let mut eighths = ((pages - pages.trunc()) * 8.0).round() as u8;
        if eighths == 8 {
            whole += 1;
            eighths = 0;
        }
        if whole == 0 && eighths == 0 {
            eighths = 1;
        }
        Self { pages: whole, eighths }
    }

    pub fn total_eighths(&self) -> usize {
        self.pages * 8 + self.eighths as usize
    }
}

impl fmt::Display for SceneLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.pages, self.eighths) {
            (pages, 0) => write!(f, "{pages}"),
            (0, eighths) => write!(f, "{eighths}/8"),
            (pages, eighths) => write!(f, "{pages} {eighths}/8"),
        }
    }
}
