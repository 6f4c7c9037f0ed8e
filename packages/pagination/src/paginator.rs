use crate::block::BlockBuilder;
use crate::cancel::{CancelToken, Cancelled, NeverCancel};
use crate::layout::Layout;
use crate::page::Page;
use crate::pagination::Pagination;
use crate::settings::PaginationSettings;
use scriptform_parser::{LineType, Screenplay};
use scriptform_styles::Styles;
use tracing::{debug, instrument};

/// Lays a screenplay out into pages
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a> {
    styles: &'a Styles,
    settings: &'a PaginationSettings,
}

impl<'a> Paginator<'a> {
    pub fn new(styles: &'a Styles, settings: &'a PaginationSettings) -> Self {
        Self { styles, settings }
    }

    /// Paginate the whole body
    #[instrument(skip_all, fields(lines = screenplay.lines.len()))]
    pub fn paginate(&self, screenplay: &Screenplay, cancel: &dyn CancelToken) -> Result<Pagination, Cancelled> {
        let first = self.first_page_number(screenplay);
        self.run(screenplay, screenplay.body_start, first, Vec::new(), cancel)
    }

    /// Paginate again after an edit starting at line `change_at`.
    ///
    /// Pages that end before the edited scene are taken from `cache`, one
    /// page short so blocks kept together across the old page boundary get
    /// re-laid. Falls back to a full run when the cache was made with other
    /// styles or settings.
    #[instrument(skip_all, fields(lines = screenplay.lines.len(), change_at))]
    pub fn paginate_incremental(
        &self,
        screenplay: &Screenplay,
        cache: &Pagination,
        change_at: usize,
        cancel: &dyn CancelToken,
    ) -> Result<Pagination, Cancelled> {
        if !self.can_reuse(screenplay, cache) {
            debug!("Cached pagination is stale, paginating from the start");
            return self.paginate(screenplay, cancel);
        }

        let effective = scene_start(screenplay, change_at);
        let mut keep = cache
            .pages
            .iter()
            .take_while(|page| !page.range.is_empty() && page.range.end <= effective)
            .count()
            .saturating_sub(1);
        while keep > 0 && !cache.pages[keep].starts_block {
            keep -= 1;
        }
        if keep == 0 {
            return self.paginate(screenplay, cancel);
        }

        let resume = &cache.pages[keep];
        if !same_scene_numbers(cache, screenplay, resume.first_line) {
            debug!("Scene numbers changed before the edit, paginating from the start");
            return self.paginate(screenplay, cancel);
        }
        debug!(reused = keep, from_line = resume.first_line, "Resuming pagination");
        self.run(
            screenplay,
            resume.first_line,
            resume.page_number,
            cache.pages[..keep].to_vec(),
            cancel,
        )
    }

    /// Whether `cache` was produced under the same layout inputs
    pub fn can_reuse(&self, screenplay: &Screenplay, cache: &Pagination) -> bool {
        cache.body_start == screenplay.body_start
            && cache.first_page_number == self.first_page_number(screenplay)
            && cache.settings.layout_eq(self.settings)
            && cache.styles == *self.styles
    }

    fn first_page_number(&self, screenplay: &Screenplay) -> usize {
        if self.settings.count_title_page && !screenplay.title_page.is_empty() {
            2
        } else {
            1
        }
    }

    fn run(
        &self,
        screenplay: &Screenplay,
        from: usize,
        page_number: usize,
        mut pages: Vec<Page>,
        cancel: &dyn CancelToken,
    ) -> Result<Pagination, Cancelled> {
        let paper = self.settings.paper_size;
        let blocks = BlockBuilder::new(screenplay, self.styles, paper).build(from);
        let layout = Layout::new(self.settings, self.styles, cancel, page_number);
        pages.extend(layout.run(&blocks)?);
        debug!(pages = pages.len(), "Paginated");
        Ok(self.finish(screenplay, pages))
    }

    /// Wrap laid out pages; an empty body still gets one blank page
    fn finish(&self, screenplay: &Screenplay, mut pages: Vec<Page>) -> Pagination {
        let first_page_number = self.first_page_number(screenplay);
        if pages.is_empty() {
            let height = self.styles.page_height(self.settings.paper_size);
            pages.push(Page::new(height, first_page_number));
        }
        Pagination {
            pages,
            title_page: screenplay.title_page.clone(),
            settings: self.settings.clone(),
            styles: self.styles.clone(),
            body_start: screenplay.body_start,
            first_page_number,
            scene_numbers: screenplay.scene_numbers.clone(),
        }
    }
}

/// Paginate without cancellation
pub fn paginate(screenplay: &Screenplay, styles: &Styles, settings: &PaginationSettings) -> Pagination {
    let paginator = Paginator::new(styles, settings);
    paginator
        .paginate(screenplay, &NeverCancel)
        .unwrap_or_else(|Cancelled| paginator.finish(screenplay, Vec::new()))
}

/// Whether headings on the pages before `line` carry the numbers they had
fn same_scene_numbers(cache: &Pagination, screenplay: &Screenplay, line: usize) -> bool {
    cache.scene_numbers.range(..line).eq(screenplay.scene_numbers.range(..line))
}

/// First line of the scene or section containing `line_index`
fn scene_start(screenplay: &Screenplay, line_index: usize) -> usize {
    let end = (line_index + 1).min(screenplay.lines.len());
    screenplay.lines[..end]
        .iter()
        .rposition(|line| {
            matches!(line.line_type, LineType::Heading | LineType::Section | LineType::PageBreak)
        })
        .unwrap_or(0)
}
