use scriptform_styles::PaperSize;
use serde::{Deserialize, Serialize};

/// Layout options supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationSettings {
    pub paper_size: PaperSize,
    pub print_scene_numbers: bool,
    /// Marker printed below a dialogue block that continues on the next page
    pub more_label: String,
    /// Suffix appended to the repeated cue on the continuing page
    pub contd_label: String,
    /// Printed at the top of every page except the first
    pub header: Option<String>,
    /// Number the title page as page 1
    pub count_title_page: bool,
    /// Paginate while editing rather than only on export
    pub live_pagination: bool,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            print_scene_numbers: true,
            more_label: "(MORE)".to_string(),
            contd_label: "(CONT'D)".to_string(),
            header: None,
            count_title_page: false,
            live_pagination: true,
        }
    }
}

impl PaginationSettings {
    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = paper_size;
        self
    }

    /// Settings that change where pages break.
    ///
    /// The header and scene-number visibility only affect printing, so a
    /// cached pagination stays valid when they change.
    pub fn layout_eq(&self, other: &Self) -> bool {
        self.paper_size == other.paper_size
            && self.more_label == other.more_label
            && self.contd_label == other.contd_label
            && self.count_title_page == other.count_title_page
    }
}
