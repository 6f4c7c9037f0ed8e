use super::{prepare, Prepared};
use crate::render::render_pdf;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use scriptform_pagination::PaginationSettings;
use scriptform_styles::PaperSize;
use scriptform_workspace::{PaginationManager, StaticDelegate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct PdfArgs {
    /// Screenplay source file
    pub source: PathBuf,

    /// PDF file to write
    pub destination: PathBuf,

    /// Paper size (a4, letter); overrides config and document
    #[arg(long)]
    pub paper: Option<PaperSize>,

    /// Print scene numbers in the margins
    #[arg(long, conflicts_with = "no_scene_numbers")]
    pub scene_numbers: bool,

    /// Leave scene numbers out
    #[arg(long)]
    pub no_scene_numbers: bool,

    /// Header printed on every page after the first
    #[arg(long)]
    pub header: Option<String>,

    /// Additional stylesheet directory
    #[arg(long = "styles", value_name = "DIR")]
    pub style_dirs: Vec<PathBuf>,
}

impl PdfArgs {
    /// Apply command line overrides
    fn apply(&self, settings: &mut PaginationSettings) {
        if let Some(paper) = self.paper {
            settings.paper_size = paper;
        }
        if self.scene_numbers {
            settings.print_scene_numbers = true;
        } else if self.no_scene_numbers {
            settings.print_scene_numbers = false;
        }
        if self.header.is_some() {
            settings.header.clone_from(&self.header);
        }
    }
}

pub fn pdf(args: PdfArgs, cwd: &Path) -> Result<()> {
    let source = cwd.join(&args.source);
    let destination = cwd.join(&args.destination);
    let Prepared { document, styles, mut settings } = prepare(&source, &args.style_dirs, cwd)?;
    args.apply(&mut settings);

    println!("{} {}", "📄 Paginating".bright_blue().bold(), args.source.display());

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let pagination = runtime
        .block_on(async {
            let mut manager = PaginationManager::new(StaticDelegate::new(settings), styles)?;
            manager.request(document.screenplay(), 0);
            anyhow::Ok(manager.settle().await)
        })?
        .ok_or_else(|| anyhow!("Pagination produced no result"))?;

    let bytes = render_pdf(&pagination);
    fs::write(&destination, bytes).with_context(|| format!("Cannot write {}", destination.display()))?;
    info!(path = %destination.display(), pages = pagination.page_count(), "Wrote PDF");

    println!(
        "  {} {} → {} ({} pages, {})",
        "✓".green(),
        args.source.display(),
        args.destination.display(),
        pagination.page_count(),
        pagination.settings.paper_size
    );
    Ok(())
}
