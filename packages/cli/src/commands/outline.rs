use super::{prepare, Prepared};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scriptform_pagination::{paginate, Pagination};
use scriptform_parser::{LineType, OutlineScene};
use scriptform_styles::PaperSize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Screenplay source file
    pub source: PathBuf,

    /// Paper size used to measure scene lengths
    #[arg(long)]
    pub paper: Option<PaperSize>,

    /// Additional stylesheet directory
    #[arg(long = "styles", value_name = "DIR")]
    pub style_dirs: Vec<PathBuf>,
}

pub fn outline(args: OutlineArgs, cwd: &Path) -> Result<()> {
    let Prepared { mut document, styles, mut settings } = prepare(&cwd.join(&args.source), &args.style_dirs, cwd)?;
    if let Some(paper) = args.paper {
        settings.paper_size = paper;
    }

    let pagination = paginate(&document.screenplay(), &styles, &settings);
    println!(
        "{} {} ({} pages)",
        "📋".bright_blue(),
        args.source.display().to_string().bold(),
        pagination.page_count()
    );
    for row in outline_rows(document.outline(), &pagination) {
        println!("{row}");
    }
    Ok(())
}

/// One printable row per outline entry
fn outline_rows(outline: &[OutlineScene], pagination: &Pagination) -> Vec<String> {
    let mut depth = 0;
    let mut rows = Vec::new();

    for scene in outline {
        match scene.line_type {
            LineType::Section => {
                depth = scene.section_depth;
                let indent = "  ".repeat(depth.saturating_sub(1));
                rows.push(format!("{indent}{} {}", "#".repeat(depth.max(1)), scene.string));
            }
            LineType::Synopsis => {
                rows.push(format!("{}= {}", "  ".repeat(depth), scene.string));
            }
            _ => {
                let number = scene.scene_number.as_deref().unwrap_or("-");
                let length = pagination
                    .scene_length(scene.line_index)
                    .map_or_else(String::new, |length| format!("  [{length}]"));
                let omitted = if scene.omitted { " (omitted)" } else { "" };
                rows.push(format!("{}{number:>4}  {}{omitted}{length}", "  ".repeat(depth), scene.string));
            }
        }
    }
    rows
}
