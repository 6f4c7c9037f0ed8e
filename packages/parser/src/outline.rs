use crate::line::{Line, LineType, SceneNumberMarker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Outline entry: a heading, section or synopsis and the lines it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineScene {
    pub line_index: usize,
    pub line_type: LineType,
    /// Display text of the outline line
    pub string: String,
    pub scene_index: usize,
    /// Printed scene number; `None` for sections, synopses and unnumbered scenes
    pub scene_number: Option<String>,
    pub section_depth: usize,
    /// Owned line indices, the outline line included
    pub range: Range<usize>,
    pub omitted: bool,
}

/// Assign printed scene numbers to headings.
///
/// Custom `#n#` markers win, `##` leaves a scene unnumbered, every other
/// visible heading takes the next value of a counter starting at `start`.
/// The result depends only on the heading sequence, so repeated runs over an
/// unchanged structure yield the same numbers.
pub fn number_scenes(lines: &[Line], start: usize) -> BTreeMap<usize, String> {
    let mut numbers = BTreeMap::new();
    let mut counter = start;

    for (index, line) in lines.iter().enumerate() {
        if line.line_type != LineType::Heading || line.omitted {
            continue;
        }
        match line.scene_number_marker() {
            Some(SceneNumberMarker::Custom(number)) => {
                numbers.insert(index, number);
            }
            Some(SceneNumberMarker::Omitted) => {}
            None => {
                numbers.insert(index, counter.to_string());
                counter += 1;
            }
        }
    }

    numbers
}

/// Build the outline from a line sequence
pub fn build_outline(lines: &[Line], scene_number_start: usize) -> Vec<OutlineScene> {
    let numbers = number_scenes(lines, scene_number_start);
    let outline_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_outline_element())
        .map(|(index, _)| index)
        .collect();

    outline_lines
        .iter()
        .enumerate()
        .map(|(scene_index, &line_index)| {
            let line = &lines[line_index];
            let end = owned_range_end(lines, &outline_lines, line_index);
            OutlineScene {
                line_index,
                line_type: line.line_type,
                string: line.stripped(),
                scene_index,
                scene_number: numbers.get(&line_index).cloned(),
                section_depth: line.section_depth(),
                range: line_index..end,
                omitted: line.omitted,
            }
        })
        .collect()
}

/// Headings own everything up to the next heading or section; sections own
/// everything up to the next section of the same or a higher level; a
/// synopsis owns only itself.
fn owned_range_end(lines: &[Line], outline_lines: &[usize], index: usize) -> usize {
    let line = &lines[index];
    let later = outline_lines.iter().copied().filter(|other| *other > index);

    let end = match line.line_type {
        LineType::Heading => later
            .into_iter()
            .find(|other| matches!(lines[*other].line_type, LineType::Heading | LineType::Section)),
        LineType::Section => {
            let depth = line.section_depth();
            later.into_iter().find(|other| {
                lines[*other].line_type == LineType::Section && lines[*other].section_depth() <= depth
            })
        }
        _ => Some(index + 1),
    };

    end.unwrap_or(lines.len())
}
