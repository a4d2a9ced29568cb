//! Placeholder layout normalization.
//!
//! Groups a slide's placeholders into logical rows from raw vertical
//! position, then sorts them into a stable reading order (row by row,
//! left to right). The extractor and every human-facing summary rely on
//! this ordering.

use std::cmp::Ordering;

use crate::types::{ArchitectureSlide, Placeholder, ShapeRecord};

/// Vertical distance (inches) beyond which a placeholder starts a new row.
pub const ROW_THRESHOLD: f64 = 0.5;

/// Assign a `row_group` to each placeholder and sort by `(row_group, left)`.
///
/// Placeholders are sorted by `top`, then walked once: whenever a
/// placeholder sits more than [`ROW_THRESHOLD`] below the top of the row
/// being built, a new row starts at that placeholder's `top`. A row is
/// therefore anchored at its most recent starting top, not at a fixed
/// grid, so slightly diagonal layouts can merge or split rows.
///
/// Deterministic: identical input sets produce identical assignments
/// regardless of initial order. Empty input is returned unchanged.
pub fn assign_row_groups(mut placeholders: Vec<Placeholder>) -> Vec<Placeholder> {
    if placeholders.is_empty() {
        return placeholders;
    }

    placeholders.sort_by(|a, b| cmp_f64(a.top, b.top).then_with(|| cmp_f64(a.left, b.left)));

    let mut row_group = 0;
    let mut current_top = placeholders[0].top;

    for ph in &mut placeholders {
        if (ph.top - current_top).abs() > ROW_THRESHOLD {
            row_group += 1;
            current_top = ph.top;
        }
        ph.row_group = row_group;
    }

    placeholders.sort_by(|a, b| {
        a.row_group
            .cmp(&b.row_group)
            .then_with(|| cmp_f64(a.left, b.left))
    });

    placeholders
}

/// Build architecture slides from raw shape records.
///
/// Keeps only placeholder-marked shapes, groups them by slide (in slide
/// order), assigns row groups, and sorts each slide's placeholders into
/// reading order. Slides without any placeholder are omitted.
pub fn find_architecture_slides(records: &[ShapeRecord]) -> Vec<ArchitectureSlide> {
    let mut slides: Vec<ArchitectureSlide> = Vec::new();

    for record in records {
        if !record.is_placeholder() {
            continue;
        }

        let ph = Placeholder::from_record(record.clone());
        match slides.iter_mut().find(|s| s.index == ph.slide_index) {
            Some(slide) => slide.placeholders.push(ph),
            None => slides.push(ArchitectureSlide {
                index: ph.slide_index,
                title: ph.slide_title.clone(),
                placeholders: vec![ph],
            }),
        }
    }

    for slide in &mut slides {
        slide.placeholders = assign_row_groups(std::mem::take(&mut slide.placeholders));
    }

    slides.sort_by_key(|s| s.index);
    slides
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
