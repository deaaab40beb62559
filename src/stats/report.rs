//! Stats report types and terminal formatting.
//!
//! The report can be rendered as text (Display) or serialized as JSON.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::ir::CategoryId;

/// Summary statistics over a set of annotations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnnotationStats {
    /// Total number of annotations, including those with unknown categories.
    pub total: usize,
    /// One entry per known category, including categories with no annotations.
    pub by_category: BTreeMap<CategoryId, CategoryShare>,
    /// Annotations whose category id is not in the category list.
    pub uncategorized: usize,
    /// Mean normalized box size.
    pub avg_size: AverageSize,
    /// Box counts bucketed by their longer side.
    pub size_distribution: SizeDistribution,
}

/// Annotation count for one category.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub count: usize,
    /// Share of `total`, in percent. Zero when there are no annotations.
    pub percentage: f64,
}

/// Mean normalized width and height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AverageSize {
    pub width: f64,
    pub height: f64,
}

/// Bounding box size bucket counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SizeDistribution {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

const BAR_WIDTH: usize = 20;

impl fmt::Display for AnnotationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "╭─────────────────────────────────────────────────────────────╮"
        )?;
        writeln!(
            f,
            "│                📊  Annotation Stats Report                  │"
        )?;
        writeln!(
            f,
            "╰─────────────────────────────────────────────────────────────╯"
        )?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_categories(f)?;
        writeln!(f)?;
        self.fmt_size_distribution(f)?;

        Ok(())
    }
}

impl AnnotationStats {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "┌─ Summary ─────────────────────────────────────────────────┐"
        )?;
        writeln!(
            f,
            "│                                                           │"
        )?;
        writeln!(
            f,
            "│   Annotations:   {:>8}                                 │",
            format_number(self.total)
        )?;
        writeln!(
            f,
            "│   Categories:    {:>8}                                 │",
            format_number(self.by_category.len())
        )?;
        if self.uncategorized > 0 {
            writeln!(
                f,
                "│   Uncategorized: {:>8}                                 │",
                format_number(self.uncategorized)
            )?;
        }
        writeln!(
            f,
            "│   Mean size:     {:>8.4} x {:<8.4}                      │",
            self.avg_size.width, self.avg_size.height
        )?;
        writeln!(
            f,
            "│                                                           │"
        )?;
        writeln!(
            f,
            "└───────────────────────────────────────────────────────────┘"
        )?;

        Ok(())
    }

    fn fmt_categories(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!("Categories ({})", self.by_category.len());
        writeln!(
            f,
            "┌─ {} {}┐",
            header,
            "─".repeat(57usize.saturating_sub(header.len()))
        )?;
        writeln!(
            f,
            "│                                                           │"
        )?;

        if self.by_category.is_empty() {
            writeln!(
                f,
                "│   No categories defined.                                  │"
            )?;
        } else {
            let max_count = self
                .by_category
                .values()
                .map(|share| share.count)
                .max()
                .unwrap_or(0);

            for (id, share) in &self.by_category {
                let label = format!("{}: {}", id, share.name);
                writeln!(
                    f,
                    "│   {:<16} {:>7} {:>5.1}%  {}│",
                    truncate_label(&label, 16),
                    format_number(share.count),
                    share.percentage,
                    pad_bar(&render_bar(share.count, max_count, BAR_WIDTH), BAR_WIDTH)
                )?;
            }
        }

        writeln!(
            f,
            "│                                                           │"
        )?;
        writeln!(
            f,
            "└───────────────────────────────────────────────────────────┘"
        )?;

        Ok(())
    }

    fn fmt_size_distribution(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.size_distribution;
        let max_count = [s.small, s.medium, s.large].into_iter().max().unwrap_or(0);

        writeln!(
            f,
            "┌─ Size Distribution (longer side: small<0.1, medium<0.5) ─┐"
        )?;
        writeln!(
            f,
            "│                                                           │"
        )?;
        for (name, count) in [("small", s.small), ("medium", s.medium), ("large", s.large)] {
            writeln!(
                f,
                "│   {:<7} {:>7}  {}│",
                name,
                format_number(count),
                pad_bar(&render_bar(count, max_count, BAR_WIDTH), BAR_WIDTH)
            )?;
        }
        writeln!(
            f,
            "│                                                           │"
        )?;
        writeln!(
            f,
            "└───────────────────────────────────────────────────────────┘"
        )?;
        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return "░".repeat(width);
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Pad a bar string to ensure consistent column alignment.
fn pad_bar(bar: &str, width: usize) -> String {
    let visual_len = bar.chars().count();
    let padding = (width + 2).saturating_sub(visual_len);
    format!("{}{}", bar, " ".repeat(padding))
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}
