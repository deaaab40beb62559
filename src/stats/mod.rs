//! Annotation statistics.
//!
//! Aggregates per-category counts, mean box size and a three-bucket size
//! histogram over a flat list of annotations.

mod report;

pub use report::{AnnotationStats, AverageSize, CategoryShare, SizeDistribution};

use crate::ir::{Annotation, Category};

/// Upper bound (exclusive) of the longer box side for the small bucket.
pub const SMALL_MAX_SIDE: f64 = 0.1;
/// Upper bound (exclusive) of the longer box side for the medium bucket.
pub const MEDIUM_MAX_SIDE: f64 = 0.5;

/// Compute statistics for a set of annotations.
///
/// Every category in `categories` gets an entry even when nothing references
/// it. Annotations whose category is not in the list still count towards
/// `total` and the size statistics, and are tallied as `uncategorized`.
pub fn aggregate_stats(annotations: &[Annotation], categories: &[Category]) -> AnnotationStats {
    let mut stats = AnnotationStats {
        total: annotations.len(),
        ..AnnotationStats::default()
    };

    for cat in categories {
        stats.by_category.insert(
            cat.id,
            CategoryShare {
                name: cat.name.clone(),
                ..CategoryShare::default()
            },
        );
    }

    if annotations.is_empty() {
        return stats;
    }

    let mut total_width = 0.0;
    let mut total_height = 0.0;

    for ann in annotations {
        match stats.by_category.get_mut(&ann.category_id) {
            Some(share) => share.count += 1,
            None => stats.uncategorized += 1,
        }

        total_width += ann.bbox.width;
        total_height += ann.bbox.height;

        let side = ann.bbox.max_side();
        if side < SMALL_MAX_SIDE {
            stats.size_distribution.small += 1;
        } else if side < MEDIUM_MAX_SIDE {
            stats.size_distribution.medium += 1;
        } else {
            stats.size_distribution.large += 1;
        }
    }

    let n = annotations.len() as f64;
    stats.avg_size = AverageSize {
        width: total_width / n,
        height: total_height / n,
    };

    for share in stats.by_category.values_mut() {
        share.percentage = share.count as f64 / n * 100.0;
    }

    stats
}
