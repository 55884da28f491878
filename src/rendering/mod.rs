//! Report rendering: category-keyed row styling and export formats.
//!
//! Kept apart from the comparison engine; it only consumes a finished
//! [`ComparisonReport`](crate::comparison::ComparisonReport).

pub mod export;
pub mod style;

pub use export::{export, format_p_value, render, render_html, render_table, write_csv, ReportFormat};
pub use style::{row_style, CategoryStyle, RowStyle, StylePalette};
