pub mod formatter;

pub use formatter::{
    format_age, format_catalog_summary, format_classification, format_compare,
    format_consistency, format_domain_summary, format_history, format_questions, format_result,
    should_use_colors,
};
