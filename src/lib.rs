//! # tableau_metadata
//!
//! Extracts metadata from Tableau workbook XML files (`.twb`): data-source
//! connections, declared tables and columns, worksheet and dashboard
//! structure, visualization encodings, and column-usage relationships.
//!
//! The core lives in [`twb`]: a set of independent extractors that walk an
//! already-parsed workbook tree and return normalized models. Around it sit
//! thin adapters: [`report`] writes the models to JSON and spreadsheet files,
//! [`values`] pulls actual row values out of a resolved Excel source, and
//! [`api`] enriches worksheets with lineage from the Tableau metadata API.
//!
//! ```no_run
//! use tableau_metadata::twb::WorkbookAnalyzer;
//!
//! let mut analyzer = WorkbookAnalyzer::new();
//! analyzer.process_chunk(&std::fs::read("workbook.twb")?);
//! let model = analyzer.finalize()?;
//! println!("{} sheets", model.sheets.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod report;
pub mod twb;
pub mod values;
pub mod xml;

/// Guard for `From<Node>` impls: if the node has an unexpected tag, log it
/// and return the default value instead of mis-parsing a sibling element.
#[macro_export]
macro_rules! ensure_tag_or_default {
    ($node:ident, $tag:expr) => {
        if !$node.has_tag_name($tag) {
            tracing::info!(
                "trying to convert a ({}) into a <{}> model",
                $node.tag_name().name(),
                $tag
            );
            return Self::default();
        }
    };
}
