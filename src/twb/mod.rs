//! Parse-and-normalize core for Tableau workbook XML.
//!
//! Each submodule is an independent extractor over the same parsed tree:
//! [`catalog`] builds the declared-column catalog, [`usage`] scans for column
//! usages, [`connection`] resolves named connections and their table/column
//! groupings, [`mapper`] associates worksheets with the datasources they
//! depend on, and the model builder here produces one unified
//! [`WorkbookModel`] per parse.

use anyhow::anyhow;
use roxmltree::Document;
use serde::{Deserialize, Serialize};
use std::mem;

use crate::twb::dashboard::{parse_dashboards, Dashboard};
use crate::twb::datasource::{parse_datasources, Datasource};
use crate::twb::script::{parse_scripts, CustomScript};
use crate::twb::worksheet::{parse_sheets, Sheet};
use crate::xml::NodeExt;

pub mod catalog;
pub mod column;
pub mod connection;
pub mod dashboard;
pub mod datasource;
pub mod mapper;
pub mod printer;
pub mod script;
pub mod usage;
pub mod worksheet;

pub(crate) const NAME_KEY: &str = "name";
pub(crate) const CAPTION_KEY: &str = "caption";
pub(crate) const ROLE_KEY: &str = "role";
pub(crate) const DATATYPE_KEY: &str = "datatype";

/// Collects workbook XML content and parses it into a [`WorkbookModel`].
///
/// The whole document is read into memory before any extraction begins;
/// there is no streaming mode. Feed bytes with [`process_chunk`] and call
/// [`finalize`] once.
///
/// [`process_chunk`]: WorkbookAnalyzer::process_chunk
/// [`finalize`]: WorkbookAnalyzer::finalize
#[derive(Default, Debug)]
pub struct WorkbookAnalyzer {
    content_buffer: Vec<u8>,
}

impl WorkbookAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_chunk(&mut self, chunk: &[u8]) {
        self.content_buffer.extend_from_slice(chunk);
    }

    /// Parses the accumulated content. Non-UTF-8 content or malformed XML is
    /// a terminal error; a missing root element fails at the XML level.
    pub fn finalize(&mut self) -> anyhow::Result<WorkbookModel> {
        let mut buf = vec![];
        mem::swap(&mut self.content_buffer, &mut buf);

        let content = String::from_utf8(buf)
            .map_err(|e| anyhow!("workbook content is not UTF-8: {e}"))?;
        let document = Document::parse(&content)
            .map_err(|e| anyhow!("workbook content is not valid XML: {e}"))?;
        Ok(WorkbookModel::from_document(&document))
    }
}

/// Root aggregate of a parsed workbook. Built once per parse, immutable
/// after construction.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct WorkbookModel {
    pub name: String,
    pub sheets: Vec<Sheet>,
    pub dashboards: Vec<Dashboard>,
    pub datasources: Vec<Datasource>,
    pub custom_scripts: Vec<CustomScript>,
}

impl WorkbookModel {
    /// Builds the model with one stateless walk over the document.
    ///
    /// Datasources are collected before sheets so their column catalogs exist
    /// first, but no cross-validation happens: a sheet may reference a column
    /// no datasource declares. Missing attributes degrade to empty strings.
    pub fn from_document(doc: &Document) -> Self {
        let root = doc.root_element();
        let datasources = parse_datasources(root);
        let sheets = parse_sheets(root);
        let dashboards = parse_dashboards(root);
        let custom_scripts = parse_scripts(root);
        Self {
            name: root.attr(NAME_KEY),
            sheets,
            dashboards,
            datasources,
            custom_scripts,
        }
    }
}
