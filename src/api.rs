//! Optional enrichment of worksheet metadata through Tableau Server's REST
//! and Metadata APIs.
//!
//! Everything here is driven by an explicit [`ApiConfig`]; no endpoint or
//! credential is baked in. Lookups are isolated per worksheet so one failed
//! remote call never poisons the rest of the report.

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use roxmltree::Document;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::twb::NAME_KEY;
use crate::xml::NodeExt;

/// Connection settings for a Tableau Server instance.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct ApiConfig {
    pub server_url: String,
    pub api_version: String,
    pub token_name: String,
    pub token_secret: String,
    pub site_id: String,
}

/// Lineage of one worksheet: its visualization facade plus the upstream
/// tables and columns reported by the Metadata API.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct SheetLineage {
    pub worksheet_name: String,
    pub visualization_title: String,
    pub visualization_type: String,
    pub tables_used: String,
    pub columns_used: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lookup_error: Option<String>,
}

/// Signs in with a personal access token and returns the credentials token
/// for subsequent requests.
pub fn sign_in(client: &Client, config: &ApiConfig) -> anyhow::Result<String> {
    let url = format!(
        "{}/api/{}/auth/signin",
        config.server_url, config.api_version
    );
    let payload = json!({
        "credentials": {
            "personalAccessTokenName": config.token_name,
            "personalAccessTokenSecret": config.token_secret,
            "site": { "contentUrl": config.site_id },
        }
    });
    let response: Value = client
        .post(&url)
        .json(&payload)
        .send()
        .context("sign-in request failed")?
        .error_for_status()
        .context("sign-in rejected")?
        .json()
        .context("sign-in response is not JSON")?;
    response["credentials"]["token"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("sign-in response carries no credentials token"))
}

/// Builds the Metadata API query for one sheet's upstream tables and columns.
pub fn build_lineage_query(workbook_name: &str, sheet_name: &str) -> String {
    format!(
        r#"{{
  workbooks(filter: {{name: "{workbook_name}"}}) {{
    sheets(filter: {{name: "{sheet_name}"}}) {{
      upstreamTables {{ name }}
      upstreamColumns {{ name }}
    }}
  }}
}}"#
    )
}

/// Queries the Metadata API for one sheet's lineage. Returns
/// `(tables, columns)` as comma-joined name lists.
pub fn query_sheet_lineage(
    client: &Client,
    config: &ApiConfig,
    token: &str,
    workbook_name: &str,
    sheet_name: &str,
) -> anyhow::Result<(String, String)> {
    let url = format!("{}/api/metadata/graphql", config.server_url);
    let payload = json!({ "query": build_lineage_query(workbook_name, sheet_name) });
    let response: Value = client
        .post(&url)
        .bearer_auth(token)
        .json(&payload)
        .send()
        .context("lineage request failed")?
        .error_for_status()
        .context("lineage request rejected")?
        .json()
        .context("lineage response is not JSON")?;

    let sheets = &response["data"]["workbooks"][0]["sheets"][0];
    Ok((
        join_names(&sheets["upstreamTables"]),
        join_names(&sheets["upstreamColumns"]),
    ))
}

fn join_names(nodes: &Value) -> String {
    use itertools::Itertools;
    nodes
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|n| n["name"].as_str())
                .join(", ")
        })
        .unwrap_or_default()
}

/// Builds a lineage row for every worksheet in the document.
///
/// The visualization facade (title and mark type) comes from the local XML.
/// A worksheet with no datasource reference keeps its run-derived title but
/// gets placeholder type and lineage text, and makes no remote call. Remote
/// lookup failures are recorded on the row and logged; processing continues
/// with the next worksheet.
pub fn enrich_worksheets(
    doc: &Document,
    workbook_name: &str,
    config: &ApiConfig,
) -> anyhow::Result<Vec<SheetLineage>> {
    let client = Client::new();
    let token = sign_in(&client, config)?;

    let mut rows = vec![];
    for worksheet in doc.root_element().tagged_descendants("worksheet") {
        let worksheet_name = worksheet.attr(NAME_KEY);
        // the title is run-derived for every worksheet, datasource or not
        let (visualization_title, visualization_type) = visualization_facade(worksheet);
        if worksheet.tagged_descendant("datasource").is_none() {
            rows.push(SheetLineage {
                worksheet_name,
                visualization_title,
                visualization_type: "No Visualization".to_owned(),
                tables_used: "No tables used".to_owned(),
                columns_used: "No columns used".to_owned(),
                lookup_error: None,
            });
            continue;
        }

        let mut row = SheetLineage {
            worksheet_name: worksheet_name.clone(),
            visualization_title,
            visualization_type,
            ..Default::default()
        };
        match query_sheet_lineage(&client, config, &token, workbook_name, &worksheet_name) {
            Ok((tables, columns)) => {
                row.tables_used = tables;
                row.columns_used = columns;
            }
            Err(e) => {
                warn!("lineage lookup failed for worksheet ({worksheet_name}): {e}");
                row.lookup_error = Some(e.to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Pulls the visualization title and mark type out of a worksheet element.
fn visualization_facade(worksheet: roxmltree::Node) -> (String, String) {
    let title = worksheet
        .tagged_descendant("run")
        .map(|run| run.all_text())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "No Title".to_owned());
    let mark_type = worksheet
        .tagged_descendant("mark")
        .map(|mark| mark.attr("class"))
        .unwrap_or_default();
    (title, mark_type)
}
