//! Datasource resolution and explore-URL derivation.

use crate::error::Error;
use crate::query::{Query, keys::clear_query_keys};
use crate::state::SessionState;
use crate::state::urlcodec::serialize_state_to_url_param;
use crate::time::RawTimeRange;

/// Name of the virtual datasource that mixes targets from several real
/// ones.
pub const MIXED_DATASOURCE_NAME: &str = "-- Mixed --";

#[derive(Debug, Clone, Default)]
pub struct DatasourceMeta {
    pub id: String,
    /// Whether the datasource supports the exploration pane.
    pub explore: bool,
}

/// The slice of a datasource this crate needs. Implemented by the hosting
/// application's datasource plugins.
pub trait Datasource {
    fn name(&self) -> &str;
    fn meta(&self) -> &DatasourceMeta;

    /// Datasource-specific mapping from panel targets to exploration
    /// queries. The default strips session-local keys and keeps the
    /// targets as-is.
    fn explore_queries(&self, targets: &[Query]) -> Vec<Query> {
        targets.iter().map(clear_query_keys).collect()
    }
}

/// Resolves a datasource by name.
pub trait DatasourceResolver {
    fn resolve(&self, name: &str) -> Result<&dyn Datasource, Error>;
}

/// Derive the exploration URL for a panel, or `None` when no involved
/// datasource supports exploration.
///
/// For a mixed-datasource panel the targets are scanned strictly left to
/// right and the first target whose datasource supports exploration wins;
/// resolution is sequential with early return, so a later target never
/// overrides an earlier match. The explore targets are then narrowed to
/// that datasource's own.
pub fn get_explore_url(
    panel_datasource: &str,
    targets: &[Query],
    range: &RawTimeRange,
    resolver: &dyn DatasourceResolver,
) -> Result<Option<String>, Error> {
    let mut datasource = resolver.resolve(panel_datasource)?;
    let mut explore_targets: Vec<Query> = targets.to_vec();

    if datasource.name() == MIXED_DATASOURCE_NAME {
        let mut found = false;
        for target in targets {
            let Some(name) = target.field_str("datasource") else {
                continue;
            };
            let candidate = resolver.resolve(name)?;
            if candidate.meta().explore {
                explore_targets = targets
                    .iter()
                    .filter(|t| t.field_str("datasource") == Some(name))
                    .cloned()
                    .collect();
                datasource = candidate;
                found = true;
                break;
            }
        }
        if !found {
            return Ok(None);
        }
    }

    if !datasource.meta().explore {
        return Ok(None);
    }

    let state = SessionState {
        datasource: Some(datasource.name().to_string()),
        queries: datasource.explore_queries(&explore_targets),
        range: range.clone(),
        ui: Default::default(),
    };
    Ok(Some(format!(
        "/explore?state={}",
        serialize_state_to_url_param(&state, true)
    )))
}
