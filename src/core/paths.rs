//! Blob key layout of a model store.
//!
//! ```text
//! <root>/operatorai-model-store/
//!     domains/<domain>.json                      latest meta-data per domain
//!     model_states/<state>.json                  one marker per created state
//!     <domain>/versions/<model-id>.json          meta-data per model
//!     <domain>/versions/<state>/<model-id>.json  models tagged with a state
//!     <domain>/<YYYY>/<MM>/<DD>/<HH:MM:SS>/<archive>
//! ```

use crate::domain::model::TIMESTAMP_FORMAT;
use chrono::{DateTime, Utc};

pub const MODELSTORE_ROOT_PREFIX: &str = "operatorai-model-store";

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn store_root(root_prefix: &str) -> String {
    join(&[root_prefix, MODELSTORE_ROOT_PREFIX])
}

pub fn archive_path(
    root_prefix: &str,
    domain: &str,
    file_name: &str,
    now: DateTime<Utc>,
) -> String {
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    join(&[&store_root(root_prefix), domain, &stamp, file_name])
}

pub fn models_path(root_prefix: &str, domain: &str, state_name: Option<&str>) -> String {
    let versions = join(&[&store_root(root_prefix), domain, "versions"]);
    match state_name {
        Some(state_name) => join(&[&versions, state_name]),
        None => versions,
    }
}

pub fn metadata_path(
    root_prefix: &str,
    domain: &str,
    model_id: &str,
    state_name: Option<&str>,
) -> String {
    join(&[
        &models_path(root_prefix, domain, state_name),
        &format!("{model_id}.json"),
    ])
}

pub fn domains_path(root_prefix: &str) -> String {
    join(&[&store_root(root_prefix), "domains"])
}

pub fn domain_path(root_prefix: &str, domain: &str) -> String {
    join(&[&domains_path(root_prefix), &format!("{domain}.json")])
}

pub fn model_states_path(root_prefix: &str) -> String {
    join(&[&store_root(root_prefix), "model_states"])
}

pub fn model_state_path(root_prefix: &str, state_name: &str) -> String {
    join(&[&model_states_path(root_prefix), &format!("{state_name}.json")])
}
