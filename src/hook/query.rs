//! Query parameter extraction.
//!
//! Five parameter names are consumed directly; everything else is passed
//! through to providers as custom parameters.

use std::collections::BTreeMap;

use crate::hook::raw::QueryParams;

pub const QUERY_PARAM_OUTPUT_ADAPTERS: &str = "adapters";
pub const QUERY_PARAM_INPUT_TYPE: &str = "inputType";
pub const QUERY_PARAM_OUTPUT_TYPE: &str = "outputType";
pub const QUERY_PARAM_TOKEN: &str = "token";
pub const QUERY_PARAM_OUTPUT_URL: &str = "url";

/// Parameter names consumed by the gateway itself.
pub const FIXED_PARAMS: [&str; 5] = [
    QUERY_PARAM_OUTPUT_ADAPTERS,
    QUERY_PARAM_INPUT_TYPE,
    QUERY_PARAM_OUTPUT_TYPE,
    QUERY_PARAM_TOKEN,
    QUERY_PARAM_OUTPUT_URL,
];

/// Multi-valued custom parameters keyed by lower-cased name.
pub type CustomQueryParams = BTreeMap<String, Vec<String>>;

/// The well-known parameters, trimmed. Absent parameters are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedParams {
    pub input_type: String,
    pub output_type: String,
    pub output_url: String,
    pub token: String,
    pub output_names: Vec<String>,
}

fn is_fixed_param(key: &str) -> bool {
    let key = key.trim();
    FIXED_PARAMS.iter().any(|fixed| fixed.eq_ignore_ascii_case(key))
}

/// Split a comma-separated adapter list, dropping blank entries.
pub fn split_output_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partition query parameters into the fixed fields and the custom bag.
pub fn extract_query_params(params: &QueryParams) -> (FixedParams, CustomQueryParams) {
    let trimmed = |name: &str| {
        params
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let fixed = FixedParams {
        input_type: trimmed(QUERY_PARAM_INPUT_TYPE),
        output_type: trimmed(QUERY_PARAM_OUTPUT_TYPE),
        output_url: trimmed(QUERY_PARAM_OUTPUT_URL),
        token: trimmed(QUERY_PARAM_TOKEN),
        output_names: params
            .get(QUERY_PARAM_OUTPUT_ADAPTERS)
            .map(split_output_names)
            .unwrap_or_default(),
    };

    let mut custom = CustomQueryParams::new();
    for (key, value) in params.iter() {
        if is_fixed_param(key) {
            continue;
        }
        custom
            .entry(key.trim().to_lowercase())
            .or_default()
            .push(value.to_string());
    }

    (fixed, custom)
}
