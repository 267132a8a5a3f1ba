use napi::Result as NapiResult;
use napi_derive::napi;

use finmodel_core::{Assumptions, OutputBundle};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Run a projection from an assumptions snapshot; returns the enveloped
/// output bundle.
#[napi]
pub fn calculate_financial_model(assumptions_json: String) -> NapiResult<String> {
    let assumptions: Assumptions =
        serde_json::from_str(&assumptions_json).map_err(to_napi_error)?;
    let output = finmodel_core::calculate_with_envelope(&assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Re-check a bundle previously returned by `calculateFinancialModel`
/// (the `result` field) and return its validation report.
#[napi]
pub fn validate_financial_model(bundle_json: String) -> NapiResult<String> {
    let bundle: OutputBundle = serde_json::from_str(&bundle_json).map_err(to_napi_error)?;
    let report = finmodel_core::validate(&bundle);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Statement and schedule tables for spreadsheet export.
#[napi]
pub fn financial_statement_tables(assumptions_json: String) -> NapiResult<String> {
    let assumptions: Assumptions =
        serde_json::from_str(&assumptions_json).map_err(to_napi_error)?;
    let bundle = finmodel_core::calculate(&assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&bundle.tables()).map_err(to_napi_error)
}
