//! Document tools (spec §4.5, C5): `extract_pdf_text`, `analyze_csv_file`,
//! `extract_action_items`. Each takes a file handle identifier minted by
//! the upload subsystem; the upload pipeline itself is out of scope, so
//! these return a structured "not available" failure rather than
//! attempting real extraction.

use briefing_domain::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct FileHandleArgs {
    file_handle: String,
}

fn not_available(tool_name: &str, file_handle: &str) -> Error {
    Error::ToolFailure(format!(
        "{tool_name} is not available in this deployment (file handle {file_handle})"
    ))
}

pub async fn extract_pdf_text(arguments: Value) -> Result<Value> {
    let args: FileHandleArgs = serde_json::from_value(arguments).map_err(|e| Error::SchemaDecodeError(e.to_string()))?;
    Err(not_available("extract_pdf_text", &args.file_handle))
}

pub async fn analyze_csv_file(arguments: Value) -> Result<Value> {
    let args: FileHandleArgs = serde_json::from_value(arguments).map_err(|e| Error::SchemaDecodeError(e.to_string()))?;
    Err(not_available("analyze_csv_file", &args.file_handle))
}

pub async fn extract_action_items(arguments: Value) -> Result<Value> {
    let args: FileHandleArgs = serde_json::from_value(arguments).map_err(|e| Error::SchemaDecodeError(e.to_string()))?;
    Err(not_available("extract_action_items", &args.file_handle))
}
