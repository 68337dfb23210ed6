//! A single conversion, run to completion on the calling thread.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::encoder::Encoder;
use crate::error::ConvertError;
use crate::formats::{self, FormatEntry};
use crate::temp::TempOutput;

/// What the user asked for when pressing convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Format label as shown in the selector
    pub format: String,
    pub input: PathBuf,
    /// Empty when no destination was chosen
    pub output: PathBuf,
}

impl ConversionRequest {
    pub fn new(format: &str, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            format: format.to_string(),
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        }
    }

    pub fn has_input(&self) -> bool {
        !self.input.as_os_str().is_empty()
    }

    pub fn has_output(&self) -> bool {
        !self.output.as_os_str().is_empty()
    }
}

/// Terminal result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The converted file now lives at this path
    Success(PathBuf),
    /// Human-readable reason
    Failure(String),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success(_))
    }
}

impl From<Result<PathBuf, ConvertError>> for ConversionOutcome {
    fn from(result: Result<PathBuf, ConvertError>) -> Self {
        match result {
            Ok(path) => ConversionOutcome::Success(path),
            Err(e) => ConversionOutcome::Failure(e.to_string()),
        }
    }
}

/// Convert `request.input` into `request.output` using `encoder`.
///
/// The encoder writes into a temporary file under `temp_dir`; only a
/// finished encode is copied to the output path. Every error is folded into
/// the returned outcome.
pub fn convert(
    encoder: &dyn Encoder,
    request: &ConversionRequest,
    temp_dir: &Path,
    progress: &mut dyn FnMut(f64),
) -> ConversionOutcome {
    let result = run(encoder, request, temp_dir, progress);
    match &result {
        Ok(path) => log::info!("Conversion finished: {:?}", path),
        Err(ConvertError::Cancelled) => log::warn!("Conversion cancelled: no output path"),
        Err(e) => log::error!("Conversion of {:?} failed: {}", request.input, e),
    }
    result.into()
}

fn run(
    encoder: &dyn Encoder,
    request: &ConversionRequest,
    temp_dir: &Path,
    progress: &mut dyn FnMut(f64),
) -> Result<PathBuf, ConvertError> {
    if !request.has_input() {
        return Err(ConvertError::MissingInput);
    }

    // Unknown labels are handed to the encoder as-is
    let codec = formats::lookup(&request.format);
    let entry = formats::find(&request.format);
    // Only table labels name the temp file, so it stays inside `temp_dir`
    let extension = entry
        .map(FormatEntry::extension)
        .unwrap_or_else(|| "tmp".to_string());

    let temp = TempOutput::new(temp_dir, &extension);
    log::debug!("Encoding into temporary file {:?}", temp.path());

    encoder
        .encode(
            &request.input,
            temp.path(),
            codec,
            entry.map(|e| e.muxer),
            progress,
        )
        .map_err(|e| ConvertError::encode(&e))?;

    if !request.has_output() {
        return Err(ConvertError::Cancelled);
    }

    deliver(temp.path(), &request.output).map_err(|e| ConvertError::encode(&e))?;
    Ok(request.output.clone())
}

/// Copy the finished encode next to `output`, then move it into place.
fn deliver(encoded: &Path, output: &Path) -> Result<()> {
    let partial = partial_path(output);

    let result = fs::copy(encoded, &partial)
        .with_context(|| format!("Failed to write {}", partial.display()))
        .and_then(|_| {
            fs::rename(&partial, output)
                .with_context(|| format!("Failed to move output into {}", output.display()))
        });

    if result.is_err() && partial.exists() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
