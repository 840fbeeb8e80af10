//! Module for reading and writing Models
pub mod cache;
pub mod json;
pub mod sbml;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::metabolic_model::model::Model;

/// File formats a network definition can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// SBML level 3 with the flux balance constraints package
    Sbml,
    /// COBRA JSON
    Json,
}

impl ModelFormat {
    /// Guess the format from the file extension, ignoring a trailing `.gz`
    pub fn from_path(path: &Path) -> Result<Self, ModelIoError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".xml") || name.ends_with(".sbml") {
            Ok(ModelFormat::Sbml)
        } else if name.ends_with(".json") {
            Ok(ModelFormat::Json)
        } else {
            Err(ModelIoError::UnknownFormat(path.to_path_buf()))
        }
    }
}

/// Read a network definition, decompressing it into the cache first if it is gzipped
pub fn read_model(path: &Path) -> Result<Model, ModelIoError> {
    let format = ModelFormat::from_path(path)?;
    let path = cache::decompress_gz(path)?;
    info!(path = %path.display(), ?format, "Loading model");
    let model = match format {
        ModelFormat::Sbml => Model::read_sbml(&path)?,
        ModelFormat::Json => Model::read_json(&path)?,
    };
    info!(
        reactions = model.reactions.len(),
        metabolites = model.metabolites.len(),
        "Loaded model"
    );
    Ok(model)
}

/// Errors raised while reading or writing models
#[derive(Error, Debug)]
pub enum ModelIoError {
    #[error("Unable to read {path}")]
    UnableToRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to write {path}")]
    UnableToWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to parse model: {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction: {0}")]
    UnableToBuildReaction(String),
    #[error("Can't tell the model format of {0}, expected .xml, .sbml or .json (optionally .gz)")]
    UnknownFormat(PathBuf),
    #[error("Reaction points to parameter {0} but it does not exist in the model")]
    InconsistentModel(String),
    #[error("The parameter {0} exists but it holds no value")]
    EmptyParameter(String),
}
