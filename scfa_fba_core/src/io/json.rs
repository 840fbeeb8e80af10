//! Module providing JSON IO for Models, in the format written by COBRA toolboxes
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::io::ModelIoError;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::ReactionBuilder;

// region JSON Model
/// A network in COBRA JSON format, gene records are ignored
#[derive(Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    id: Option<String>,
    compartments: Option<IndexMap<String, String>>,
    version: Option<String>,
}

#[derive(Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
}

#[derive(Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    objective_coefficient: Option<f64>,
    subsystem: Option<String>,
}
// endregion JSON Model

// region Conversions
impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
        }
    }
}

impl Model {
    /// Read a model from a COBRA JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, ModelIoError> {
        let path = path.as_ref();
        let model_str = fs::read_to_string(path).map_err(|source| ModelIoError::UnableToRead {
            path: path.to_path_buf(),
            source,
        })?;
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a COBRA JSON string
    pub fn from_json_str(model_str: &str) -> Result<Model, ModelIoError> {
        let json_model = serde_json::from_str::<JsonModel>(model_str)
            .map_err(|err| ModelIoError::UnableToParse(err.to_string()))?;
        Model::from_json(json_model)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, ModelIoError> {
        let mut model = Model::new_empty();
        json_model.metabolites.into_iter().for_each(|m| {
            model.add_metabolite(Metabolite::from(m));
        });
        for rxn in json_model.reactions {
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .build()
                .map_err(|err| ModelIoError::UnableToBuildReaction(err.to_string()))?;
            model.add_reaction(new_reaction);
            // Add the reaction to the objective function if desired
            if let Some(coef) = rxn.objective_coefficient {
                if coef != 0. {
                    model.objective.insert(rxn.id, coef);
                }
            }
        }
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        Ok(model)
    }
}
// endregion Conversions
