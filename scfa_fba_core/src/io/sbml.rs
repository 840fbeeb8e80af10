//! Module providing SBML (FBC) input for Models, parsing is done by rust_sbml
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rust_sbml::{Model as SbmlModel, Parameter, SpeciesReference};

use crate::configuration::{default_lower_bound, default_upper_bound};
use crate::io::ModelIoError;
use crate::metabolic_model::metabolite::MetaboliteBuilder;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::ReactionBuilder;

impl Model {
    /// Read a model from an SBML file with flux balance constraints
    pub fn read_sbml<P: AsRef<Path>>(path: P) -> Result<Model, ModelIoError> {
        let path = path.as_ref();
        let doc = fs::read_to_string(path).map_err(|source| ModelIoError::UnableToRead {
            path: path.to_path_buf(),
            source,
        })?;
        Model::from_sbml_str(&doc)
    }

    /// Parse a model from an SBML document
    ///
    /// # Note:
    /// Reaction and species ids lose their `R_` and `M_` prefixes and have SBML
    /// character escapes (`__91__` for `[` etc.) decoded, which gives the ids COBRA
    /// toolboxes use. The SBML document stores reactions unordered, so they are
    /// sorted by id for a deterministic model.
    pub fn from_sbml_str(doc: &str) -> Result<Model, ModelIoError> {
        let sbml =
            SbmlModel::parse(doc).map_err(|err| ModelIoError::UnableToParse(err.to_string()))?;
        let mut model = Model::new_empty();
        model.id = sbml.annotation.id.clone();
        let mut species_ids: Vec<&String> = sbml.species.keys().collect();
        species_ids.sort();
        for id in species_ids {
            let metabolite = MetaboliteBuilder::default()
                .id(decode_sbml_id(id, "M_"))
                .compartment(Some(sbml.species[id].compartment.clone()))
                .build()
                .map_err(|err| ModelIoError::UnableToParse(err.to_string()))?;
            model.add_metabolite(metabolite);
        }

        let mut reaction_ids: Vec<&String> = sbml.reactions.keys().collect();
        reaction_ids.sort();
        for key in reaction_ids {
            let rxn = &sbml.reactions[key];
            let mut stoichiometry: IndexMap<String, f64> = IndexMap::new();
            add_references(&mut stoichiometry, &rxn.list_of_reactants.0, -1.);
            add_references(&mut stoichiometry, &rxn.list_of_products.0, 1.);
            let lower_bound = resolve_bound(
                rxn.lower_bound.as_deref(),
                &sbml.parameters,
                "cobra_default_lb",
                default_lower_bound(),
            )?;
            let upper_bound = resolve_bound(
                rxn.upper_bound.as_deref(),
                &sbml.parameters,
                "cobra_default_ub",
                default_upper_bound(),
            )?;
            let reaction = ReactionBuilder::default()
                .id(decode_sbml_id(key, "R_"))
                .metabolites(stoichiometry)
                .lower_bound(lower_bound)
                .upper_bound(upper_bound)
                .build()
                .map_err(|err| ModelIoError::UnableToBuildReaction(err.to_string()))?;
            model.add_reaction(reaction);
        }

        for objective in sbml.objectives.iter() {
            let id = decode_sbml_id(objective, "R_");
            if model.has_reaction(&id) {
                model.objective.insert(id, 1.);
            }
        }
        Ok(model)
    }
}

fn add_references(into: &mut IndexMap<String, f64>, refs: &[SpeciesReference], sign: f64) {
    for sref in refs {
        let coef = sign * sref.stoichiometry.unwrap_or(1.);
        *into.entry(decode_sbml_id(&sref.species, "M_")).or_insert(0.) += coef;
    }
}

/// Look up a flux bound parameter, falling back to the model default parameter and
/// then the global default
fn resolve_bound(
    param: Option<&str>,
    parameters: &HashMap<String, Parameter>,
    default_param: &str,
    fallback: f64,
) -> Result<f64, ModelIoError> {
    match param {
        Some(p) => parameters
            .get(p)
            .ok_or_else(|| ModelIoError::InconsistentModel(p.to_string()))?
            .value
            .ok_or_else(|| ModelIoError::EmptyParameter(p.to_string())),
        None => match parameters.get(default_param) {
            Some(param) => param
                .value
                .ok_or_else(|| ModelIoError::EmptyParameter(default_param.to_string())),
            None => Ok(fallback),
        },
    }
}

/// Strip an SBML id prefix and decode `__<ascii code>__` escapes
pub fn decode_sbml_id(id: &str, prefix: &str) -> String {
    let id = id.strip_prefix(prefix).unwrap_or(id);
    let mut out = String::with_capacity(id.len());
    let mut rest = id;
    while let Some(start) = rest.find("__") {
        let after = &rest[start + 2..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        let decoded = if digits > 0 && after[digits..].starts_with("__") {
            after[..digits]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };
        match decoded {
            Some(c) => {
                out.push_str(&rest[..start]);
                out.push(c);
                rest = &after[digits + 2..];
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
