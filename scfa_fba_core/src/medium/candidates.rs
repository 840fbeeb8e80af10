//! Reaction id candidates for the entities the medium and the flux panel refer to
//!
//! Genome scale reconstructions are not consistent in how they name exchange
//! reactions (`EX_glc__D_e`, `EX_glc_D_e`, `EX_glc[e]` ...), so every entity is
//! looked up through an ordered list of candidate ids, the first id present in the
//! model wins.
use crate::metabolic_model::model::Model;
use crate::scfa_inputs::Scfa;

pub const ACETATE_IDS: [&str; 3] = ["EX_ac_e", "EX_ac[u]", "EX_ac(e)"];
pub const PROPIONATE_IDS: [&str; 3] = ["EX_ppa_e", "EX_propn_e", "EX_ppn_e"];
pub const BUTYRATE_IDS: [&str; 2] = ["EX_but_e", "EX_btn_e"];
pub const GLUCOSE_IDS: [&str; 3] = ["EX_glc__D_e", "EX_glc_D_e", "EX_glc[e]"];
pub const OXYGEN_IDS: [&str; 2] = ["EX_o2_e", "EX_o2[e]"];
/// ATP maintenance, the objective
pub const OBJECTIVE_IDS: [&str; 2] = ["ATPM", "DM_atp_c_"];

/// Metabolites exchanged freely in both directions
pub const FREE_EXCHANGE: [&str; 2] = ["h2o", "h"];

/// Inorganic ions and their uptake caps
pub const IONS: [(&str, f64); 8] = [
    ("pi", 10.),
    ("so4", 10.),
    ("k", 10.),
    ("na1", 10.),
    ("ca2", 10.),
    ("cl", 10.),
    ("mg2", 10.),
    ("fe2", 10.),
];
/// Secretion cap shared by all ions
pub const ION_SECRETION_CAP: f64 = 100.;

/// Secretion products and their secretion caps
pub const SECRETION: [(&str, f64); 2] = [("co2", 1000.), ("nh4", 100.)];
/// Ammonium may also be taken up, in small amounts
pub const AMMONIUM_UPTAKE: f64 = 0.5;

pub const ESSENTIAL_AMINO_ACIDS: [&str; 9] = [
    "his__L", "ile__L", "leu__L", "lys__L", "met__L", "phe__L", "thr__L", "trp__L", "val__L",
];

pub const VITAMINS: [&str; 9] = [
    "thm", "ribflv", "ncam", "pnto__R", "pydxn", "fol", "cbl1", "chol", "inost",
];

/// Candidate ids of an SCFA's exchange reaction
pub fn scfa_ids(scfa: Scfa) -> &'static [&'static str] {
    match scfa {
        Scfa::Acetate => &ACETATE_IDS,
        Scfa::Propionate => &PROPIONATE_IDS,
        Scfa::Butyrate => &BUTYRATE_IDS,
    }
}

/// Candidate ids of the extracellular exchange reaction of a metabolite
///
/// # Examples
/// ```rust
/// use scfa_fba_core::medium::candidates::exchange_ids;
/// assert_eq!(
///     exchange_ids("his__L"),
///     vec!["EX_his__L_e", "EX_his_L_e", "EX_his__L[e]", "EX_his__L(e)"]
/// );
/// assert_eq!(exchange_ids("o2"), vec!["EX_o2_e", "EX_o2[e]", "EX_o2(e)"]);
/// ```
pub fn exchange_ids(stem: &str) -> Vec<String> {
    let mut ids = vec![format!("EX_{stem}_e")];
    let collapsed = stem.replace("__", "_");
    if collapsed != stem {
        ids.push(format!("EX_{collapsed}_e"));
    }
    ids.push(format!("EX_{stem}[e]"));
    ids.push(format!("EX_{stem}(e)"));
    ids
}

/// First candidate id present in the model, if any
pub fn resolve<S: AsRef<str>>(model: &Model, candidates: &[S]) -> Option<String> {
    candidates
        .iter()
        .map(|c| c.as_ref())
        .find(|c| model.has_reaction(c))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_models::toy_hepatocyte;

    #[test]
    fn first_match_wins() {
        let model = toy_hepatocyte();
        assert_eq!(resolve(&model, &GLUCOSE_IDS), Some("EX_glc__D_e".to_string()));
        assert_eq!(resolve(&model, &["EX_nope_e", "ATPM"]), Some("ATPM".to_string()));
        assert_eq!(resolve(&model, &["EX_nope_e", "EX_none_e"]), None);
        let empty: [&str; 0] = [];
        assert_eq!(resolve(&model, &empty), None);
    }

    #[test]
    fn variants_reach_alternate_names() {
        let model = toy_hepatocyte();
        assert_eq!(
            resolve(&model, &exchange_ids("his__L")),
            Some("EX_his_L_e".to_string())
        );
        assert_eq!(
            resolve(&model, &exchange_ids("thm")),
            Some("EX_thm[e]".to_string())
        );
        assert_eq!(resolve(&model, &exchange_ids("so4")), None);
    }

    #[test]
    fn scfa_lists() {
        let model = toy_hepatocyte();
        for scfa in Scfa::ALL {
            assert!(resolve(&model, scfa_ids(scfa)).is_some());
        }
        assert_eq!(scfa_ids(Scfa::Butyrate), &["EX_but_e", "EX_btn_e"]);
    }
}
