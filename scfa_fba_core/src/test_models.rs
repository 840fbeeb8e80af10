//! Small hand-built networks shared by the unit tests
use indexmap::IndexMap;

use crate::metabolic_model::metabolite::MetaboliteBuilder;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::ReactionBuilder;

fn add(model: &mut Model, id: &str, stoich: &[(&str, f64)], lower: f64, upper: f64) {
    let metabolites: IndexMap<String, f64> =
        stoich.iter().map(|(m, c)| (m.to_string(), *c)).collect();
    for met in metabolites.keys() {
        if !model.metabolites.contains_key(met) {
            model.add_metabolite(MetaboliteBuilder::default().id(met.as_str()).build().unwrap());
        }
    }
    model.add_reaction(
        ReactionBuilder::default()
            .id(id)
            .metabolites(metabolites)
            .lower_bound(lower)
            .upper_bound(upper)
            .build()
            .unwrap(),
    );
}

/// A lumped hepatocyte energy network in its "as downloaded" state (every boundary
/// reaction open)
///
/// ATP yields: glucose gives 2 ATP at pyruvate kinase plus 10 per acetyl-CoA (2 per
/// glucose), acetate and propionate give one acetyl-CoA, butyrate gives two. Each
/// acetyl-CoA oxidized costs 2 O2.
pub(crate) fn toy_hepatocyte() -> Model {
    let mut model = Model::new_empty();
    model.id = Some("toy_hepatocyte".to_string());
    let open = (-1000., 1000.);
    for (rxn, met) in [
        ("EX_glc__D_e", "glc__D_e"),
        ("EX_o2_e", "o2_e"),
        ("EX_co2_e", "co2_e"),
        ("EX_h2o_e", "h2o_e"),
        ("EX_h_e", "h_e"),
        ("EX_nh4_e", "nh4_e"),
        ("EX_pi_e", "pi_e"),
        ("EX_na1_e", "na1_e"),
        ("EX_ac_e", "ac_e"),
        ("EX_ppa_e", "ppa_e"),
        ("EX_but_e", "but_e"),
        ("EX_his_L_e", "his__L_e"),
        ("EX_thm[e]", "thm_e"),
        ("DM_x_c", "x_c"),
    ] {
        add(&mut model, rxn, &[(met, -1.)], open.0, open.1);
    }
    add(&mut model, "PFK", &[("glc__D_e", -1.), ("pep_c", 2.)], open.0, open.1);
    add(
        &mut model,
        "PYK",
        &[("pep_c", -1.), ("pyr_c", 1.), ("atp_c", 1.)],
        open.0,
        open.1,
    );
    add(
        &mut model,
        "PDHm",
        &[("pyr_c", -1.), ("accoa_c", 1.), ("co2_e", 1.)],
        open.0,
        open.1,
    );
    add(
        &mut model,
        "CSm",
        &[("accoa_c", -1.), ("o2_e", -2.), ("co2_e", 2.), ("atp_c", 10.)],
        open.0,
        open.1,
    );
    add(&mut model, "ACS", &[("ac_e", -1.), ("accoa_c", 1.)], open.0, open.1);
    add(&mut model, "PPAOX", &[("ppa_e", -1.), ("pyr_c", 1.)], open.0, open.1);
    add(&mut model, "BUTOX", &[("but_e", -1.), ("accoa_c", 2.)], open.0, open.1);
    add(&mut model, "LOOPa", &[("x_c", -1.), ("y_c", 1.)], open.0, open.1);
    add(&mut model, "LOOPb", &[("y_c", -1.), ("x_c", 1.)], open.0, open.1);
    add(&mut model, "ATPM", &[("atp_c", -1.)], 0., 1000.);
    model.objective.insert("ATPM".to_string(), 1.);
    model
}
