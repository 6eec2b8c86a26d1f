use crate::analyzers::types::{Biometrics, GlobalAggregate, NeighborhoodAggregate, ValueCounts};
use crate::analyzers::utility::{max, mean, median, min, mode, value_counts};
use crate::record::FlatRecord;
use std::collections::{BTreeMap, HashSet};

/// Number of species listed in each neighborhood's `top_especies_json`.
pub const TOP_SPECIES_PER_NEIGHBORHOOD: usize = 5;

/// Number of species listed in the global `top_10_especies_json`.
pub const TOP_SPECIES_GLOBAL: usize = 10;

/// Computes the biometric summary of a set of trees.
pub fn biometrics(records: &[&FlatRecord]) -> Biometrics {
    let column = |field: fn(&FlatRecord) -> f64| -> Vec<f64> {
        records.iter().map(|r| field(r)).collect()
    };

    let altura = column(|r| r.altura);
    let dap = column(|r| r.dap);
    let copa = column(|r| r.copa);
    let cap = column(|r| r.cap);

    Biometrics {
        altura_media: mean(&altura),
        altura_min: min(&altura),
        altura_max: max(&altura),
        altura_mediana: median(&altura),
        dap_medio: mean(&dap),
        dap_min: min(&dap),
        dap_max: max(&dap),
        dap_mediana: median(&dap),
        copa_media: mean(&copa),
        copa_min: min(&copa),
        copa_max: max(&copa),
        copa_mediana: median(&copa),
        cap_medio: mean(&cap),
    }
}

/// Counts a text column over a set of trees.
fn counts_of<'a>(records: &[&'a FlatRecord], field: fn(&'a FlatRecord) -> &'a str) -> ValueCounts {
    ValueCounts(value_counts(records.iter().copied().map(field)))
}

/// Groups records by `bairro_nome` and summarizes each group.
///
/// Rows are ordered by descending tree count; equal counts fall back to the
/// neighborhood name in ascending order.
pub fn aggregate_neighborhoods(records: &[FlatRecord]) -> anyhow::Result<Vec<NeighborhoodAggregate>> {
    let mut groups: BTreeMap<&str, Vec<&FlatRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.bairro_nome.as_str()).or_default().push(record);
    }

    let mut rows = Vec::with_capacity(groups.len());

    for (bairro, group) in groups {
        let b = biometrics(&group);
        let top_especies =
            counts_of(&group, |r| r.nome_popul.as_str()).top(TOP_SPECIES_PER_NEIGHBORHOOD);
        let portes = counts_of(&group, |r| r.porte_esp.as_str());

        rows.push(NeighborhoodAggregate {
            bairro: bairro.to_string(),
            rpa: mode(group.iter().map(|r| r.rpa.as_str())),
            quantidade: group.len(),
            altura_media: b.altura_media,
            altura_min: b.altura_min,
            altura_max: b.altura_max,
            altura_mediana: b.altura_mediana,
            dap_medio: b.dap_medio,
            dap_min: b.dap_min,
            dap_max: b.dap_max,
            dap_mediana: b.dap_mediana,
            copa_media: b.copa_media,
            copa_min: b.copa_min,
            copa_max: b.copa_max,
            copa_mediana: b.copa_mediana,
            cap_medio: b.cap_medio,
            top_especies_json: top_especies.to_json()?,
            portes_json: portes.to_json()?,
        });
    }

    // stable: BTreeMap already ordered the ties by name
    rows.sort_by(|a, b| b.quantidade.cmp(&a.quantidade));

    Ok(rows)
}

/// Summarizes the whole dataset into the single global row.
pub fn aggregate_global(records: &[FlatRecord]) -> anyhow::Result<GlobalAggregate> {
    let all: Vec<&FlatRecord> = records.iter().collect();
    let b = biometrics(&all);

    let total_especies = records
        .iter()
        .map(|r| r.nome_popul.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(GlobalAggregate {
        total_arvores: records.len(),
        total_especies,
        altura_media: b.altura_media,
        altura_min: b.altura_min,
        altura_max: b.altura_max,
        altura_mediana: b.altura_mediana,
        dap_medio: b.dap_medio,
        dap_min: b.dap_min,
        dap_max: b.dap_max,
        dap_mediana: b.dap_mediana,
        copa_media: b.copa_media,
        copa_min: b.copa_min,
        copa_max: b.copa_max,
        copa_mediana: b.copa_mediana,
        cap_medio: b.cap_medio,
        distribuicao_porte_json: counts_of(&all, |r| r.porte_esp.as_str()).to_json()?,
        distribuicao_rpa_json: counts_of(&all, |r| r.rpa.as_str()).to_json()?,
        distribuicao_tipologia_json: counts_of(&all, |r| r.tipologia.as_str()).to_json()?,
        top_10_especies_json: counts_of(&all, |r| r.nome_popul.as_str())
            .top(TOP_SPECIES_GLOBAL)
            .to_json()?,
    })
}
