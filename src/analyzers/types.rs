//! Data types used by the aggregation pipeline.

use serde::{Serialize, Serializer};

use crate::output::TableRow;

/// A frequency table in value-counts order.
///
/// Serializes as a JSON object whose keys keep this order, which a plain
/// `serde_json::Map` would sort away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueCounts(pub Vec<(String, usize)>);

impl ValueCounts {
    /// Keeps only the `n` most frequent entries.
    pub fn top(mut self, n: usize) -> Self {
        self.0.truncate(n);
        self
    }

    /// Encodes the table as compact JSON for embedding in a CSV cell.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ValueCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(value, count)| (value, count)))
    }
}

/// Descriptive statistics of the biometric measurements over a set of trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Biometrics {
    pub altura_media: f64,
    pub altura_min: f64,
    pub altura_max: f64,
    pub altura_mediana: f64,
    pub dap_medio: f64,
    pub dap_min: f64,
    pub dap_max: f64,
    pub dap_mediana: f64,
    pub copa_media: f64,
    pub copa_min: f64,
    pub copa_max: f64,
    pub copa_mediana: f64,
    pub cap_medio: f64,
}

/// One row of `bairro_stats.csv`.
///
/// csv cannot flatten nested structs, so the biometric columns are repeated
/// here rather than embedding [`Biometrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodAggregate {
    pub bairro: String,
    pub rpa: String,
    pub quantidade: usize,
    pub altura_media: f64,
    pub altura_min: f64,
    pub altura_max: f64,
    pub altura_mediana: f64,
    pub dap_medio: f64,
    pub dap_min: f64,
    pub dap_max: f64,
    pub dap_mediana: f64,
    pub copa_media: f64,
    pub copa_min: f64,
    pub copa_max: f64,
    pub copa_mediana: f64,
    pub cap_medio: f64,
    pub top_especies_json: String,
    pub portes_json: String,
}

/// The single row of `global_stats.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalAggregate {
    pub total_arvores: usize,
    pub total_especies: usize,
    pub altura_media: f64,
    pub altura_min: f64,
    pub altura_max: f64,
    pub altura_mediana: f64,
    pub dap_medio: f64,
    pub dap_min: f64,
    pub dap_max: f64,
    pub dap_mediana: f64,
    pub copa_media: f64,
    pub copa_min: f64,
    pub copa_max: f64,
    pub copa_mediana: f64,
    pub cap_medio: f64,
    pub distribuicao_porte_json: String,
    pub distribuicao_rpa_json: String,
    pub distribuicao_tipologia_json: String,
    pub top_10_especies_json: String,
}

impl TableRow for NeighborhoodAggregate {
    const HEADERS: &'static [&'static str] = &[
        "bairro",
        "rpa",
        "quantidade",
        "altura_media",
        "altura_min",
        "altura_max",
        "altura_mediana",
        "dap_medio",
        "dap_min",
        "dap_max",
        "dap_mediana",
        "copa_media",
        "copa_min",
        "copa_max",
        "copa_mediana",
        "cap_medio",
        "top_especies_json",
        "portes_json",
    ];
}

impl TableRow for GlobalAggregate {
    const HEADERS: &'static [&'static str] = &[
        "total_arvores",
        "total_especies",
        "altura_media",
        "altura_min",
        "altura_max",
        "altura_mediana",
        "dap_medio",
        "dap_min",
        "dap_max",
        "dap_mediana",
        "copa_media",
        "copa_min",
        "copa_max",
        "copa_mediana",
        "cap_medio",
        "distribuicao_porte_json",
        "distribuicao_rpa_json",
        "distribuicao_tipologia_json",
        "top_10_especies_json",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts_json_keeps_order() {
        let counts = ValueCounts(vec![("Oiti".into(), 5), ("Ipê".into(), 3), ("Acácia".into(), 1)]);
        assert_eq!(counts.to_json().unwrap(), r#"{"Oiti":5,"Ipê":3,"Acácia":1}"#);
    }

    #[test]
    fn test_value_counts_top() {
        let counts = ValueCounts(vec![("a".into(), 3), ("b".into(), 2), ("c".into(), 1)]).top(2);
        assert_eq!(counts.0.len(), 2);
        assert_eq!(counts.to_json().unwrap(), r#"{"a":3,"b":2}"#);
    }

    #[test]
    fn test_empty_value_counts_json() {
        let counts = ValueCounts::default();
        assert!(counts.0.is_empty());
        assert_eq!(counts.to_json().unwrap(), "{}");
    }
}
