use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::output::TableRow;
use crate::parser::Feature;

/// One tree, denormalized into a single CSV row.
///
/// Field order is the column order of `censo_arboreo_processed.csv`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub nome_popul: String,
    pub nome_sp: String,
    pub altura: f64,
    pub dap: f64,
    pub copa: f64,
    pub cap: f64,
    pub porte_esp: String,
    pub bairro: String,
    pub bairro_nome: String,
    pub rpa: String,
    pub tipologia: String,
    pub lng: f64,
    pub lat: f64,
}

/// The reduced row written to `heatmap_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub bairro_nome: String,
    pub nome_popul: String,
    pub altura: f64,
    pub dap: f64,
    pub lng: f64,
    pub lat: f64,
}

impl TableRow for FlatRecord {
    const HEADERS: &'static [&'static str] = &[
        "nome_popul",
        "nome_sp",
        "altura",
        "dap",
        "copa",
        "cap",
        "porte_esp",
        "bairro",
        "bairro_nome",
        "rpa",
        "tipologia",
        "lng",
        "lat",
    ];
}

impl TableRow for SampleRecord {
    const HEADERS: &'static [&'static str] =
        &["bairro_nome", "nome_popul", "altura", "dap", "lng", "lat"];
}

impl FlatRecord {
    /// Extracts a record from a parsed feature.
    ///
    /// Missing or `null` properties default to `""` for text fields and `0`
    /// for measurements. A geometry without a `[lng, lat]` pair is an error.
    pub fn from_feature(feature: &Feature) -> Result<Self> {
        let props = &feature.properties;

        let (lng, lat) = match feature.geometry.coordinates.as_slice() {
            [lng, lat, ..] => (*lng, *lat),
            other => bail!(
                "geometry has {} coordinate(s), expected a [lng, lat] pair",
                other.len()
            ),
        };

        Ok(FlatRecord {
            nome_popul: text_field(props, "nome_popul")?,
            nome_sp: text_field(props, "nome_sp")?,
            altura: numeric_field(props, "altura")?,
            dap: numeric_field(props, "dap")?,
            copa: numeric_field(props, "copa")?,
            cap: numeric_field(props, "cap")?,
            porte_esp: text_field(props, "porte_esp")?,
            bairro: text_field(props, "bairro")?,
            bairro_nome: text_field(props, "bairro_nome")?,
            rpa: text_field(props, "rpa")?,
            tipologia: text_field(props, "tipologia")?,
            lng,
            lat,
        })
    }

    /// Projects the record onto the heatmap columns.
    pub fn to_sample(&self) -> SampleRecord {
        SampleRecord {
            bairro_nome: self.bairro_nome.clone(),
            nome_popul: self.nome_popul.clone(),
            altura: self.altura,
            dap: self.dap,
            lng: self.lng,
            lat: self.lat,
        }
    }
}

fn text_field(props: &Map<String, Value>, key: &str) -> Result<String> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(anyhow!("property '{key}' is not a scalar: {other}")),
    }
}

fn numeric_field(props: &Map<String, Value>, key: &str) -> Result<f64> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| anyhow!("property '{key}' is out of range: {n}")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| anyhow!("property '{key}' is not numeric: {s:?}")),
        Some(other) => Err(anyhow!("property '{key}' is not numeric: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Geometry;
    use serde_json::json;

    fn feature(properties: Value, coordinates: Vec<f64>) -> Feature {
        let Value::Object(properties) = properties else {
            panic!("test properties must be an object");
        };
        Feature {
            properties,
            geometry: Geometry { coordinates },
        }
    }

    #[test]
    fn test_from_feature_full() {
        let f = feature(
            json!({
                "nome_popul": "Ipê-amarelo",
                "nome_sp": "Handroanthus albus",
                "altura": 8.5,
                "dap": 0.32,
                "copa": 6,
                "cap": 1.0,
                "porte_esp": "Médio",
                "bairro": "12",
                "bairro_nome": "Boa Viagem",
                "rpa": 6,
                "tipologia": "Calçada"
            }),
            vec![-34.89, -8.12],
        );

        let record = FlatRecord::from_feature(&f).unwrap();

        assert_eq!(record.nome_popul, "Ipê-amarelo");
        assert_eq!(record.altura, 8.5);
        assert_eq!(record.copa, 6.0);
        assert_eq!(record.rpa, "6");
        assert_eq!(record.bairro_nome, "Boa Viagem");
        assert_eq!(record.lng, -34.89);
        assert_eq!(record.lat, -8.12);
    }

    #[test]
    fn test_missing_properties_default() {
        let record = FlatRecord::from_feature(&feature(json!({}), vec![1.0, 2.0])).unwrap();

        assert_eq!(record.altura, 0.0);
        assert_eq!(record.cap, 0.0);
        assert_eq!(record.nome_popul, "");
        assert_eq!(record.rpa, "");
        assert_eq!((record.lng, record.lat), (1.0, 2.0));
    }

    #[test]
    fn test_null_and_blank_values_default() {
        let f = feature(
            json!({"altura": null, "dap": "  ", "bairro_nome": null}),
            vec![0.0, 0.0],
        );
        let record = FlatRecord::from_feature(&f).unwrap();

        assert_eq!(record.altura, 0.0);
        assert_eq!(record.dap, 0.0);
        assert_eq!(record.bairro_nome, "");
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let f = feature(json!({"altura": "12.5", "dap": " 3 "}), vec![0.0, 0.0]);
        let record = FlatRecord::from_feature(&f).unwrap();

        assert_eq!(record.altura, 12.5);
        assert_eq!(record.dap, 3.0);
    }

    #[test]
    fn test_non_numeric_measurement_is_an_error() {
        let f = feature(json!({"altura": "alta"}), vec![0.0, 0.0]);
        let err = FlatRecord::from_feature(&f).unwrap_err();
        assert!(err.to_string().contains("altura"));
    }

    #[test]
    fn test_non_finite_measurement_is_an_error() {
        for value in ["NaN", "inf", "-infinity"] {
            let f = feature(json!({"altura": value}), vec![0.0, 0.0]);
            let result = FlatRecord::from_feature(&f);
            assert!(result.is_err(), "{value} was accepted as a measurement");
        }
    }

    #[test]
    fn test_nested_text_value_is_an_error() {
        let f = feature(json!({"nome_popul": ["a", "b"]}), vec![0.0, 0.0]);
        assert!(FlatRecord::from_feature(&f).is_err());
    }

    #[test]
    fn test_short_coordinates_are_an_error() {
        assert!(FlatRecord::from_feature(&feature(json!({}), vec![1.0])).is_err());
        assert!(FlatRecord::from_feature(&feature(json!({}), vec![])).is_err());
    }

    #[test]
    fn test_to_sample_projection() {
        let record = FlatRecord {
            nome_popul: "Oiti".into(),
            bairro_nome: "Centro".into(),
            altura: 4.0,
            dap: 0.2,
            lng: -34.8,
            lat: -8.0,
            rpa: "1".into(),
            ..Default::default()
        };

        let sample = record.to_sample();

        assert_eq!(sample.bairro_nome, "Centro");
        assert_eq!(sample.nome_popul, "Oiti");
        assert_eq!(sample.altura, 4.0);
        assert_eq!((sample.lng, sample.lat), (-34.8, -8.0));
    }
}
