use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SolrResult;
use crate::response::path::{self, JsonPath};

/// `stats.stats_fields`, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub fields: IndexMap<String, FieldStats>,
}

/// Statistics for one field. Which keys Solr sends depends on the field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub count: Option<u64>,
    pub missing: Option<u64>,
    pub sum: Option<f64>,
    pub mean: Option<Value>,
    pub sum_of_squares: Option<f64>,
    pub stddev: Option<f64>,
}

impl FieldStats {
    pub fn get_min<T: DeserializeOwned>(&self) -> SolrResult<Option<T>> {
        Ok(self.min.clone().map(serde_json::from_value).transpose()?)
    }

    pub fn get_max<T: DeserializeOwned>(&self) -> SolrResult<Option<T>> {
        Ok(self.max.clone().map(serde_json::from_value).transpose()?)
    }

    fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let u64_at = |key: &str| -> SolrResult<Option<u64>> {
            path::optional(object, key, at)
                .map(|(v, p)| path::as_u64(v, &p))
                .transpose()
        };
        let f64_at = |key: &str| -> SolrResult<Option<f64>> {
            path::optional(object, key, at)
                .map(|(v, p)| path::as_f64(v, &p))
                .transpose()
        };
        let raw_at = |key: &str| path::optional(object, key, at).map(|(v, _)| v.clone());

        Ok(Self {
            min: raw_at("min"),
            max: raw_at("max"),
            count: u64_at("count")?,
            missing: u64_at("missing")?,
            sum: f64_at("sum")?,
            mean: raw_at("mean"),
            sum_of_squares: f64_at("sumOfSquares")?,
            stddev: f64_at("stddev")?,
        })
    }
}

impl StatsResult {
    pub(crate) fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (fields, fields_path) = path::required(object, "stats_fields", at)?;
        let fields = path::as_object(fields, &fields_path)?
            .iter()
            .map(|(name, stats)| Ok((name.clone(), FieldStats::parse(stats, &fields_path.key(name))?)))
            .collect::<SolrResult<IndexMap<_, _>>>()?;
        Ok(Self { fields })
    }

    pub fn get_field(&self, field: &str) -> Option<&FieldStats> {
        self.fields.get(field)
    }
}
