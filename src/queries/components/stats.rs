use serde::{Deserialize, Serialize};

use crate::queries::params::ParamList;

/// Field statistics (`stats=true`, one `stats.field` per field).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsComponent {
    pub fields: Vec<String>,
}

impl StatsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<S: Into<String>, I: IntoIterator<Item = S>>(mut self, fields: I) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn append_params(&self, params: &mut ParamList) {
        params.push("stats", "true");
        for field in &self.fields {
            params.push("stats.field", field.as_str());
        }
    }
}
