use std::collections::HashMap;
use std::str::FromStr;

use crate::error::CrudError;

/// Raw path variables as the transport layer captured them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parse the variable `name` into `T`.
    ///
    /// Missing or unparseable values are `InvalidArgument`.
    pub fn parse<T>(&self, name: &str) -> Result<T, CrudError>
    where
        T: FromStr,
    {
        let raw = self.get(name).ok_or_else(|| {
            CrudError::invalid_argument(format!("missing path variable '{name}'"))
        })?;
        raw.parse::<T>().map_err(|_| {
            CrudError::invalid_argument(format!(
                "invalid path variable {name}: '{raw}' (expected type: {})",
                short_type_name::<T>()
            ))
        })
    }
}

impl From<HashMap<String, String>> for PathParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Names of the path variables a nested endpoint reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNames {
    pub parent_id: String,
    pub id: String,
}

impl Default for PathNames {
    fn default() -> Self {
        Self {
            parent_id: "parentId".into(),
            id: "id".into(),
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
