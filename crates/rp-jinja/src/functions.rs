//! Jinja template functions: config(), var(), source(), ref() and the SQL
//! helpers for the tier and calendar rules.

use minijinja::value::{Kwargs, Value};
use minijinja::{Error, ErrorKind};
use rp_core::calendar::{day_type_sql, time_of_day_sql};
use rp_core::tier::{CustomerValueTier, ProductPerformanceCategory, StorePerformanceTier, Tier};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Captured config values from config() calls
pub(crate) type ConfigCapture = Arc<Mutex<HashMap<String, Value>>>;

/// Create the config() function that captures model configuration
///
/// Usage in templates:
/// ```jinja
/// {{ config(materialized='table', layer='mart') }}
/// ```
pub(crate) fn make_config_fn(
    capture: ConfigCapture,
) -> impl Fn(Kwargs) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |kwargs: Kwargs| {
        let mut captured = capture.lock().map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("config mutex poisoned: {e}"),
            )
        })?;

        for key in kwargs.args() {
            let value = kwargs.get::<Value>(key).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("failed to get config kwarg '{}': {}", key, e),
                )
            })?;
            captured.insert(key.to_string(), value);
        }

        // config() renders nothing
        Ok(String::new())
    }
}

/// Create the var() function that retrieves variables from config
///
/// Usage in templates:
/// ```jinja
/// {{ var('lookback_days') }}
/// {{ var('missing', 30) }}
/// ```
pub(crate) fn make_var_fn(
    vars: HashMap<String, serde_json::Value>,
) -> impl Fn(&str, Option<Value>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |name: &str, default: Option<Value>| {
        if let Some(value) = vars.get(name) {
            Ok(json_to_minijinja_value(value))
        } else if let Some(default_val) = default {
            Ok(default_val)
        } else {
            Err(Error::new(
                ErrorKind::UndefinedError,
                format!("Variable '{}' is not defined and no default provided", name),
            ))
        }
    }
}

/// Create the source() function resolving a raw table to its qualified name
///
/// Usage in templates:
/// ```jinja
/// SELECT * FROM {{ source('raw', 'stores') }}
/// ```
pub(crate) fn make_source_fn(
    schema: String,
    tables: HashSet<String>,
) -> impl Fn(&str, &str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |source_name: &str, table: &str| {
        if source_name != "raw" {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown source '{}' (only 'raw' is defined)", source_name),
            ));
        }
        if !tables.contains(table) {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown raw table '{}'", table),
            ));
        }
        Ok(format!("{}.{}", schema, table))
    }
}

/// Create the ref() function resolving a model to its qualified name
///
/// With `models` unset every reference resolves to the bare model name, which
/// is enough to capture `config()` before schemas are known.
pub(crate) fn make_ref_fn(
    models: Option<HashMap<String, String>>,
) -> impl Fn(&str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |model: &str| match &models {
        None => Ok(model.to_string()),
        Some(models) => models.get(model).cloned().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("ref() to unknown model '{}'", model),
            )
        }),
    }
}

/// Register the tier and calendar SQL helpers on an environment
pub(crate) fn register_rule_functions(env: &mut minijinja::Environment<'static>) {
    env.add_function("customer_value_tier", |expr: &str| -> Result<String, Error> {
        Ok(CustomerValueTier::case_sql(expr))
    });
    env.add_function("store_performance_tier", |expr: &str| -> Result<String, Error> {
        Ok(StorePerformanceTier::case_sql(expr))
    });
    env.add_function(
        "product_performance_category",
        |expr: &str| -> Result<String, Error> { Ok(ProductPerformanceCategory::case_sql(expr)) },
    );
    env.add_function("day_type", |expr: &str| -> Result<String, Error> {
        Ok(day_type_sql(expr))
    });
    env.add_function("time_of_day", |expr: &str| -> Result<String, Error> {
        Ok(time_of_day_sql(expr))
    });
}

/// Convert serde_json::Value to minijinja::Value
pub(crate) fn json_to_minijinja_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::from(()),
        serde_json::Value::Bool(b) => Value::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                Value::from(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(arr) => {
            let values: Vec<Value> = arr.iter().map(json_to_minijinja_value).collect();
            Value::from(values)
        }
        serde_json::Value::Object(obj) => {
            let map: HashMap<String, Value> = obj
                .iter()
                .map(|(k, v)| (k.clone(), json_to_minijinja_value(v)))
                .collect();
            Value::from_iter(map)
        }
    }
}

/// Convert serde_yaml::Value to serde_json::Value
pub(crate) fn yaml_to_json(yaml: &serde_yaml::Value) -> serde_json::Value {
    match yaml {
        serde_yaml::Value::Null => serde_json::Value::Null,
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            } else {
                serde_json::Value::Null
            }
        }
        serde_yaml::Value::String(s) => serde_json::Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            serde_json::Value::Array(seq.iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let obj: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|key| (key.to_string(), yaml_to_json(v))))
                .collect();
            serde_json::Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
