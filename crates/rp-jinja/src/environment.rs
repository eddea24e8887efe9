//! Jinja environment setup for model templates

use crate::error::{JinjaError, JinjaResult};
use crate::functions::{
    make_config_fn, make_ref_fn, make_source_fn, make_var_fn, register_rule_functions,
    yaml_to_json, ConfigCapture,
};
use minijinja::{Environment, Value};
use rp_core::model::{Materialization, ModelConfig};
use rp_core::Layer;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Relations that `source()` and `ref()` resolve against
#[derive(Debug, Clone, Default)]
pub struct RelationMap {
    /// Schema holding the raw tables
    pub source_schema: String,
    /// Raw table names `source('raw', ...)` accepts
    pub source_tables: HashSet<String>,
    /// Model name to qualified relation; `None` resolves refs to bare names
    pub models: Option<HashMap<String, String>>,
}

impl RelationMap {
    /// Map used for the first pass, before model schemas are known
    pub fn discovery(source_schema: &str, source_tables: HashSet<String>) -> Self {
        Self {
            source_schema: source_schema.to_string(),
            source_tables,
            models: None,
        }
    }

    /// Map with fully qualified model relations
    pub fn resolved(
        source_schema: &str,
        source_tables: HashSet<String>,
        models: HashMap<String, String>,
    ) -> Self {
        Self {
            source_schema: source_schema.to_string(),
            source_tables,
            models: Some(models),
        }
    }
}

/// Jinja templating environment for model SQL
pub struct JinjaEnvironment {
    env: Environment<'static>,
    config_capture: ConfigCapture,
}

impl JinjaEnvironment {
    /// Create a new environment with config vars and relation resolution
    pub fn new(vars: &HashMap<String, serde_yaml::Value>, relations: RelationMap) -> Self {
        let mut env = Environment::new();
        let config_capture: ConfigCapture = Arc::new(Mutex::new(HashMap::new()));

        let json_vars: HashMap<String, serde_json::Value> = vars
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect();

        env.add_function("config", make_config_fn(config_capture.clone()));
        env.add_function("var", make_var_fn(json_vars));
        env.add_function(
            "source",
            make_source_fn(relations.source_schema, relations.source_tables),
        );
        env.add_function("ref", make_ref_fn(relations.models));
        register_rule_functions(&mut env);

        Self {
            env,
            config_capture,
        }
    }

    fn captured(&self) -> JinjaResult<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.config_capture
            .lock()
            .map_err(|e| JinjaError::Internal(format!("config mutex poisoned: {e}")))
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> JinjaResult<String> {
        self.captured()?.clear();

        let result = self.env.render_str(template, ())?;

        Ok(result)
    }

    /// Render a template and return both the SQL and the captured model config
    pub fn render_with_config(&self, template: &str) -> JinjaResult<(String, ModelConfig)> {
        let rendered = self.render(template)?;
        let config = self.model_config()?;
        Ok((rendered, config))
    }

    /// Interpret the captured `config()` keyword arguments
    pub fn model_config(&self) -> JinjaResult<ModelConfig> {
        let captured = self.captured()?;
        let mut config = ModelConfig::default();

        let mut keys: Vec<&String> = captured.keys().collect();
        keys.sort();
        for key in keys {
            let value = &captured[key];
            let text = value.as_str().ok_or_else(|| JinjaError::InvalidConfigValue {
                key: key.clone(),
                message: format!("expected a string, got {}", value.kind()),
            })?;
            match key.as_str() {
                "materialized" => {
                    let m = text.parse::<Materialization>().map_err(|message| {
                        JinjaError::InvalidConfigValue {
                            key: key.clone(),
                            message,
                        }
                    })?;
                    config.materialized = Some(m);
                }
                "layer" => {
                    let layer = text.parse::<Layer>().map_err(|message| {
                        JinjaError::InvalidConfigValue {
                            key: key.clone(),
                            message,
                        }
                    })?;
                    config.layer = Some(layer);
                }
                _ => return Err(JinjaError::InvalidConfigKey { key: key.clone() }),
            }
        }

        Ok(config)
    }
}

impl Default for JinjaEnvironment {
    fn default() -> Self {
        Self::new(&HashMap::new(), RelationMap::default())
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
