use crate::core::cast::cast;
use crate::core::casing::Casing;
use crate::core::registry;
use crate::domain::collection::PropertyCollection;
use crate::domain::property::{PropertyInfo, PropertyKind};
use crate::domain::value::Value;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_identifier, validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Model definitions loaded from a TOML schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub serialization: Option<SerializationConfig>,
    pub models: Vec<ModelDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializationConfig {
    pub casing: Option<Casing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub default: Option<toml::Value>,
}

impl SchemaConfig {
    /// 從 TOML 檔案載入模型定義
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析模型定義
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ModelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_PREFIX})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Casing configured for serialization, `snake` when unset.
    pub fn casing(&self) -> Casing {
        self.serialization
            .as_ref()
            .and_then(|s| s.casing)
            .unwrap_or_default()
    }

    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Builds one property collection per defined model, in file order.
    pub fn collections(&self) -> Result<Vec<PropertyCollection>> {
        self.validate_config()?;
        self.models.iter().map(ModelDefinition::collection).collect()
    }

    /// Registers every defined model so it can be constructed and restored by
    /// name. If any model clashes with one already registered, none are.
    pub fn register(&self) -> Result<Vec<Arc<PropertyCollection>>> {
        let collections = self.collections()?;
        tracing::info!("📚 Registering {} model definitions", collections.len());
        registry::register_all(collections)
    }

    /// 驗證模型定義的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(ModelError::ConfigValidationError {
                field: "models".to_string(),
                message: "At least one model must be defined".to_string(),
            });
        }

        let mut names = HashSet::new();
        for model in &self.models {
            validate_identifier("models.name", &model.name)?;
            if !names.insert(model.name.as_str()) {
                return Err(ModelError::ConfigValidationError {
                    field: "models.name".to_string(),
                    message: format!("Model '{}' is defined more than once", model.name),
                });
            }
        }

        for model in &self.models {
            for property in &model.properties {
                let field = format!("models.{}.properties", model.name);
                validate_identifier(&field, &property.name)?;
                let type_field = format!("{}.{}.type", field, property.name);
                validate_non_empty_string(&type_field, &property.kind)?;

                let kind = property.parse_kind(&field)?;
                if let Some(model_ref) = kind.model_ref() {
                    let known = names.contains(model_ref.name())
                        || registry::lookup(model_ref.name()).is_some();
                    if !known {
                        return Err(ModelError::ConfigValidationError {
                            field,
                            message: format!(
                                "Property '{}' references unknown model '{}'",
                                property.name,
                                model_ref.name()
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl ModelDefinition {
    pub fn collection(&self) -> Result<PropertyCollection> {
        let field = format!("models.{}.properties", self.name);
        let properties = self
            .properties
            .iter()
            .map(|property| property.info(&field))
            .collect::<Result<Vec<_>>>()?;
        PropertyCollection::new(self.name.clone(), properties)
    }
}

impl PropertyDefinition {
    fn parse_kind(&self, field: &str) -> Result<PropertyKind> {
        self.kind
            .parse::<PropertyKind>()
            .map_err(|e| ModelError::ConfigValidationError {
                field: field.to_string(),
                message: format!("Property '{}': {}", self.name, e),
            })
    }

    /// Builds the descriptor, casting the configured default to the declared
    /// kind.
    pub fn info(&self, field: &str) -> Result<PropertyInfo> {
        let kind = self.parse_kind(field)?;
        let Some(raw_default) = &self.default else {
            return Ok(PropertyInfo::new(&self.name, kind, Value::Null));
        };

        if kind.is_nested() {
            return Err(ModelError::ConfigValidationError {
                field: field.to_string(),
                message: format!("Nested property '{}' cannot declare a default", self.name),
            });
        }

        let raw = Value::from(serde_json::to_value(raw_default)?);
        let untyped = PropertyInfo::new(&self.name, kind.clone(), Value::Null);
        let default = cast(Some(raw), &untyped).map_err(|e| ModelError::ConfigValidationError {
            field: field.to_string(),
            message: format!("Invalid default: {}", e),
        })?;

        Ok(PropertyInfo::new(&self.name, kind, default))
    }
}

impl Validate for SchemaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
