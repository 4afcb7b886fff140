use crate::domain::property::PropertyInfo;
use crate::utils::error::{ModelError, Result};
use std::collections::HashMap;

/// Ordered, name-unique set of property descriptors for one model type.
///
/// Built once per type and shared read-only by every instance of it.
#[derive(Debug, Clone)]
pub struct PropertyCollection {
    name: String,
    properties: Vec<PropertyInfo>,
    positions: HashMap<String, usize>,
}

impl PropertyCollection {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyInfo>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::schema("Model type name cannot be empty"));
        }

        let mut positions = HashMap::with_capacity(properties.len());
        for (index, info) in properties.iter().enumerate() {
            if info.name().is_empty() {
                return Err(ModelError::schema(format!(
                    "Model '{}' declares a property with an empty name",
                    name
                )));
            }
            if positions.insert(info.name().to_string(), index).is_some() {
                return Err(ModelError::schema(format!(
                    "Model '{}' declares property '{}' more than once",
                    name,
                    info.name()
                )));
            }
        }

        // the snake_case alternate doubles as a lookup and output key
        let mut owners: HashMap<&str, &str> = HashMap::with_capacity(properties.len() * 2);
        for info in &properties {
            for key in [info.name(), info.alternate_name()] {
                if let Some(owner) = owners.insert(key, info.name()) {
                    if owner != info.name() {
                        return Err(ModelError::schema(format!(
                            "Model '{}' declares '{}' and '{}', which share the key '{}'",
                            name,
                            owner,
                            info.name(),
                            key
                        )));
                    }
                }
            }
        }

        Ok(Self {
            name,
            properties,
            positions,
        })
    }

    /// Name of the model type this collection describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All properties in declaration order.
    pub fn all(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&PropertyInfo> {
        self.position(name).map(|index| &self.properties[index])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.properties.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(PropertyInfo::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyInfo> {
        self.properties.iter()
    }
}

impl PartialEq for PropertyCollection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.properties == other.properties
    }
}

impl Eq for PropertyCollection {}

impl<'a> IntoIterator for &'a PropertyCollection {
    type Item = &'a PropertyInfo;
    type IntoIter = std::slice::Iter<'a, PropertyInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::PropertyKind;
    use crate::domain::value::Value;

    fn book_properties() -> Vec<PropertyInfo> {
        vec![
            PropertyInfo::new("id", PropertyKind::Int, 0),
            PropertyInfo::new("name", PropertyKind::Text, Value::Null),
            PropertyInfo::new("stockLevel", PropertyKind::Int, 0),
        ]
    }

    #[test]
    fn test_keeps_declaration_order() {
        let collection = PropertyCollection::new("Book", book_properties()).unwrap();

        let names: Vec<&str> = collection.names().collect();
        assert_eq!(names, vec!["id", "name", "stockLevel"]);
        assert_eq!(collection.count(), 3);
        assert_eq!(collection.position("stockLevel"), Some(2));
    }

    #[test]
    fn test_get_returns_none_for_undeclared() {
        let collection = PropertyCollection::new("Book", book_properties()).unwrap();

        assert_eq!(collection.get("name").map(PropertyInfo::name), Some("name"));
        assert!(collection.get("stock_level").is_none());
        assert!(collection.get("isbn").is_none());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let mut properties = book_properties();
        properties.push(PropertyInfo::new("id", PropertyKind::Text, Value::Null));

        let err = PropertyCollection::new("Book", properties).unwrap_err();
        assert!(matches!(err, ModelError::Schema { .. }));
    }

    #[test]
    fn test_recomputed_collection_is_equal() {
        let first = PropertyCollection::new("Book", book_properties()).unwrap();
        let second = PropertyCollection::new("Book", book_properties()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_names_colliding_in_snake_case() {
        let mut properties = book_properties();
        properties.push(PropertyInfo::new("stock_level", PropertyKind::Int, 0));

        let err = PropertyCollection::new("Book", properties).unwrap_err();
        assert!(matches!(err, ModelError::Schema { .. }));
        assert!(err.to_string().contains("stock_level"));

        let properties = vec![
            PropertyInfo::new("userId", PropertyKind::Int, 0),
            PropertyInfo::new("userID", PropertyKind::Int, 0),
        ];
        assert!(PropertyCollection::new("Account", properties).is_err());
    }

    #[test]
    fn test_snake_case_names_alongside_camel_case_are_fine() {
        let properties = vec![
            PropertyInfo::new("address1", PropertyKind::Text, Value::Null),
            PropertyInfo::new("user_id", PropertyKind::Int, 0),
            PropertyInfo::new("stockLevel", PropertyKind::Int, 0),
        ];
        let collection = PropertyCollection::new("Customer", properties).unwrap();
        assert_eq!(collection.count(), 3);
    }
}
