//! Fixed values written in YAML configuration.

use fixture_core::Value;
use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;

/// Convert a YAML value to a [`Value`].
///
/// Mappings with string keys become objects named `"map"`, other mappings
/// become key/value pairs.
pub fn yaml_to_value(yaml: &YamlValue) -> Value {
    match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::List(items.iter().map(yaml_to_value).collect()),
        YamlValue::Mapping(map) => {
            if map.keys().all(YamlValue::is_string) {
                let fields: IndexMap<String, Value> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), yaml_to_value(v))))
                    .collect();
                Value::Object {
                    type_name: "map".to_string(),
                    fields,
                }
            } else {
                Value::Map(
                    map.iter()
                        .map(|(k, v)| (yaml_to_value(k), yaml_to_value(v)))
                        .collect(),
                )
            }
        }
        YamlValue::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_scalars() {
        assert_eq!(yaml_to_value(&YamlValue::Null), Value::Null);
        assert_eq!(yaml_to_value(&YamlValue::Bool(true)), Value::Bool(true));
        assert_eq!(
            yaml_to_value(&serde_yaml::from_str("42").unwrap()),
            Value::Int(42)
        );
        assert_eq!(
            yaml_to_value(&serde_yaml::from_str("1.5").unwrap()),
            Value::Float(1.5)
        );
        assert_eq!(
            yaml_to_value(&serde_yaml::from_str("NEW").unwrap()),
            Value::String("NEW".to_string())
        );
    }

    #[test]
    fn test_yaml_sequence() {
        let yaml: YamlValue = serde_yaml::from_str("[1, 2, 3]").unwrap();
        assert_eq!(
            yaml_to_value(&yaml),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_yaml_mappings() {
        let yaml: YamlValue = serde_yaml::from_str("{city: Paris, zip: 75001}").unwrap();
        let value = yaml_to_value(&yaml);
        assert_eq!(value.get_field("city"), Some(&Value::String("Paris".to_string())));
        assert_eq!(value.get_field("zip"), Some(&Value::Int(75001)));

        let yaml: YamlValue = serde_yaml::from_str("{1: one, 2: two}").unwrap();
        assert_eq!(yaml_to_value(&yaml).as_map().map(<[_]>::len), Some(2));
    }
}
