//! Provider schema model, as emitted by `terraform providers schema -json`.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSchemas {
    #[serde(default)]
    pub format_version: String,
    #[serde(default)]
    pub provider_schemas: BTreeMap<String, ProviderSchema>,
}

impl ProviderSchemas {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub provider: Option<EntitySchema>,
    #[serde(default)]
    pub resource_schemas: BTreeMap<String, EntitySchema>,
    #[serde(default)]
    pub data_source_schemas: BTreeMap<String, EntitySchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntitySchema {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub block: Block,
}

/// A schema block: attributes plus nested blocks, both ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default)]
    pub block_types: BTreeMap<String, NestedBlock>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type", default)]
    pub attr_type: AttributeType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
}

impl Attribute {
    /// Non-empty description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NestedBlock {
    #[serde(default)]
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub block: Block,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    #[default]
    Single,
    Group,
    List,
    Set,
    Map,
}

impl NestingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NestingMode::Single => "single",
            NestingMode::Group => "group",
            NestingMode::List => "list",
            NestingMode::Set => "set",
            NestingMode::Map => "map",
        }
    }
}

/// A cty type expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    #[default]
    Dynamic,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
    Tuple(Vec<AttributeType>),
}

impl AttributeType {
    /// Short label shown next to attribute names in the tree.
    pub fn label(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Bool => "bool",
            AttributeType::Dynamic => "any",
            AttributeType::List(_) => "list",
            AttributeType::Set(_) => "set",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
            AttributeType::Tuple(_) => "tuple",
        }
    }

    /// HCL type constraint, e.g. `list(string)` or `object({ id = string })`.
    pub fn hcl(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Number => "number".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::Dynamic => "any".to_string(),
            AttributeType::List(inner) => format!("list({})", inner.hcl()),
            AttributeType::Set(inner) => format!("set({})", inner.hcl()),
            AttributeType::Map(inner) => format!("map({})", inner.hcl()),
            AttributeType::Object(fields) if fields.is_empty() => "object({})".to_string(),
            AttributeType::Object(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{} = {}", name, ty.hcl()))
                    .collect();
                format!("object({{ {} }})", fields.join(", "))
            }
            AttributeType::Tuple(items) => {
                let items: Vec<String> = items.iter().map(AttributeType::hcl).collect();
                format!("tuple([{}])", items.join(", "))
            }
        }
    }

    /// Object or tuple anywhere in the type.
    pub fn is_complex(&self) -> bool {
        match self {
            AttributeType::Object(_) | AttributeType::Tuple(_) => true,
            AttributeType::List(inner) | AttributeType::Set(inner) | AttributeType::Map(inner) => {
                inner.is_complex()
            }
            _ => false,
        }
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(name) => match name.as_str() {
                "string" => Ok(AttributeType::String),
                "number" => Ok(AttributeType::Number),
                "bool" => Ok(AttributeType::Bool),
                "dynamic" => Ok(AttributeType::Dynamic),
                other => Err(format!("unknown primitive type '{}'", other)),
            },
            Value::Array(parts) => {
                let kind = parts
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| "type expression must start with a kind".to_string())?;
                let arg = parts
                    .get(1)
                    .ok_or_else(|| format!("type '{}' is missing its element type", kind))?;
                match kind {
                    "list" => Ok(AttributeType::List(Box::new(Self::from_value(arg)?))),
                    "set" => Ok(AttributeType::Set(Box::new(Self::from_value(arg)?))),
                    "map" => Ok(AttributeType::Map(Box::new(Self::from_value(arg)?))),
                    "object" => {
                        let fields = arg
                            .as_object()
                            .ok_or_else(|| "object type needs a field map".to_string())?;
                        let mut out = BTreeMap::new();
                        for (name, ty) in fields {
                            out.insert(name.clone(), Self::from_value(ty)?);
                        }
                        Ok(AttributeType::Object(out))
                    }
                    "tuple" => {
                        let items = arg
                            .as_array()
                            .ok_or_else(|| "tuple type needs an element list".to_string())?;
                        let items = items
                            .iter()
                            .map(Self::from_value)
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(AttributeType::Tuple(items))
                    }
                    other => Err(format!("unknown type kind '{}'", other)),
                }
            }
            Value::Null => Ok(AttributeType::Dynamic),
            other => Err(format!("unsupported type expression: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        AttributeType::from_value(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_document() {
        let json = r#"{
            "format_version": "1.0",
            "provider_schemas": {
                "registry.terraform.io/hashicorp/aws": {
                    "provider": { "version": 0, "block": {} },
                    "resource_schemas": {
                        "aws_instance": {
                            "version": 1,
                            "block": {
                                "attributes": {
                                    "ami": { "type": "string", "required": true },
                                    "id": { "type": "string", "computed": true, "description": "Instance ID" },
                                    "tags": { "type": ["map", "string"], "optional": true }
                                },
                                "block_types": {
                                    "network_interface": {
                                        "nesting_mode": "set",
                                        "block": {
                                            "attributes": {
                                                "device_index": { "type": "number", "required": true }
                                            }
                                        },
                                        "min_items": 0
                                    }
                                }
                            }
                        }
                    },
                    "data_source_schemas": {}
                }
            }
        }"#;

        let schemas = ProviderSchemas::from_json(json).unwrap();
        let aws = &schemas.provider_schemas["registry.terraform.io/hashicorp/aws"];
        let instance = &aws.resource_schemas["aws_instance"];
        assert_eq!(instance.version, 1);

        let block = &instance.block;
        assert!(block.attributes["ami"].required);
        assert_eq!(block.attributes["id"].description(), Some("Instance ID"));
        assert_eq!(
            block.attributes["tags"].attr_type,
            AttributeType::Map(Box::new(AttributeType::String))
        );
        let nic = &block.block_types["network_interface"];
        assert_eq!(nic.nesting_mode, NestingMode::Set);
        assert!(nic.block.attributes.contains_key("device_index"));
    }

    #[test]
    fn test_type_rendering() {
        let ty: AttributeType = serde_json::from_str(
            r#"["list", ["object", {"name": "string", "port": "number"}]]"#,
        )
        .unwrap();
        assert_eq!(ty.label(), "list");
        assert_eq!(ty.hcl(), "list(object({ name = string, port = number }))");
        assert!(ty.is_complex());

        let tuple: AttributeType = serde_json::from_str(r#"["tuple", ["string", "bool"]]"#).unwrap();
        assert_eq!(tuple.hcl(), "tuple([string, bool])");

        let set: AttributeType = serde_json::from_str(r#"["set", "string"]"#).unwrap();
        assert_eq!(set.hcl(), "set(string)");
        assert!(!set.is_complex());
    }

    #[test]
    fn test_missing_type_is_dynamic() {
        let attr: Attribute = serde_json::from_str(r#"{ "optional": true }"#).unwrap();
        assert_eq!(attr.attr_type, AttributeType::Dynamic);
        assert_eq!(attr.attr_type.hcl(), "any");
        assert_eq!(attr.description(), None);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: serde_json::Result<AttributeType> = serde_json::from_str(r#"["matrix", "string"]"#);
        assert!(result.is_err());
        let result: serde_json::Result<AttributeType> = serde_json::from_str(r#"42"#);
        assert!(result.is_err());
    }
}
