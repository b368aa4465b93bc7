use serde_json::{json, Map, Value};

/// JSON Schema (`type: object`) for function-calling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameters(Value);

impl ToolParameters {
    pub fn as_value(&self) -> &Value { &self.0 }
    pub fn into_value(self) -> Value { self.0 }
}

/// Builder for `ToolParameters`.
#[derive(Debug, Default)]
pub struct ToolParametersBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
    additional_properties: Option<bool>,
}

impl ToolParametersBuilder {
    pub fn new_object() -> Self {
        Self::default()
    }

    pub fn add_string(mut self, name: &str, description: Option<&str>) -> Self {
        let mut prop = json!({ "type": "string" });
        if let Some(d) = description {
            prop["description"] = Value::from(d);
        }
        self.properties.insert(name.to_string(), prop);
        self
    }

    /// 列挙値のみ許可する文字列
    pub fn add_string_enum(mut self, name: &str, description: Option<&str>, variants: &[&str]) -> Self {
        let mut prop = json!({ "type": "string", "enum": variants });
        if let Some(d) = description {
            prop["description"] = Value::from(d);
        }
        self.properties.insert(name.to_string(), prop);
        self
    }

    pub fn required(mut self, name: &str) -> Self {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    pub fn build(self) -> ToolParameters {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties),
            "required": self.required,
        });
        if let Some(allowed) = self.additional_properties {
            schema["additionalProperties"] = Value::Bool(allowed);
        }
        ToolParameters(schema)
    }
}
