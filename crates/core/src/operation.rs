use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::Guid;

/// Names an operation class and carries its JSON parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    pub class: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// An operation bound to concrete input and output entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInstance {
    pub guid: Guid,
    #[serde(default)]
    pub inputs: HashMap<String, Guid>,
    #[serde(default)]
    pub outputs: HashMap<String, Guid>,
    pub operation: OperationDescription,
}

impl OperationInstance {
    pub fn new(class: &str, data: serde_json::Value) -> Self {
        Self {
            guid: Guid::new_v4(),
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            operation: OperationDescription {
                class: class.to_string(),
                data,
            },
        }
    }

    pub fn with_input(mut self, name: &str, guid: Guid) -> Self {
        self.inputs.insert(name.to_string(), guid);
        self
    }

    pub fn with_output(mut self, name: &str, guid: Guid) -> Self {
        self.outputs.insert(name.to_string(), guid);
        self
    }
}
