use crate::error::TidyError;
use crate::tree::{Node, NodeKind};

/// Converts an in-memory `serde_json::Value` into the document tree.
///
/// `recursion_limit` bounds the depth; exceeding it is reported as a
/// suspected circular reference rather than blowing the stack.
pub fn tree_from_value(
    value: &serde_json::Value,
    prop_name: Option<&str>,
    recursion_limit: usize,
) -> Result<Node, TidyError> {
    if recursion_limit == 0 {
        return Err(TidyError::new(
            "Depth limit exceeded - possible circular reference",
        ));
    }

    let mut node = Node::default();
    if let Some(name) = prop_name {
        node.name = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""));
    }

    match value {
        serde_json::Value::Null => {
            node.kind = NodeKind::Null;
            node.value = "null".to_string();
        }
        serde_json::Value::Bool(true) => {
            node.kind = NodeKind::True;
            node.value = "true".to_string();
        }
        serde_json::Value::Bool(false) => {
            node.kind = NodeKind::False;
            node.value = "false".to_string();
        }
        serde_json::Value::Number(num) => {
            node.kind = NodeKind::Number;
            node.value = num.to_string();
        }
        serde_json::Value::String(text) => {
            node.kind = NodeKind::String;
            node.value = serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""));
        }
        serde_json::Value::Array(items) => {
            node.kind = NodeKind::Array;
            node.children = items
                .iter()
                .map(|child| tree_from_value(child, None, recursion_limit - 1))
                .collect::<Result<Vec<_>, _>>()?;
        }
        serde_json::Value::Object(map) => {
            node.kind = NodeKind::Object;
            node.children = map
                .iter()
                .map(|(key, child)| tree_from_value(child, Some(key), recursion_limit - 1))
                .collect::<Result<Vec<_>, _>>()?;
        }
    }

    if let Some(deepest) = node.children.iter().map(|ch| ch.complexity).max() {
        node.complexity = deepest + 1;
    }

    Ok(node)
}
