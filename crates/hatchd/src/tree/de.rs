//! Serde support for declaring trees as nested maps.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use super::{CommandNode, TreeShape};

impl<'de> Deserialize<'de> for TreeShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ShapeVisitor)
    }
}

struct ShapeVisitor;

impl<'de> Visitor<'de> for ShapeVisitor {
    type Value = TreeShape;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of command names to nodes")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        Ok(TreeShape {
            nodes: read_children(map)?,
        })
    }
}

fn read_children<'de, A>(mut map: A) -> Result<Vec<CommandNode>, A::Error>
where
    A: MapAccess<'de>,
{
    let mut nodes = Vec::new();
    while let Some((name, body)) = map.next_entry::<String, NodeBody>()? {
        let mut node = CommandNode::new(name);
        match body {
            NodeBody::Leaf(description) => node.description = description,
            NodeBody::Group(children) => node.children = children,
        }
        nodes.push(node);
    }
    Ok(nodes)
}

/// Value side of a map entry.
enum NodeBody {
    Leaf(Option<String>),
    Group(Vec<CommandNode>),
}

impl<'de> Deserialize<'de> for NodeBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeBodyVisitor)
    }
}

struct NodeBodyVisitor;

impl<'de> Visitor<'de> for NodeBodyVisitor {
    type Value = NodeBody;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("null, a description string, or a map of child nodes")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(NodeBody::Leaf(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(NodeBody::Leaf(None))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Self)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(NodeBody::Leaf(Some(value.to_owned())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(NodeBody::Leaf(Some(value)))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let children = read_children(map)?;
        if children.is_empty() {
            Ok(NodeBody::Leaf(None))
        } else {
            Ok(NodeBody::Group(children))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_nested_json_in_order() {
        let shape: TreeShape = serde_json::from_str(
            r#"{
                "Status": null,
                "Echo": "repeat the arguments back",
                "Config": { "Show": null, "Filter": {} }
            }"#,
        )
        .expect("parse shape");

        let expected = TreeShape::new()
            .leaf("Status")
            .node(CommandNode::new("Echo").describe("repeat the arguments back"))
            .node(CommandNode::new("Config").leaf("Show").leaf("Filter"));
        assert_eq!(shape, expected);
    }

    #[test]
    fn rejects_non_map_root() {
        let result = serde_json::from_str::<TreeShape>("[\"Status\"]");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_numeric_node_body() {
        let result = serde_json::from_str::<TreeShape>(r#"{"Status": 3}"#);
        let error = result.expect_err("numbers are not node bodies");
        assert!(error.to_string().contains("description string"));
    }
}
