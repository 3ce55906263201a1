use super::{Node, NodeKind};
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal value held by a `Constant` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(b) => write!(f, "{}", b),
            ConstantValue::Int(i) => write!(f, "{}", i),
            ConstantValue::Float(x) => write!(f, "{:?}", x),
            ConstantValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::String(value.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(value: String) -> Self {
        ConstantValue::String(value)
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}

impl From<i64> for ConstantValue {
    fn from(value: i64) -> Self {
        ConstantValue::Int(value)
    }
}

/// Whether a block reference is a statement (`{% block %}` placement) or an
/// expression (`block('name')`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceForm {
    Statement,
    Expression,
}

impl fmt::Display for ReferenceForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceForm::Statement => write!(f, "statement"),
            ReferenceForm::Expression => write!(f, "expression"),
        }
    }
}

impl Node {
    pub fn constant(value: impl Into<ConstantValue>) -> Self {
        Node::new(
            NodeKind::Constant {
                value: value.into(),
            },
            Span::dummy(),
        )
    }

    pub fn name(name: impl Into<String>) -> Self {
        Node::new(
            NodeKind::Name {
                name: name.into(),
                always_defined: false,
            },
            Span::dummy(),
        )
    }

    pub fn assign_name(name: impl Into<String>) -> Self {
        Node::new(NodeKind::AssignName { name: name.into() }, Span::dummy())
    }

    /// `operand|filter_name(arguments...)`
    pub fn filter(operand: Node, filter_name: &str, arguments: Vec<Node>) -> Self {
        Node::new(NodeKind::Filter, Span::dummy())
            .with_child("node", operand)
            .with_child("filter", Node::constant(filter_name))
            .with_child("arguments", Node::nodes(arguments))
    }

    /// `base.attribute`, where `attribute` is usually a string constant
    pub fn attribute(base: Node, attribute: Node) -> Self {
        Node::new(NodeKind::AttributeAccess, Span::dummy())
            .with_child("node", base)
            .with_child("attribute", attribute)
    }

    /// Function call with named arguments, in call order
    pub fn call<I, S>(name: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        let mut args = Node::new(NodeKind::Nodes, Span::dummy());
        for (arg_name, value) in arguments {
            args.set_child(arg_name, value);
        }
        Node::new(NodeKind::FunctionCall { name: name.into() }, Span::dummy())
            .with_child("arguments", args)
    }

    pub fn block_reference(name: impl Into<String>, form: ReferenceForm) -> Self {
        Node::new(
            NodeKind::BlockReference {
                name: name.into(),
                form,
                output: false,
            },
            Span::dummy(),
        )
    }

    pub fn parent_call(name: impl Into<String>) -> Self {
        Node::new(
            NodeKind::ParentCall {
                name: name.into(),
                output: false,
            },
            Span::dummy(),
        )
    }

    pub fn binary(operator: impl Into<String>, left: Node, right: Node) -> Self {
        Node::new(
            NodeKind::Binary {
                operator: operator.into(),
            },
            Span::dummy(),
        )
        .with_child("left", left)
        .with_child("right", right)
    }
}
