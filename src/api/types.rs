use std::collections::BTreeSet;
use std::fmt;
use serde::Serialize;

/// Display name of a type in the API model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ApiTypeName(String);

impl ApiTypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ApiTypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Any,
    String,
    Boolean,
    Integer,
    Float,
    Void,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Any => "any",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Float => "float",
            PrimitiveType::Void => "void",
        };
        write!(f, "{}", name)
    }
}

/// Target-agnostic type of the generated client model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    Array(Box<ApiType>),
    /// Opaque type, supplied from outside or deliberately not elaborated
    BlackBox(ApiTypeName),
    Class(ApiTypeName),
    /// String-keyed map
    Dictionary(Box<ApiType>),
    Nullable(Box<ApiType>),
    Primitive(PrimitiveType),
}

impl ApiType {
    pub const ANY: ApiType = ApiType::Primitive(PrimitiveType::Any);
    pub const STRING: ApiType = ApiType::Primitive(PrimitiveType::String);
    pub const BOOLEAN: ApiType = ApiType::Primitive(PrimitiveType::Boolean);
    pub const INTEGER: ApiType = ApiType::Primitive(PrimitiveType::Integer);
    pub const FLOAT: ApiType = ApiType::Primitive(PrimitiveType::Float);
    pub const VOID: ApiType = ApiType::Primitive(PrimitiveType::Void);

    pub fn array(element: ApiType) -> Self {
        ApiType::Array(Box::new(element))
    }

    pub fn dictionary(value: ApiType) -> Self {
        ApiType::Dictionary(Box::new(value))
    }

    pub fn class(name: impl Into<String>) -> Self {
        ApiType::Class(ApiTypeName::new(name))
    }

    pub fn black_box(name: impl Into<String>) -> Self {
        ApiType::BlackBox(ApiTypeName::new(name))
    }

    /// Wraps in `Nullable` unless already nullable.
    pub fn nullable(self) -> Self {
        match self {
            ApiType::Nullable(_) => self,
            other => ApiType::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, ApiType::Nullable(_))
    }

    pub fn unwrap_nullable(&self) -> &ApiType {
        match self {
            ApiType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Names of all `Class` references reachable through wrappers.
    pub fn collect_class_references(&self, out: &mut BTreeSet<ApiTypeName>) {
        match self {
            ApiType::Class(name) => {
                out.insert(name.clone());
            }
            ApiType::Array(inner) | ApiType::Dictionary(inner) | ApiType::Nullable(inner) => {
                inner.collect_class_references(out)
            }
            ApiType::BlackBox(_) | ApiType::Primitive(_) => {}
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiType::Array(element) => write!(f, "{}[]", element),
            ApiType::BlackBox(name) | ApiType::Class(name) => write!(f, "{}", name),
            ApiType::Dictionary(value) => write!(f, "Dictionary<{}>", value),
            ApiType::Nullable(inner) => write!(f, "{} | null", inner),
            ApiType::Primitive(p) => write!(f, "{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display() {
        assert_eq!(ApiType::array(ApiType::STRING).to_string(), "string[]");
        assert_eq!(ApiType::dictionary(ApiType::class("Foo").nullable()).to_string(), "Dictionary<Foo | null>");
        assert_eq!(ApiType::black_box("Instant").to_string(), "Instant");
    }

    #[test]
    fn test_class_references_through_wrappers() {
        let ty = ApiType::dictionary(ApiType::array(ApiType::class("Foo")).nullable());
        let mut names = BTreeSet::new();
        ty.collect_class_references(&mut names);
        ApiType::black_box("Bar").collect_class_references(&mut names);

        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec![ApiTypeName::new("Foo")]);
    }

    fn arb_api_type() -> impl Strategy<Value = ApiType> {
        let leaf = prop_oneof![
            Just(ApiType::ANY),
            Just(ApiType::STRING),
            Just(ApiType::INTEGER),
            "[A-Z][a-z]{0,5}".prop_map(ApiType::class),
        ];
        leaf.prop_recursive(3, 12, 1, |inner| {
            prop_oneof![
                inner.clone().prop_map(ApiType::array),
                inner.clone().prop_map(ApiType::dictionary),
                inner.prop_map(ApiType::nullable),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_nullable_is_idempotent(ty in arb_api_type()) {
            let once = ty.nullable();
            prop_assert_eq!(once.clone().nullable(), once.clone());
            prop_assert!(!once.unwrap_nullable().is_nullable());
        }
    }
}
