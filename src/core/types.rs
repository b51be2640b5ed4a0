use std::fmt;
use serde::{Serialize, Deserialize};

use crate::errors::{Result, TranslationError};

// Well-known JDK class names
pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const BOOLEAN_BOXED: &str = "java.lang.Boolean";
pub const NUMBER: &str = "java.lang.Number";
pub const ENUM: &str = "java.lang.Enum";
pub const RECORD: &str = "java.lang.Record";
pub const ANNOTATION: &str = "java.lang.annotation.Annotation";
pub const COLLECTION: &str = "java.util.Collection";
pub const MAP: &str = "java.util.Map";
pub const OPTIONAL: &str = "java.util.Optional";
pub const OPTIONAL_INT: &str = "java.util.OptionalInt";
pub const OPTIONAL_LONG: &str = "java.util.OptionalLong";
pub const OPTIONAL_DOUBLE: &str = "java.util.OptionalDouble";

/// A type as declared in compiled class facts, possibly generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaType {
    /// Raw class or primitive, by fully-qualified name (`int`, `java.lang.String`)
    Basic(String),
    Array(Box<JavaType>),
    Parameterized {
        base: Box<JavaType>,
        arguments: Vec<JavaType>,
    },
    Variable(String),
    Wildcard {
        upper_bound: Option<Box<JavaType>>,
        lower_bound: Option<Box<JavaType>>,
    },
    /// Member class reached through a parameterized outer type (`Outer<A>.Inner`)
    InnerClass {
        outer: Box<JavaType>,
        name: String,
    },
}

impl JavaType {
    pub fn basic(name: impl Into<String>) -> Self {
        JavaType::Basic(name.into())
    }

    pub fn array(element: JavaType) -> Self {
        JavaType::Array(Box::new(element))
    }

    pub fn parameterized(base: JavaType, arguments: Vec<JavaType>) -> Self {
        debug_assert!(!arguments.is_empty(), "no arguments for generic type {}", base);
        JavaType::Parameterized {
            base: Box::new(base),
            arguments,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        JavaType::Variable(name.into())
    }

    pub fn unbounded() -> Self {
        JavaType::Wildcard {
            upper_bound: None,
            lower_bound: None,
        }
    }

    pub fn extending(bound: JavaType) -> Self {
        JavaType::Wildcard {
            upper_bound: Some(Box::new(bound)),
            lower_bound: None,
        }
    }

    pub fn with_super(bound: JavaType) -> Self {
        JavaType::Wildcard {
            upper_bound: None,
            lower_bound: Some(Box::new(bound)),
        }
    }

    pub fn inner_class(outer: JavaType, name: impl Into<String>) -> Self {
        JavaType::InnerClass {
            outer: Box::new(outer),
            name: name.into(),
        }
    }

    pub fn object() -> Self {
        JavaType::basic(OBJECT)
    }

    /// Substitutes every reachable variable bound in `env`.
    ///
    /// Lookup is a single step: a variable bound to another variable is not
    /// chased further here, the translator does that with its own cycle guard.
    pub fn resolve(&self, env: &TypeEnvironment) -> JavaType {
        match self {
            JavaType::Basic(_) => self.clone(),
            JavaType::Array(element) => JavaType::array(element.resolve(env)),
            JavaType::Parameterized { base, arguments } => JavaType::Parameterized {
                base: Box::new(base.resolve(env)),
                arguments: arguments.iter().map(|arg| arg.resolve(env)).collect(),
            },
            JavaType::Variable(name) => env.lookup(name).cloned().unwrap_or_else(|| self.clone()),
            JavaType::Wildcard { upper_bound, lower_bound } => JavaType::Wildcard {
                upper_bound: upper_bound.as_ref().map(|t| Box::new(t.resolve(env))),
                lower_bound: lower_bound.as_ref().map(|t| Box::new(t.resolve(env))),
            },
            JavaType::InnerClass { outer, name } => JavaType::InnerClass {
                outer: Box::new(outer.resolve(env)),
                name: name.clone(),
            },
        }
    }

    /// Name of the underlying class with all generic arguments erased.
    ///
    /// Variables, wildcards and arrays have no class of their own.
    pub fn non_generic_class_name(&self) -> Option<String> {
        match self {
            JavaType::Basic(name) => Some(name.clone()),
            JavaType::Parameterized { base, .. } => base.non_generic_class_name(),
            JavaType::InnerClass { outer, name } => outer
                .non_generic_class_name()
                .map(|outer| format!("{}${}", outer, name)),
            JavaType::Array(_) | JavaType::Variable(_) | JavaType::Wildcard { .. } => None,
        }
    }

    pub fn as_basic(&self) -> Option<&str> {
        match self {
            JavaType::Basic(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_basic(&self, name: &str) -> bool {
        self.as_basic() == Some(name)
    }

    pub fn is_void(&self) -> bool {
        self.is_basic("void")
    }

    pub fn is_primitive_integral(&self) -> bool {
        matches!(self.as_basic(), Some("byte" | "short" | "int" | "long"))
    }

    pub fn is_primitive_number(&self) -> bool {
        self.is_primitive_integral() || matches!(self.as_basic(), Some("float" | "double"))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.as_basic(),
            Some("byte" | "short" | "int" | "long" | "float" | "double" | "char" | "boolean" | "void")
        )
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Basic(name) => write!(f, "{}", name),
            JavaType::Array(element) => write!(f, "{}[]", element),
            JavaType::Parameterized { base, arguments } => {
                write!(f, "{}<", base)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            JavaType::Variable(name) => write!(f, "{}", name),
            JavaType::Wildcard { upper_bound, lower_bound } => {
                write!(f, "?")?;
                if let Some(upper) = upper_bound {
                    write!(f, " extends {}", upper)?;
                }
                if let Some(lower) = lower_bound {
                    write!(f, " super {}", lower)?;
                }
                Ok(())
            }
            JavaType::InnerClass { outer, name } => write!(f, "{}.{}", outer, name),
        }
    }
}

/// Package part of a fully-qualified class name, empty for the default package.
pub fn package_name_of(class_name: &str) -> &str {
    class_name.rfind('.').map(|i| &class_name[..i]).unwrap_or("")
}

/// Declared type variables of one class or method, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    variables: Vec<(String, Vec<JavaType>)>,
}

impl TypeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: impl Into<String>) -> Result<()> {
        let variable = variable.into();
        if self.contains(&variable) {
            return Err(TranslationError::DuplicateTypeVariable(variable));
        }
        self.variables.push((variable, Vec::new()));
        Ok(())
    }

    pub fn add_bound(&mut self, variable: &str, bound: JavaType) -> Result<()> {
        match self.variables.iter_mut().find(|(name, _)| name == variable) {
            Some((_, bounds)) => {
                bounds.push(bound);
                Ok(())
            }
            None => Err(TranslationError::UnknownTypeVariable(variable.to_string())),
        }
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.variables.iter().any(|(name, _)| name == variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn bounds(&self, variable: &str) -> &[JavaType] {
        self.variables
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, bounds)| bounds.as_slice())
            .unwrap_or(&[])
    }

    /// Only the first declared bound is used; `Object` when there are none.
    pub fn effective_bound(&self, variable: &str) -> JavaType {
        self.bounds(variable).first().cloned().unwrap_or_else(JavaType::object)
    }

    /// Binds declared variables to actual arguments, positionally.
    ///
    /// A raw use (no arguments) binds nothing.
    pub fn apply(&self, arguments: &[JavaType]) -> Result<TypeEnvironment> {
        if arguments.is_empty() {
            return Ok(TypeEnvironment::empty());
        }
        if arguments.len() != self.variables.len() {
            return Err(TranslationError::SchemaArity {
                expected: self.variables.len(),
                found: arguments.len(),
            });
        }

        Ok(TypeEnvironment::new(
            self.variables()
                .zip(arguments)
                .map(|(name, arg)| (name.to_string(), arg.clone()))
                .collect(),
        ))
    }
}

/// Bindings from type variables to types.
///
/// Generic arities are small, so an ordered association list beats a map here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEnvironment {
    bindings: Vec<(String, JavaType)>,
}

impl TypeEnvironment {
    /// Builds an environment, dropping identity bindings (`T = T`).
    ///
    /// Such a binding means the name is reused from an ancestor schema. The
    /// ancestor's binding already points at the right target and keeping
    /// `T = T` would make resolution cycle.
    pub fn new(bindings: Vec<(String, JavaType)>) -> Self {
        let bindings = bindings
            .into_iter()
            .filter(|(name, ty)| !matches!(ty, JavaType::Variable(v) if v == name))
            .collect();
        Self { bindings }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Environment of a member: the enclosing schema's variables first, then the member's own,
    /// each bound to its effective bound.
    pub fn from_schemas(parent: &TypeSchema, child: &TypeSchema) -> Self {
        let bindings = [parent, child]
            .iter()
            .flat_map(|schema| {
                schema
                    .variables()
                    .map(move |v| (v.to_string(), schema.effective_bound(v)))
            })
            .collect();
        Self::new(bindings)
    }

    /// First binding for `variable` wins.
    pub fn lookup(&self, variable: &str) -> Option<&JavaType> {
        self.bindings
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, ty)| ty)
    }

    /// Adds a binding behind the existing ones. Unlike [`TypeEnvironment::new`] this keeps
    /// identity bindings, which the translator reports as modeling errors.
    pub fn bind(&mut self, variable: impl Into<String>, ty: JavaType) {
        self.bindings.push((variable.into(), ty));
    }

    /// Appends `other`'s bindings behind this environment's own.
    pub fn merge(mut self, other: &TypeEnvironment) -> Self {
        self.bindings.extend(other.bindings.iter().cloned());
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for TypeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, ty)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, ty)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(arg: JavaType) -> JavaType {
        JavaType::parameterized(JavaType::basic("java.util.List"), vec![arg])
    }

    #[test]
    fn test_resolve_substitutes_nested_variables() {
        let mut env = TypeEnvironment::empty();
        env.bind("T", JavaType::basic(STRING));

        let ty = JavaType::array(list_of(JavaType::extending(JavaType::variable("T"))));
        let resolved = ty.resolve(&env);

        assert_eq!(
            resolved,
            JavaType::array(list_of(JavaType::extending(JavaType::basic(STRING))))
        );
    }

    #[test]
    fn test_unbound_variable_resolves_to_itself() {
        let ty = JavaType::variable("U");
        assert_eq!(ty.resolve(&TypeEnvironment::empty()), ty);
    }

    #[test]
    fn test_display() {
        let ty = JavaType::parameterized(
            JavaType::basic("java.util.Map"),
            vec![JavaType::basic(STRING), JavaType::array(JavaType::basic("int"))],
        );
        assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, int[]>");
        assert_eq!(JavaType::with_super(JavaType::variable("T")).to_string(), "? super T");
        assert_eq!(JavaType::unbounded().to_string(), "?");
    }

    #[test]
    fn test_non_generic_class_name() {
        let inner = JavaType::inner_class(list_of(JavaType::variable("T")), "Node");
        assert_eq!(inner.non_generic_class_name().as_deref(), Some("java.util.List$Node"));
        assert_eq!(list_of(JavaType::basic(STRING)).non_generic_class_name().as_deref(), Some("java.util.List"));
        assert_eq!(JavaType::variable("T").non_generic_class_name(), None);
    }

    #[test]
    fn test_schema_rejects_duplicate_variable() {
        let mut schema = TypeSchema::new();
        schema.add("T").unwrap();
        assert!(matches!(schema.add("T"), Err(TranslationError::DuplicateTypeVariable(_))));
    }

    #[test]
    fn test_schema_keeps_first_bound() {
        let mut schema = TypeSchema::new();
        schema.add("T").unwrap();
        schema.add_bound("T", JavaType::basic(NUMBER)).unwrap();
        schema.add_bound("T", JavaType::basic("java.lang.Comparable")).unwrap();
        schema.add("U").unwrap();

        assert_eq!(schema.effective_bound("T"), JavaType::basic(NUMBER));
        assert_eq!(schema.effective_bound("U"), JavaType::object());
        assert_eq!(schema.bounds("T").len(), 2);
    }

    #[test]
    fn test_schema_apply() {
        let mut schema = TypeSchema::new();
        schema.add("K").unwrap();
        schema.add("V").unwrap();

        let env = schema
            .apply(&[JavaType::basic(STRING), JavaType::basic("int")])
            .unwrap();
        assert_eq!(env.lookup("V"), Some(&JavaType::basic("int")));

        assert!(schema.apply(&[]).unwrap().is_empty());
        assert!(matches!(
            schema.apply(&[JavaType::basic(STRING)]),
            Err(TranslationError::SchemaArity { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_environment_drops_self_binding() {
        let mut parent = TypeSchema::new();
        parent.add("T").unwrap();
        let mut child = TypeSchema::new();
        child.add("U").unwrap();
        child.add_bound("U", JavaType::variable("T")).unwrap();

        let env = TypeEnvironment::from_schemas(&parent, &child);
        assert_eq!(env.lookup("T"), Some(&JavaType::object()));
        assert_eq!(env.lookup("U"), Some(&JavaType::variable("T")));

        let env = TypeEnvironment::new(vec![("T".to_string(), JavaType::variable("T"))]);
        assert!(env.is_empty());
    }

    #[test]
    fn test_environment_first_binding_wins() {
        let mut env = TypeEnvironment::empty();
        env.bind("T", JavaType::basic(STRING));
        let mut other = TypeEnvironment::empty();
        other.bind("T", JavaType::basic("int"));
        other.bind("U", JavaType::basic("long"));

        let merged = env.merge(&other);
        assert_eq!(merged.lookup("T"), Some(&JavaType::basic(STRING)));
        assert_eq!(merged.lookup("U"), Some(&JavaType::basic("long")));
        assert_eq!(merged.to_string(), "{T=java.lang.String, T=int, U=long}");
    }

    fn arb_java_type() -> impl Strategy<Value = JavaType> {
        let leaf = prop_oneof![
            "[a-z]{1,6}(\\.[A-Z][a-z]{0,5})?".prop_map(JavaType::Basic),
            "[A-Z]".prop_map(JavaType::Variable),
        ];
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(JavaType::array),
                (inner.clone(), prop::collection::vec(inner.clone(), 1..3))
                    .prop_map(|(base, args)| JavaType::parameterized(base, args)),
                (proptest::option::of(inner.clone()), proptest::option::of(inner.clone())).prop_map(
                    |(upper, lower)| JavaType::Wildcard {
                        upper_bound: upper.map(Box::new),
                        lower_bound: lower.map(Box::new),
                    }
                ),
                (inner, "[A-Z][a-z]{0,4}").prop_map(|(outer, name)| JavaType::inner_class(outer, name)),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_empty_environment_is_identity(ty in arb_java_type()) {
            prop_assert_eq!(ty.resolve(&TypeEnvironment::empty()), ty);
        }

        #[test]
        fn prop_resolve_is_idempotent_for_closed_bindings(ty in arb_java_type()) {
            let mut env = TypeEnvironment::empty();
            for v in ["A", "B", "T"] {
                env.bind(v, JavaType::basic(STRING));
            }
            let once = ty.resolve(&env);
            prop_assert_eq!(once.resolve(&env), once);
        }
    }
}
