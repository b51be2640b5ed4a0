use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::core::types::{self, JavaType, TypeEnvironment};
use crate::errors::Result;
use crate::model::class::JavaClass;
use crate::model::jdk;

/// Source of class facts, looked up by fully-qualified name.
pub trait ClassDataLoader {
    fn load_class(&self, name: &str) -> Option<&JavaClass>;

    /// Every loadable class name, in a stable order.
    fn class_names(&self) -> Vec<&str>;
}

/// In-memory class facts, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct ClassCollection {
    classes: BTreeMap<String, JavaClass>,
    duplicates: Vec<String>,
}

impl ClassCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. The first definition of a name wins, later ones are recorded as duplicates.
    pub fn add(&mut self, class: JavaClass) {
        let name = class.name().to_string();
        if self.classes.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.classes.insert(name, class);
        }
    }

    pub fn with_class(mut self, class: JavaClass) -> Self {
        self.add(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn duplicate_class_names(&self) -> &[String] {
        &self.duplicates
    }
}

impl ClassDataLoader for ClassCollection {
    fn load_class(&self, name: &str) -> Option<&JavaClass> {
        self.classes.get(name)
    }

    fn class_names(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }
}

impl FromIterator<JavaClass> for ClassCollection {
    fn from_iter<I: IntoIterator<Item = JavaClass>>(iter: I) -> Self {
        let mut collection = ClassCollection::new();
        for class in iter {
            collection.add(class);
        }
        collection
    }
}

/// A class seen through the generic arguments it was reached with.
#[derive(Debug, Clone)]
pub struct BoundClass<'a> {
    pub class: &'a JavaClass,
    pub environment: TypeEnvironment,
}

impl<'a> BoundClass<'a> {
    pub fn new(class: &'a JavaClass, environment: TypeEnvironment) -> Self {
        Self { class, environment }
    }

    pub fn unbound(class: &'a JavaClass) -> Self {
        Self::new(class, TypeEnvironment::empty())
    }
}

/// Hierarchy queries over loaded classes.
pub struct JavaModel {
    loader: Box<dyn ClassDataLoader>,
}

impl JavaModel {
    pub fn new(loader: impl ClassDataLoader + 'static) -> Self {
        Self { loader: Box::new(loader) }
    }

    pub fn find_class(&self, name: &str) -> Option<&JavaClass> {
        self.loader.load_class(name)
    }

    pub fn find_class_for_type(&self, ty: &JavaType) -> Option<&JavaClass> {
        self.find_class(&ty.non_generic_class_name()?)
    }

    pub fn class_count(&self) -> usize {
        self.loader.class_names().len()
    }

    pub fn find_classes(&self, predicate: impl Fn(&str) -> bool) -> Vec<&JavaClass> {
        self.loader
            .class_names()
            .into_iter()
            .filter(|name| predicate(name))
            .filter_map(|name| self.loader.load_class(name))
            .collect()
    }

    /// Whether `ty` is `target` or a subtype of it.
    ///
    /// Loaded classes are followed through their declared supertypes, other
    /// names through the built-in JDK table. A wildcard answers for its upper bound.
    pub fn is_instance_of(&self, ty: &JavaType, target: &str) -> bool {
        if let JavaType::Wildcard { upper_bound, .. } = ty {
            return upper_bound.as_ref().is_some_and(|upper| self.is_instance_of(upper, target));
        }
        let Some(name) = ty.non_generic_class_name() else {
            return false;
        };

        let mut visited = HashSet::new();
        let mut pending = vec![name];
        while let Some(name) = pending.pop() {
            if name == target {
                return true;
            }
            if !visited.insert(name.clone()) {
                continue;
            }

            if let Some(class) = self.find_class(&name) {
                pending.extend(class.superclass.iter().filter_map(|s| s.non_generic_class_name()));
                pending.extend(class.interfaces.iter().filter_map(|i| i.non_generic_class_name()));
            } else if let Some(supertypes) = jdk::supertypes(&name) {
                pending.extend(supertypes.iter().map(|s| s.to_string()));
            }
        }
        false
    }

    pub fn is_integral(&self, ty: &JavaType) -> bool {
        ty.is_primitive_integral()
            || INTEGRAL_CLASSES.iter().any(|class| self.is_instance_of(ty, class))
    }

    pub fn is_number(&self, ty: &JavaType) -> bool {
        ty.is_primitive_number() || self.is_instance_of(ty, types::NUMBER)
    }

    /// The class and everything above it, each visited once by name.
    ///
    /// Order: the class, its interfaces depth-first, then the same for the
    /// superclass and so on up the chain. Each level's environment comes from
    /// applying the arguments it was reached with to its own schema. Classes
    /// that are not loaded are skipped.
    pub fn classes_upwards_from<'a>(&'a self, start: BoundClass<'a>) -> Result<Vec<BoundClass<'a>>> {
        let mut result: Vec<BoundClass<'a>> = Vec::new();

        let mut current = Some(start);
        while let Some(bound) = current {
            let superclass = bound.class.superclass.clone();
            let environment = bound.environment.clone();

            self.collect_with_interfaces(bound, &mut result)?;

            current = match superclass {
                Some(superclass) => self.bound_class_for(&superclass, &environment)?,
                None => None,
            };
        }

        debug!(count = result.len(), "Collected class hierarchy");
        Ok(result)
    }

    fn collect_with_interfaces<'a>(&'a self, bound: BoundClass<'a>, result: &mut Vec<BoundClass<'a>>) -> Result<()> {
        if result.iter().any(|b| b.class.name() == bound.class.name()) {
            return Ok(());
        }

        let class = bound.class;
        let environment = bound.environment.clone();
        result.push(bound);

        for interface in &class.interfaces {
            if let Some(next) = self.bound_class_for(interface, &environment)? {
                self.collect_with_interfaces(next, result)?;
            }
        }
        Ok(())
    }

    /// The loaded class behind `ty`, bound to `ty`'s arguments as resolved in `env`.
    pub fn bound_class_for<'a>(&'a self, ty: &JavaType, env: &TypeEnvironment) -> Result<Option<BoundClass<'a>>> {
        let Some(class) = self.find_class_for_type(ty) else {
            return Ok(None);
        };

        let environment = match ty {
            JavaType::Parameterized { arguments, .. } => {
                let resolved: Vec<JavaType> = arguments.iter().map(|a| a.resolve(env)).collect();
                class.schema.apply(&resolved)?
            }
            _ => TypeEnvironment::empty(),
        };
        Ok(Some(BoundClass::new(class, environment)))
    }

    /// Loaded classes in the same package whose direct superclass is `class`, by name.
    pub fn find_direct_subclasses_in_same_package(&self, class: &JavaClass) -> Vec<&JavaClass> {
        let package = class.package_name();
        self.find_classes(|name| types::package_name_of(name) == package)
            .into_iter()
            .filter(|c| {
                c.superclass
                    .as_ref()
                    .and_then(|s| s.non_generic_class_name())
                    .is_some_and(|s| s == class.name())
            })
            .collect()
    }
}

const INTEGRAL_CLASSES: &[&str] = &[
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.math.BigInteger",
    "java.util.concurrent.atomic.AtomicInteger",
    "java.util.concurrent.atomic.AtomicLong",
];
