//! Reader for JVM type descriptors and generic signatures
//!
//! Parsing is two-phase. The reader walks the signature once and records every
//! production as a node in a [`TypeArena`], addressed by [`NodeId`]. Only after
//! the whole signature has been visited are the nodes materialized into
//! [`JavaType`]s. Bounds of type parameters can mention sibling parameters that
//! are declared later (`<T:Ljava/lang/Comparable<TU;>;U:Ljava/lang/Object;>`),
//! so schemas are assembled from the arena rather than while reading.

use crate::core::types::{JavaType, TypeSchema};
use crate::errors::{Result, TranslationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum Node {
    Basic(String),
    Array(NodeId),
    Parameterized { base: NodeId, arguments: Vec<NodeId> },
    Variable(String),
    Wildcard { upper: Option<NodeId>, lower: Option<NodeId> },
    InnerClass { outer: NodeId, name: String },
}

/// Unresolved type nodes produced while reading one signature.
#[derive(Debug, Default)]
pub struct TypeArena {
    nodes: Vec<Node>,
}

impl TypeArena {
    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Second pass: builds the final type for a handle.
    pub fn materialize(&self, id: NodeId) -> JavaType {
        match &self.nodes[id.0] {
            Node::Basic(name) => JavaType::Basic(name.clone()),
            Node::Array(element) => JavaType::array(self.materialize(*element)),
            Node::Parameterized { base, arguments } => JavaType::Parameterized {
                base: Box::new(self.materialize(*base)),
                arguments: arguments.iter().map(|a| self.materialize(*a)).collect(),
            },
            Node::Variable(name) => JavaType::Variable(name.clone()),
            Node::Wildcard { upper, lower } => JavaType::Wildcard {
                upper_bound: upper.map(|u| Box::new(self.materialize(u))),
                lower_bound: lower.map(|l| Box::new(self.materialize(l))),
            },
            Node::InnerClass { outer, name } => JavaType::inner_class(self.materialize(*outer), name.clone()),
        }
    }
}

/// Formal type parameters as read, before materialization.
#[derive(Debug, Default)]
struct PendingSchema {
    parameters: Vec<(String, Vec<NodeId>)>,
}

impl PendingSchema {
    fn build(self, arena: &TypeArena) -> Result<TypeSchema> {
        let mut schema = TypeSchema::new();
        for (name, _) in &self.parameters {
            schema.add(name.clone())?;
        }
        for (name, bounds) in &self.parameters {
            for bound in bounds {
                schema.add_bound(name, arena.materialize(*bound))?;
            }
        }
        Ok(schema)
    }
}

/// Generic view of a class: its own type parameters and direct supertypes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSignature {
    pub schema: TypeSchema,
    pub superclass: JavaType,
    pub interfaces: Vec<JavaType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub return_type: JavaType,
    pub parameter_types: Vec<JavaType>,
    pub schema: TypeSchema,
}

impl MethodSignature {
    pub fn argument_count(&self) -> usize {
        self.parameter_types.len()
    }
}

struct SignatureReader<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    arena: TypeArena,
}

impl<'a> SignatureReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            arena: TypeArena::default(),
        }
    }

    fn error(&self, message: impl Into<String>) -> TranslationError {
        TranslationError::malformed(self.input, self.pos, message)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<u8> {
        let c = self.peek().ok_or_else(|| self.error("unexpected end of signature"))?;
        self.pos += 1;
        Ok(c)
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let c = self.next()?;
        if c != expected {
            self.pos -= 1;
            return Err(self.error(format!("expected '{}', found '{}'", expected as char, c as char)));
        }
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    /// Reads up to (not including) any of the terminators.
    fn identifier(&mut self, terminators: &[u8]) -> Result<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        let input = self.input;
        Ok(&input[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<PendingSchema> {
        let mut pending = PendingSchema::default();
        if self.peek() != Some(b'<') {
            return Ok(pending);
        }
        self.pos += 1;

        while self.peek() != Some(b'>') {
            let name = self.identifier(b":")?.to_string();
            let mut bounds = Vec::new();

            // Class bound may be empty (`T::Ljava/lang/Comparable;`), interface bounds may not.
            self.expect(b':')?;
            if !matches!(self.peek(), Some(b':') | Some(b'>')) {
                bounds.push(self.reference_type()?);
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                bounds.push(self.reference_type()?);
            }

            pending.parameters.push((name, bounds));
        }
        self.expect(b'>')?;

        if pending.parameters.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(pending)
    }

    fn java_type(&mut self) -> Result<NodeId> {
        match self.peek() {
            Some(b'L') | Some(b'T') | Some(b'[') => self.reference_type(),
            Some(c) => {
                let name = primitive_name(c).ok_or_else(|| self.error(format!("unknown type code '{}'", c as char)))?;
                self.pos += 1;
                Ok(self.arena.alloc(Node::Basic(name.to_string())))
            }
            None => Err(self.error("unexpected end of signature")),
        }
    }

    fn reference_type(&mut self) -> Result<NodeId> {
        match self.next()? {
            b'L' => self.class_type(),
            b'T' => {
                let name = self.identifier(b";")?.to_string();
                self.expect(b';')?;
                Ok(self.arena.alloc(Node::Variable(name)))
            }
            b'[' => {
                let element = self.java_type()?;
                Ok(self.arena.alloc(Node::Array(element)))
            }
            c => {
                self.pos -= 1;
                Err(self.error(format!("expected reference type, found '{}'", c as char)))
            }
        }
    }

    /// Reads a class type after its leading `L`, through the closing `;`.
    fn class_type(&mut self) -> Result<NodeId> {
        let internal_name = self.identifier(b"<.;")?;
        let base = self.arena.alloc(Node::Basic(internal_name.replace('/', ".")));
        let mut current = self.with_type_arguments(base)?;

        while self.peek() == Some(b'.') {
            self.pos += 1;
            let name = self.identifier(b"<.;")?.to_string();
            let inner = self.arena.alloc(Node::InnerClass { outer: current, name });
            current = self.with_type_arguments(inner)?;
        }

        self.expect(b';')?;
        Ok(current)
    }

    fn with_type_arguments(&mut self, base: NodeId) -> Result<NodeId> {
        if self.peek() != Some(b'<') {
            return Ok(base);
        }
        self.pos += 1;

        let mut arguments = Vec::new();
        while self.peek() != Some(b'>') {
            let argument = match self.next()? {
                b'*' => self.arena.alloc(Node::Wildcard { upper: None, lower: None }),
                b'+' => {
                    let bound = self.reference_type()?;
                    self.arena.alloc(Node::Wildcard { upper: Some(bound), lower: None })
                }
                b'-' => {
                    let bound = self.reference_type()?;
                    self.arena.alloc(Node::Wildcard { upper: None, lower: Some(bound) })
                }
                _ => {
                    self.pos -= 1;
                    self.reference_type()?
                }
            };
            arguments.push(argument);
        }
        self.expect(b'>')?;

        if arguments.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(self.arena.alloc(Node::Parameterized { base, arguments }))
    }
}

fn primitive_name(code: u8) -> Option<&'static str> {
    Some(match code {
        b'B' => "byte",
        b'C' => "char",
        b'D' => "double",
        b'F' => "float",
        b'I' => "int",
        b'J' => "long",
        b'S' => "short",
        b'Z' => "boolean",
        b'V' => "void",
        _ => return None,
    })
}

/// Parses a non-generic field descriptor such as `I`, `[J` or `Ljava/lang/String;`.
pub fn parse_type_descriptor(descriptor: &str) -> Result<JavaType> {
    let mut reader = SignatureReader::new(descriptor);
    let id = reader.java_type()?;
    reader.finish()?;

    let ty = reader.arena.materialize(id);
    if contains_generics(&ty) {
        return Err(TranslationError::malformed(descriptor, 0, "descriptor contains generic information"));
    }
    Ok(ty)
}

/// Converts an internal name (`java/util/Map$Entry`) to a class type.
pub fn parse_object_type(internal_name: &str) -> JavaType {
    if internal_name.starts_with('[') {
        if let Ok(ty) = parse_type_descriptor(internal_name) {
            return ty;
        }
    }
    JavaType::Basic(internal_name.replace('/', "."))
}

/// Parses a field signature (the `Signature` attribute of a field).
pub fn parse_generic_type(signature: &str) -> Result<JavaType> {
    let mut reader = SignatureReader::new(signature);
    let id = reader.java_type()?;
    reader.finish()?;
    Ok(reader.arena.materialize(id))
}

/// Generic signature when the class file carries one, the plain descriptor otherwise.
pub fn parse_java_type(descriptor: &str, signature: Option<&str>) -> Result<JavaType> {
    match signature {
        Some(signature) => parse_generic_type(signature),
        None => parse_type_descriptor(descriptor),
    }
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    let mut reader = SignatureReader::new(signature);
    let pending = reader.type_parameters()?;

    let superclass = reader.reference_type()?;
    let mut interfaces = Vec::new();
    while !reader.at_end() {
        interfaces.push(reader.reference_type()?);
    }

    let arena = reader.arena;
    Ok(ClassSignature {
        schema: pending.build(&arena)?,
        superclass: arena.materialize(superclass),
        interfaces: interfaces.into_iter().map(|i| arena.materialize(i)).collect(),
    })
}

/// Parses a non-generic method descriptor. The resulting schema is always empty.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodSignature> {
    let signature = parse_generic_method_signature(descriptor)?;
    if !signature.schema.is_empty() {
        return Err(TranslationError::malformed(descriptor, 0, "descriptor declares type parameters"));
    }
    Ok(signature)
}

pub fn parse_generic_method_signature(signature: &str) -> Result<MethodSignature> {
    let mut reader = SignatureReader::new(signature);
    let pending = reader.type_parameters()?;

    reader.expect(b'(')?;
    let mut parameters = Vec::new();
    while reader.peek() != Some(b')') {
        parameters.push(reader.java_type()?);
    }
    reader.expect(b')')?;

    let return_type = reader.java_type()?;

    // Thrown types do not contribute to the API, but must still be well-formed.
    while reader.peek() == Some(b'^') {
        reader.pos += 1;
        reader.reference_type()?;
    }
    reader.finish()?;

    let arena = reader.arena;
    Ok(MethodSignature {
        return_type: arena.materialize(return_type),
        parameter_types: parameters.into_iter().map(|p| arena.materialize(p)).collect(),
        schema: pending.build(&arena)?,
    })
}

/// Parses a method's types, preferring the generic signature when present.
///
/// Some compilers omit the implicit outer-instance argument of inner class
/// constructors from the generic signature while keeping it in the descriptor.
/// When the counts differ by exactly one, the missing leading argument is taken
/// from the descriptor.
pub fn parse_method_signature(descriptor: &str, signature: Option<&str>) -> Result<MethodSignature> {
    let legacy = parse_method_descriptor(descriptor)?;
    let Some(signature) = signature else {
        return Ok(legacy);
    };

    let mut generic = parse_generic_method_signature(signature)?;
    if legacy.argument_count() == generic.argument_count() + 1 {
        generic.parameter_types.insert(0, legacy.parameter_types[0].clone());
    } else if legacy.argument_count() != generic.argument_count() {
        return Err(TranslationError::malformed(
            signature,
            0,
            format!(
                "signature has {} arguments but descriptor {} has {}",
                generic.argument_count(),
                descriptor,
                legacy.argument_count()
            ),
        ));
    }
    Ok(generic)
}

fn contains_generics(ty: &JavaType) -> bool {
    match ty {
        JavaType::Basic(_) => false,
        JavaType::Array(element) => contains_generics(element),
        _ => true,
    }
}
