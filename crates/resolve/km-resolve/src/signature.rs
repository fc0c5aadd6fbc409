//! JVM signature computation
//!
//! Host declarations and descriptors are compared by a single string of the
//! form `name(params)return`, e.g. `put(Ljava/lang/String;J)V`. The host
//! side is derived from erased host types. The descriptor side uses the
//! recorded JVM signature when present and otherwise maps source types to
//! their JVM erasure.
//!
//! Enum constructors are special: the host never shows the implicit
//! `(String name, int ordinal)` parameters, but the descriptor side includes
//! them, so they are stripped from the descriptor signature before matching.

use crate::error::{ResolveError, ResolveResult};
use km_host::{DeclId, DeclKind, HostTree, JvmType};
use km_metadata::{
    Classifier, ConstructorDescriptor, FunctionDescriptor, FunctionFlags, JvmMethodSignature,
    MetadataError, PropertyDescriptor, StringTable, TypeParameterDescriptor, TypeRef,
};

/// JVM name of every constructor
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Implicit leading parameters of every enum constructor
pub const ENUM_CONSTRUCTOR_PREFIX: &str = "Ljava/lang/String;I";

/// Trailing parameter appended to suspend functions
pub const CONTINUATION_DESCRIPTOR: &str = "Lkotlin/coroutines/Continuation;";

const OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

/// Type parameters nested deeper than this erase to `Object`
const MAX_BOUND_DEPTH: usize = 16;

const PRIMITIVES: &[(&str, char, &str)] = &[
    ("kotlin/Boolean", 'Z', "java/lang/Boolean"),
    ("kotlin/Char", 'C', "java/lang/Character"),
    ("kotlin/Byte", 'B', "java/lang/Byte"),
    ("kotlin/Short", 'S', "java/lang/Short"),
    ("kotlin/Int", 'I', "java/lang/Integer"),
    ("kotlin/Float", 'F', "java/lang/Float"),
    ("kotlin/Long", 'J', "java/lang/Long"),
    ("kotlin/Double", 'D', "java/lang/Double"),
];

const PRIMITIVE_ARRAYS: &[(&str, char)] = &[
    ("kotlin/BooleanArray", 'Z'),
    ("kotlin/CharArray", 'C'),
    ("kotlin/ByteArray", 'B'),
    ("kotlin/ShortArray", 'S'),
    ("kotlin/IntArray", 'I'),
    ("kotlin/FloatArray", 'F'),
    ("kotlin/LongArray", 'J'),
    ("kotlin/DoubleArray", 'D'),
];

const MAPPED_CLASSES: &[(&str, &str)] = &[
    ("kotlin/Any", "java/lang/Object"),
    ("kotlin/String", "java/lang/String"),
    ("kotlin/CharSequence", "java/lang/CharSequence"),
    ("kotlin/Number", "java/lang/Number"),
    ("kotlin/Throwable", "java/lang/Throwable"),
    ("kotlin/Comparable", "java/lang/Comparable"),
    ("kotlin/Enum", "java/lang/Enum"),
    ("kotlin/Annotation", "java/lang/annotation/Annotation"),
    ("kotlin/Cloneable", "java/lang/Cloneable"),
    ("kotlin/Nothing", "java/lang/Void"),
    ("kotlin/collections/Iterable", "java/lang/Iterable"),
    ("kotlin/collections/MutableIterable", "java/lang/Iterable"),
    ("kotlin/collections/Iterator", "java/util/Iterator"),
    ("kotlin/collections/MutableIterator", "java/util/Iterator"),
    ("kotlin/collections/Collection", "java/util/Collection"),
    ("kotlin/collections/MutableCollection", "java/util/Collection"),
    ("kotlin/collections/List", "java/util/List"),
    ("kotlin/collections/MutableList", "java/util/List"),
    ("kotlin/collections/ListIterator", "java/util/ListIterator"),
    ("kotlin/collections/MutableListIterator", "java/util/ListIterator"),
    ("kotlin/collections/Set", "java/util/Set"),
    ("kotlin/collections/MutableSet", "java/util/Set"),
    ("kotlin/collections/Map", "java/util/Map"),
    ("kotlin/collections/MutableMap", "java/util/Map"),
    ("kotlin/collections/Map.Entry", "java/util/Map$Entry"),
    ("kotlin/collections/MutableMap.MutableEntry", "java/util/Map$Entry"),
];

/// Append the JVM descriptor of an erased host type
pub fn encode_jvm_type(ty: &JvmType, out: &mut String) {
    match ty {
        JvmType::Void => out.push('V'),
        JvmType::Boolean => out.push('Z'),
        JvmType::Byte => out.push('B'),
        JvmType::Char => out.push('C'),
        JvmType::Short => out.push('S'),
        JvmType::Int => out.push('I'),
        JvmType::Long => out.push('J'),
        JvmType::Float => out.push('F'),
        JvmType::Double => out.push('D'),
        JvmType::Object(name) => {
            out.push('L');
            out.push_str(name);
            out.push(';');
        }
        JvmType::Array(element) => {
            out.push('[');
            encode_jvm_type(element, out);
        }
        JvmType::TypeVariable { bound, .. } => encode_jvm_type(bound, out),
    }
}

/// JVM signature of a host method or constructor
pub fn host_signature<T: HostTree + ?Sized>(tree: &T, decl: DeclId) -> String {
    let is_constructor = tree.kind(decl) == DeclKind::Constructor;
    let mut out = String::from(if is_constructor {
        CONSTRUCTOR_NAME
    } else {
        tree.simple_name(decl)
    });
    out.push('(');
    for &param in tree.parameters(decl) {
        match tree.ty(param) {
            Some(ty) => encode_jvm_type(ty, &mut out),
            None => out.push_str(OBJECT_DESCRIPTOR),
        }
    }
    out.push(')');
    match tree.ty(decl) {
        Some(ty) if !is_constructor => encode_jvm_type(ty, &mut out),
        _ => out.push('V'),
    }
    out
}

/// Remove the implicit enum constructor parameters from a signature
///
/// The prefix must be present; its absence means the descriptor does not
/// describe an enum constructor at all.
pub fn strip_enum_constructor_prefix(owner: &str, signature: &str) -> ResolveResult<String> {
    signature
        .strip_prefix(CONSTRUCTOR_NAME)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_prefix(ENUM_CONSTRUCTOR_PREFIX))
        .map(|rest| format!("{CONSTRUCTOR_NAME}({rest}"))
        .ok_or_else(|| ResolveError::EnumConstructorPrefix {
            owner: owner.to_owned(),
            signature: signature.to_owned(),
        })
}

/// Render a recorded method signature as `name` + `desc`
pub fn recorded_signature(
    strings: &StringTable,
    signature: &JvmMethodSignature,
) -> Result<String, MetadataError> {
    let name = strings.get(signature.name)?;
    let desc = strings.get(signature.desc)?;
    Ok(format!("{name}{desc}"))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Position {
    /// Parameter or field; primitives stay unboxed
    Value,
    /// Return type; `Unit` becomes `V`
    Return,
    /// Type argument or array element; primitives are boxed
    Argument,
}

/// Computes descriptor-side signatures against one string table
///
/// Type parameters in scope are searched innermost first, so a function's
/// own type parameters shadow the class's.
#[derive(Clone, Debug)]
pub struct DescriptorEncoder<'meta> {
    strings: &'meta StringTable,
    scope: Vec<&'meta TypeParameterDescriptor>,
}

impl<'meta> DescriptorEncoder<'meta> {
    /// An encoder with no type parameters in scope
    pub fn new(strings: &'meta StringTable) -> Self {
        Self {
            strings,
            scope: Vec::new(),
        }
    }

    /// Bring `params` into scope
    #[must_use]
    pub fn with_type_parameters(&self, params: &'meta [TypeParameterDescriptor]) -> Self {
        let mut scope = self.scope.clone();
        scope.extend(params);
        Self {
            strings: self.strings,
            scope,
        }
    }

    /// JVM signature of a function
    pub fn function_signature(&self, function: &'meta FunctionDescriptor) -> Result<String, MetadataError> {
        if let Some(recorded) = &function.jvm_signature {
            return recorded_signature(self.strings, recorded);
        }

        let encoder = self.with_type_parameters(&function.type_parameters);
        let is_suspend = function.flags.contains(FunctionFlags::SUSPEND);
        let mut out = self.strings.get(function.name)?.to_owned();
        out.push('(');
        if let Some(receiver) = &function.receiver {
            encoder.encode(receiver, Position::Value, 0, &mut out)?;
        }
        for param in &function.value_parameters {
            encoder.encode(&param.ty, Position::Value, 0, &mut out)?;
        }
        if is_suspend {
            out.push_str(CONTINUATION_DESCRIPTOR);
        }
        out.push(')');
        if is_suspend {
            out.push_str(OBJECT_DESCRIPTOR);
        } else {
            encoder.encode(&function.return_type, Position::Return, 0, &mut out)?;
        }
        Ok(out)
    }

    /// JVM signature of a constructor, enum prefix stripped when `is_enum`
    pub fn constructor_signature(
        &self,
        owner: &str,
        ctor: &ConstructorDescriptor,
        is_enum: bool,
    ) -> ResolveResult<String> {
        let signature = match &ctor.jvm_signature {
            Some(recorded) => recorded_signature(self.strings, recorded)?,
            None => {
                let mut out = format!("{CONSTRUCTOR_NAME}(");
                if is_enum {
                    out.push_str(ENUM_CONSTRUCTOR_PREFIX);
                }
                for param in &ctor.value_parameters {
                    self.encode(&param.ty, Position::Value, 0, &mut out)?;
                }
                out.push_str(")V");
                out
            }
        };

        if is_enum {
            strip_enum_constructor_prefix(owner, &signature)
        } else {
            Ok(signature)
        }
    }

    /// Recorded getter, setter and annotation holder signatures of a property
    pub fn accessor_signatures(
        &self,
        property: &PropertyDescriptor,
    ) -> Result<[Option<String>; 3], MetadataError> {
        let render = |signature: &Option<JvmMethodSignature>| {
            signature
                .as_ref()
                .map(|signature| recorded_signature(self.strings, signature))
                .transpose()
        };
        Ok([
            render(&property.jvm.getter)?,
            render(&property.jvm.setter)?,
            render(&property.jvm.synthetic_method)?,
        ])
    }

    fn find_type_parameter(&self, id: u32) -> Option<&'meta TypeParameterDescriptor> {
        self.scope.iter().rev().find(|param| param.id == id).copied()
    }

    fn encode(
        &self,
        ty: &TypeRef,
        position: Position,
        depth: usize,
        out: &mut String,
    ) -> Result<(), MetadataError> {
        let name = match ty.classifier {
            Classifier::TypeParameter(id) => {
                let param = self
                    .find_type_parameter(id)
                    .ok_or(MetadataError::UnknownTypeParameter { id })?;
                return match param.upper_bounds.first() {
                    Some(bound) if depth < MAX_BOUND_DEPTH => {
                        self.encode(bound, Position::Argument, depth + 1, out)
                    }
                    _ => {
                        out.push_str(OBJECT_DESCRIPTOR);
                        Ok(())
                    }
                };
            }
            Classifier::Class(name) => self.strings.get(name)?,
        };

        if let Some(&(_, primitive, boxed)) = PRIMITIVES.iter().find(|(kt, ..)| *kt == name) {
            if position == Position::Argument || ty.nullable {
                push_reference(boxed, out);
            } else {
                out.push(primitive);
            }
            return Ok(());
        }

        if name == "kotlin/Unit" && position == Position::Return && !ty.nullable {
            out.push('V');
            return Ok(());
        }

        if let Some(&(_, element)) = PRIMITIVE_ARRAYS.iter().find(|(kt, _)| *kt == name) {
            out.push('[');
            out.push(element);
            return Ok(());
        }

        if name == "kotlin/Array" {
            out.push('[');
            return match ty.arguments.first().and_then(|arg| arg.ty.as_ref()) {
                Some(element) => self.encode(element, Position::Argument, depth, out),
                None => {
                    out.push_str(OBJECT_DESCRIPTOR);
                    Ok(())
                }
            };
        }

        push_reference(&jvm_class_name(name), out);
        Ok(())
    }
}

fn push_reference(internal_name: &str, out: &mut String) {
    out.push('L');
    out.push_str(internal_name);
    out.push(';');
}

/// JVM internal name of a source class name (`a/b/Outer.Inner` -> `a/b/Outer$Inner`)
pub fn jvm_class_name(name: &str) -> String {
    if let Some(&(_, mapped)) = MAPPED_CLASSES.iter().find(|(kt, _)| *kt == name) {
        return mapped.to_owned();
    }
    match name.strip_prefix("kotlin/Function") {
        Some(arity) if !arity.is_empty() && arity.bytes().all(|byte| byte.is_ascii_digit()) => {
            format!("kotlin/jvm/functions/Function{arity}")
        }
        _ => name.replace('.', "$"),
    }
}
