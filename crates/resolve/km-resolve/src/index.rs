//! Descriptor lookup tables
//!
//! A [`DescriptorIndex`] is built once per source type (or file facade) and
//! answers "which descriptor records this JVM signature" without rescanning
//! the descriptor tree. Lookups return positions into the original
//! descriptor lists, so callers can go back to the full descriptor for flags
//! and visibility. Enum entries are also keyed by name. Two descriptors of one
//! kind recording the same signature (or two entries with one name) make the
//! container unusable and are reported while indexing.

use crate::error::{ResolveError, ResolveResult};
use crate::property::AccessorRole;
use crate::signature::DescriptorEncoder;
use km_host::DeclKind;
use km_metadata::{
    ClassKind, ClassMetadata, ConstructorDescriptor, FunctionDescriptor, FunctionFlags,
    PackageMetadata, ParameterDescriptor, PropertyDescriptor, StringTable,
    TypeParameterDescriptor,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// A value parameter with its name resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedParameter {
    /// Parameter name
    pub name: String,
    /// Declares a default value
    pub has_default: bool,
    /// `vararg`
    pub is_vararg: bool,
}

/// A function with its signature computed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedFunction {
    /// Source name
    pub name: String,
    /// JVM signature
    pub signature: String,
    /// Value parameters
    pub parameters: Vec<IndexedParameter>,
    /// Type parameter names
    pub type_parameters: Vec<String>,
    /// Host parameters before the value parameters (extension receiver)
    pub implicit_leading: usize,
    /// Host parameters after the value parameters (continuation)
    pub implicit_trailing: usize,
}

/// A constructor with its signature computed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedConstructor {
    /// JVM signature, enum prefix already stripped
    pub signature: String,
    /// Primary constructor
    pub is_primary: bool,
    /// Value parameters
    pub parameters: Vec<IndexedParameter>,
}

/// A property with its recorded JVM members resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedProperty {
    /// Property name
    pub name: String,
    /// A backing field is recorded
    pub has_field: bool,
    /// Explicit field name, which well-formed metadata never records
    pub field_name: Option<String>,
    /// Getter signature
    pub getter: Option<String>,
    /// Setter signature
    pub setter: Option<String>,
    /// Annotation holder signature
    pub annotation_holder: Option<String>,
    /// Extension property
    pub has_receiver: bool,
}

impl IndexedProperty {
    /// Recorded signature for an accessor role; `None` for the field
    pub fn accessor(&self, role: AccessorRole) -> Option<&str> {
        match role {
            AccessorRole::Field => None,
            AccessorRole::Getter => self.getter.as_deref(),
            AccessorRole::Setter => self.setter.as_deref(),
            AccessorRole::AnnotationHolder => self.annotation_holder.as_deref(),
        }
    }
}

/// Lookup tables over one member container
#[derive(Clone, Debug, Default)]
pub struct DescriptorIndex {
    owner: String,
    functions: Vec<IndexedFunction>,
    constructors: Vec<IndexedConstructor>,
    properties: Vec<IndexedProperty>,
    type_parameters: Vec<String>,
    enum_entries: Vec<String>,
    functions_by_signature: FxHashMap<String, usize>,
    constructors_by_signature: FxHashMap<String, usize>,
    accessors: FxHashMap<String, (usize, AccessorRole)>,
    enum_entries_by_name: FxHashMap<String, usize>,
}

impl DescriptorIndex {
    /// Index a class descriptor; `owner` names the host type in errors
    pub fn for_class(owner: &str, metadata: &ClassMetadata) -> ResolveResult<Self> {
        let class = &metadata.class;
        let strings = &metadata.strings;
        let encoder = DescriptorEncoder::new(strings).with_type_parameters(&class.type_parameters);

        let mut index = Self {
            owner: owner.to_owned(),
            ..Self::default()
        };
        index.add_functions(&encoder, strings, &class.functions)?;
        index.add_properties(&encoder, strings, &class.properties)?;
        index.add_constructors(
            &encoder,
            strings,
            &class.constructors,
            class.kind == ClassKind::EnumClass,
        )?;
        index.type_parameters = type_parameter_names(strings, &class.type_parameters)?;
        for &entry in &class.enum_entries {
            index.add_enum_entry(strings.get(entry)?)?;
        }
        Ok(index)
    }

    /// Index the top-level declarations of a file facade
    pub fn for_package(owner: &str, metadata: &PackageMetadata) -> ResolveResult<Self> {
        let strings = &metadata.strings;
        let encoder = DescriptorEncoder::new(strings);
        let mut index = Self {
            owner: owner.to_owned(),
            ..Self::default()
        };
        index.add_functions(&encoder, strings, &metadata.package.functions)?;
        index.add_properties(&encoder, strings, &metadata.package.properties)?;
        Ok(index)
    }

    fn add_functions<'meta>(
        &mut self,
        encoder: &DescriptorEncoder<'meta>,
        strings: &StringTable,
        functions: &'meta [FunctionDescriptor],
    ) -> ResolveResult<()> {
        for (position, function) in functions.iter().enumerate() {
            let signature = encoder.function_signature(function)?;
            self.functions.push(IndexedFunction {
                name: strings.get(function.name)?.to_owned(),
                signature: signature.clone(),
                parameters: parameters(strings, &function.value_parameters)?,
                type_parameters: type_parameter_names(strings, &function.type_parameters)?,
                implicit_leading: usize::from(function.receiver.is_some()),
                implicit_trailing: usize::from(function.flags.contains(FunctionFlags::SUSPEND)),
            });
            let describe = |found: usize| {
                let name = self.functions.get(found).map(|function| function.name.as_str());
                format!("function `{}`", name.unwrap_or_default())
            };
            record(&self.owner, &mut self.functions_by_signature, signature, position, describe)?;
        }
        Ok(())
    }

    fn add_constructors(
        &mut self,
        encoder: &DescriptorEncoder<'_>,
        strings: &StringTable,
        constructors: &[ConstructorDescriptor],
        is_enum: bool,
    ) -> ResolveResult<()> {
        for (position, ctor) in constructors.iter().enumerate() {
            let signature = encoder.constructor_signature(&self.owner, ctor, is_enum)?;
            self.constructors.push(IndexedConstructor {
                signature: signature.clone(),
                is_primary: ctor.is_primary(),
                parameters: parameters(strings, &ctor.value_parameters)?,
            });
            let describe = |found: usize| format!("constructor #{found}");
            record(&self.owner, &mut self.constructors_by_signature, signature, position, describe)?;
        }
        Ok(())
    }

    fn add_properties(
        &mut self,
        encoder: &DescriptorEncoder<'_>,
        strings: &StringTable,
        properties: &[PropertyDescriptor],
    ) -> ResolveResult<()> {
        for (position, property) in properties.iter().enumerate() {
            let [getter, setter, annotation_holder] = encoder.accessor_signatures(property)?;
            let field_name = match property.jvm.field.and_then(|field| field.name) {
                Some(id) => Some(strings.get(id)?.to_owned()),
                None => None,
            };
            self.properties.push(IndexedProperty {
                name: strings.get(property.name)?.to_owned(),
                has_field: property.jvm.field.is_some(),
                field_name,
                getter: getter.clone(),
                setter: setter.clone(),
                annotation_holder: annotation_holder.clone(),
                has_receiver: property.receiver.is_some(),
            });

            let roles = [
                (getter, AccessorRole::Getter),
                (setter, AccessorRole::Setter),
                (annotation_holder, AccessorRole::AnnotationHolder),
            ];
            for (signature, role) in roles {
                let Some(signature) = signature else {
                    continue;
                };
                let describe = |(found, role): (usize, AccessorRole)| {
                    let name = self.properties.get(found).map(|property| property.name.as_str());
                    format!("{role} of property `{}`", name.unwrap_or_default())
                };
                record(&self.owner, &mut self.accessors, signature, (position, role), describe)?;
            }
        }
        Ok(())
    }

    fn add_enum_entry(&mut self, name: &str) -> ResolveResult<()> {
        let ordinal = self.enum_entries.len();
        self.enum_entries.push(name.to_owned());
        let describe = |found: usize| format!("enum entry #{found}");
        record(&self.owner, &mut self.enum_entries_by_name, name.to_owned(), ordinal, describe)
    }

    /// Functions in declaration order
    pub fn functions(&self) -> &[IndexedFunction] {
        &self.functions
    }

    /// Position of the function with a JVM signature
    pub fn function_by_signature(&self, signature: &str) -> Option<usize> {
        self.functions_by_signature.get(signature).copied()
    }

    /// Constructors in declaration order
    pub fn constructors(&self) -> &[IndexedConstructor] {
        &self.constructors
    }

    /// Position of the constructor with a JVM signature
    pub fn constructor_by_signature(&self, signature: &str) -> Option<usize> {
        self.constructors_by_signature.get(signature).copied()
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[IndexedProperty] {
        &self.properties
    }

    /// Property and role whose recorded accessor has a JVM signature
    pub fn property_by_accessor(&self, signature: &str) -> Option<(usize, AccessorRole)> {
        self.accessors.get(signature).copied()
    }

    /// Whether a host member of `kind` with `signature` belongs to a descriptor
    ///
    /// Methods are owned by functions and by property accessors, constructors
    /// by constructor descriptors.
    pub fn reserves(&self, kind: DeclKind, signature: &str) -> bool {
        match kind {
            DeclKind::Constructor => self.constructor_by_signature(signature).is_some(),
            DeclKind::Method => {
                self.function_by_signature(signature).is_some()
                    || self.property_by_accessor(signature).is_some()
            }
            _ => false,
        }
    }

    /// Type parameter names in declaration order
    pub fn type_parameters(&self) -> &[String] {
        &self.type_parameters
    }

    /// Enum entry names in declaration order
    pub fn enum_entries(&self) -> &[String] {
        &self.enum_entries
    }

    /// Ordinal of the enum entry with a name
    pub fn enum_entry_named(&self, name: &str) -> Option<usize> {
        self.enum_entries_by_name.get(name).copied()
    }
}

/// Key `value` by `signature`, refusing a signature recorded earlier
fn record<V: Copy>(
    owner: &str,
    map: &mut FxHashMap<String, V>,
    signature: String,
    value: V,
    describe: impl Fn(V) -> String,
) -> ResolveResult<()> {
    match map.entry(signature) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(taken) => Err(ResolveError::DuplicateDescriptor {
            owner: owner.to_owned(),
            signature: taken.key().clone(),
            first: describe(*taken.get()),
            second: describe(value),
        }),
    }
}

fn parameters(
    strings: &StringTable,
    params: &[ParameterDescriptor],
) -> ResolveResult<Vec<IndexedParameter>> {
    params
        .iter()
        .map(|param| {
            Ok(IndexedParameter {
                name: strings.get(param.name)?.to_owned(),
                has_default: param.declares_default,
                is_vararg: param.vararg_element.is_some(),
            })
        })
        .collect()
}

fn type_parameter_names(
    strings: &StringTable,
    params: &[TypeParameterDescriptor],
) -> ResolveResult<Vec<String>> {
    params
        .iter()
        .map(|param| Ok(strings.get(param.name)?.to_owned()))
        .collect()
}
