//! Model registry.
//!
//! A [`TypeIndex`] is built fresh for every generation run. Registering a root
//! walks the model graph depth-first, declares one exported object type per
//! reachable model, collects enum tags and emits both wire functions for every
//! newly declared model. Maps are insertion-ordered so declaration order is the
//! traversal order and output never depends on hashing.
//!
//! The index also owns the module's top-level namespace. TypeScript globals the
//! generated code relies on and the generated helpers are reserved up front;
//! every model, wire function and enum then claims its name, and a second
//! claimant is a [`CodegenError::ModelNameConflict`].

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::classify::{
    TypeDescriptor, classify, contains_model_union, peel_annotations, referenced_models,
};
use crate::error::{CodegenError, Result};
use crate::model::{Annotation, EnumTag, LiteralValue, ModelGraph, ModelPath, PrimitiveKind};
use crate::render::{render, render_literal};
use crate::routes::{API_ERROR_CLASS, ENCODE_QUERY_FN, READ_ERROR_BODY_FN, VALIDATION_GUARD_FN};
use crate::typescript::utils::is_valid_identifier;
use crate::typescript::{Emit, TsProp, TsType, TsTypeDef, TypeDefKind};
use crate::wire::{
    UNREACHABLE_FN, WireFunction, emit_from_wire, emit_to_wire, from_wire_name, to_wire_name,
};

/// Globals referenced by generated types and route wrappers.
const TYPESCRIPT_GLOBALS: &[&str] = &[
    "Array",
    "Date",
    "Error",
    "JSON",
    "Object",
    "Promise",
    "Record",
    "RequestInit",
    "Response",
    "String",
    "URLSearchParams",
    "encodeURIComponent",
    "fetch",
];

const GENERATED_HELPERS: &[&str] = &[
    API_ERROR_CLASS,
    UNREACHABLE_FN,
    READ_ERROR_BODY_FN,
    ENCODE_QUERY_FN,
    VALIDATION_GUARD_FN,
];

/// One declared field of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeField {
    /// Field name
    pub name: String,
    /// Classified field type
    pub descriptor: TypeDescriptor,
    /// Rendered field type
    pub ts_type: TsType,
    /// Declared default, documented on the property
    pub default: Option<LiteralValue>,
}

/// TypeScript object type declared for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    /// TypeScript name (the model's short name)
    pub name: String,
    /// Model identity; `None` for route form types
    pub path: Option<ModelPath>,
    /// Fields in source order
    pub fields: Vec<ObjectTypeField>,
    /// Whether the declaration is exported
    pub exported: bool,
}

impl ObjectType {
    /// Declaration AST.
    pub fn to_type_def(&self) -> TsTypeDef {
        let properties = self
            .fields
            .iter()
            .map(|field| TsProp {
                name: field.name.clone(),
                ty: field.ts_type.clone(),
                doc: field
                    .default
                    .as_ref()
                    .map(|value| format!("@default {}", render_literal(value).emit())),
            })
            .collect();

        TsTypeDef {
            name: self.name.clone(),
            kind: TypeDefKind::Object { properties },
            is_export: self.exported,
        }
    }
}

/// Enum name -> values, gathered from enum tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumRegistry {
    enums: BTreeMap<String, BTreeSet<String>>,
}

impl EnumRegistry {
    /// Record a tag's values.
    pub fn add(&mut self, tag: &EnumTag) {
        self.enums
            .entry(tag.name.clone())
            .or_default()
            .extend(tag.values.iter().cloned());
    }

    /// Enum names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    /// Sorted values of one enum.
    pub fn values(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        self.enums.get(name).map(|values| values.iter().map(String::as_str))
    }

    /// Number of enums.
    pub fn len(&self) -> usize {
        self.enums.len()
    }

    /// Whether no enum tag was seen.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Enum declarations sorted by name, values sorted lexicographically.
    pub fn to_type_defs(&self) -> Vec<TsTypeDef> {
        self.enums
            .iter()
            .map(|(name, values)| TsTypeDef {
                name: name.clone(),
                kind: TypeDefKind::Enum {
                    members: values.iter().cloned().collect(),
                },
                is_export: true,
            })
            .collect()
    }
}

/// Everything generated for a set of root models.
#[derive(Debug)]
pub struct TypeIndex {
    objects: IndexMap<ModelPath, ObjectType>,
    by_ts_name: IndexMap<String, ModelPath>,
    from_wire: IndexMap<ModelPath, WireFunction>,
    to_wire: IndexMap<ModelPath, WireFunction>,
    enums: EnumRegistry,
    // TypeScript name -> who declares it
    names: IndexMap<String, String>,
}

impl Default for TypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeIndex {
    /// Empty index with the TypeScript globals and generated helpers reserved.
    pub fn new() -> Self {
        let mut names = IndexMap::new();
        for name in TYPESCRIPT_GLOBALS {
            names.insert((*name).to_string(), "the TypeScript global".to_string());
        }
        for name in GENERATED_HELPERS {
            names.insert((*name).to_string(), "a generated helper".to_string());
        }
        Self {
            objects: IndexMap::new(),
            by_ts_name: IndexMap::new(),
            from_wire: IndexMap::new(),
            to_wire: IndexMap::new(),
            enums: EnumRegistry::default(),
            names,
        }
    }

    /// Build an index from roots, in order.
    pub fn register(graph: &ModelGraph, roots: &[ModelPath]) -> Result<Self> {
        let mut index = Self::new();
        for root in roots {
            index.add_root(graph, root)?;
        }
        Ok(index)
    }

    /// Register one more root. Models already declared are skipped.
    ///
    /// On error the index is left partially updated and should be discarded.
    pub fn add_root(&mut self, graph: &ModelGraph, root: &ModelPath) -> Result<()> {
        let mut added = Vec::new();
        self.visit(graph, root, &mut added)?;

        for path in &added {
            let from_wire = emit_from_wire(self, path)?;
            let to_wire = emit_to_wire(self, path)?;
            self.from_wire.insert(path.clone(), from_wire);
            self.to_wire.insert(path.clone(), to_wire);
        }

        debug!(root = %root, added = added.len(), total = self.objects.len(), "registered root");
        Ok(())
    }

    fn visit(
        &mut self,
        graph: &ModelGraph,
        path: &ModelPath,
        added: &mut Vec<ModelPath>,
    ) -> Result<()> {
        if self.objects.contains_key(path) {
            return Ok(());
        }

        let model = graph.require(path)?;
        let name = path.short_name();
        if !is_valid_identifier(name) {
            return Err(CodegenError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        self.claim_name(name, path.to_string())?;
        self.claim_name(&from_wire_name(name), format!("the from-wire function of {path}"))?;
        self.claim_name(&to_wire_name(name), format!("the to-wire function of {path}"))?;

        let mut fields = Vec::with_capacity(model.fields.len());
        for field in &model.fields {
            let descriptor =
                classify(&field.ty).map_err(|err| err.located(format!("{name}.{}", field.name)))?;
            self.collect_enums(&descriptor)?;
            fields.push(ObjectTypeField {
                name: field.name.clone(),
                ts_type: render(&descriptor),
                descriptor,
                default: field.default.clone(),
            });
        }

        // Mark visited before descending so cycles terminate
        let nested: Vec<ModelPath> = fields
            .iter()
            .flat_map(|field| referenced_models(&field.descriptor))
            .cloned()
            .collect();
        trace!(model = %path, fields = fields.len(), "declaring object type");
        self.by_ts_name.insert(name.to_string(), path.clone());
        self.objects.insert(
            path.clone(),
            ObjectType {
                name: name.to_string(),
                path: Some(path.clone()),
                fields,
                exported: true,
            },
        );
        added.push(path.clone());

        for child in &nested {
            self.visit(graph, child, added)?;
        }
        Ok(())
    }

    fn collect_enums(&mut self, desc: &TypeDescriptor) -> Result<()> {
        match desc {
            TypeDescriptor::Annotated(inner, meta) => {
                for annotation in meta {
                    if let Annotation::Enum(tag) = annotation {
                        validate_enum_tag(tag, inner)?;
                        self.claim_name(&tag.name, format!("enum {}", tag.name))?;
                        self.enums.add(tag);
                    }
                }
                self.collect_enums(inner)
            }
            TypeDescriptor::Optional(inner) | TypeDescriptor::List(inner) => {
                self.collect_enums(inner)
            }
            TypeDescriptor::Mapping(key, value) => {
                self.collect_enums(key)?;
                self.collect_enums(value)
            }
            TypeDescriptor::UnionOfPrimitives { variants, .. } => {
                for variant in variants {
                    self.collect_enums(variant)?;
                }
                Ok(())
            }
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::Literal(_)
            | TypeDescriptor::Model(_)
            | TypeDescriptor::UnionOfModels { .. } => Ok(()),
        }
    }

    /// Claim a top-level TypeScript name for `owner`. Claiming a name again
    /// for the same owner is a no-op.
    pub fn claim_name(&mut self, name: &str, owner: impl Into<String>) -> Result<()> {
        let owner = owner.into();
        match self.names.get(name) {
            Some(existing) if *existing == owner => Ok(()),
            Some(existing) => Err(CodegenError::ModelNameConflict {
                name: name.to_string(),
                first: existing.clone(),
                second: owner,
            }),
            None => {
                self.names.insert(name.to_string(), owner);
                Ok(())
            }
        }
    }

    /// Who declares `name` in the generated module, if anyone.
    pub fn name_owner(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Object types in declaration order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.objects.values()
    }

    /// Object type of a model.
    pub fn object(&self, path: &ModelPath) -> Option<&ObjectType> {
        self.objects.get(path)
    }

    /// Object type by TypeScript name.
    pub fn object_by_name(&self, name: &str) -> Option<&ObjectType> {
        self.by_ts_name
            .get(name)
            .and_then(|path| self.objects.get(path))
    }

    /// Whether a model is declared.
    pub fn contains(&self, path: &ModelPath) -> bool {
        self.objects.contains_key(path)
    }

    /// From-wire function of a model.
    pub fn from_wire(&self, path: &ModelPath) -> Option<&WireFunction> {
        self.from_wire.get(path)
    }

    /// To-wire function of a model.
    pub fn to_wire(&self, path: &ModelPath) -> Option<&WireFunction> {
        self.to_wire.get(path)
    }

    /// From-wire functions in declaration order.
    pub fn from_wire_functions(&self) -> impl Iterator<Item = &WireFunction> {
        self.from_wire.values()
    }

    /// To-wire functions in declaration order.
    pub fn to_wire_functions(&self) -> impl Iterator<Item = &WireFunction> {
        self.to_wire.values()
    }

    /// Collected enums.
    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    /// Number of declared models.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether some wire function dispatches over a union of models and
    /// therefore calls `unreachable()`.
    pub fn needs_unreachable(&self) -> bool {
        self.objects
            .values()
            .flat_map(|object| &object.fields)
            .any(|field| contains_model_union(&field.descriptor))
    }
}

fn validate_enum_tag(tag: &EnumTag, inner: &TypeDescriptor) -> Result<()> {
    let fail = |reason: &str| {
        Err(CodegenError::UnknownEnumTag {
            name: tag.name.clone(),
            reason: reason.to_string(),
        })
    };

    if !is_valid_identifier(&tag.name) {
        return fail("enum name is not a valid TypeScript identifier");
    }
    if tag.values.is_empty() {
        return fail("enum tag has no values");
    }
    if tag
        .values
        .iter()
        .any(|value| value.is_empty() || is_numeric_name(value))
    {
        return fail("enum values must be non-empty and non-numeric");
    }
    match peel_annotations(inner) {
        TypeDescriptor::Primitive(PrimitiveKind::Str)
        | TypeDescriptor::Literal(LiteralValue::Str(_)) => Ok(()),
        _ => fail("enum tags only apply to str fields"),
    }
}

// TypeScript rejects enum members with numeric names; `nan` and `inf` are fine.
fn is_numeric_name(value: &str) -> bool {
    value.parse::<f64>().is_ok() && value.chars().any(|c| c.is_ascii_digit())
}
