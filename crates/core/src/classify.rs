//! Type classification.
//!
//! [`classify`] turns an unclassified [`TypeExpr`] into exactly one
//! [`TypeDescriptor`]. Every downstream stage (rendering, registration, wire
//! codegen) matches on descriptors and never re-inspects raw expressions.

use crate::error::{CodegenError, Result};
use crate::model::{Annotation, LiteralValue, ModelPath, PrimitiveKind, TypeExpr};

/// Classified shape of a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Built-in scalar
    Primitive(PrimitiveKind),
    /// Literal type
    Literal(LiteralValue),
    /// Exactly `T | none`
    Optional(Box<TypeDescriptor>),
    /// `list[T]`
    List(Box<TypeDescriptor>),
    /// `dict[K, V]` with a string-like key
    Mapping(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// Inner shape plus metadata
    Annotated(Box<TypeDescriptor>, Vec<Annotation>),
    /// Model reference
    Model(ModelPath),
    /// Union whose members are all models
    UnionOfModels {
        /// Variants in declaration order
        variants: Vec<ModelPath>,
        /// Whether `none` is a member
        nullable: bool,
    },
    /// Union whose members are all safe primitives or literals
    UnionOfPrimitives {
        /// Members in declaration order, annotations kept
        variants: Vec<TypeDescriptor>,
        /// Whether `none` is a member
        nullable: bool,
    },
}

/// Classify a type expression.
pub fn classify(expr: &TypeExpr) -> Result<TypeDescriptor> {
    match expr {
        TypeExpr::Primitive(kind) => Ok(TypeDescriptor::Primitive(*kind)),
        TypeExpr::Literal(value) => Ok(TypeDescriptor::Literal(value.clone())),
        TypeExpr::List(elem) => Ok(TypeDescriptor::List(Box::new(classify(elem)?))),
        TypeExpr::Dict(key, value) => {
            let key_desc = classify(key)?;
            match peel_annotations(&key_desc) {
                TypeDescriptor::Primitive(kind) if kind.is_string_like() => {}
                _ => {
                    return Err(CodegenError::unsupported(
                        expr,
                        format!("mapping key {key} must be str or url"),
                    ));
                }
            }
            Ok(TypeDescriptor::Mapping(
                Box::new(key_desc),
                Box::new(classify(value)?),
            ))
        }
        TypeExpr::Union(members) => classify_union(expr, members),
        TypeExpr::Annotated(inner, meta) => Ok(TypeDescriptor::Annotated(
            Box::new(classify(inner)?),
            meta.clone(),
        )),
        TypeExpr::Model(path) => Ok(TypeDescriptor::Model(path.clone())),
    }
}

fn flatten_union<'a>(members: &'a [TypeExpr], out: &mut Vec<&'a TypeExpr>) {
    for member in members {
        match member {
            TypeExpr::Union(nested) => flatten_union(nested, out),
            other => {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
    }
}

fn classify_union(expr: &TypeExpr, members: &[TypeExpr]) -> Result<TypeDescriptor> {
    let mut flat = Vec::new();
    flatten_union(members, &mut flat);

    let none = TypeExpr::none();
    let nullable = flat.contains(&&none);
    let present: Vec<&TypeExpr> = flat.into_iter().filter(|m| **m != none).collect();

    match (present.as_slice(), nullable) {
        ([], false) => Err(CodegenError::unsupported(expr, "empty union")),
        ([], true) => Ok(TypeDescriptor::Primitive(PrimitiveKind::None)),
        ([only], false) => classify(only),
        ([only], true) => Ok(TypeDescriptor::Optional(Box::new(classify(only)?))),
        (many, nullable) => {
            let descs = many
                .iter()
                .map(|m| classify(m))
                .collect::<Result<Vec<_>>>()?;

            if descs.iter().all(is_model) {
                let variants = descs
                    .iter()
                    .filter_map(|d| match peel_annotations(d) {
                        TypeDescriptor::Model(path) => Some(path.clone()),
                        _ => None,
                    })
                    .collect();
                return Ok(TypeDescriptor::UnionOfModels { variants, nullable });
            }

            if descs.iter().all(|d| is_safe_primitive(d) || is_literal(d)) {
                return Ok(TypeDescriptor::UnionOfPrimitives {
                    variants: descs,
                    nullable,
                });
            }

            let reason = if descs.iter().any(is_model) {
                "union mixes models with other shapes"
            } else {
                "union members must be safe primitives, literals or models"
            };
            Err(CodegenError::unsupported(expr, reason))
        }
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// Strip any number of `Annotated` layers.
pub fn peel_annotations(desc: &TypeDescriptor) -> &TypeDescriptor {
    let mut current = desc;
    while let TypeDescriptor::Annotated(inner, _) = current {
        current = inner;
    }
    current
}

/// Any built-in scalar, including `datetime` and `none`.
pub fn is_primitive(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Primitive(_))
}

/// A scalar that crosses the wire unchanged.
pub fn is_safe_primitive(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Primitive(kind) if kind.is_safe())
}

/// Exactly `T | none`.
pub fn is_optional(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Optional(_))
}

/// `list[T]`
pub fn is_list(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::List(_))
}

/// `dict[K, V]`
pub fn is_mapping(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Mapping(..))
}

/// Carries metadata at the top level.
pub fn is_annotated(desc: &TypeDescriptor) -> bool {
    matches!(desc, TypeDescriptor::Annotated(..))
}

/// A literal type.
pub fn is_literal(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Literal(_))
}

/// A model reference.
pub fn is_model(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::Model(_))
}

/// A union of models, nullable or not.
pub fn is_union_of_models(desc: &TypeDescriptor) -> bool {
    matches!(peel_annotations(desc), TypeDescriptor::UnionOfModels { .. })
}

/// A union of safe primitives and literals, nullable or not.
pub fn is_union_of_safe_primitives(desc: &TypeDescriptor) -> bool {
    matches!(
        peel_annotations(desc),
        TypeDescriptor::UnionOfPrimitives { .. }
    )
}

/// A multi-member union that includes `none`.
pub fn is_union_with_absence(desc: &TypeDescriptor) -> bool {
    matches!(
        peel_annotations(desc),
        TypeDescriptor::UnionOfModels { nullable: true, .. }
            | TypeDescriptor::UnionOfPrimitives { nullable: true, .. }
    )
}

/// Values of this shape need no conversion in either direction.
pub fn is_passthrough(desc: &TypeDescriptor) -> bool {
    is_safe_primitive(desc)
        || is_literal(desc)
        || is_union_of_safe_primitives(desc)
        || matches!(
            peel_annotations(desc),
            TypeDescriptor::Primitive(PrimitiveKind::None)
        )
}

/// Models referenced anywhere inside `desc`, in first-occurrence order.
pub fn referenced_models(desc: &TypeDescriptor) -> Vec<&ModelPath> {
    fn walk<'a>(desc: &'a TypeDescriptor, out: &mut Vec<&'a ModelPath>) {
        match desc {
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::Literal(_)
            | TypeDescriptor::UnionOfPrimitives { .. } => {}
            TypeDescriptor::Optional(inner)
            | TypeDescriptor::List(inner)
            | TypeDescriptor::Annotated(inner, _) => walk(inner, out),
            TypeDescriptor::Mapping(key, value) => {
                walk(key, out);
                walk(value, out);
            }
            TypeDescriptor::Model(path) => {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
            TypeDescriptor::UnionOfModels { variants, .. } => {
                for path in variants {
                    if !out.contains(&path) {
                        out.push(path);
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(desc, &mut out);
    out
}

/// Whether a discriminated dispatch appears anywhere inside `desc`.
pub fn contains_model_union(desc: &TypeDescriptor) -> bool {
    match desc {
        TypeDescriptor::UnionOfModels { .. } => true,
        TypeDescriptor::Optional(inner)
        | TypeDescriptor::List(inner)
        | TypeDescriptor::Annotated(inner, _) => contains_model_union(inner),
        TypeDescriptor::Mapping(_, value) => contains_model_union(value),
        TypeDescriptor::Primitive(_)
        | TypeDescriptor::Literal(_)
        | TypeDescriptor::Model(_)
        | TypeDescriptor::UnionOfPrimitives { .. } => false,
    }
}
