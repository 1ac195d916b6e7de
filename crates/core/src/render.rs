//! TypeDescriptor -> TypeScript type.

use crate::classify::TypeDescriptor;
use crate::model::{LiteralValue, PrimitiveKind};
use crate::typescript::{Emit, TsLiteral, TsPrimitive, TsType};

/// Render a classified descriptor as a TypeScript type.
///
/// Models render as their short name and are never inlined. Absence and
/// `null` are the same TypeScript type.
pub fn render(desc: &TypeDescriptor) -> TsType {
    match desc {
        TypeDescriptor::Primitive(kind) => render_primitive(*kind),
        TypeDescriptor::Literal(value) => TsType::Literal(render_literal(value)),
        TypeDescriptor::Optional(inner) => render(inner).nullable(),
        TypeDescriptor::List(elem) => TsType::Array(Box::new(render(elem))),
        TypeDescriptor::Mapping(key, value) => TsType::Record {
            key: Box::new(render(key)),
            value: Box::new(render(value)),
        },
        TypeDescriptor::Annotated(inner, _) => render(inner),
        TypeDescriptor::Model(path) => TsType::named(path.short_name()),
        TypeDescriptor::UnionOfModels { variants, nullable } => union(
            variants.iter().map(|path| TsType::named(path.short_name())),
            *nullable,
        ),
        TypeDescriptor::UnionOfPrimitives { variants, nullable } => {
            union(variants.iter().map(render), *nullable)
        }
    }
}

/// Render straight to source text.
pub fn render_string(desc: &TypeDescriptor) -> String {
    render(desc).emit()
}

fn render_primitive(kind: PrimitiveKind) -> TsType {
    match kind {
        PrimitiveKind::Str | PrimitiveKind::Url => TsType::Primitive(TsPrimitive::String),
        PrimitiveKind::Int | PrimitiveKind::Float => TsType::Primitive(TsPrimitive::Number),
        PrimitiveKind::Bool => TsType::Primitive(TsPrimitive::Boolean),
        PrimitiveKind::DateTime => TsType::named("Date"),
        PrimitiveKind::None => TsType::Primitive(TsPrimitive::Null),
    }
}

pub(crate) fn render_literal(value: &LiteralValue) -> TsLiteral {
    match value {
        LiteralValue::Bool(b) => TsLiteral::Bool(*b),
        LiteralValue::Int(i) => TsLiteral::Int(*i),
        LiteralValue::Str(s) => TsLiteral::String(s.clone()),
        LiteralValue::Null => TsLiteral::Null,
    }
}

// `Literal[None]` folds into the trailing `null`
fn union(members: impl Iterator<Item = TsType>, nullable: bool) -> TsType {
    let mut nullable = nullable;
    let mut types: Vec<TsType> = Vec::new();
    for member in members {
        if matches!(
            member,
            TsType::Literal(TsLiteral::Null) | TsType::Primitive(TsPrimitive::Null)
        ) {
            nullable = true;
        } else if !types.contains(&member) {
            types.push(member);
        }
    }
    if types.is_empty() {
        return TsType::Primitive(TsPrimitive::Null);
    }
    let ty = match types.len() {
        1 => types.remove(0),
        _ => TsType::Union(types),
    };
    if nullable { ty.nullable() } else { ty }
}
