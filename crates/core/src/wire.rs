//! From-wire and to-wire function generation.
//!
//! For every registered model two pure functions are emitted:
//! `get<Name>FromWire(root: any): Name` rebuilds rich values (dates, nested
//! models, discriminated unions) from wire JSON, and
//! `convert<Name>ToWire(root: Name): any` flattens them back. Field conversion
//! recurses through the classified descriptor; whenever the conversion of a
//! container's contents is the identity the container is passed through as-is.
//!
//! Lambda variables are numbered by nesting depth (`v1`, `k2`, ...) so nested
//! lambdas never shadow each other.

use crate::classify::{TypeDescriptor, is_passthrough, peel_annotations};
use crate::error::{CodegenError, Result};
use crate::model::{LiteralValue, ModelPath, PrimitiveKind};
use crate::render::{render, render_literal};
use crate::type_index::TypeIndex;
use crate::typescript::{
    BinOp, Emit, TsExpr, TsFunction, TsLiteral, TsParam, TsPrimitive, TsStmt, TsType,
};

/// Name of the helper called when no union variant matches.
pub const UNREACHABLE_FN: &str = "unreachable";

/// A generated conversion function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFunction {
    /// Function name
    pub name: String,
    /// TypeScript type the function produces or consumes
    pub target_type_name: String,
    /// Function AST
    pub function: TsFunction,
}

impl WireFunction {
    /// Emitted source text.
    pub fn source(&self) -> String {
        self.function.emit()
    }
}

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Wire JSON -> rich value
    FromWire,
    /// Rich value -> wire JSON
    ToWire,
}

/// `get<Name>FromWire`
pub fn from_wire_name(type_name: &str) -> String {
    format!("get{type_name}FromWire")
}

/// `convert<Name>ToWire`
pub fn to_wire_name(type_name: &str) -> String {
    format!("convert{type_name}ToWire")
}

/// Build the from-wire function of a registered model.
pub fn emit_from_wire(index: &TypeIndex, model: &ModelPath) -> Result<WireFunction> {
    emit_wire_function(index, model, Direction::FromWire)
}

/// Build the to-wire function of a registered model.
pub fn emit_to_wire(index: &TypeIndex, model: &ModelPath) -> Result<WireFunction> {
    emit_wire_function(index, model, Direction::ToWire)
}

fn any() -> TsType {
    TsType::Primitive(TsPrimitive::Any)
}

fn emit_wire_function(index: &TypeIndex, model: &ModelPath, dir: Direction) -> Result<WireFunction> {
    let object = index
        .object(model)
        .ok_or_else(|| CodegenError::UnknownModel(model.clone()))?;

    let root = TsExpr::ident("root");
    let mut props = Vec::with_capacity(object.fields.len());
    for field in &object.fields {
        let access = root.clone().member(&field.name);
        let converted = convert(index, &field.descriptor, &access, 1, dir)
            .map_err(|err| err.located(format!("{}.{}", object.name, field.name)))?;
        props.push((field.name.clone(), converted.unwrap_or(access)));
    }

    let (name, param_ty, return_ty) = match dir {
        Direction::FromWire => (
            from_wire_name(&object.name),
            any(),
            TsType::named(&object.name),
        ),
        Direction::ToWire => (to_wire_name(&object.name), TsType::named(&object.name), any()),
    };

    Ok(WireFunction {
        name: name.clone(),
        target_type_name: object.name.clone(),
        function: TsFunction {
            name,
            doc: vec![],
            params: vec![TsParam::typed("root", param_ty)],
            return_type: Some(return_ty),
            body: vec![TsStmt::Return(Some(TsExpr::Object(props)))],
            is_async: false,
            is_export: true,
        },
    })
}

/// Conversion of `src` according to `desc`; `None` means identity.
pub fn convert(
    index: &TypeIndex,
    desc: &TypeDescriptor,
    src: &TsExpr,
    depth: usize,
    dir: Direction,
) -> Result<Option<TsExpr>> {
    if is_passthrough(desc) {
        return Ok(None);
    }

    match desc {
        TypeDescriptor::Annotated(inner, _) => convert(index, inner, src, depth, dir),

        TypeDescriptor::Primitive(PrimitiveKind::DateTime) => Ok(Some(match dir {
            Direction::FromWire => TsExpr::New {
                callee: Box::new(TsExpr::ident("Date")),
                args: vec![src.clone().bin(BinOp::Mul, int(1000))],
            },
            Direction::ToWire => src
                .clone()
                .member("getTime")
                .call(vec![])
                .bin(BinOp::Div, int(1000)),
        })),

        TypeDescriptor::Optional(inner) => {
            let Some(converted) = convert(index, inner, src, depth + 1, dir)? else {
                return Ok(None);
            };
            Ok(Some(null_guard(src, converted)))
        }

        TypeDescriptor::List(elem) => {
            let var = format!("v{depth}");
            let Some(converted) = convert(index, elem, &TsExpr::ident(&var), depth + 1, dir)?
            else {
                return Ok(None);
            };
            let param_ty = match dir {
                Direction::FromWire => any(),
                Direction::ToWire => render(elem),
            };
            Ok(Some(src.clone().member("map").call(vec![TsExpr::Arrow {
                params: vec![TsParam::typed(var, param_ty)],
                body: Box::new(converted),
            }])))
        }

        TypeDescriptor::Mapping(key, value) => {
            let key_var = format!("k{depth}");
            let value_var = format!("v{depth}");
            let Some(converted) =
                convert(index, value, &TsExpr::ident(&value_var), depth + 1, dir)?
            else {
                return Ok(None);
            };
            let value_ty = match dir {
                Direction::FromWire => any(),
                Direction::ToWire => render(value),
            };
            let entries = TsExpr::ident("Object").member("entries").call(vec![TsExpr::Cast {
                expr: Box::new(src.clone()),
                ty: TsType::Record {
                    key: Box::new(render(key)),
                    value: Box::new(value_ty),
                },
            }]);
            let mapped = entries.member("map").call(vec![TsExpr::Arrow {
                params: vec![TsParam::untyped(format!("[{key_var}, {value_var}]"))],
                body: Box::new(TsExpr::Array(vec![TsExpr::ident(key_var), converted])),
            }]);
            Ok(Some(
                TsExpr::ident("Object")
                    .member("fromEntries")
                    .call(vec![mapped]),
            ))
        }

        TypeDescriptor::Model(path) => Ok(Some(model_call(index, path, src, dir)?)),

        TypeDescriptor::UnionOfModels { variants, nullable } => {
            let dispatch = dispatch(index, variants, src, dir)?;
            Ok(Some(if *nullable {
                null_guard(src, dispatch)
            } else {
                dispatch
            }))
        }

        TypeDescriptor::Primitive(_)
        | TypeDescriptor::Literal(_)
        | TypeDescriptor::UnionOfPrimitives { .. } => Err(CodegenError::unsupported(
            crate::render::render_string(desc),
            "no wire conversion for this shape",
        )),
    }
}

fn int(value: i64) -> TsExpr {
    TsExpr::Literal(TsLiteral::Int(value))
}

fn null() -> TsExpr {
    TsExpr::Literal(TsLiteral::Null)
}

/// `src === null ? null : converted`
fn null_guard(src: &TsExpr, converted: TsExpr) -> TsExpr {
    TsExpr::ternary(src.clone().bin(BinOp::StrictEqual, null()), null(), converted)
}

fn model_call(index: &TypeIndex, path: &ModelPath, src: &TsExpr, dir: Direction) -> Result<TsExpr> {
    let object = index
        .object(path)
        .ok_or_else(|| CodegenError::UnknownModel(path.clone()))?;
    let name = match dir {
        Direction::FromWire => from_wire_name(&object.name),
        Direction::ToWire => to_wire_name(&object.name),
    };
    Ok(TsExpr::ident(name).call(vec![src.clone()]))
}

/// Discriminating field shared by every variant of a union, with each
/// variant's literal in variant order.
pub fn discriminant<'a>(
    index: &'a TypeIndex,
    variants: &'a [ModelPath],
) -> Result<(&'a str, Vec<(&'a ModelPath, &'a LiteralValue)>)> {
    let union = variants
        .iter()
        .map(|v| v.short_name())
        .collect::<Vec<_>>()
        .join(" | ");
    let ambiguous = |reason: String| CodegenError::AmbiguousDiscriminant {
        union: union.clone(),
        reason,
    };

    let mut field_name: Option<&str> = None;
    let mut arms: Vec<(&ModelPath, &LiteralValue)> = Vec::with_capacity(variants.len());

    for path in variants {
        let object = index
            .object(path)
            .ok_or_else(|| CodegenError::UnknownModel(path.clone()))?;
        let first = object
            .fields
            .first()
            .ok_or_else(|| ambiguous(format!("variant {} has no fields", object.name)))?;

        match field_name {
            None => field_name = Some(&first.name),
            Some(expected) if expected != first.name => {
                return Err(ambiguous(format!(
                    "variants disagree on the first field: `{expected}` vs {}.{}",
                    object.name, first.name
                )));
            }
            Some(_) => {}
        }

        let TypeDescriptor::Literal(value) = peel_annotations(&first.descriptor) else {
            return Err(ambiguous(format!(
                "{}.{} is not a literal",
                object.name, first.name
            )));
        };

        if let Some((other, _)) = arms.iter().find(|(_, seen)| *seen == value) {
            return Err(ambiguous(format!(
                "{} and {} share the discriminant {value}",
                other.short_name(),
                object.name
            )));
        }
        arms.push((path, value));
    }

    let field_name = field_name.ok_or_else(|| ambiguous("union has no variants".to_string()))?;
    Ok((field_name, arms))
}

/// `src.kind === "a" ? fA(src) : src.kind === "b" ? fB(src) : unreachable()`
fn dispatch(
    index: &TypeIndex,
    variants: &[ModelPath],
    src: &TsExpr,
    dir: Direction,
) -> Result<TsExpr> {
    let (field, arms) = discriminant(index, variants)?;

    let mut expr = TsExpr::ident(UNREACHABLE_FN).call(vec![]);
    for (path, value) in arms.into_iter().rev() {
        let cond = src
            .clone()
            .member(field)
            .bin(BinOp::StrictEqual, TsExpr::Literal(render_literal(value)));
        expr = TsExpr::ternary(cond, model_call(index, path, src, dir)?, expr);
    }
    Ok(expr)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{ModelDef, ModelGraph, TypeExpr};

    fn index_for(graph: &ModelGraph, root: &str) -> TypeIndex {
        TypeIndex::register(graph, &[ModelPath::new(root)]).unwrap()
    }

    fn sources(index: &TypeIndex, root: &str) -> (String, String) {
        let path = ModelPath::new(root);
        (
            index.from_wire(&path).unwrap().source(),
            index.to_wire(&path).unwrap().source(),
        )
    }

    fn events_graph() -> ModelGraph {
        ModelGraph::new()
            .with_model(
                "ev.Created",
                ModelDef::new()
                    .field("kind", TypeExpr::literal("created"))
                    .field("at", TypeExpr::datetime()),
            )
            .with_model(
                "ev.Deleted",
                ModelDef::new()
                    .field("kind", TypeExpr::literal("deleted"))
                    .field("reason", TypeExpr::str()),
            )
    }

    #[test]
    fn passthrough_fields_are_plain_accesses() {
        let graph = ModelGraph::new().with_model(
            "a.Opt",
            ModelDef::new()
                .field("key", TypeExpr::str())
                .field("val", TypeExpr::optional(TypeExpr::str()))
                .field("tags", TypeExpr::list(TypeExpr::str()))
                .field(
                    "u",
                    TypeExpr::union(vec![TypeExpr::none(), TypeExpr::int(), TypeExpr::str()]),
                ),
        );
        let index = index_for(&graph, "a.Opt");
        let (from, to) = sources(&index, "a.Opt");
        assert_eq!(
            from,
            "export function getOptFromWire(root: any): Opt {\n  return { key: root.key, val: root.val, tags: root.tags, u: root.u };\n}\n"
        );
        assert_eq!(
            to,
            "export function convertOptToWire(root: Opt): any {\n  return { key: root.key, val: root.val, tags: root.tags, u: root.u };\n}\n"
        );
    }

    #[test]
    fn datetime_converts_seconds() {
        let graph = ModelGraph::new().with_model(
            "a.Org",
            ModelDef::new()
                .field("created_at", TypeExpr::datetime())
                .field("deleted_at", TypeExpr::optional(TypeExpr::datetime())),
        );
        let index = index_for(&graph, "a.Org");
        let (from, to) = sources(&index, "a.Org");
        assert!(from.contains("created_at: new Date(root.created_at * 1000)"));
        assert!(from.contains(
            "deleted_at: root.deleted_at === null ? null : new Date(root.deleted_at * 1000)"
        ));
        assert!(to.contains("created_at: root.created_at.getTime() / 1000"));
        assert!(to.contains(
            "deleted_at: root.deleted_at === null ? null : root.deleted_at.getTime() / 1000"
        ));
    }

    #[test]
    fn nested_containers_number_lambdas_by_depth() {
        let graph = ModelGraph::new()
            .with_model(
                "a.User",
                ModelDef::new().field(
                    "deep",
                    TypeExpr::dict(
                        TypeExpr::str(),
                        TypeExpr::list(TypeExpr::model("a.Opt")),
                    ),
                ),
            )
            .with_model("a.Opt", ModelDef::new().field("key", TypeExpr::str()));
        let index = index_for(&graph, "a.User");
        let (from, to) = sources(&index, "a.User");
        assert!(from.contains(
            "deep: Object.fromEntries(Object.entries(root.deep as Record<string, any>).map(([k1, v1]) => [k1, v1.map((v2: any) => getOptFromWire(v2))]))"
        ));
        assert!(to.contains(
            "deep: Object.fromEntries(Object.entries(root.deep as Record<string, Array<Opt>>).map(([k1, v1]) => [k1, v1.map((v2: Opt) => convertOptToWire(v2))]))"
        ));
    }

    #[test]
    fn optional_list_of_models() {
        let graph = ModelGraph::new()
            .with_model(
                "a.Org",
                ModelDef::new().field(
                    "maybe_users",
                    TypeExpr::optional(TypeExpr::list(TypeExpr::model("a.User"))),
                ),
            )
            .with_model("a.User", ModelDef::new().field("id", TypeExpr::str()));
        let index = index_for(&graph, "a.Org");
        let (from, _) = sources(&index, "a.Org");
        assert!(from.contains(
            "maybe_users: root.maybe_users === null ? null : root.maybe_users.map((v2: any) => getUserFromWire(v2))"
        ));
    }

    #[test]
    fn union_of_models_dispatches_on_first_field() {
        let graph = events_graph().with_model(
            "ev.Log",
            ModelDef::new()
                .field(
                    "event",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Created"),
                        TypeExpr::model("ev.Deleted"),
                    ]),
                )
                .field(
                    "last",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Created"),
                        TypeExpr::model("ev.Deleted"),
                        TypeExpr::none(),
                    ]),
                ),
        );
        let index = index_for(&graph, "ev.Log");
        let (from, to) = sources(&index, "ev.Log");
        assert!(from.contains(
            "event: root.event.kind === \"created\" ? getCreatedFromWire(root.event) : root.event.kind === \"deleted\" ? getDeletedFromWire(root.event) : unreachable()"
        ));
        assert!(from.contains("last: root.last === null ? null : root.last.kind === \"created\""));
        assert!(to.contains("convertDeletedToWire(root.event) : unreachable()"));
        assert!(index.needs_unreachable());
    }

    #[test]
    fn duplicate_discriminant_is_ambiguous() {
        let graph = events_graph()
            .with_model(
                "ev.Again",
                ModelDef::new().field("kind", TypeExpr::literal("created")),
            )
            .with_model(
                "ev.Log",
                ModelDef::new().field(
                    "event",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Created"),
                        TypeExpr::model("ev.Again"),
                    ]),
                ),
            );
        let err = TypeIndex::register(&graph, &[ModelPath::new("ev.Log")]).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::AmbiguousDiscriminant { ref reason, .. } if reason.contains("share")
        ));
    }

    #[test]
    fn disagreeing_first_fields_are_ambiguous() {
        let graph = events_graph()
            .with_model(
                "ev.Other",
                ModelDef::new().field("type", TypeExpr::literal("other")),
            )
            .with_model(
                "ev.Log",
                ModelDef::new().field(
                    "event",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Created"),
                        TypeExpr::model("ev.Other"),
                    ]),
                ),
            );
        let err = TypeIndex::register(&graph, &[ModelPath::new("ev.Log")]).unwrap_err();
        assert!(matches!(err, CodegenError::AmbiguousDiscriminant { .. }));
    }

    #[test]
    fn non_literal_or_empty_variant_is_ambiguous() {
        let graph = events_graph()
            .with_model("ev.Plain", ModelDef::new().field("kind", TypeExpr::str()))
            .with_model("ev.Empty", ModelDef::new())
            .with_model(
                "ev.A",
                ModelDef::new().field(
                    "e",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Created"),
                        TypeExpr::model("ev.Plain"),
                    ]),
                ),
            )
            .with_model(
                "ev.B",
                ModelDef::new().field(
                    "e",
                    TypeExpr::union(vec![
                        TypeExpr::model("ev.Empty"),
                        TypeExpr::model("ev.Created"),
                    ]),
                ),
            );
        for root in ["ev.A", "ev.B"] {
            let err = TypeIndex::register(&graph, &[ModelPath::new(root)]).unwrap_err();
            assert!(matches!(err, CodegenError::AmbiguousDiscriminant { .. }), "{root}");
        }
    }

    #[test]
    fn bracket_access_for_non_identifier_fields() {
        let graph = ModelGraph::new().with_model(
            "a.H",
            ModelDef::new().field("x-request-id", TypeExpr::datetime()),
        );
        let index = index_for(&graph, "a.H");
        let (from, _) = sources(&index, "a.H");
        assert!(from.contains("\"x-request-id\": new Date(root[\"x-request-id\"] * 1000)"));
    }
}
