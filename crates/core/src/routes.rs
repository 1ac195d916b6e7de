//! Typed `fetch` wrappers for routes.
//!
//! Besides one wrapper per route this module provides the helpers the wrappers
//! share (`ApiError`, `readErrorBody`, `encodeQuery`), the validation-error
//! models decoded into `ApiError.validation`, and the per-route form type: a
//! non-exported object holding every match-info and body field, widened so a
//! half-filled form can be typed before it is sent.

use crate::classify::{TypeDescriptor, is_optional, is_union_with_absence, peel_annotations};
use crate::error::{CodegenError, Result};
use crate::model::{ModelDef, ModelGraph, ModelPath, RouteDef, TypeExpr};
use crate::type_index::{ObjectType, ObjectTypeField, TypeIndex};
use crate::typescript::utils::{capitalize_first, is_valid_identifier};
use crate::typescript::{
    Emit, TemplatePart, TsExpr, TsFunction, TsLiteral, TsParam, TsPrimitive, TsStmt, TsType,
};
use crate::wire::{Direction, convert, from_wire_name, to_wire_name};

/// Error class thrown by every wrapper on a non-2xx response.
pub const API_ERROR_CLASS: &str = "ApiError";
/// Reads a failed response body as JSON, falling back to text.
pub const READ_ERROR_BODY_FN: &str = "readErrorBody";
/// Turns a wire object into `URLSearchParams` for GET/HEAD bodies.
pub const ENCODE_QUERY_FN: &str = "encodeQuery";
/// Shape check run before decoding a validation-error body.
pub const VALIDATION_GUARD_FN: &str = "isValidationErrorResponse";
/// One field-level validation failure reported by the server.
pub const VALIDATION_ERROR: &str = "tswire.ValidationError";
/// Body of a validation failure response.
pub const VALIDATION_ERROR_RESPONSE: &str = "tswire.ValidationErrorResponse";

/// Models registered whenever routes are generated.
pub fn validation_error_graph() -> ModelGraph {
    ModelGraph::new()
        .with_model(
            VALIDATION_ERROR,
            ModelDef::new()
                .field("type", TypeExpr::str())
                .field(
                    "loc",
                    TypeExpr::list(TypeExpr::union(vec![TypeExpr::str(), TypeExpr::int()])),
                )
                .field("msg", TypeExpr::str())
                .field("input", TypeExpr::str())
                .field(
                    "ctx",
                    TypeExpr::optional(TypeExpr::dict(TypeExpr::str(), TypeExpr::str())),
                ),
        )
        .with_model(
            VALIDATION_ERROR_RESPONSE,
            ModelDef::new().field("errors", TypeExpr::list(TypeExpr::model(VALIDATION_ERROR))),
        )
}

/// `ApiError`, emitted raw since the AST has no classes.
pub fn api_error_class() -> TsFunction {
    let response = ModelPath::new(VALIDATION_ERROR_RESPONSE);
    let response = response.short_name();
    TsFunction::raw(format!(
        r#"export class {API_ERROR_CLASS} extends Error {{
  status: number;
  statusText: string;
  body: unknown;
  validation: {response} | null;

  constructor(status: number, statusText: string, body: unknown) {{
    super(`HTTP ${{status}}: ${{statusText}}`);
    this.name = "{API_ERROR_CLASS}";
    this.status = status;
    this.statusText = statusText;
    this.body = body;
    this.validation = {VALIDATION_GUARD_FN}(body) ? {from_wire}(body) : null;
  }}
}}"#,
        from_wire = from_wire_name(response),
    ))
}

fn read_error_body_helper() -> TsFunction {
    TsFunction::raw(format!(
        r#"async function {READ_ERROR_BODY_FN}(res: Response): Promise<unknown> {{
  const text = await res.text();
  try {{
    return JSON.parse(text);
  }} catch {{
    return text;
  }}
}}"#
    ))
}

fn validation_guard_helper() -> TsFunction {
    TsFunction::raw(format!(
        r#"function {VALIDATION_GUARD_FN}(body: unknown): boolean {{
  return typeof body === "object" && body !== null && Array.isArray((body as {{ errors?: unknown }}).errors);
}}"#
    ))
}

fn encode_query_helper() -> TsFunction {
    TsFunction::raw(format!(
        r#"function {ENCODE_QUERY_FN}(value: Record<string, unknown>): URLSearchParams {{
  const query = new URLSearchParams();
  for (const [key, item] of Object.entries(value)) {{
    if (item === null || item === undefined) continue;
    query.append(key, typeof item === "object" ? JSON.stringify(item) : String(item));
  }}
  return query;
}}"#
    ))
}

fn sends_query(route: &RouteDef) -> bool {
    route.body.is_some() && !route.method.allows_body()
}

/// Helpers the wrappers of `routes` call, in declaration order.
pub fn route_helpers(routes: &[RouteDef]) -> Vec<TsFunction> {
    if routes.is_empty() {
        return vec![];
    }
    let mut helpers = vec![
        api_error_class(),
        validation_guard_helper(),
        read_error_body_helper(),
    ];
    if routes.iter().any(sends_query) {
        helpers.push(encode_query_helper());
    }
    helpers
}

/// Name of a route's form type: `getUser` -> `GetUserForm`.
pub fn form_type_name(route: &RouteDef) -> String {
    format!("{}Form", capitalize_first(&route.ts_name()))
}

// `T` -> `T | null | undefined`; already-nullable fields stay as declared
fn widen(field: &ObjectTypeField) -> TsType {
    if is_optional(&field.descriptor) || is_union_with_absence(&field.descriptor) {
        return field.ts_type.clone();
    }
    let undefined = TsType::Primitive(TsPrimitive::Undefined);
    match field.ts_type.clone().nullable() {
        TsType::Union(mut types) => {
            types.push(undefined);
            TsType::Union(types)
        }
        other => TsType::Union(vec![other, undefined]),
    }
}

/// Non-exported form type of a route: match-info fields then body fields.
///
/// `None` when the route has neither. A field present in both models must
/// render to the same type and is declared once.
pub fn route_form(index: &TypeIndex, route: &RouteDef) -> Result<Option<ObjectType>> {
    let match_info = route_object(index, route.match_info.as_ref())?;
    let body = route_object(index, route.body.as_ref())?;
    if match_info.is_none() && body.is_none() {
        return Ok(None);
    }

    let mut fields: Vec<ObjectTypeField> = Vec::new();
    for field in match_info.into_iter().chain(body).flat_map(|o| &o.fields) {
        let form_field = ObjectTypeField {
            name: field.name.clone(),
            descriptor: field.descriptor.clone(),
            ts_type: widen(field),
            default: None,
        };
        match fields.iter().find(|f| f.name == field.name) {
            Some(existing) if existing.ts_type == form_field.ts_type => {}
            Some(existing) => {
                return Err(CodegenError::InvalidRoute {
                    route: route.handler.clone(),
                    reason: format!(
                        "field `{}` is `{}` in match_info but `{}` in body",
                        field.name,
                        existing.ts_type.emit(),
                        form_field.ts_type.emit()
                    ),
                });
            }
            None => fields.push(form_field),
        }
    }

    Ok(Some(ObjectType {
        name: form_type_name(route),
        path: None,
        fields,
        exported: false,
    }))
}

// Path parameters are stringified; containers and models have no path form
fn is_path_scalar(desc: &TypeDescriptor) -> bool {
    match peel_annotations(desc) {
        TypeDescriptor::Optional(inner) => is_path_scalar(inner),
        TypeDescriptor::Primitive(_)
        | TypeDescriptor::Literal(_)
        | TypeDescriptor::UnionOfPrimitives { .. } => true,
        TypeDescriptor::List(_)
        | TypeDescriptor::Mapping(..)
        | TypeDescriptor::Annotated(..)
        | TypeDescriptor::Model(_)
        | TypeDescriptor::UnionOfModels { .. } => false,
    }
}

/// Piece of a route path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Literal text
    Static(String),
    /// `{name}` or `{name:regex}` placeholder
    Param(String),
}

/// Split a path template into static text and placeholders.
///
/// Placeholders may carry a regex after a colon (`{id:\d+}`); braces inside
/// the regex must balance.
pub fn parse_path(route: &RouteDef) -> Result<Vec<PathSegment>> {
    let invalid = |reason: String| CodegenError::InvalidRoute {
        route: route.handler.clone(),
        reason,
    };

    let mut segments = Vec::new();
    let mut text = String::new();
    let mut placeholder = String::new();
    let mut depth = 0_usize;

    for c in route.path.chars() {
        match (c, depth) {
            ('{', 0) => {
                if !text.is_empty() {
                    segments.push(PathSegment::Static(std::mem::take(&mut text)));
                }
                depth = 1;
            }
            ('}', 0) => return Err(invalid(format!("unbalanced `}}` in `{}`", route.path))),
            ('}', 1) => {
                let name = placeholder
                    .split_once(':')
                    .map_or(placeholder.as_str(), |(name, _)| name)
                    .trim()
                    .to_string();
                if name.is_empty() {
                    return Err(invalid(format!("empty placeholder in `{}`", route.path)));
                }
                segments.push(PathSegment::Param(name));
                placeholder.clear();
                depth = 0;
            }
            (c, 0) => text.push(c),
            (c, _) => {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                placeholder.push(c);
            }
        }
    }

    if depth != 0 {
        return Err(invalid(format!("unbalanced `{{` in `{}`", route.path)));
    }
    if !text.is_empty() {
        segments.push(PathSegment::Static(text));
    }
    Ok(segments)
}

fn route_object<'a>(index: &'a TypeIndex, model: Option<&ModelPath>) -> Result<Option<&'a ObjectType>> {
    model
        .map(|path| {
            index
                .object(path)
                .ok_or_else(|| CodegenError::UnknownModel(path.clone()))
        })
        .transpose()
}

/// Build the async wrapper for one route.
///
/// Every model the route references must already be registered in `index`.
pub fn emit_route(index: &TypeIndex, route: &RouteDef) -> Result<TsFunction> {
    let invalid = |reason: String| CodegenError::InvalidRoute {
        route: route.handler.clone(),
        reason,
    };

    let fn_name = route.ts_name();
    if !is_valid_identifier(&fn_name) {
        return Err(invalid(format!(
            "`{fn_name}` is not a valid TypeScript function name"
        )));
    }

    let match_info = route_object(index, route.match_info.as_ref())?;
    let body = route_object(index, route.body.as_ref())?;
    let response = route_object(index, route.response.as_ref())?;

    // Path parameters go through the to-wire conversion before stringifying
    let segments = parse_path(route)?;
    let mut url_parts = Vec::with_capacity(segments.len() + 2);
    for segment in &segments {
        let name = match segment {
            PathSegment::Static(text) => {
                url_parts.push(TemplatePart::Static(text.clone()));
                continue;
            }
            PathSegment::Param(name) => name,
        };
        let Some(match_info) = match_info else {
            return Err(invalid(format!(
                "path parameter `{name}` needs a match_info model"
            )));
        };
        let Some(field) = match_info.fields.iter().find(|f| &f.name == name) else {
            return Err(invalid(format!(
                "match_info model {} has no field `{name}`",
                match_info.name
            )));
        };
        if !is_path_scalar(&field.descriptor) {
            return Err(invalid(format!(
                "path parameter `{name}` has type `{}`, which cannot appear in a URL path",
                field.ts_type.emit()
            )));
        }
        let access = TsExpr::ident("matchInfo").member(name);
        let wire = convert(index, &field.descriptor, &access, 1, Direction::ToWire)
            .map_err(|err| err.located(format!("{}.{name}", match_info.name)))?
            .unwrap_or(access);
        url_parts.push(TemplatePart::Dynamic(
            TsExpr::ident("encodeURIComponent").call(vec![TsExpr::ident("String").call(vec![wire])]),
        ));
    }

    // Parameters and docs
    let mut doc = vec![format!("{} {}", route.method, route.path)];
    let mut params = Vec::new();
    let mut param_docs = Vec::new();
    for (arg, object) in [("matchInfo", match_info), ("body", body)] {
        let Some(object) = object else { continue };
        params.push(TsParam::typed(arg, TsType::named(&object.name)));
        for field in &object.fields {
            param_docs.push(format!(
                "@param {{{}}} {arg}.{}",
                field.ts_type.emit(),
                field.name
            ));
        }
    }
    params.push(TsParam {
        name: "options".into(),
        ty: Some(TsType::named("RequestInit")),
        optional: true,
    });
    if !param_docs.is_empty() {
        doc.push(String::new());
        doc.extend(param_docs);
    }

    let mut stmts = Vec::new();
    let mut fetch_options = format!("...options, method: \"{}\"", route.method);
    if let Some(body) = body {
        let wire_body = TsExpr::ident(to_wire_name(&body.name)).call(vec![TsExpr::ident("body")]);
        if route.method.allows_body() {
            fetch_options.push_str(
                ", headers: { \"Content-Type\": \"application/json\", ...options?.headers }",
            );
            fetch_options.push_str(&format!(", body: JSON.stringify({})", wire_body.emit()));
        } else {
            stmts.push(TsStmt::Const {
                name: "query".into(),
                ty: None,
                init: TsExpr::ident(ENCODE_QUERY_FN).call(vec![wire_body]),
            });
            url_parts.push(TemplatePart::Static("?".into()));
            url_parts.push(TemplatePart::Dynamic(TsExpr::ident("query")));
        }
    }

    let url = if url_parts
        .iter()
        .all(|part| matches!(part, TemplatePart::Static(_)))
    {
        let path: String = url_parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Static(text) => Some(text.as_str()),
                TemplatePart::Dynamic(_) => None,
            })
            .collect();
        TsExpr::Literal(TsLiteral::String(path))
    } else {
        TsExpr::Template(url_parts)
    };

    stmts.push(TsStmt::Const {
        name: "res".into(),
        ty: None,
        init: TsExpr::Await(Box::new(TsExpr::ident("fetch").call(vec![
            url,
            TsExpr::Raw(format!("{{ {fetch_options} }}")),
        ]))),
    });

    let res = || TsExpr::ident("res");
    stmts.push(TsStmt::If {
        cond: TsExpr::Not(Box::new(res().member("ok"))),
        then_body: vec![TsStmt::Throw(TsExpr::New {
            callee: Box::new(TsExpr::ident(API_ERROR_CLASS)),
            args: vec![
                res().member("status"),
                res().member("statusText"),
                TsExpr::Await(Box::new(TsExpr::ident(READ_ERROR_BODY_FN).call(vec![res()]))),
            ],
        })],
    });

    let return_type = match response {
        Some(response) => {
            stmts.push(TsStmt::Return(Some(TsExpr::ident(from_wire_name(&response.name)).call(
                vec![TsExpr::Await(Box::new(res().member("json").call(vec![])))],
            ))));
            format!("Promise<{}>", response.name)
        }
        None => {
            stmts.push(TsStmt::Return(None));
            "Promise<void>".to_string()
        }
    };

    Ok(TsFunction {
        name: fn_name,
        doc,
        params,
        return_type: Some(TsType::named(return_type)),
        body: stmts,
        is_async: true,
        is_export: true,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, ModelDef, ModelGraph, TypeExpr};

    fn graph() -> ModelGraph {
        ModelGraph::new()
            .with_model("app.UserMatch", ModelDef::new().field("user_id", TypeExpr::str()))
            .with_model(
                "app.UserPatch",
                ModelDef::new()
                    .field("name", TypeExpr::optional(TypeExpr::str()))
                    .field("seen_at", TypeExpr::datetime()),
            )
            .with_model(
                "app.User",
                ModelDef::new()
                    .field("user_id", TypeExpr::str())
                    .field("created_at", TypeExpr::datetime()),
            )
    }

    fn index_for(route: &RouteDef) -> TypeIndex {
        let roots: Vec<ModelPath> = route.models().cloned().collect();
        TypeIndex::register(&graph(), &roots).unwrap()
    }

    #[test]
    fn parses_placeholders() {
        let route = RouteDef::new("r", HttpMethod::Get, "/api/users/{user_id}/files/{path:.*}");
        assert_eq!(
            parse_path(&route).unwrap(),
            vec![
                PathSegment::Static("/api/users/".into()),
                PathSegment::Param("user_id".into()),
                PathSegment::Static("/files/".into()),
                PathSegment::Param("path".into()),
            ]
        );

        let route = RouteDef::new("r", HttpMethod::Get, r"/api/{id:\d{3}}");
        assert_eq!(
            parse_path(&route).unwrap()[1],
            PathSegment::Param("id".into())
        );
    }

    #[test]
    fn rejects_unbalanced_paths() {
        for path in ["/api/{id", "/api/id}", "/api/{}"] {
            let route = RouteDef::new("r", HttpMethod::Get, path);
            assert!(
                matches!(parse_path(&route), Err(CodegenError::InvalidRoute { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn get_route_with_match_info_and_response() {
        let route = RouteDef::new("get_user", HttpMethod::Get, "/api/users/{user_id}")
            .with_match_info("app.UserMatch")
            .with_response("app.User");
        let func = emit_route(&index_for(&route), &route).unwrap();
        let expected = r#"/**
 * GET /api/users/{user_id}
 *
 * @param {string} matchInfo.user_id
 */
export async function getUser(matchInfo: UserMatch, options?: RequestInit): Promise<User> {
  const res = await fetch(`/api/users/${encodeURIComponent(String(matchInfo.user_id))}`, { ...options, method: "GET" });
  if (!res.ok) {
    throw new ApiError(res.status, res.statusText, await readErrorBody(res));
  }
  return getUserFromWire(await res.json());
}
"#;
        assert_eq!(func.emit(), expected);
    }

    #[test]
    fn post_route_sends_wire_json_body() {
        let route = RouteDef::new("update_user", HttpMethod::Patch, "/api/users/{user_id}")
            .with_match_info("app.UserMatch")
            .with_body("app.UserPatch");
        let out = emit_route(&index_for(&route), &route).unwrap().emit();
        assert!(out.contains(
            "export async function updateUser(matchInfo: UserMatch, body: UserPatch, options?: RequestInit): Promise<void>"
        ));
        assert!(out.contains("@param {string | null} body.name"));
        assert!(out.contains("@param {Date} body.seen_at"));
        assert!(out.contains(
            "{ ...options, method: \"PATCH\", headers: { \"Content-Type\": \"application/json\", ...options?.headers }, body: JSON.stringify(convertUserPatchToWire(body)) }"
        ));
        assert!(out.contains("  return;\n"));
    }

    #[test]
    fn get_route_with_body_uses_query_string() {
        let route = RouteDef::new("search", HttpMethod::Get, "/api/search")
            .with_body("app.UserPatch")
            .with_ts_name("searchUsers");
        let out = emit_route(&index_for(&route), &route).unwrap().emit();
        assert!(out.contains("  const query = encodeQuery(convertUserPatchToWire(body));\n"));
        assert!(out.contains("fetch(`/api/search?${query}`, { ...options, method: \"GET\" })"));
        assert!(!out.contains("JSON.stringify(convertUserPatchToWire"));
    }

    #[test]
    fn empty_route_has_static_url() {
        let route = RouteDef::new("ping", HttpMethod::Post, "/api/ping");
        let out = emit_route(&TypeIndex::new(), &route).unwrap().emit();
        assert!(out.contains("export async function ping(options?: RequestInit): Promise<void>"));
        assert!(out.contains("fetch(\"/api/ping\", { ...options, method: \"POST\" })"));
    }

    #[test]
    fn path_params_need_match_info_fields() {
        let route = RouteDef::new("get_user", HttpMethod::Get, "/api/users/{user_id}");
        let err = emit_route(&TypeIndex::new(), &route).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidRoute { .. }));

        let route = RouteDef::new("get_user", HttpMethod::Get, "/api/users/{id}")
            .with_match_info("app.UserMatch");
        let err = emit_route(&index_for(&route), &route).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidRoute { ref reason, .. } if reason.contains("no field `id`")
        ));
    }

    #[test]
    fn invalid_ts_name_is_rejected() {
        let route = RouteDef::new("x", HttpMethod::Get, "/").with_ts_name("delete");
        let err = emit_route(&TypeIndex::new(), &route).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidRoute { .. }));
    }

    #[test]
    fn unregistered_model_is_unknown() {
        let route = RouteDef::new("x", HttpMethod::Get, "/").with_response("app.User");
        let err = emit_route(&TypeIndex::new(), &route).unwrap_err();
        assert_eq!(err, CodegenError::UnknownModel(ModelPath::new("app.User")));
    }

    #[test]
    fn datetime_path_parameter_is_sent_as_wire_seconds() {
        let graph = ModelGraph::new().with_model(
            "app.DayMatch",
            ModelDef::new()
                .field("day", TypeExpr::datetime())
                .field("slot", TypeExpr::optional(TypeExpr::datetime())),
        );
        let index = TypeIndex::register(&graph, &[ModelPath::new("app.DayMatch")]).unwrap();
        let route = RouteDef::new("get_day", HttpMethod::Get, "/api/days/{day}/{slot}")
            .with_match_info("app.DayMatch");
        let out = emit_route(&index, &route).unwrap().emit();
        assert!(out.contains(
            "`/api/days/${encodeURIComponent(String(matchInfo.day.getTime() / 1000))}/${encodeURIComponent(String(matchInfo.slot === null ? null : matchInfo.slot.getTime() / 1000))}`"
        ));
    }

    #[test]
    fn container_path_parameter_is_rejected() {
        let graph = ModelGraph::new().with_model(
            "app.TagsMatch",
            ModelDef::new().field("tags", TypeExpr::list(TypeExpr::str())),
        );
        let index = TypeIndex::register(&graph, &[ModelPath::new("app.TagsMatch")]).unwrap();
        let route = RouteDef::new("by_tags", HttpMethod::Get, "/api/tags/{tags}")
            .with_match_info("app.TagsMatch");
        let err = emit_route(&index, &route).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidRoute { ref reason, .. } if reason.contains("cannot appear in a URL path")
        ));
    }

    #[test]
    fn form_type_merges_match_info_and_body() {
        let route = RouteDef::new("update_user", HttpMethod::Patch, "/api/users/{user_id}")
            .with_match_info("app.UserMatch")
            .with_body("app.UserPatch");
        let form = route_form(&index_for(&route), &route).unwrap().unwrap();
        assert!(!form.exported);
        assert_eq!(form.path, None);
        assert_eq!(
            form.to_type_def().emit(),
            "type UpdateUserForm = {\n  user_id: string | null | undefined;\n  name: string | null;\n  seen_at: Date | null | undefined;\n};\n"
        );
    }

    #[test]
    fn form_type_declares_shared_fields_once() {
        let graph = graph().with_model(
            "app.Rename",
            ModelDef::new()
                .field("user_id", TypeExpr::str())
                .field("name", TypeExpr::str()),
        );
        let route = RouteDef::new("rename", HttpMethod::Post, "/api/users/{user_id}/name")
            .with_match_info("app.UserMatch")
            .with_body("app.Rename");
        let roots: Vec<ModelPath> = route.models().cloned().collect();
        let index = TypeIndex::register(&graph, &roots).unwrap();
        let form = route_form(&index, &route).unwrap().unwrap();
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "name"]);

        let graph = graph.with_model(
            "app.Renumber",
            ModelDef::new().field("user_id", TypeExpr::int()),
        );
        let route = route.with_body("app.Renumber");
        let roots: Vec<ModelPath> = route.models().cloned().collect();
        let index = TypeIndex::register(&graph, &roots).unwrap();
        let err = route_form(&index, &route).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidRoute { ref reason, .. } if reason.contains("`user_id`")
        ));
    }

    #[test]
    fn route_without_inputs_has_no_form() {
        let route = RouteDef::new("ping", HttpMethod::Post, "/api/ping");
        assert_eq!(route_form(&TypeIndex::new(), &route).unwrap(), None);
    }

    #[test]
    fn helpers_follow_the_routes() {
        assert!(route_helpers(&[]).is_empty());

        let post = RouteDef::new("ping", HttpMethod::Post, "/api/ping").with_body("app.User");
        let helpers: Vec<String> = route_helpers(std::slice::from_ref(&post))
            .iter()
            .map(|h| h.emit())
            .collect();
        assert_eq!(helpers.len(), 3);
        assert!(helpers[0].starts_with("export class ApiError extends Error {"));
        assert!(helpers[0].contains(
            "this.validation = isValidationErrorResponse(body) ? getValidationErrorResponseFromWire(body) : null;"
        ));
        assert!(helpers[2].starts_with("async function readErrorBody(res: Response): Promise<unknown> {"));

        let search = RouteDef::new("search", HttpMethod::Get, "/api/search").with_body("app.User");
        let helpers = route_helpers(&[post, search]);
        assert_eq!(helpers.len(), 4);
        assert!(helpers[3].emit().starts_with("function encodeQuery("));
    }

    #[test]
    fn validation_error_models_register() {
        let index = TypeIndex::register(
            &validation_error_graph(),
            &[ModelPath::new(VALIDATION_ERROR_RESPONSE)],
        )
        .unwrap();
        let names: Vec<&str> = index.objects().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["ValidationErrorResponse", "ValidationError"]);
        assert_eq!(
            index
                .object_by_name("ValidationError")
                .unwrap()
                .to_type_def()
                .emit(),
            "export type ValidationError = {\n  type: string;\n  loc: Array<string | number>;\n  msg: string;\n  input: string;\n  ctx: Record<string, string> | null;\n};\n"
        );
    }
}
