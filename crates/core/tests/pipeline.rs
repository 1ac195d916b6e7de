//! End-to-end tests for the generation pipeline.
//!
//! Each test builds a realistic model graph (users/orgs, discriminated events,
//! cycles) and checks properties of the emitted TypeScript module.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use tswire_core::model::{HttpMethod, ModelDef, ModelGraph, ModelPath, RouteDef, TypeExpr};
use tswire_core::{CodegenError, SchemaDocument, generate, generate_document};

fn model(path: &str) -> TypeExpr {
    TypeExpr::model(path)
}

fn org_graph() -> ModelGraph {
    ModelGraph::new()
        .with_model(
            "app.models.Opt",
            ModelDef::new()
                .field("key", TypeExpr::str())
                .field("val", TypeExpr::optional(TypeExpr::str())),
        )
        .with_model(
            "app.models.User",
            ModelDef::new()
                .field("user_id", TypeExpr::str())
                .field("name", TypeExpr::optional(TypeExpr::str()))
                .field("roles", TypeExpr::list(TypeExpr::enum_tagged("Role", "member")))
                .field(
                    "options",
                    TypeExpr::dict(TypeExpr::str(), model("app.models.Opt")),
                )
                .field(
                    "opt_union",
                    TypeExpr::union(vec![TypeExpr::none(), TypeExpr::int(), TypeExpr::str()]),
                ),
        )
        .with_model(
            "app.models.Org",
            ModelDef::new()
                .field("org_id", TypeExpr::str())
                .field("created_at", TypeExpr::datetime())
                .field("owner_role", TypeExpr::enum_tagged("Role", "admin"))
                .field("users", TypeExpr::list(model("app.models.User")))
                .field(
                    "maybe_users",
                    TypeExpr::optional(TypeExpr::list(model("app.models.User"))),
                ),
        )
        .with_model(
            "app.routes.OrgMatch",
            ModelDef::new().field("org_id", TypeExpr::str()),
        )
}

fn org_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("get_org", HttpMethod::Get, "/api/orgs/{org_id}")
            .with_match_info("app.routes.OrgMatch")
            .with_response("app.models.Org"),
        RouteDef::new("update_user", HttpMethod::Post, "/api/users")
            .with_body("app.models.User"),
    ]
}

fn position(code: &str, needle: &str) -> usize {
    code.find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{code}"))
}

#[test]
fn generation_is_deterministic() {
    let roots = [ModelPath::new("app.models.Org")];
    let first = generate(&org_graph(), &roots, &org_routes()).unwrap();
    let second = generate(&org_graph(), &roots, &org_routes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn module_sections_are_ordered() {
    let code = generate(&org_graph(), &[ModelPath::new("app.models.Org")], &org_routes()).unwrap();

    let header = position(&code, "// This file is generated by tswire");
    let api_error = position(&code, "export class ApiError extends Error");
    let role = position(&code, "export enum Role {");
    let org = position(&code, "export type Org = {");
    let user = position(&code, "export type User = {");
    let opt = position(&code, "export type Opt = {");
    let org_match = position(&code, "export type OrgMatch = {");
    let form = position(&code, "type GetOrgForm = {");
    let from_org = position(&code, "export function getOrgFromWire(root: any): Org");
    let to_org = position(&code, "export function convertOrgToWire(root: Org): any");
    let route = position(&code, "export async function getOrg(");

    assert!(header < api_error);
    assert!(api_error < role);
    assert!(role < org);
    // depth-first from the root, then route models
    assert!(org < user && user < opt && opt < org_match);
    assert!(org_match < form && form < from_org);
    assert!(from_org < to_org);
    assert!(to_org < route);

    // no union of models, no helper
    assert!(!code.contains("function unreachable"));
}

#[test]
fn field_order_is_preserved() {
    let code = generate(&org_graph(), &[ModelPath::new("app.models.Org")], &[]).unwrap();
    let decl = &code[position(&code, "export type Org = {")..];
    let fields = ["org_id", "created_at", "owner_role", "users", "maybe_users"];
    let offsets: Vec<usize> = fields
        .iter()
        .map(|f| position(decl, &format!("  {f}: ")))
        .collect();
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));

    let init = &code[position(&code, "function getOrgFromWire")..];
    let offsets: Vec<usize> = fields
        .iter()
        .map(|f| position(init, &format!("{f}: ")))
        .collect();
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn object_types_render_fields() {
    let code = generate(&org_graph(), &[ModelPath::new("app.models.Org")], &[]).unwrap();
    assert!(code.contains(
        "export type User = {\n  user_id: string;\n  name: string | null;\n  roles: Array<string>;\n  options: Record<string, Opt>;\n  opt_union: number | string | null;\n};\n"
    ));
    assert!(code.contains("  created_at: Date;\n"));
    assert!(code.contains("  maybe_users: Array<User> | null;\n"));
}

#[test]
fn enums_are_collected_sorted_and_deduplicated() {
    let code = generate(&org_graph(), &[ModelPath::new("app.models.Org")], &[]).unwrap();
    assert!(code.contains("export enum Role {\n  admin = \"admin\",\n  member = \"member\",\n}\n"));
    assert_eq!(code.matches("export enum Role").count(), 1);
}

#[test]
fn optional_and_union_pass_through() {
    let code = generate(&org_graph(), &[ModelPath::new("app.models.Org")], &[]).unwrap();
    assert!(code.contains("name: root.name"));
    assert!(code.contains("opt_union: root.opt_union"));
    assert!(code.contains("roles: root.roles"));
    assert!(code.contains(
        "maybe_users: root.maybe_users === null ? null : root.maybe_users.map((v2: any) => getUserFromWire(v2))"
    ));
    assert!(code.contains(
        "maybe_users: root.maybe_users === null ? null : root.maybe_users.map((v2: User) => convertUserToWire(v2))"
    ));
}

#[test]
fn cyclic_models_are_declared_once() {
    let graph = ModelGraph::new()
        .with_model(
            "tree.Node",
            ModelDef::new()
                .field("name", TypeExpr::str())
                .field("children", TypeExpr::list(model("tree.Node")))
                .field("owner", TypeExpr::optional(model("tree.Owner"))),
        )
        .with_model(
            "tree.Owner",
            ModelDef::new()
                .field("root", model("tree.Node"))
                .field("since", TypeExpr::datetime()),
        );
    let code = generate(&graph, &[ModelPath::new("tree.Node"), ModelPath::new("tree.Owner")], &[])
        .unwrap();
    assert_eq!(code.matches("export type Node = {").count(), 1);
    assert_eq!(code.matches("export type Owner = {").count(), 1);
    assert_eq!(code.matches("function getNodeFromWire(").count(), 1);
    assert!(code.contains("children: root.children.map((v1: any) => getNodeFromWire(v1))"));
    assert!(code.contains("owner: root.owner === null ? null : getOwnerFromWire(root.owner)"));
}

#[test]
fn discriminated_union_dispatch() {
    let graph = ModelGraph::new()
        .with_model(
            "ev.Created",
            ModelDef::new()
                .field("kind", TypeExpr::literal("created"))
                .field("at", TypeExpr::datetime()),
        )
        .with_model(
            "ev.Renamed",
            ModelDef::new()
                .field("kind", TypeExpr::literal("renamed"))
                .field("name", TypeExpr::str()),
        )
        .with_model(
            "ev.Feed",
            ModelDef::new().field(
                "events",
                TypeExpr::list(TypeExpr::union(vec![model("ev.Created"), model("ev.Renamed")])),
            ),
        );
    let code = generate(&graph, &[ModelPath::new("ev.Feed")], &[]).unwrap();

    assert!(code.contains("function unreachable(): never {"));
    assert!(code.contains(
        "events: root.events.map((v1: any) => v1.kind === \"created\" ? getCreatedFromWire(v1) : v1.kind === \"renamed\" ? getRenamedFromWire(v1) : unreachable())"
    ));
    assert!(code.contains(
        "events: root.events.map((v1: Created | Renamed) => v1.kind === \"created\" ? convertCreatedToWire(v1) : v1.kind === \"renamed\" ? convertRenamedToWire(v1) : unreachable())"
    ));
    assert!(code.contains("  events: Array<Created | Renamed>;\n"));
    assert!(code.contains("  kind: \"created\";\n"));
}

#[test]
fn errors_abort_without_output() {
    let graph = ModelGraph::new().with_model(
        "a.Bad",
        ModelDef::new().field(
            "mixed",
            TypeExpr::union(vec![model("a.Bad"), TypeExpr::str()]),
        ),
    );
    let err = generate(&graph, &[ModelPath::new("a.Bad")], &[]).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedTypeShape { ref location, .. } if location == "Bad.mixed"
    ));
}

#[test]
fn routes_register_their_models() {
    let code = generate(&org_graph(), &[], &org_routes()).unwrap();
    assert!(code.contains("export type OrgMatch = {"));
    assert!(code.contains("export type Org = {"));
    assert!(code.contains(
        "export async function updateUser(body: User, options?: RequestInit): Promise<void>"
    ));
    assert!(code.contains("body: JSON.stringify(convertUserToWire(body))"));
    assert!(code.contains("return getOrgFromWire(await res.json());"));
}

#[test]
fn schema_document_end_to_end() {
    let doc = SchemaDocument::from_yaml(
        r#"
models:
  shop.Item:
    fields:
      - { name: sku, type: str }
      - { name: price, type: float, default: 0 }
      - { name: tags, type: { dict: [str, { list: str }] } }
      - { name: restocked_at, type: { optional: datetime } }
  shop.ItemMatch:
    fields:
      - { name: sku, type: str }
routes:
  - handler: get_item
    method: GET
    path: "/api/items/{sku}"
    match_info: shop.ItemMatch
    response: shop.Item
"#,
    )
    .unwrap();
    let output = generate_document(&doc).unwrap();
    // the two schema models plus ValidationError and ValidationErrorResponse
    assert_eq!(output.model_count, 4);
    assert_eq!(output.enum_count, 0);
    assert_eq!(output.route_count, 1);
    assert!(output.code.contains("  /** @default 0 */\n  price: number;\n"));
    assert!(output.code.contains("tags: root.tags,"));
    assert!(output.code.contains(
        "restocked_at: root.restocked_at === null ? null : new Date(root.restocked_at * 1000)"
    ));
    assert!(output.code.contains("export async function getItem(matchInfo: ItemMatch"));
}

#[test]
fn routes_declare_validation_errors_and_forms() {
    let code = generate(&org_graph(), &[], &org_routes()).unwrap();
    assert!(code.contains("  validation: ValidationErrorResponse | null;\n"));
    assert!(code.contains("export type ValidationErrorResponse = {\n  errors: Array<ValidationError>;\n};\n"));
    assert!(code.contains("export function getValidationErrorResponseFromWire(root: any): ValidationErrorResponse"));
    assert!(code.contains("async function readErrorBody(res: Response): Promise<unknown> {"));
    assert!(code.contains("throw new ApiError(res.status, res.statusText, await readErrorBody(res));"));
    // no GET/HEAD route sends a body
    assert!(!code.contains("function encodeQuery("));

    assert!(code.contains("\ntype GetOrgForm = {\n  org_id: string | null | undefined;\n};\n"));
    assert!(code.contains("\ntype UpdateUserForm = {\n  user_id: string | null | undefined;\n  name: string | null;\n"));
    assert!(!code.contains("export type GetOrgForm"));
}

#[test]
fn model_shadowing_a_global_is_a_conflict() {
    let graph = ModelGraph::new()
        .with_model(
            "app.Event",
            ModelDef::new()
                .field("at", TypeExpr::datetime())
                .field("d", model("app.Date")),
        )
        .with_model("app.Date", ModelDef::new().field("day", TypeExpr::int()));
    let err = generate(&graph, &[ModelPath::new("app.Event")], &[]).unwrap_err();
    assert!(matches!(err, CodegenError::ModelNameConflict { ref name, .. } if name == "Date"));
}

#[test]
fn model_shadowing_a_helper_is_a_conflict() {
    let graph = ModelGraph::new()
        .with_model("app.ApiError", ModelDef::new().field("code", TypeExpr::int()));
    let routes = [RouteDef::new("fail", HttpMethod::Get, "/api/fail").with_response("app.ApiError")];
    let err = generate(&graph, &[], &routes).unwrap_err();
    assert_eq!(
        err,
        CodegenError::ModelNameConflict {
            name: "ApiError".into(),
            first: "a generated helper".into(),
            second: "app.ApiError".into(),
        }
    );
}

#[test]
fn model_named_like_validation_error_is_a_conflict() {
    let graph = ModelGraph::new().with_model("app.ValidationError", ModelDef::new());
    let routes = [RouteDef::new("check", HttpMethod::Post, "/api/check").with_body("app.ValidationError")];
    let err = generate(&graph, &[], &routes).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::ModelNameConflict { ref name, ref first, .. }
            if name == "ValidationError" && first == "app.ValidationError"
    ));

    // without routes the name is free
    assert!(generate(&graph, &[ModelPath::new("app.ValidationError")], &[]).is_ok());
}

#[test]
fn duplicate_route_names_are_rejected() {
    let routes = [
        RouteDef::new("get_org", HttpMethod::Get, "/api/orgs/{org_id}")
            .with_match_info("app.routes.OrgMatch"),
        RouteDef::new("get_org", HttpMethod::Get, "/api/v2/orgs/{org_id}")
            .with_match_info("app.routes.OrgMatch"),
    ];
    let err = generate(&org_graph(), &[], &routes).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::InvalidRoute { ref reason, .. }
            if reason == "`getOrg` is already declared by route get_org"
    ));
}

#[test]
fn route_named_like_a_wire_function_is_rejected() {
    let routes = [
        RouteDef::new("get_user", HttpMethod::Get, "/api/user").with_response("app.models.User"),
        RouteDef::new("raw_user", HttpMethod::Get, "/api/raw").with_ts_name("getUserFromWire"),
    ];
    let err = generate(&org_graph(), &[], &routes).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::InvalidRoute { ref route, ref reason }
            if route == "raw_user" && reason.contains("from-wire function of app.models.User")
    ));
}

#[test]
fn route_named_like_a_model_is_rejected() {
    let routes = [RouteDef::new("user", HttpMethod::Get, "/api/me")
        .with_ts_name("User")
        .with_response("app.models.User")];
    let err = generate(&org_graph(), &[], &routes).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::InvalidRoute { ref reason, .. } if reason.contains("app.models.User")
    ));
}
