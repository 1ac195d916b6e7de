//! Generation pipeline: model graph + routes -> one TypeScript module.
//!
//! Module layout, in order: header comment, preamble helpers (`ApiError` and
//! the fetch helpers when there are routes, `unreachable` when a union of
//! models is dispatched), enum declarations, object types, route form types,
//! from-wire functions, to-wire functions, route wrappers.

use std::collections::BTreeMap;

use tracing::{debug, debug_span};

use crate::error::{CodegenError, Result};
use crate::model::{ModelGraph, ModelPath, RouteDef, SchemaDocument};
use crate::routes::{
    VALIDATION_ERROR_RESPONSE, emit_route, form_type_name, route_form, route_helpers,
    validation_error_graph,
};
use crate::type_index::TypeIndex;
use crate::typescript::{Emit, TsFunction, TsModule};
use crate::wire::UNREACHABLE_FN;

/// Header line of every generated file.
pub const GENERATED_HEADER: &str = "This file is generated by tswire. Do not edit.";

/// Generated module plus a few counts for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// TypeScript source
    pub code: String,
    /// Declared object types, including the validation-error types added
    /// for routes
    pub model_count: usize,
    /// Declared enums
    pub enum_count: usize,
    /// Route wrappers
    pub route_count: usize,
}

fn unreachable_helper() -> TsFunction {
    TsFunction::raw(format!(
        r#"function {UNREACHABLE_FN}(): never {{
  throw new Error("unreachable: value matched no union variant");
}}"#
    ))
}

// Route wrappers and form types share the module namespace with models,
// wire functions, enums and helpers.
fn check_route_names(index: &TypeIndex, routes: &[RouteDef]) -> Result<()> {
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    for route in routes {
        let mut names = vec![route.ts_name()];
        if route.match_info.is_some() || route.body.is_some() {
            names.push(form_type_name(route));
        }
        for name in names {
            let owner = index
                .name_owner(&name)
                .map(str::to_string)
                .or_else(|| claimed.get(&name).map(|handler| format!("route {handler}")));
            if let Some(owner) = owner {
                return Err(CodegenError::InvalidRoute {
                    route: route.handler.clone(),
                    reason: format!("`{name}` is already declared by {owner}"),
                });
            }
            claimed.insert(name, &route.handler);
        }
    }
    Ok(())
}

/// Assemble the module AST for a populated index.
pub fn build_module(index: &TypeIndex, routes: &[RouteDef]) -> Result<TsModule> {
    check_route_names(index, routes)?;

    let mut module = TsModule {
        header: vec![GENERATED_HEADER.to_string()],
        ..TsModule::default()
    };

    module.preamble.extend(route_helpers(routes));
    if index.needs_unreachable() {
        module.preamble.push(unreachable_helper());
    }

    module.types.extend(index.enums().to_type_defs());
    module.types.extend(index.objects().map(|o| o.to_type_def()));
    for route in routes {
        if let Some(form) = route_form(index, route)? {
            module.types.push(form.to_type_def());
        }
    }

    module
        .functions
        .extend(index.from_wire_functions().map(|f| f.function.clone()));
    module
        .functions
        .extend(index.to_wire_functions().map(|f| f.function.clone()));
    for route in routes {
        module.functions.push(emit_route(index, route)?);
    }

    Ok(module)
}

/// Generate TypeScript for `roots` and `routes`.
///
/// Models referenced by routes are registered after the roots.
pub fn generate(graph: &ModelGraph, roots: &[ModelPath], routes: &[RouteDef]) -> Result<String> {
    generate_output(graph, roots, routes).map(|output| output.code)
}

/// Generate TypeScript for a whole schema document.
pub fn generate_document(document: &SchemaDocument) -> Result<Output> {
    generate_output(document.graph(), &document.roots(), &document.routes)
}

fn generate_output(graph: &ModelGraph, roots: &[ModelPath], routes: &[RouteDef]) -> Result<Output> {
    let span = debug_span!("generate", roots = roots.len(), routes = routes.len());
    let _guard = span.enter();

    let mut all_roots: Vec<ModelPath> = roots.to_vec();
    for path in routes.iter().flat_map(|route| route.models()) {
        if !all_roots.contains(path) {
            all_roots.push(path.clone());
        }
    }

    let mut index = TypeIndex::register(graph, &all_roots)?;
    if !routes.is_empty() {
        index.add_root(
            &validation_error_graph(),
            &ModelPath::new(VALIDATION_ERROR_RESPONSE),
        )?;
    }
    let module = build_module(&index, routes)?;
    let code = module.emit();

    let output = Output {
        code,
        model_count: index.len(),
        enum_count: index.enums().len(),
        route_count: routes.len(),
    };
    debug!(
        models = output.model_count,
        enums = output.enum_count,
        routes = output.route_count,
        bytes = output.code.len(),
        "generated TypeScript module"
    );
    Ok(output)
}
