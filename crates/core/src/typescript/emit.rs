//! Text rendering for the TypeScript AST.
//!
//! Every node implements [`Emit`]. Quoting, escaping and two-space indentation
//! happen here and nowhere else, so generators only ever build nodes.

use super::types::{
    BinOp, TemplatePart, TsExpr, TsFunction, TsLiteral, TsModule, TsParam, TsPrimitive, TsProp,
    TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{escape_js_string, escape_template_string, format_member_access, quote_if_needed};

/// A node that renders to TypeScript source.
pub trait Emit {
    /// Render the node.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(|i| i.emit()).collect::<Vec<_>>().join(sep)
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Undefined => "undefined".to_string(),
            TsPrimitive::Any => "any".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => format!("Array<{}>", inner.emit()),
            TsType::Union(types) => join(types, " | "),
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        format!("{}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        match &self.kind {
            TypeDefKind::Object { properties } => {
                if properties.is_empty() {
                    return format!("{export}type {} = {{}};\n", self.name);
                }
                let mut output = format!("{export}type {} = {{\n", self.name);
                for prop in properties {
                    if let Some(doc) = &prop.doc {
                        output.push_str(&format!("  /** {doc} */\n"));
                    }
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                output.push_str("};\n");
                output
            }
            TypeDefKind::Enum { members } => {
                if members.is_empty() {
                    return format!("{export}enum {} {{}}\n", self.name);
                }
                let mut output = format!("{export}enum {} {{\n", self.name);
                for member in members {
                    output.push_str(&format!(
                        "  {} = {},\n",
                        quote_if_needed(member),
                        TsLiteral::String(member.clone()).emit()
                    ));
                }
                output.push_str("}\n");
                output
            }
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::StrictEqual => "===".to_string(),
            BinOp::Mul => "*".to_string(),
            BinOp::Div => "/".to_string(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => {
                format!("{}({})", callee.emit(), join(args, ", "))
            }
            TsExpr::Arrow { params, body } => {
                let params_str = join(params, ", ");
                // An object literal body would parse as a block
                if matches!(**body, TsExpr::Object(_)) {
                    format!("({params_str}) => ({})", body.emit())
                } else {
                    format!("({params_str}) => {}", body.emit())
                }
            }
            TsExpr::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props
                        .iter()
                        .map(|(k, v)| format!("{}: {}", quote_if_needed(k), v.emit()))
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Member { object, prop } => format_member_access(&object.emit(), prop),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => escape_template_string(s),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Await(expr) => format!("await {}", expr.emit()),
            TsExpr::Not(expr) => match **expr {
                TsExpr::Ident(_) | TsExpr::Member { .. } | TsExpr::Call { .. } => {
                    format!("!{}", expr.emit())
                }
                _ => format!("!({})", expr.emit()),
            },
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::New { callee, args } => {
                format!("new {}({})", callee.emit(), join(args, ", "))
            }
            TsExpr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                format!("{} ? {} : {}", cond.emit(), then_expr.emit(), else_expr.emit())
            }
            TsExpr::Array(items) => format!("[{}]", join(items, ", ")),
            TsExpr::Cast { expr, ty } => format!("{} as {}", expr.emit(), ty.emit()),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{}: {}", self.name, opt, ty.emit()),
            None => format!("{}{}", self.name, opt),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::Const { name, ty, init } => {
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!("{prefix}const {name}{ty_str} = {};\n", init.emit())
            }
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{}return {};\n", prefix, e.emit()),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If { cond, then_body } => {
                let mut output = format!("{}if ({}) {{\n", prefix, cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Throw(expr) => format!("{}throw {};\n", prefix, expr.emit()),
            TsStmt::Raw(code) => {
                // Raw code is emitted as-is, with proper indentation for each line
                code.lines()
                    .map(|line| {
                        if line.is_empty() {
                            "\n".to_string()
                        } else {
                            format!("{prefix}{line}\n")
                        }
                    })
                    .collect()
            }
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

fn emit_doc(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut output = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            output.push_str(" *\n");
        } else {
            output.push_str(&format!(" * {line}\n"));
        }
    }
    output.push_str(" */\n");
    output
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        // Special case: empty name with Raw body = just emit the raw content
        // This is used for things like the ApiError class that don't fit the function AST
        if self.name.is_empty() {
            let mut output = String::new();
            for stmt in &self.body {
                if let TsStmt::Raw(code) = stmt {
                    output.push_str(code);
                    output.push('\n');
                } else {
                    output.push_str(&stmt.emit_indented(0));
                }
            }
            return output;
        }

        let mut output = emit_doc(&self.doc);

        if self.is_export {
            output.push_str("export ");
        }

        let params_str = join(&self.params, ", ");
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let async_str = if self.is_async { "async " } else { "" };

        output.push_str(&format!(
            "{}function {}({}){}",
            async_str, self.name, params_str, return_type_str
        ));
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push_str("}\n");
        }

        output
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.header {
            output.push_str(&format!("// {line}\n"));
        }
        if !self.header.is_empty() {
            output.push('\n');
        }

        for helper in &self.preamble {
            output.push_str(&helper.emit());
            output.push('\n');
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        for func in &self.functions {
            output.push_str(&func.emit());
            output.push('\n');
        }

        output
    }
}

// =============================================================================
// Tests
// =============================================================================
