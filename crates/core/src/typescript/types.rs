//! TypeScript IR types for code generation.
//!
//! This module defines the TypeScript representation the generators build:
//! - TsType: Types (primitives, arrays, unions, records, etc.)
//! - TsExpr: Expressions (identifiers, calls, arrows, ternaries, etc.)
//! - TsStmt / TsFunction / TsTypeDef / TsModule: declarations and the module

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, undefined, any
    Primitive(TsPrimitive),
    /// Array type: Array<T>
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Record type: Record<K, V>
    Record {
        /// Key type
        key: Box<TsType>,
        /// Value type
        value: Box<TsType>,
    },
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named type reference: "User", "Date", "Promise<void>"
    Ref(String),
}

impl TsType {
    /// Shorthand for a named reference.
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// Wrap this type in `T | null`, flattening an existing union.
    pub fn nullable(self) -> Self {
        let null = TsType::Primitive(TsPrimitive::Null);
        match self {
            TsType::Union(mut types) => {
                if !types.contains(&null) {
                    types.push(null);
                }
                TsType::Union(types)
            }
            TsType::Primitive(TsPrimitive::Null) => self,
            other => TsType::Union(vec![other, null]),
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// string
    String,
    /// number
    Number,
    /// boolean
    Boolean,
    /// null
    Null,
    /// undefined
    Undefined,
    /// any
    Any,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsProp {
    /// Property key
    pub name: String,
    /// Property type
    pub ty: TsType,
    /// Optional single-line doc comment rendered above the property
    pub doc: Option<String>,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsLiteral {
    /// "text"
    String(String),
    /// 42
    Int(i64),
    /// true / false
    Bool(bool),
    /// null
    Null,
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Function call: foo(a, b)
    Call {
        /// Called expression
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// Arrow function with an expression body: (x) => x.foo
    Arrow {
        /// Parameters
        params: Vec<TsParam>,
        /// Body expression
        body: Box<TsExpr>,
    },
    /// Object literal: { a: 1, b: 2 }
    Object(Vec<(String, TsExpr)>),
    /// Member access: foo.bar, or foo["bar-baz"] when the key is not an identifier
    Member {
        /// Accessed object
        object: Box<TsExpr>,
        /// Property name
        prop: String,
    },
    /// Template literal: `${foo}/bar`
    Template(Vec<TemplatePart>),
    /// Await expression: await fetch()
    Await(Box<TsExpr>),
    /// Logical not: !res.ok
    Not(Box<TsExpr>),
    /// Binary operation: a === b, a * 1000
    BinOp {
        /// Left operand
        left: Box<TsExpr>,
        /// Operator
        op: BinOp,
        /// Right operand
        right: Box<TsExpr>,
    },
    /// new Date(...)
    New {
        /// Constructor
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// Ternary/conditional: cond ? a : b
    Ternary {
        /// Condition
        cond: Box<TsExpr>,
        /// Value when the condition holds
        then_expr: Box<TsExpr>,
        /// Value otherwise
        else_expr: Box<TsExpr>,
    },
    /// Array literal: [a, b, c]
    Array(Vec<TsExpr>),
    /// Type cast: expr as Type
    Cast {
        /// Cast expression
        expr: Box<TsExpr>,
        /// Target type
        ty: TsType,
    },
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl TsExpr {
    /// Identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// `self.prop`
    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    /// `self(args...)`
    pub fn call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
        }
    }

    /// `self <op> right`
    pub fn bin(self, op: BinOp, right: TsExpr) -> Self {
        TsExpr::BinOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// `cond ? then_expr : else_expr`
    pub fn ternary(cond: TsExpr, then_expr: TsExpr, else_expr: TsExpr) -> Self {
        TsExpr::Ternary {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// ===
    StrictEqual,
    /// *
    Mul,
    /// /
    Div,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsParam {
    /// Parameter name or destructuring pattern
    pub name: String,
    /// Type annotation
    pub ty: Option<TsType>,
    /// Whether the parameter is optional (`name?: T`)
    pub optional: bool,
}

impl TsParam {
    /// Required parameter with a type annotation.
    pub fn typed(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    /// Required parameter without a type annotation.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            optional: false,
        }
    }
}

/// Template literal part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Static string part
    Static(String),
    /// Dynamic expression part: ${expr}
    Dynamic(TsExpr),
}

// =============================================================================
// Module-Level IR
// =============================================================================

/// Type definition kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefKind {
    /// type Foo = { ... };
    Object {
        /// Properties in declaration order
        properties: Vec<TsProp>,
    },
    /// enum Foo { a = "a", ... }
    Enum {
        /// String members, emitted as `member = "member"`
        members: Vec<String>,
    },
}

/// Type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsTypeDef {
    /// Declared name
    pub name: String,
    /// Declaration body
    pub kind: TypeDefKind,
    /// Whether the declaration carries `export`
    pub is_export: bool,
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsStmt {
    /// `const name: T = init;`
    Const {
        /// Variable name
        name: String,
        /// Optional type annotation
        ty: Option<TsType>,
        /// Initializer
        init: TsExpr,
    },
    /// Return statement
    Return(Option<TsExpr>),
    /// If statement
    If {
        /// Condition
        cond: TsExpr,
        /// Statements run when the condition holds
        then_body: Vec<TsStmt>,
    },
    /// Throw statement
    Throw(TsExpr),
    /// Raw code block (for complex patterns that don't fit the AST)
    Raw(String),
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsFunction {
    /// Function name; empty for raw blocks (see `Emit for TsFunction`)
    pub name: String,
    /// JSDoc lines, emitted as a `/** ... */` block
    pub doc: Vec<String>,
    /// Parameters
    pub params: Vec<TsParam>,
    /// Return type annotation
    pub return_type: Option<TsType>,
    /// Body statements
    pub body: Vec<TsStmt>,
    /// `async function`
    pub is_async: bool,
    /// `export function`
    pub is_export: bool,
}

impl TsFunction {
    /// A raw top-level block (class, helper) that doesn't fit the function AST.
    pub fn raw(code: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            doc: vec![],
            params: vec![],
            return_type: None,
            body: vec![TsStmt::Raw(code.into())],
            is_async: false,
            is_export: false,
        }
    }
}

/// Complete TypeScript module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsModule {
    /// Leading `//` comment lines
    pub header: Vec<String>,
    /// Helper blocks emitted before any declaration
    pub preamble: Vec<TsFunction>,
    /// Type definitions (enums, object types)
    pub types: Vec<TsTypeDef>,
    /// Functions and raw blocks
    pub functions: Vec<TsFunction>,
}
