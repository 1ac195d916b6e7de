//! Unclassified model IR: type expressions, fields, models and routes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CodegenError, Result};
use crate::typescript::utils::snake_to_camel;

// =============================================================================
// Identities
// =============================================================================

/// Dotted model identity, e.g. `app.models.User`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelPath(String);

impl ModelPath {
    /// Wrap a dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Full dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dotted segment; this is the TypeScript name of the model.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

// =============================================================================
// Type Expressions
// =============================================================================

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `str`
    Str,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `bool`
    Bool,
    /// `url`, a string on both sides of the wire
    Url,
    /// `datetime`, epoch seconds on the wire, `Date` in TypeScript
    DateTime,
    /// `none`, the absence of a value
    None,
}

impl PrimitiveKind {
    /// Document keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Str => "str",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Url => "url",
            PrimitiveKind::DateTime => "datetime",
            PrimitiveKind::None => "none",
        }
    }

    /// Parse a document keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "str" => PrimitiveKind::Str,
            "int" => PrimitiveKind::Int,
            "float" => PrimitiveKind::Float,
            "bool" => PrimitiveKind::Bool,
            "url" => PrimitiveKind::Url,
            "datetime" => PrimitiveKind::DateTime,
            "none" => PrimitiveKind::None,
            _ => return None,
        })
    }

    /// Safe primitives cross the wire without conversion.
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Str
                | PrimitiveKind::Int
                | PrimitiveKind::Float
                | PrimitiveKind::Bool
                | PrimitiveKind::Url
        )
    }

    /// Kinds usable as mapping keys.
    pub fn is_string_like(self) -> bool {
        matches!(self, PrimitiveKind::Str | PrimitiveKind::Url)
    }
}

/// Literal value carried by a literal type or a field default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer
    Int(i64),
    /// String
    Str(String),
    /// `null`
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::Str(s) => write!(f, "{s:?}"),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Str(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

/// Enum tag: marks a string field as a member of a named TypeScript enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumTag {
    /// Enum name
    pub name: String,
    /// Values this field contributes to the enum
    pub values: Vec<String>,
}

/// Metadata attached to an annotated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// Contributes values to a TypeScript enum
    Enum(EnumTag),
    /// Opaque metadata; carried but ignored by generation
    Note(String),
}

/// An unclassified type expression as written by the model author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawTypeExpr")]
pub enum TypeExpr {
    /// Built-in scalar
    Primitive(PrimitiveKind),
    /// Single literal value
    Literal(LiteralValue),
    /// Homogeneous list
    List(Box<TypeExpr>),
    /// Mapping from key type to value type
    Dict(Box<TypeExpr>, Box<TypeExpr>),
    /// Union of members in declaration order
    Union(Vec<TypeExpr>),
    /// Inner type plus metadata
    Annotated(Box<TypeExpr>, Vec<Annotation>),
    /// Reference to a model in the graph
    Model(ModelPath),
}

impl TypeExpr {
    /// `str`
    pub fn str() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Str)
    }

    /// `int`
    pub fn int() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Int)
    }

    /// `float`
    pub fn float() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Float)
    }

    /// `bool`
    pub fn bool() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Bool)
    }

    /// `url`
    pub fn url() -> Self {
        TypeExpr::Primitive(PrimitiveKind::Url)
    }

    /// `datetime`
    pub fn datetime() -> Self {
        TypeExpr::Primitive(PrimitiveKind::DateTime)
    }

    /// `none`
    pub fn none() -> Self {
        TypeExpr::Primitive(PrimitiveKind::None)
    }

    /// Literal type.
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        TypeExpr::Literal(value.into())
    }

    /// `list[T]`
    pub fn list(elem: TypeExpr) -> Self {
        TypeExpr::List(Box::new(elem))
    }

    /// `dict[K, V]`
    pub fn dict(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Dict(Box::new(key), Box::new(value))
    }

    /// `A | B | ...`
    pub fn union(members: Vec<TypeExpr>) -> Self {
        TypeExpr::Union(members)
    }

    /// `T | none`
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Union(vec![inner, TypeExpr::none()])
    }

    /// Model reference.
    pub fn model(path: impl Into<ModelPath>) -> Self {
        TypeExpr::Model(path.into())
    }

    /// Annotated type.
    pub fn annotated(inner: TypeExpr, meta: Vec<Annotation>) -> Self {
        TypeExpr::Annotated(Box::new(inner), meta)
    }

    /// A `str` field contributing `value` to enum `name`.
    pub fn enum_tagged(name: impl Into<String>, value: impl Into<String>) -> Self {
        TypeExpr::annotated(
            TypeExpr::str(),
            vec![Annotation::Enum(EnumTag {
                name: name.into(),
                values: vec![value.into()],
            })],
        )
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(kind) => f.write_str(kind.keyword()),
            TypeExpr::Literal(value) => write!(f, "Literal[{value}]"),
            TypeExpr::List(elem) => write!(f, "list[{elem}]"),
            TypeExpr::Dict(key, value) => write!(f, "dict[{key}, {value}]"),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeExpr::Annotated(inner, meta) => {
                write!(f, "Annotated[{inner}")?;
                for annotation in meta {
                    match annotation {
                        Annotation::Enum(tag) => write!(f, ", enum {}", tag.name)?,
                        Annotation::Note(note) => write!(f, ", {note:?}")?,
                    }
                }
                f.write_str("]")
            }
            TypeExpr::Model(path) => f.write_str(path.short_name()),
        }
    }
}

/// Document form of a type expression: a bare keyword/model path or a
/// single-key compound map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeExpr {
    Name(String),
    Compound(Box<CompoundTypeExpr>),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum CompoundTypeExpr {
    List(TypeExpr),
    Dict((TypeExpr, TypeExpr)),
    Union(Vec<TypeExpr>),
    Optional(TypeExpr),
    Literal(LiteralValue),
    Model(ModelPath),
    Annotated(AnnotatedTypeExpr),
}

#[derive(Deserialize)]
struct AnnotatedTypeExpr {
    #[serde(rename = "type")]
    ty: TypeExpr,
    #[serde(default)]
    meta: Vec<Annotation>,
}

impl TryFrom<RawTypeExpr> for TypeExpr {
    type Error = String;

    fn try_from(raw: RawTypeExpr) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawTypeExpr::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err("empty type name".to_string());
                }
                Ok(PrimitiveKind::from_keyword(name)
                    .map_or_else(|| TypeExpr::model(name), TypeExpr::Primitive))
            }
            RawTypeExpr::Compound(compound) => Ok(match *compound {
                CompoundTypeExpr::List(elem) => TypeExpr::list(elem),
                CompoundTypeExpr::Dict((key, value)) => TypeExpr::dict(key, value),
                CompoundTypeExpr::Union(members) => TypeExpr::union(members),
                CompoundTypeExpr::Optional(inner) => TypeExpr::optional(inner),
                CompoundTypeExpr::Literal(value) => TypeExpr::Literal(value),
                CompoundTypeExpr::Model(path) => TypeExpr::Model(path),
                CompoundTypeExpr::Annotated(AnnotatedTypeExpr { ty, meta }) => {
                    TypeExpr::annotated(ty, meta)
                }
            }),
        }
    }
}

// =============================================================================
// Models
// =============================================================================

/// A declared model field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDef {
    /// Field name, used verbatim on both sides of the wire
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Default value, surfaced as documentation only
    #[serde(default, deserialize_with = "explicit_literal")]
    pub default: Option<LiteralValue>,
}

/// Keeps an explicit `default: null` distinct from a missing default.
fn explicit_literal<'de, D>(deserializer: D) -> std::result::Result<Option<LiteralValue>, D::Error>
where
    D: Deserializer<'de>,
{
    LiteralValue::deserialize(deserializer).map(Some)
}

/// A record type: an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelDef {
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ModelDef {
    /// Model without fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Append a field with a default value.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: TypeExpr,
        default: impl Into<LiteralValue>,
    ) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            default: Some(default.into()),
        });
        self
    }
}

/// All models known to a generation run, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ModelGraph {
    models: BTreeMap<ModelPath, ModelDef>,
}

impl ModelGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_model(mut self, path: impl Into<ModelPath>, model: ModelDef) -> Self {
        self.insert(path, model);
        self
    }

    /// Insert or replace a model.
    pub fn insert(&mut self, path: impl Into<ModelPath>, model: ModelDef) {
        self.models.insert(path.into(), model);
    }

    /// Look up a model.
    pub fn get(&self, path: &ModelPath) -> Option<&ModelDef> {
        self.models.get(path)
    }

    /// Look up a model that must exist.
    pub fn require(&self, path: &ModelPath) -> Result<&ModelDef> {
        self.get(path)
            .ok_or_else(|| CodegenError::UnknownModel(path.clone()))
    }

    /// Model paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &ModelPath> {
        self.models.keys()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the graph has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

// =============================================================================
// Routes
// =============================================================================

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[serde(alias = "get")]
    Get,
    /// POST
    #[serde(alias = "post")]
    Post,
    /// PUT
    #[serde(alias = "put")]
    Put,
    /// PATCH
    #[serde(alias = "patch")]
    Patch,
    /// DELETE
    #[serde(alias = "delete")]
    Delete,
    /// HEAD
    #[serde(alias = "head")]
    Head,
}

impl HttpMethod {
    /// Uppercase method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether `fetch` accepts a request body for this method.
    pub fn allows_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route metadata consumed by the route stub emitter.
///
/// An absent `match_info`, `body` or `response` model is the Empty model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDef {
    /// Server handler name; camelCased into the wrapper name
    pub handler: String,
    /// Explicit wrapper name
    #[serde(default)]
    pub ts_name: Option<String>,
    /// HTTP method
    pub method: HttpMethod,
    /// Path template with `{param}` placeholders
    pub path: String,
    /// Model holding the path parameters
    #[serde(default)]
    pub match_info: Option<ModelPath>,
    /// Request body model
    #[serde(default)]
    pub body: Option<ModelPath>,
    /// Response model
    #[serde(default)]
    pub response: Option<ModelPath>,
}

impl RouteDef {
    /// Route with Empty match-info, body and response.
    pub fn new(handler: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            ts_name: None,
            method,
            path: path.into(),
            match_info: None,
            body: None,
            response: None,
        }
    }

    /// Override the wrapper name.
    pub fn with_ts_name(mut self, name: impl Into<String>) -> Self {
        self.ts_name = Some(name.into());
        self
    }

    /// Set the match-info model.
    pub fn with_match_info(mut self, path: impl Into<ModelPath>) -> Self {
        self.match_info = Some(path.into());
        self
    }

    /// Set the body model.
    pub fn with_body(mut self, path: impl Into<ModelPath>) -> Self {
        self.body = Some(path.into());
        self
    }

    /// Set the response model.
    pub fn with_response(mut self, path: impl Into<ModelPath>) -> Self {
        self.response = Some(path.into());
        self
    }

    /// Name of the generated wrapper.
    pub fn ts_name(&self) -> String {
        self.ts_name
            .clone()
            .unwrap_or_else(|| snake_to_camel(&self.handler))
    }

    /// Models this route references, in match-info, body, response order.
    pub fn models(&self) -> impl Iterator<Item = &ModelPath> {
        [&self.match_info, &self.body, &self.response]
            .into_iter()
            .flatten()
    }
}
