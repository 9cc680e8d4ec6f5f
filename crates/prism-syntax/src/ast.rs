//! Syntax tree node types.
//!
//! The tree is owned (no arena): a parser builds it once per source unit and
//! hands it to the reflector, which only reads it. Only the parts of the
//! language relevant to declaration facts are modelled; function bodies keep
//! just enough structure to locate nested closures, anonymous classes and
//! `yield` expressions.

use crate::name::Name;
use prism_common::Span;
use std::sync::Arc;

// =============================================================================
// Files and statements
// =============================================================================

/// A parsed source unit.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SourceFile {
    pub path: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `namespace Foo;` (with following statements) or `namespace Foo { ... }`.
    Namespace(Namespace),
    Use(UseStatement),
    ClassLike(Arc<ClassLike>),
    Function(Arc<Function>),
    /// `const A = 1, B = 2;`
    Constant(Arc<ConstantStatement>),
    Expression(Expr),
    Return(Option<Expr>),
    Block(Vec<Statement>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Namespace {
    /// `None` for the global namespace block `namespace { ... }`.
    pub name: Option<Name>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UseKind {
    Class,
    Function,
    Constant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseStatement {
    pub kind: UseKind,
    pub items: Vec<UseItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseItem {
    pub name: Name,
    pub alias: Option<String>,
}

impl UseItem {
    /// The local name this import introduces.
    pub fn local_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.name.last_segment())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocComment {
    pub text: String,
    pub span: Span,
}

// =============================================================================
// Modifiers and attributes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

/// `#[A, B(1)]`
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeGroup {
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    /// Named argument label (`name: value`).
    pub name: Option<String>,
    pub value: Expr,
    pub spread: bool,
}

// =============================================================================
// Class-likes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassLike {
    pub kind: ClassLikeKind,
    /// `None` for `new class { ... }`.
    pub name: Option<String>,
    pub modifiers: Modifiers,
    /// Parent class for classes, parent interfaces for interfaces.
    pub extends: Vec<Name>,
    pub implements: Vec<Name>,
    /// Backing type of a backed enum.
    pub backing_type: Option<TypeHint>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Constant(ClassConstant),
    Property(Property),
    Method(Method),
    EnumCase(EnumCase),
    TraitUse(TraitUse),
}

/// `final public const int A = 1, B = 2;`
#[derive(Clone, Debug, PartialEq)]
pub struct ClassConstant {
    pub modifiers: Modifiers,
    pub type_hint: Option<TypeHint>,
    pub items: Vec<ConstantItem>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantItem {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `public readonly int $a = 1, $b;`
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub modifiers: Modifiers,
    pub type_hint: Option<TypeHint>,
    pub items: Vec<PropertyItem>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyItem {
    /// Property name without the leading `$`.
    pub name: String,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub modifiers: Modifiers,
    pub by_ref: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeHint>,
    /// `None` for abstract and interface methods.
    pub body: Option<Vec<Statement>>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumCase {
    pub name: String,
    pub value: Option<Expr>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

/// `use A, B { A::foo insteadof B; B::foo as protected bar; }`
#[derive(Clone, Debug, PartialEq)]
pub struct TraitUse {
    pub traits: Vec<Name>,
    pub adaptations: Vec<TraitAdaptation>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TraitAdaptation {
    /// `A::foo insteadof B, C;`
    Precedence {
        trait_name: Name,
        method: String,
        instead_of: Vec<Name>,
    },
    /// `[A::]foo as [visibility] [alias];`
    Alias {
        trait_name: Option<Name>,
        method: String,
        alias: Option<String>,
        visibility: Option<Visibility>,
    },
}

// =============================================================================
// Functions, parameters and constants
// =============================================================================

/// A named function or a closure / arrow function (`name == None`).
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub by_ref: bool,
    /// `static function () {}` closures.
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Statement>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Parameter name without the leading `$`.
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Expr>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Constructor property promotion modifiers (`public readonly int $x`).
    pub promotion: Option<Modifiers>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

/// Top-level `const A = 1;`
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantStatement {
    pub items: Vec<ConstantItem>,
    pub attributes: Vec<AttributeGroup>,
    pub doc_comment: Option<DocComment>,
    pub span: Span,
}

// =============================================================================
// Native type hints
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum TypeHint {
    /// A class name or a reserved type keyword (`int`, `self`, `mixed`, ...).
    Identifier(Name),
    /// `?T`
    Nullable(Box<TypeHint>),
    Union(Vec<TypeHint>),
    Intersection(Vec<TypeHint>),
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Concat,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Spaceship,
    Coalesce,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
    BitwiseNot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MagicConstant {
    Line,
    File,
    Dir,
    Namespace,
    Class,
    Trait,
    Function,
    Method,
    Property,
}

/// The class side of `X::CONST` and `new X`.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassRef {
    Named(Name),
    SelfRef,
    Static,
    Parent,
    /// `$obj::CONST` and friends; never foldable.
    Dynamic(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum NewTarget {
    Class(ClassRef),
    Anonymous(Arc<ClassLike>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub spread: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Array(Vec<ArrayItem>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `a ? b : c`; `then == None` for the short form `a ?: c`.
    Ternary {
        condition: Box<Expr>,
        then: Option<Box<Expr>>,
        otherwise: Box<Expr>,
    },
    ConstFetch(Name),
    /// `X::NAME`; `constant == "class"` for `X::class`.
    ClassConstFetch {
        class: ClassRef,
        constant: String,
    },
    New {
        target: NewTarget,
        arguments: Vec<Argument>,
    },
    /// `$a[k]`; `index == None` for `$a[]`.
    ArrayDim {
        array: Box<Expr>,
        index: Option<Box<Expr>>,
    },
    Magic {
        constant: MagicConstant,
        line: u32,
    },
    Closure(Arc<Function>),
    Yield {
        key: Option<Box<Expr>>,
        value: Option<Box<Expr>>,
    },
    YieldFrom(Box<Expr>),
    Variable(String),
    Call {
        callee: Box<Expr>,
        arguments: Vec<Argument>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    /// Visit direct child expressions.
    ///
    /// Closures and anonymous classes are not descended into; callers that
    /// need them match on `Expr::Closure` and `NewTarget::Anonymous`.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Expr)) {
        match self {
            Expr::Literal(_)
            | Expr::ConstFetch(_)
            | Expr::Magic { .. }
            | Expr::Closure(_)
            | Expr::Variable(_) => {}
            Expr::Array(items) => {
                for item in items {
                    if let Some(key) = &item.key {
                        f(key);
                    }
                    f(&item.value);
                }
            }
            Expr::Binary { left, right, .. } => {
                f(left);
                f(right);
            }
            Expr::Unary { operand, .. } => f(operand),
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                f(condition);
                if let Some(then) = then {
                    f(then);
                }
                f(otherwise);
            }
            Expr::ClassConstFetch { class, .. } => {
                if let ClassRef::Dynamic(inner) = class {
                    f(inner);
                }
            }
            Expr::New { target, arguments } => {
                if let NewTarget::Class(ClassRef::Dynamic(inner)) = target {
                    f(inner);
                }
                for argument in arguments {
                    f(&argument.value);
                }
            }
            Expr::ArrayDim { array, index } => {
                f(array);
                if let Some(index) = index {
                    f(index);
                }
            }
            Expr::Yield { key, value } => {
                if let Some(key) = key {
                    f(key);
                }
                if let Some(value) = value {
                    f(value);
                }
            }
            Expr::YieldFrom(inner) => f(inner),
            Expr::Call { callee, arguments } => {
                f(callee);
                for argument in arguments {
                    f(&argument.value);
                }
            }
            Expr::Assign { target, value } => {
                f(target);
                f(value);
            }
        }
    }
}

impl Statement {
    /// Visit expressions directly held by this statement and its nested
    /// blocks. Nested declarations are not descended into.
    pub fn for_each_expr(&self, f: &mut dyn FnMut(&Expr)) {
        match self {
            Statement::Expression(expr) | Statement::Return(Some(expr)) => f(expr),
            Statement::Block(statements) => {
                for statement in statements {
                    statement.for_each_expr(f);
                }
            }
            Statement::Return(None)
            | Statement::Namespace(_)
            | Statement::Use(_)
            | Statement::ClassLike(_)
            | Statement::Function(_)
            | Statement::Constant(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/ast_tests.rs"]
mod tests;
