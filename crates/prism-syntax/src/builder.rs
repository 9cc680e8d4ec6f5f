//! Fluent builders for syntax trees.
//!
//! Hosts that already own a parser convert its output into [`crate::ast`]
//! directly. Tests and small embedders build trees by hand with the helpers
//! below:
//!
//! ```ignore
//! let file = file([namespace("App", [class("User")
//!     .property(property("name").hint(hint("string")))
//!     .statement()])]);
//! ```

use crate::ast::*;
use crate::name::Name;
use prism_common::Span;
use std::sync::Arc;

// =============================================================================
// Files
// =============================================================================

pub fn file(statements: impl IntoIterator<Item = Statement>) -> SourceFile {
    SourceFile {
        path: None,
        statements: statements.into_iter().collect(),
    }
}

pub fn namespace(name: &str, statements: impl IntoIterator<Item = Statement>) -> Statement {
    Statement::Namespace(Namespace {
        name: (!name.is_empty()).then(|| Name::from(name)),
        statements: statements.into_iter().collect(),
        span: Span::lines(1, 1),
    })
}

/// `use A\B [as C];` for classes.
pub fn use_class(name: &str, alias: Option<&str>) -> Statement {
    use_item(UseKind::Class, name, alias)
}

pub fn use_function(name: &str, alias: Option<&str>) -> Statement {
    use_item(UseKind::Function, name, alias)
}

pub fn use_const(name: &str, alias: Option<&str>) -> Statement {
    use_item(UseKind::Constant, name, alias)
}

fn use_item(kind: UseKind, name: &str, alias: Option<&str>) -> Statement {
    Statement::Use(UseStatement {
        kind,
        items: vec![UseItem {
            name: Name::from(name),
            alias: alias.map(str::to_string),
        }],
    })
}

pub fn doc(text: &str) -> DocComment {
    DocComment {
        text: text.to_string(),
        span: Span::lines(1, 1),
    }
}

// =============================================================================
// Class-likes
// =============================================================================

#[derive(Clone, Debug)]
pub struct ClassLikeBuilder {
    node: ClassLike,
}

pub fn class(name: &str) -> ClassLikeBuilder {
    ClassLikeBuilder::new(ClassLikeKind::Class, Some(name))
}

pub fn interface(name: &str) -> ClassLikeBuilder {
    ClassLikeBuilder::new(ClassLikeKind::Interface, Some(name))
}

pub fn trait_(name: &str) -> ClassLikeBuilder {
    ClassLikeBuilder::new(ClassLikeKind::Trait, Some(name))
}

pub fn enum_(name: &str) -> ClassLikeBuilder {
    ClassLikeBuilder::new(ClassLikeKind::Enum, Some(name))
}

/// `new class { ... }`; position it with [`ClassLikeBuilder::at`].
pub fn anonymous_class() -> ClassLikeBuilder {
    ClassLikeBuilder::new(ClassLikeKind::Class, None)
}

impl ClassLikeBuilder {
    fn new(kind: ClassLikeKind, name: Option<&str>) -> Self {
        Self {
            node: ClassLike {
                kind,
                name: name.map(str::to_string),
                modifiers: Modifiers::default(),
                extends: Vec::new(),
                implements: Vec::new(),
                backing_type: None,
                attributes: Vec::new(),
                doc_comment: None,
                members: Vec::new(),
                span: Span::lines(1, 1),
            },
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.node.span = Span::at(line, column);
        self
    }

    pub fn extends(mut self, name: &str) -> Self {
        self.node.extends.push(Name::from(name));
        self
    }

    pub fn implements(mut self, name: &str) -> Self {
        self.node.implements.push(Name::from(name));
        self
    }

    pub fn backed_by(mut self, type_hint: TypeHint) -> Self {
        self.node.backing_type = Some(type_hint);
        self
    }

    pub fn abstract_(mut self) -> Self {
        self.node.modifiers.is_abstract = true;
        self
    }

    pub fn final_(mut self) -> Self {
        self.node.modifiers.is_final = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.node.modifiers.is_readonly = true;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn constant(mut self, constant: ConstantBuilder) -> Self {
        self.node.members.push(Member::Constant(constant.build()));
        self
    }

    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.node.members.push(Member::Property(property.build()));
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.node.members.push(Member::Method(method.build()));
        self
    }

    pub fn case(mut self, name: &str, value: Option<Expr>) -> Self {
        self.node.members.push(Member::EnumCase(EnumCase {
            name: name.to_string(),
            value,
            attributes: Vec::new(),
            doc_comment: None,
            span: self.node.span,
        }));
        self
    }

    pub fn uses(mut self, trait_use: TraitUseBuilder) -> Self {
        self.node.members.push(Member::TraitUse(trait_use.build()));
        self
    }

    pub fn build(self) -> Arc<ClassLike> {
        Arc::new(self.node)
    }

    pub fn statement(self) -> Statement {
        Statement::ClassLike(self.build())
    }

    /// `new class(...) { ... }` expression.
    pub fn instantiate(self, arguments: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::New {
            target: NewTarget::Anonymous(self.build()),
            arguments: arguments.into_iter().map(arg).collect(),
        }
    }
}

// =============================================================================
// Members
// =============================================================================

#[derive(Clone, Debug)]
pub struct ConstantBuilder {
    node: ClassConstant,
}

pub fn constant(name: &str, value: Expr) -> ConstantBuilder {
    ConstantBuilder {
        node: ClassConstant {
            modifiers: Modifiers::default(),
            type_hint: None,
            items: vec![ConstantItem {
                name: name.to_string(),
                value,
                span: Span::lines(1, 1),
            }],
            attributes: Vec::new(),
            doc_comment: None,
            span: Span::lines(1, 1),
        },
    }
}

impl ConstantBuilder {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.node.modifiers.visibility = Some(visibility);
        self
    }

    pub fn final_(mut self) -> Self {
        self.node.modifiers.is_final = true;
        self
    }

    pub fn hint(mut self, type_hint: TypeHint) -> Self {
        self.node.type_hint = Some(type_hint);
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn build(self) -> ClassConstant {
        self.node
    }
}

#[derive(Clone, Debug)]
pub struct PropertyBuilder {
    node: Property,
}

pub fn property(name: &str) -> PropertyBuilder {
    PropertyBuilder {
        node: Property {
            modifiers: Modifiers::default(),
            type_hint: None,
            items: vec![PropertyItem {
                name: name.to_string(),
                default: None,
                span: Span::lines(1, 1),
            }],
            attributes: Vec::new(),
            doc_comment: None,
            span: Span::lines(1, 1),
        },
    }
}

impl PropertyBuilder {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.node.modifiers.visibility = Some(visibility);
        self
    }

    pub fn static_(mut self) -> Self {
        self.node.modifiers.is_static = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.node.modifiers.is_readonly = true;
        self
    }

    pub fn hint(mut self, type_hint: TypeHint) -> Self {
        self.node.type_hint = Some(type_hint);
        self
    }

    pub fn default(mut self, value: Expr) -> Self {
        if let Some(item) = self.node.items.first_mut() {
            item.default = Some(value);
        }
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn build(self) -> Property {
        self.node
    }
}

#[derive(Clone, Debug)]
pub struct MethodBuilder {
    node: Method,
}

pub fn method(name: &str) -> MethodBuilder {
    MethodBuilder {
        node: Method {
            name: name.to_string(),
            modifiers: Modifiers::default(),
            by_ref: false,
            parameters: Vec::new(),
            return_type: None,
            body: Some(Vec::new()),
            attributes: Vec::new(),
            doc_comment: None,
            span: Span::lines(1, 1),
        },
    }
}

impl MethodBuilder {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.node.modifiers.visibility = Some(visibility);
        self
    }

    pub fn static_(mut self) -> Self {
        self.node.modifiers.is_static = true;
        self
    }

    pub fn final_(mut self) -> Self {
        self.node.modifiers.is_final = true;
        self
    }

    /// Abstract methods have no body.
    pub fn abstract_(mut self) -> Self {
        self.node.modifiers.is_abstract = true;
        self.node.body = None;
        self
    }

    /// Interface-style declaration without a body.
    pub fn bodyless(mut self) -> Self {
        self.node.body = None;
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.node.by_ref = true;
        self
    }

    pub fn param(mut self, parameter: ParamBuilder) -> Self {
        self.node.parameters.push(parameter.build());
        self
    }

    pub fn returns(mut self, type_hint: TypeHint) -> Self {
        self.node.return_type = Some(type_hint);
        self
    }

    pub fn body(mut self, statements: impl IntoIterator<Item = Statement>) -> Self {
        self.node.body = Some(statements.into_iter().collect());
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.node.span = Span::at(line, column);
        self
    }

    pub fn build(self) -> Method {
        self.node
    }
}

#[derive(Clone, Debug)]
pub struct TraitUseBuilder {
    node: TraitUse,
}

pub fn trait_use(traits: impl IntoIterator<Item = &'static str>) -> TraitUseBuilder {
    TraitUseBuilder {
        node: TraitUse {
            traits: traits.into_iter().map(Name::from).collect(),
            adaptations: Vec::new(),
            doc_comment: None,
            span: Span::lines(1, 1),
        },
    }
}

impl TraitUseBuilder {
    /// `Trait::method insteadof Other;`
    pub fn instead_of(mut self, trait_name: &str, method: &str, others: &[&str]) -> Self {
        self.node.adaptations.push(TraitAdaptation::Precedence {
            trait_name: Name::from(trait_name),
            method: method.to_string(),
            instead_of: others.iter().copied().map(Name::from).collect(),
        });
        self
    }

    /// `[Trait::]method as [visibility] [alias];`
    pub fn alias(
        mut self,
        trait_name: Option<&str>,
        method: &str,
        alias: Option<&str>,
        visibility: Option<Visibility>,
    ) -> Self {
        self.node.adaptations.push(TraitAdaptation::Alias {
            trait_name: trait_name.map(Name::from),
            method: method.to_string(),
            alias: alias.map(str::to_string),
            visibility,
        });
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn build(self) -> TraitUse {
        self.node
    }
}

// =============================================================================
// Functions and parameters
// =============================================================================

#[derive(Clone, Debug)]
pub struct FunctionBuilder {
    node: Function,
}

pub fn function(name: &str) -> FunctionBuilder {
    FunctionBuilder::new(Some(name))
}

/// `function () {}`; position it with [`FunctionBuilder::at`].
pub fn closure() -> FunctionBuilder {
    FunctionBuilder::new(None)
}

impl FunctionBuilder {
    fn new(name: Option<&str>) -> Self {
        Self {
            node: Function {
                name: name.map(str::to_string),
                by_ref: false,
                is_static: false,
                parameters: Vec::new(),
                return_type: None,
                body: Vec::new(),
                attributes: Vec::new(),
                doc_comment: None,
                span: Span::lines(1, 1),
            },
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.node.span = Span::at(line, column);
        self
    }

    pub fn static_(mut self) -> Self {
        self.node.is_static = true;
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.node.by_ref = true;
        self
    }

    pub fn param(mut self, parameter: ParamBuilder) -> Self {
        self.node.parameters.push(parameter.build());
        self
    }

    pub fn returns(mut self, type_hint: TypeHint) -> Self {
        self.node.return_type = Some(type_hint);
        self
    }

    pub fn body(mut self, statements: impl IntoIterator<Item = Statement>) -> Self {
        self.node.body = statements.into_iter().collect();
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn build(self) -> Arc<Function> {
        Arc::new(self.node)
    }

    pub fn statement(self) -> Statement {
        Statement::Function(self.build())
    }

    pub fn expr(self) -> Expr {
        Expr::Closure(self.build())
    }
}

#[derive(Clone, Debug)]
pub struct ParamBuilder {
    node: Parameter,
}

pub fn param(name: &str) -> ParamBuilder {
    ParamBuilder {
        node: Parameter {
            name: name.to_string(),
            type_hint: None,
            default: None,
            by_ref: false,
            variadic: false,
            promotion: None,
            attributes: Vec::new(),
            doc_comment: None,
            span: Span::lines(1, 1),
        },
    }
}

impl ParamBuilder {
    pub fn hint(mut self, type_hint: TypeHint) -> Self {
        self.node.type_hint = Some(type_hint);
        self
    }

    pub fn default(mut self, value: Expr) -> Self {
        self.node.default = Some(value);
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.node.by_ref = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.node.variadic = true;
        self
    }

    /// Constructor promotion with the given visibility.
    pub fn promoted(mut self, visibility: Visibility) -> Self {
        let modifiers = self.node.promotion.get_or_insert_with(Modifiers::default);
        modifiers.visibility = Some(visibility);
        self
    }

    pub fn readonly(mut self) -> Self {
        let modifiers = self.node.promotion.get_or_insert_with(Modifiers::default);
        modifiers.is_readonly = true;
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.node.doc_comment = Some(doc(text));
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.node.attributes.push(attribute_group([attribute]));
        self
    }

    pub fn build(self) -> Parameter {
        self.node
    }
}

/// Top-level `const NAME = value;`
pub fn const_statement(name: &str, value: Expr) -> Statement {
    Statement::Constant(Arc::new(ConstantStatement {
        items: vec![ConstantItem {
            name: name.to_string(),
            value,
            span: Span::lines(1, 1),
        }],
        attributes: Vec::new(),
        doc_comment: None,
        span: Span::lines(1, 1),
    }))
}

// =============================================================================
// Attributes
// =============================================================================

pub fn attribute(name: &str, arguments: impl IntoIterator<Item = Expr>) -> Attribute {
    Attribute {
        name: Name::from(name),
        arguments: arguments.into_iter().map(arg).collect(),
        span: Span::lines(1, 1),
    }
}

pub fn attribute_group(attributes: impl IntoIterator<Item = Attribute>) -> AttributeGroup {
    AttributeGroup {
        attributes: attributes.into_iter().collect(),
        span: Span::lines(1, 1),
    }
}

pub fn arg(value: Expr) -> Argument {
    Argument {
        name: None,
        value,
        spread: false,
    }
}

pub fn named_arg(name: &str, value: Expr) -> Argument {
    Argument {
        name: Some(name.to_string()),
        value,
        spread: false,
    }
}

// =============================================================================
// Type hints
// =============================================================================

pub fn hint(name: &str) -> TypeHint {
    TypeHint::Identifier(Name::from(name))
}

pub fn nullable(inner: TypeHint) -> TypeHint {
    TypeHint::Nullable(Box::new(inner))
}

pub fn union(members: impl IntoIterator<Item = TypeHint>) -> TypeHint {
    TypeHint::Union(members.into_iter().collect())
}

pub fn intersection(members: impl IntoIterator<Item = TypeHint>) -> TypeHint {
    TypeHint::Intersection(members.into_iter().collect())
}

// =============================================================================
// Expressions
// =============================================================================

pub fn null() -> Expr {
    Expr::Literal(Literal::Null)
}

pub fn bool_(value: bool) -> Expr {
    Expr::Literal(Literal::Bool(value))
}

pub fn int(value: i64) -> Expr {
    Expr::Literal(Literal::Int(value))
}

pub fn float(value: f64) -> Expr {
    Expr::Literal(Literal::Float(value))
}

pub fn string(value: &str) -> Expr {
    Expr::Literal(Literal::String(value.to_string()))
}

/// List-style array `[a, b, c]`.
pub fn list(values: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Array(
        values
            .into_iter()
            .map(|value| ArrayItem {
                key: None,
                value,
                spread: false,
            })
            .collect(),
    )
}

/// Keyed array `[k => v, ...]`.
pub fn map(entries: impl IntoIterator<Item = (Expr, Expr)>) -> Expr {
    Expr::Array(
        entries
            .into_iter()
            .map(|(key, value)| ArrayItem {
                key: Some(key),
                value,
                spread: false,
            })
            .collect(),
    )
}

pub fn spread(value: Expr) -> ArrayItem {
    ArrayItem {
        key: None,
        value,
        spread: true,
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

pub fn ternary(condition: Expr, then: Option<Expr>, otherwise: Expr) -> Expr {
    Expr::Ternary {
        condition: Box::new(condition),
        then: then.map(Box::new),
        otherwise: Box::new(otherwise),
    }
}

pub fn const_fetch(name: &str) -> Expr {
    Expr::ConstFetch(Name::from(name))
}

/// `Class::NAME`; `self`, `static` and `parent` map to their dedicated refs.
pub fn class_const(class: &str, constant: &str) -> Expr {
    Expr::ClassConstFetch {
        class: class_ref(class),
        constant: constant.to_string(),
    }
}

pub fn new(class: &str, arguments: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::New {
        target: NewTarget::Class(class_ref(class)),
        arguments: arguments.into_iter().map(arg).collect(),
    }
}

pub fn dim(array: Expr, index: Expr) -> Expr {
    Expr::ArrayDim {
        array: Box::new(array),
        index: Some(Box::new(index)),
    }
}

pub fn magic(constant: MagicConstant, line: u32) -> Expr {
    Expr::Magic { constant, line }
}

pub fn variable(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}

pub fn yield_(value: Option<Expr>) -> Expr {
    Expr::Yield {
        key: None,
        value: value.map(Box::new),
    }
}

pub fn expr_statement(expr: Expr) -> Statement {
    Statement::Expression(expr)
}

pub fn return_(expr: Option<Expr>) -> Statement {
    Statement::Return(expr)
}

fn class_ref(class: &str) -> ClassRef {
    let name = Name::from(class);
    if name.is_keyword("self") {
        ClassRef::SelfRef
    } else if name.is_keyword("static") {
        ClassRef::Static
    } else if name.is_keyword("parent") {
        ClassRef::Parent
    } else {
        ClassRef::Named(name)
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
