//! Syntax tree to native facts.
//!
//! [`NodeReflector::collect`] walks a parsed unit once and returns one
//! [`DeferredDeclaration`] per declaration it contains: top-level classes,
//! functions and constants, and the nested ones (closures, anonymous
//! classes, functions and classes declared inside bodies). Collecting only
//! computes identities; the facts of a declaration are built when the
//! session materializes it.
//!
//! The facts built here are the native ones. Doc comments are recorded
//! verbatim for the overlay; nothing is inherited yet.

use crate::data::{
    self, ClassKind, Location, Members, MixinAlias, MixinPrecedence, UnresolvedReference,
};
use crate::error::{EvaluationError, Result};
use crate::expression::{Argument, CompileScope, Expression, Value, compile};
use crate::typed_map::{DefaultKey, TypedMap};
use prism_common::Span;
use prism_syntax::{
    AttributeGroup, ClassConstant, ClassLike, ClassLikeKind, ConstantItem, ConstantStatement,
    DocComment, EnumCase, Expr, Function, Member, Method, Name, NewTarget, Parameter, Property,
    SourceFile, Statement, TraitAdaptation, TypeHint, UseKind, UseStatement, Visibility,
};
use prism_types::native::compile_hint;
use prism_types::{ClassId, DeclId, FunctionId, NameContext, Type, TypeContext, TypeLayers};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

type Build = Rc<dyn Fn() -> Result<TypedMap>>;

/// A declaration whose facts are built on first use. Building can be
/// repeated, so a failed attempt leaves it usable.
#[derive(Clone)]
pub struct DeferredDeclaration {
    pub id: DeclId,
    build: Build,
}

impl DeferredDeclaration {
    pub fn materialize(&self) -> Result<TypedMap> {
        trace!(id = %self.id, "materializing");
        (self.build)()
    }
}

impl fmt::Debug for DeferredDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredDeclaration")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

pub struct NodeReflector;

impl NodeReflector {
    /// Every declaration of `file`, in source order. `base` seeds each map.
    pub fn collect(file: &SourceFile, base: &TypedMap) -> Vec<DeferredDeclaration> {
        let unit = Arc::new(Unit {
            file: file.path.clone().or_else(|| base.get(&data::FILE).cloned()),
            base: base.clone(),
        });
        let mut collector = Collector {
            unit,
            declarations: Vec::new(),
        };
        collector.statements(&file.statements, &mut NameContext::new(None), None);
        collector.declarations
    }
}

struct Unit {
    file: Option<String>,
    base: TypedMap,
}

impl Unit {
    fn location(&self, span: Span) -> Location {
        Location {
            file: self.file.clone(),
            span,
        }
    }

    fn anonymous_key(&self) -> &str {
        self.file.as_deref().unwrap_or_default()
    }
}

/// The class-like a nested declaration is written in.
#[derive(Clone)]
struct ClassScope {
    id: ClassId,
    parent: Option<String>,
    is_trait: bool,
}

// =============================================================================
// Collection
// =============================================================================

struct Collector {
    unit: Arc<Unit>,
    declarations: Vec<DeferredDeclaration>,
}

impl Collector {
    fn defer(&mut self, id: DeclId, build: impl Fn() -> Result<TypedMap> + 'static) {
        self.declarations.push(DeferredDeclaration {
            id,
            build: Rc::new(build),
        });
    }

    fn statements(&mut self, statements: &[Statement], names: &mut NameContext, class: Option<&ClassScope>) {
        for statement in statements {
            match statement {
                Statement::Namespace(namespace) => {
                    let mut names = NameContext::new(namespace.name.as_ref().map(Name::without_prefix));
                    self.statements(&namespace.statements, &mut names, None);
                }
                Statement::Use(statement) => import(names, statement),
                Statement::ClassLike(node) => self.class_like(node, names),
                Statement::Function(node) => self.function(node, names, None),
                Statement::Constant(node) => self.constants(node, names),
                Statement::Expression(expr) | Statement::Return(Some(expr)) => self.expr(expr, names, class),
                Statement::Block(block) => self.statements(block, names, class),
                Statement::Return(None) => {}
            }
        }
    }

    fn expr(&mut self, expr: &Expr, names: &NameContext, class: Option<&ClassScope>) {
        match expr {
            Expr::Closure(node) => self.function(node, names, class),
            Expr::New {
                target: NewTarget::Anonymous(node),
                ..
            } => self.class_like(node, names),
            _ => {}
        }
        expr.for_each_child(&mut |child| self.expr(child, names, class));
    }

    fn class_like(&mut self, node: &Arc<ClassLike>, names: &NameContext) {
        let id = match &node.name {
            Some(name) => ClassId::named(&names.qualify(name)),
            None => ClassId::anonymous(
                self.unit.anonymous_key(),
                node.span.start_line,
                node.span.start_column,
            ),
        };
        let parent = match node.kind {
            ClassLikeKind::Class => node.extends.first().map(|name| names.resolve_class(name)),
            _ => None,
        };
        let scope = ClassScope {
            id: id.clone(),
            parent,
            is_trait: node.kind == ClassLikeKind::Trait,
        };

        let (unit, built, inner_names, inner_scope) =
            (Arc::clone(&self.unit), Arc::clone(node), names.clone(), scope.clone());
        self.defer(DeclId::Class(id), move || {
            build_class(&unit, &built, &inner_names, &inner_scope)
        });

        for member in &node.members {
            if let Member::Method(Method {
                body: Some(body), ..
            }) = member
            {
                self.statements(body, &mut names.clone(), Some(&scope));
            }
        }
    }

    /// Named functions get no class scope; closures inherit the enclosing one.
    fn function(&mut self, node: &Arc<Function>, names: &NameContext, class: Option<&ClassScope>) {
        let id = match &node.name {
            Some(name) => FunctionId::named(&names.qualify(name)),
            None => FunctionId::anonymous(
                self.unit.anonymous_key(),
                node.span.start_line,
                node.span.start_column,
            ),
        };
        let (unit, built, inner_names, inner_class, inner_id) = (
            Arc::clone(&self.unit),
            Arc::clone(node),
            names.clone(),
            class.cloned(),
            id.clone(),
        );
        self.defer(DeclId::Function(id), move || {
            build_function(&unit, &built, &inner_names, inner_class.as_ref(), &inner_id)
        });
        self.statements(&node.body, &mut names.clone(), class);
    }

    fn constants(&mut self, node: &Arc<ConstantStatement>, names: &NameContext) {
        for item in &node.items {
            let (unit, statement, inner_names, item) =
                (Arc::clone(&self.unit), Arc::clone(node), names.clone(), item.clone());
            let id = DeclId::constant(&names.qualify(&item.name));
            self.defer(id, move || build_constant(&unit, &statement, &item, &inner_names));
        }
    }
}

fn import(names: &mut NameContext, statement: &UseStatement) {
    for item in &statement.items {
        let target = item.name.without_prefix();
        match statement.kind {
            UseKind::Class => names.import_class(item.local_name(), target),
            UseKind::Function => names.import_function(item.local_name(), target),
            UseKind::Constant => names.import_constant(item.local_name(), target),
        }
    }
}

// =============================================================================
// Facts
// =============================================================================

fn doc(comment: &Option<DocComment>) -> Option<String> {
    comment.as_ref().map(|comment| comment.text.clone())
}

fn native(hint: Option<&TypeHint>, context: &TypeContext) -> TypeLayers {
    TypeLayers::from_native(hint.map(|hint| compile_hint(hint, context)))
}

fn flag(data: TypedMap, key: &DefaultKey<bool>, value: bool) -> TypedMap {
    if value { data.with(key, true) } else { data }
}

fn with_members(data: TypedMap, key: &DefaultKey<Members>, members: Members) -> TypedMap {
    if members.is_empty() { data } else { data.with(key, members) }
}

fn with_attributes(data: TypedMap, attributes: &[TypedMap]) -> TypedMap {
    if attributes.is_empty() {
        data
    } else {
        data.with(&data::ATTRIBUTES, attributes.to_vec())
    }
}

fn attributes(groups: &[AttributeGroup], scope: &CompileScope<'_>) -> Result<Vec<TypedMap>> {
    let mut attributes = Vec::new();
    for group in groups {
        for attribute in &group.attributes {
            let mut arguments = Vec::with_capacity(attribute.arguments.len());
            for argument in &attribute.arguments {
                if argument.spread {
                    return Err(EvaluationError::NotConstant("argument unpacking").into());
                }
                arguments.push(Argument {
                    name: argument.name.clone(),
                    value: compile(&argument.value, scope)?,
                });
            }
            attributes.push(
                TypedMap::new()
                    .with(&data::ATTRIBUTE_CLASS, scope.names.resolve_class(&attribute.name))
                    .with(&data::ARGUMENTS, arguments)
                    .with(
                        &data::LOCATION,
                        Location {
                            file: scope.file.map(str::to_string),
                            span: attribute.span,
                        },
                    ),
            );
        }
    }
    Ok(attributes)
}

fn is_generator(body: &[Statement]) -> bool {
    fn contains_yield(expr: &Expr) -> bool {
        if matches!(expr, Expr::Yield { .. } | Expr::YieldFrom(_)) {
            return true;
        }
        let mut found = false;
        expr.for_each_child(&mut |child| found = found || contains_yield(child));
        found
    }

    let mut found = false;
    for statement in body {
        statement.for_each_expr(&mut |expr| found = found || contains_yield(expr));
    }
    found
}

fn parameters(
    parameters: &[Parameter],
    unit: &Unit,
    context: &TypeContext,
    scope: &CompileScope<'_>,
) -> Result<Members> {
    let mut members = Members::with_capacity(parameters.len());
    for parameter in parameters {
        let default = parameter
            .default
            .as_ref()
            .map(|expr| compile(expr, scope))
            .transpose()?;
        let mut native = parameter.type_hint.as_ref().map(|hint| compile_hint(hint, context));
        // `T $x = null` accepts null.
        if default.as_ref().is_some_and(Expression::is_null) {
            native = native.map(|ty| if ty.is_nullable() { ty } else { Type::nullable(ty) });
        }
        let mut map = TypedMap::new()
            .with(&data::NAME, parameter.name.clone())
            .with(&data::TYPE, TypeLayers::from_native(native))
            .with_opt(&data::DEFAULT_VALUE, default)
            .with(&data::LOCATION, unit.location(parameter.span))
            .with_opt(&data::DOC_COMMENT, doc(&parameter.doc_comment));
        map = flag(map, &data::VARIADIC, parameter.variadic);
        map = flag(map, &data::BY_REFERENCE, parameter.by_ref);
        if let Some(promotion) = &parameter.promotion {
            map = map
                .with(&data::PROMOTED, true)
                .with(
                    &data::VISIBILITY,
                    promotion.visibility.unwrap_or(Visibility::Public),
                );
            map = flag(map, &data::NATIVE_READONLY, promotion.is_readonly);
        }
        map = with_attributes(map, &attributes(&parameter.attributes, scope)?);
        members.insert(parameter.name.clone(), map);
    }
    Ok(members)
}

// =============================================================================
// Class-likes
// =============================================================================

/// What the members of one class-like are built against.
struct MemberScope<'a> {
    unit: &'a Unit,
    class: &'a ClassId,
    context: &'a TypeContext,
    compile: CompileScope<'a>,
}

fn build_class(unit: &Unit, node: &ClassLike, names: &NameContext, scope: &ClassScope) -> Result<TypedMap> {
    let id = &scope.id;
    let kind = match (node.kind, &node.name) {
        (ClassLikeKind::Class, Some(_)) => ClassKind::Class,
        (ClassLikeKind::Class, None) => ClassKind::AnonymousClass,
        (ClassLikeKind::Interface, _) => ClassKind::Interface,
        (ClassLikeKind::Trait, _) => ClassKind::Trait,
        (ClassLikeKind::Enum, _) => ClassKind::Enum,
    };
    let context = TypeContext::new(names.clone()).with_class(id.clone(), scope.parent.clone());
    let compile_scope = CompileScope::new(names)
        .with_file(unit.file.as_deref())
        .with_class(id, scope.parent.as_deref(), scope.is_trait);
    let members = MemberScope {
        unit,
        class: id,
        context: &context,
        compile: compile_scope,
    };

    let mut data = unit
        .base
        .with(&data::NAME, id.type_name())
        .with(&data::CLASS_KIND, kind)
        .with(&data::LOCATION, unit.location(node.span))
        .with_opt(&data::NAMESPACE, names.namespace().map(str::to_string))
        .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
    data = flag(data, &data::ABSTRACT, node.modifiers.is_abstract);
    data = flag(data, &data::NATIVE_FINAL, node.modifiers.is_final || kind == ClassKind::Enum);
    data = flag(data, &data::NATIVE_READONLY, node.modifiers.is_readonly);

    let interfaces = match node.kind {
        ClassLikeKind::Interface => references(names, &node.extends),
        ClassLikeKind::Class | ClassLikeKind::Enum => references(names, &node.implements),
        ClassLikeKind::Trait => Vec::new(),
    };
    if !interfaces.is_empty() {
        data = data.with(&data::UNRESOLVED_INTERFACES, interfaces);
    }
    if let Some(parent) = &scope.parent {
        data = data.with(&data::UNRESOLVED_PARENT, UnresolvedReference::new(parent.clone()));
    }
    if let Some(backing) = &node.backing_type {
        data = data.with(&data::BACKING_TYPE, compile_hint(backing, &context));
    }

    let mut constants = Members::new();
    let mut properties = Members::new();
    let mut methods = Members::new();
    let mut mixins = Vec::new();
    let mut aliases = Vec::new();
    let mut precedence = Vec::new();
    for member in &node.members {
        match member {
            Member::Constant(constant) => class_constants(&members, constant, &mut constants)?,
            Member::EnumCase(case) => {
                constants.insert(case.name.clone(), enum_case(&members, case)?);
            }
            Member::Property(property) => class_properties(&members, property, &mut properties)?,
            Member::Method(method) => {
                methods.insert(method.name.clone(), class_method(&members, method)?);
            }
            Member::TraitUse(trait_use) => {
                mixins.extend(references(names, &trait_use.traits));
                for adaptation in &trait_use.adaptations {
                    match adaptation {
                        TraitAdaptation::Precedence {
                            trait_name,
                            method,
                            instead_of,
                        } => precedence.push(MixinPrecedence {
                            mixin: names.resolve_class(trait_name),
                            method: method.clone(),
                            instead_of: instead_of.iter().map(|name| names.resolve_class(name)).collect(),
                        }),
                        TraitAdaptation::Alias {
                            trait_name,
                            method,
                            alias,
                            visibility,
                        } => aliases.push(MixinAlias {
                            mixin: trait_name.as_ref().map(|name| names.resolve_class(name)),
                            method: method.clone(),
                            alias: alias.clone(),
                            visibility: *visibility,
                        }),
                    }
                }
            }
        }
    }

    data = with_members(data, &data::CONSTANTS, constants);
    data = with_members(data, &data::PROPERTIES, properties);
    data = with_members(data, &data::METHODS, methods);
    if !mixins.is_empty() {
        data = data.with(&data::UNRESOLVED_MIXINS, mixins);
    }
    if !aliases.is_empty() {
        data = data.with(&data::MIXIN_ALIASES, aliases);
    }
    if !precedence.is_empty() {
        data = data.with(&data::MIXIN_PRECEDENCE, precedence);
    }
    let data = with_attributes(data, &attributes(&node.attributes, &compile_scope)?);
    Ok(data.with(&data::TYPE_CONTEXT, context.clone()))
}

fn references(names: &NameContext, list: &[Name]) -> Vec<UnresolvedReference> {
    list.iter()
        .map(|name| UnresolvedReference::new(names.resolve_class(name)))
        .collect()
}

fn class_constants(scope: &MemberScope<'_>, node: &ClassConstant, into: &mut Members) -> Result<()> {
    let attributes = attributes(&node.attributes, &scope.compile)?;
    for item in &node.items {
        let mut constant = TypedMap::new()
            .with(&data::NAME, item.name.clone())
            .with(&data::DECLARING_CLASS, scope.class.clone())
            .with(
                &data::VISIBILITY,
                node.modifiers.visibility.unwrap_or(Visibility::Public),
            )
            .with(&data::TYPE, native(node.type_hint.as_ref(), scope.context))
            .with(&data::VALUE, compile(&item.value, &scope.compile)?)
            .with(&data::LOCATION, scope.unit.location(item.span))
            .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
        constant = flag(constant, &data::NATIVE_FINAL, node.modifiers.is_final);
        into.insert(item.name.clone(), with_attributes(constant, &attributes));
    }
    Ok(())
}

fn enum_case(scope: &MemberScope<'_>, node: &EnumCase) -> Result<TypedMap> {
    let value = node
        .value
        .as_ref()
        .map(|value| compile(value, &scope.compile))
        .transpose()?;
    let case = TypedMap::new()
        .with(&data::NAME, node.name.clone())
        .with(&data::DECLARING_CLASS, scope.class.clone())
        .with(&data::ENUM_CASE, true)
        .with(&data::NATIVE_FINAL, true)
        .with(
            &data::TYPE,
            TypeLayers::from_native(Some(Type::named(scope.class.type_name()))),
        )
        .with_opt(&data::VALUE, value)
        .with(&data::LOCATION, scope.unit.location(node.span))
        .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
    Ok(with_attributes(case, &attributes(&node.attributes, &scope.compile)?))
}

fn class_properties(scope: &MemberScope<'_>, node: &Property, into: &mut Members) -> Result<()> {
    let attributes = attributes(&node.attributes, &scope.compile)?;
    for item in &node.items {
        let default = match &item.default {
            Some(expr) => Some(compile(expr, &scope.compile.with_property(&item.name))?),
            // Untyped properties start out null.
            None if node.type_hint.is_none() => Some(Expression::Value(Value::Null)),
            None => None,
        };
        let mut property = TypedMap::new()
            .with(&data::NAME, item.name.clone())
            .with(&data::DECLARING_CLASS, scope.class.clone())
            .with(
                &data::VISIBILITY,
                node.modifiers.visibility.unwrap_or(Visibility::Public),
            )
            .with(&data::TYPE, native(node.type_hint.as_ref(), scope.context))
            .with_opt(&data::DEFAULT_VALUE, default)
            .with(&data::LOCATION, scope.unit.location(item.span))
            .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
        property = flag(property, &data::STATIC, node.modifiers.is_static);
        property = flag(property, &data::NATIVE_READONLY, node.modifiers.is_readonly);
        into.insert(item.name.clone(), with_attributes(property, &attributes));
    }
    Ok(())
}

fn class_method(scope: &MemberScope<'_>, node: &Method) -> Result<TypedMap> {
    let compile_scope = scope.compile.with_function(&node.name);
    let mut method = TypedMap::new()
        .with(&data::NAME, node.name.clone())
        .with(&data::DECLARING_CLASS, scope.class.clone())
        .with(
            &data::VISIBILITY,
            node.modifiers.visibility.unwrap_or(Visibility::Public),
        )
        .with(&data::TYPE, native(node.return_type.as_ref(), scope.context))
        .with(
            &data::PARAMETERS,
            parameters(&node.parameters, scope.unit, scope.context, &compile_scope)?,
        )
        .with(&data::LOCATION, scope.unit.location(node.span))
        .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
    method = flag(method, &data::STATIC, node.modifiers.is_static);
    method = flag(method, &data::ABSTRACT, node.modifiers.is_abstract);
    method = flag(method, &data::NATIVE_FINAL, node.modifiers.is_final);
    method = flag(method, &data::RETURNS_REFERENCE, node.by_ref);
    method = flag(
        method,
        &data::GENERATOR,
        node.body.as_deref().is_some_and(is_generator),
    );
    Ok(with_attributes(method, &attributes(&node.attributes, &compile_scope)?))
}

// =============================================================================
// Functions and constants
// =============================================================================

fn build_function(
    unit: &Unit,
    node: &Function,
    names: &NameContext,
    class: Option<&ClassScope>,
    id: &FunctionId,
) -> Result<TypedMap> {
    let name = match id {
        FunctionId::Named(name) => name.clone(),
        FunctionId::Anonymous { .. } => "{closure}".to_string(),
    };
    let mut context = TypeContext::new(names.clone());
    let mut scope = CompileScope::new(names)
        .with_file(unit.file.as_deref())
        .with_function(&name);
    if let Some(class) = class {
        context = context.with_class(class.id.clone(), class.parent.clone());
        scope = scope.with_class(&class.id, class.parent.as_deref(), class.is_trait);
    }

    let mut data = unit
        .base
        .with(&data::NAME, name.clone())
        .with_opt(&data::NAMESPACE, names.namespace().map(str::to_string))
        .with(&data::LOCATION, unit.location(node.span))
        .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment))
        .with(&data::TYPE, native(node.return_type.as_ref(), &context))
        .with(&data::PARAMETERS, parameters(&node.parameters, unit, &context, &scope)?);
    data = flag(data, &data::STATIC, node.is_static);
    data = flag(data, &data::RETURNS_REFERENCE, node.by_ref);
    data = flag(data, &data::GENERATOR, is_generator(&node.body));
    let data = with_attributes(data, &attributes(&node.attributes, &scope)?);
    Ok(data.with(&data::TYPE_CONTEXT, context))
}

fn build_constant(
    unit: &Unit,
    node: &ConstantStatement,
    item: &ConstantItem,
    names: &NameContext,
) -> Result<TypedMap> {
    let scope = CompileScope::new(names).with_file(unit.file.as_deref());
    let data = unit
        .base
        .with(&data::NAME, names.qualify(&item.name))
        .with_opt(&data::NAMESPACE, names.namespace().map(str::to_string))
        .with(&data::VALUE, compile(&item.value, &scope)?)
        .with(&data::LOCATION, unit.location(item.span))
        .with_opt(&data::DOC_COMMENT, doc(&node.doc_comment));
    let data = with_attributes(data, &attributes(&node.attributes, &scope)?);
    Ok(data.with(&data::TYPE_CONTEXT, TypeContext::new(names.clone())))
}

#[cfg(test)]
#[path = "../tests/reflector_tests.rs"]
mod tests;
