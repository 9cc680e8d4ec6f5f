//! Documentation overlay.
//!
//! Reads the doc comment of a declaration and of each of its members and
//! records what it adds: annotated types, templates, type aliases, generic
//! arguments of supertypes, and the annotated flags. Native facts are never
//! replaced; annotated types go into their own layer.
//!
//! Any malformed type expression fails the whole reflection.

use super::{Hook, map_members};
use crate::data::{self, Members, UnresolvedReference};
use crate::error::{ReflectionError, Result};
use crate::session::Reflect;
use crate::typed_map::{DefaultKey, TypedMap};
use prism_docblock::{
    AnnotationError, DocBlock, DocParseError, TagPrioritizer, TypeNode, compile_type,
    parse_doc_block, tags::split_tags,
};
use prism_syntax::Name;
use prism_types::{ClassId, DeclId, FunctionLikeId, TemplateSite, Type, TypeContext};
use tracing::trace;

const TEMPLATE_TAGS: &[&str] = &["template", "template-covariant", "template-contravariant"];

pub struct DocOverlayHook {
    prioritizer: TagPrioritizer,
}

impl DocOverlayHook {
    pub fn new(prioritizer: TagPrioritizer) -> Self {
        Self { prioritizer }
    }

    /// The parsed comment of `data`, with its text for error locations.
    fn block(&self, id: &DeclId, data: &TypedMap) -> Result<Option<(String, DocBlock)>> {
        let Some(text) = data.get(&data::DOC_COMMENT) else {
            return Ok(None);
        };
        let block = parse_doc_block(text, &self.prioritizer).map_err(|source| invalid(id, source))?;
        Ok(Some((text.clone(), block)))
    }

    fn compile(
        &self,
        id: &DeclId,
        text: &str,
        tags: &[&str],
        node: &TypeNode,
        context: &TypeContext,
    ) -> Result<Type> {
        compile_type(node, context).map_err(|error| invalid(id, self.locate(text, tags, error)))
    }

    /// Attribute a compile error to the highest ranked tag it can come from.
    fn locate(&self, text: &str, tags: &[&str], error: DocParseError) -> AnnotationError {
        let (_, raw_tags) = split_tags(text);
        let mut best: Option<(i32, String, u32)> = None;
        for raw in raw_tags {
            let (prefix, base) = self.prioritizer.split(&raw.name);
            if !tags.contains(&base) {
                continue;
            }
            let rank = self.prioritizer.rank(prefix);
            if best.as_ref().is_none_or(|(best, _, _)| rank > *best) {
                best = Some((rank, raw.name.clone(), raw.line));
            }
        }
        let (tag, line) = match best {
            Some((_, tag, line)) => (tag, line),
            None => (tags.first().copied().unwrap_or_default().to_string(), 0),
        };
        AnnotationError { tag, line, error }
    }

    fn templates(
        &self,
        id: &DeclId,
        text: &str,
        block: &DocBlock,
        context: &TypeContext,
    ) -> Result<Members> {
        let mut templates = Members::new();
        for tag in &block.templates {
            let mut template = TypedMap::new()
                .with(&data::NAME, tag.name.clone())
                .with(&data::VARIANCE, tag.variance);
            if let Some(constraint) = &tag.constraint {
                let constraint = self.compile(id, text, TEMPLATE_TAGS, constraint, context)?;
                template = template.with(&data::CONSTRAINT, constraint);
            }
            templates.insert(tag.name.clone(), template);
        }
        Ok(templates)
    }

    /// `@extends`/`@implements`/`@use` target: a class name with arguments.
    fn supertype(
        &self,
        id: &DeclId,
        text: &str,
        tags: &[&str],
        node: &TypeNode,
        context: &TypeContext,
    ) -> Result<(String, Vec<Type>)> {
        match self.compile(id, text, tags, node, context)? {
            Type::Named { class, args } => Ok((class, args)),
            other => Err(invalid(
                id,
                self.locate(
                    text,
                    tags,
                    DocParseError::InvalidType {
                        text: other.to_string(),
                        reason: "expected a class reference".to_string(),
                    },
                ),
            )),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn class(&self, id: &DeclId, class: &ClassId, mut data: TypedMap) -> Result<TypedMap> {
        let mut context = data.get(&data::TYPE_CONTEXT).cloned().unwrap_or_default();

        if let Some((text, block)) = self.block(id, &data)? {
            let class_name = class.type_name();
            context = context.with_templates(
                &TemplateSite::Class(class.clone()),
                block.templates.iter().map(|tag| tag.name.as_str()),
            );
            for alias in &block.type_aliases {
                context = context.with_alias(&alias.name, &class_name, &alias.name);
            }
            for import in &block.imported_types {
                let from = context.names.resolve_class(&Name::from(import.from.as_str()));
                let local = import.alias.as_deref().unwrap_or(&import.name);
                context = context.with_alias(local, &from, &import.name);
            }

            if !block.templates.is_empty() {
                data = data.with(&data::TEMPLATES, self.templates(id, &text, &block, &context)?);
            }

            let mut aliases = Members::new();
            for alias in &block.type_aliases {
                let ty = self.compile(id, &text, &["type"], &alias.ty, &context)?;
                aliases.insert(
                    alias.name.clone(),
                    TypedMap::new()
                        .with(&data::NAME, alias.name.clone())
                        .with(&data::ALIAS_TYPE, ty)
                        .with(&data::DECLARING_CLASS, class.clone()),
                );
            }
            if !aliases.is_empty() {
                data = data.with(&data::TYPE_ALIASES, aliases);
            }

            let is_interface = data.get(&data::CLASS_KIND) == Some(&data::ClassKind::Interface);
            for node in &block.extends {
                let (name, args) =
                    self.supertype(id, &text, &["extends", "template-extends"], node, &context)?;
                if is_interface {
                    data = attach(data, &data::UNRESOLVED_INTERFACES, &name, args);
                } else {
                    match data.get(&data::UNRESOLVED_PARENT) {
                        Some(parent) if parent.name.eq_ignore_ascii_case(&name) => {
                            let parent = UnresolvedReference {
                                name: parent.name.clone(),
                                arguments: args,
                            };
                            data = data.with(&data::UNRESOLVED_PARENT, parent);
                        }
                        _ => trace!(%id, supertype = %name, "@extends does not name the parent"),
                    }
                }
            }
            for node in &block.implements {
                let (name, args) =
                    self.supertype(id, &text, &["implements", "template-implements"], node, &context)?;
                data = attach(data, &data::UNRESOLVED_INTERFACES, &name, args);
            }
            for node in &block.uses {
                let (name, args) = self.supertype(id, &text, &["use", "template-use"], node, &context)?;
                data = attach(data, &data::UNRESOLVED_MIXINS, &name, args);
            }

            data = flags(data, &block);
        }

        data = map_members(&data, &data::CONSTANTS, |name, constant| {
            self.variable(&DeclId::class_constant(class, name), constant, name, &context)
        })?;
        data = map_members(&data, &data::PROPERTIES, |name, property| {
            self.variable(&DeclId::property(class, name), property, name, &context)
        })?;
        data = map_members(&data, &data::METHODS, |name, method| {
            let function = FunctionLikeId::Method {
                class: class.clone(),
                name: name.to_string(),
            };
            self.function_like(&function, method, &context)
        })?;
        Ok(data.with(&data::TYPE_CONTEXT, context))
    }

    /// Constants and properties: `@var` and flags.
    fn variable(&self, id: &DeclId, member: &TypedMap, name: &str, context: &TypeContext) -> Result<TypedMap> {
        let Some((text, block)) = self.block(id, member)? else {
            return Ok(member.clone());
        };
        let mut member = member.clone();
        if let Some(node) = block.var_for(name) {
            let ty = self.compile(id, &text, &["var"], node, context)?;
            member = member.modify(&data::TYPE, |layers| layers.with_annotated(ty))?;
        }
        Ok(flags(member, &block))
    }

    fn function_like(&self, function: &FunctionLikeId, data: &TypedMap, context: &TypeContext) -> Result<TypedMap> {
        let id = function.to_decl();
        let (text, block) = self.block(&id, data)?.unwrap_or_default();
        let context = context.clone().with_templates(
            &TemplateSite::FunctionLike(function.clone()),
            block.templates.iter().map(|tag| tag.name.as_str()),
        );

        let mut data = data.clone();
        if !block.templates.is_empty() {
            data = data.with(&data::TEMPLATES, self.templates(&id, &text, &block, &context)?);
        }
        if let Some(node) = &block.return_type {
            let ty = self.compile(&id, &text, &["return"], node, &context)?;
            data = data.modify(&data::TYPE, |layers| layers.with_annotated(ty))?;
        }
        if !block.throws.is_empty() {
            let mut throws = Vec::with_capacity(block.throws.len());
            for node in &block.throws {
                throws.push(self.compile(&id, &text, &["throws"], node, &context)?);
            }
            data = data.with(&data::THROWS, throws);
        }
        data = map_members(&data, &data::PARAMETERS, |name, parameter| {
            let parameter_id = DeclId::parameter(function, name);
            // A parameter's own comment (promoted parameters) comes first;
            // `@param` on the function overrides its type.
            let mut parameter = self.variable(&parameter_id, parameter, name, &context)?;
            if let Some(tag) = block.param(name) {
                let ty = self.compile(&id, &text, &["param"], &tag.ty, &context)?;
                parameter = parameter.modify(&data::TYPE, |layers| layers.with_annotated(ty))?;
            }
            Ok(parameter)
        })?;
        Ok(flags(data, &block))
    }
}

impl Hook for DocOverlayHook {
    fn name(&self) -> &'static str {
        "doc_overlay"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let context = data.get(&data::TYPE_CONTEXT).cloned().unwrap_or_default();
        match id {
            DeclId::Class(class) => self.class(id, class, data),
            DeclId::Function(function) => {
                self.function_like(&FunctionLikeId::Function(function.clone()), &data, &context)
            }
            DeclId::Constant(constant) => self.variable(id, &data, constant.name(), &context),
            _ => Ok(data),
        }
    }
}

fn invalid(id: &DeclId, source: AnnotationError) -> ReflectionError {
    ReflectionError::InvalidAnnotationSyntax {
        id: id.clone(),
        source,
    }
}

fn flags(mut data: TypedMap, block: &DocBlock) -> TypedMap {
    if block.readonly {
        data = data.with(&data::ANNOTATED_READONLY, true);
    }
    if block.is_final {
        data = data.with(&data::ANNOTATED_FINAL, true);
    }
    data.with_opt(&data::DEPRECATION, block.deprecated.clone())
}

/// Give the matching reference its generic arguments.
fn attach(
    data: TypedMap,
    key: &DefaultKey<Vec<UnresolvedReference>>,
    name: &str,
    arguments: Vec<Type>,
) -> TypedMap {
    let mut references = data.get(key).into_owned();
    match references
        .iter_mut()
        .find(|reference| reference.name.eq_ignore_ascii_case(name))
    {
        Some(reference) => reference.arguments = arguments,
        None => {
            trace!(supertype = %name, "annotated supertype is not declared");
            return data;
        }
    }
    data.with(key, references)
}

#[cfg(test)]
#[path = "../../tests/doc_overlay_tests.rs"]
mod tests;
