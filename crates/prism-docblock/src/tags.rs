//! Tag extraction.
//!
//! A doc comment is split into its summary and `@tag` entries (a tag runs
//! until the next line starting with `@`, so multi-line shapes work). The
//! entries are then read into a [`DocBlock`]: typed, still unresolved
//! annotations with prefix conflicts already settled by the
//! [`TagPrioritizer`].

use crate::error::{AnnotationError, DocParseError};
use crate::node::TypeNode;
use crate::parser::parse_type_prefix;
use crate::priority::{Ranked, TagPrioritizer};
use indexmap::IndexMap;
use prism_common::comments::doc_comment_lines;
use serde::{Deserialize, Serialize};
use tracing::trace;

// =============================================================================
// Raw tags
// =============================================================================

/// One `@name body` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTag {
    /// Tag name without `@`.
    pub name: String,
    /// Everything after the name, continuation lines joined with `\n`.
    pub body: String,
    /// Zero-based line inside the comment.
    pub line: u32,
}

/// Split a doc comment into summary text and raw tags.
pub fn split_tags(text: &str) -> (String, Vec<RawTag>) {
    let mut summary: Vec<&str> = Vec::new();
    let mut tags: Vec<RawTag> = Vec::new();

    for line in doc_comment_lines(text) {
        if let Some(rest) = line.text.strip_prefix('@') {
            let name_len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(rest.len());
            if name_len > 0 {
                tags.push(RawTag {
                    name: rest[..name_len].to_string(),
                    body: rest[name_len..].trim().to_string(),
                    line: line.line,
                });
                continue;
            }
        }
        match tags.last_mut() {
            Some(tag) => {
                if !line.text.is_empty() {
                    if !tag.body.is_empty() {
                        tag.body.push('\n');
                    }
                    tag.body.push_str(line.text);
                }
            }
            None => summary.push(line.text),
        }
    }

    let summary = summary.join("\n").trim().to_string();
    (summary, tags)
}

// =============================================================================
// Annotations
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarTag {
    pub name: Option<String>,
    pub ty: TypeNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamTag {
    pub name: String,
    pub ty: TypeNode,
    pub by_ref: bool,
    pub variadic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateTag {
    pub name: String,
    pub constraint: Option<TypeNode>,
    pub variance: Variance,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAliasTag {
    pub name: String,
    pub ty: TypeNode,
}

/// `@psalm-import-type Row from Table as TableRow`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedTypeTag {
    pub name: String,
    pub from: String,
    pub alias: Option<String>,
}

/// The annotations of one doc comment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocBlock {
    pub summary: String,
    pub vars: Vec<VarTag>,
    pub params: Vec<ParamTag>,
    pub return_type: Option<TypeNode>,
    pub throws: Vec<TypeNode>,
    pub templates: Vec<TemplateTag>,
    pub extends: Vec<TypeNode>,
    pub implements: Vec<TypeNode>,
    pub uses: Vec<TypeNode>,
    pub type_aliases: Vec<TypeAliasTag>,
    pub imported_types: Vec<ImportedTypeTag>,
    pub readonly: bool,
    pub is_final: bool,
    /// The deprecation message (possibly empty) when `@deprecated` is present.
    pub deprecated: Option<String>,
}

impl DocBlock {
    /// `@var` for the given property name, else the unnamed `@var`.
    pub fn var_for(&self, name: &str) -> Option<&TypeNode> {
        self.vars
            .iter()
            .find(|var| var.name.as_deref() == Some(name))
            .or_else(|| self.vars.iter().find(|var| var.name.is_none()))
            .map(|var| &var.ty)
    }

    pub fn param(&self, name: &str) -> Option<&ParamTag> {
        self.params.iter().find(|param| param.name == name)
    }
}

#[derive(Default)]
struct Collector {
    vars: IndexMap<Option<String>, Ranked<VarTag>>,
    params: IndexMap<String, Ranked<ParamTag>>,
    return_type: Ranked<TypeNode>,
    throws: Vec<(i32, TypeNode)>,
    templates: IndexMap<String, Ranked<TemplateTag>>,
    extends: IndexMap<String, Ranked<TypeNode>>,
    implements: IndexMap<String, Ranked<TypeNode>>,
    uses: IndexMap<String, Ranked<TypeNode>>,
    type_aliases: IndexMap<String, Ranked<TypeAliasTag>>,
    imported_types: IndexMap<String, Ranked<ImportedTypeTag>>,
}

fn finish<K, T>(map: IndexMap<K, Ranked<T>>) -> Vec<T> {
    map.into_values().filter_map(Ranked::into_inner).collect()
}

/// Parse a doc comment into its annotations.
///
/// Tags with missing types (`@param $x`) are skipped; a malformed type
/// expression is an error.
pub fn parse_doc_block(text: &str, prioritizer: &TagPrioritizer) -> Result<DocBlock, AnnotationError> {
    let (summary, raw_tags) = split_tags(text);
    let mut block = DocBlock {
        summary,
        ..DocBlock::default()
    };
    let mut collector = Collector::default();

    for tag in &raw_tags {
        let (prefix, base) = prioritizer.split(&tag.name);
        let rank = prioritizer.rank(prefix);
        let wrap = |error: DocParseError| AnnotationError {
            tag: tag.name.clone(),
            line: tag.line,
            error,
        };
        let body = tag.body.as_str();

        match base {
            "var" => {
                if let Some(var) = read_var(body).map_err(wrap)? {
                    collector
                        .vars
                        .entry(var.name.clone())
                        .or_default()
                        .offer(rank, var);
                }
            }
            "param" => {
                if let Some(param) = read_param(body).map_err(wrap)? {
                    collector
                        .params
                        .entry(param.name.clone())
                        .or_default()
                        .offer(rank, param);
                }
            }
            "return" => {
                if let Some(ty) = read_type(body).map_err(wrap)? {
                    collector.return_type.offer(rank, ty);
                }
            }
            "throws" => {
                if let Some(ty) = read_type(body).map_err(wrap)? {
                    collector.throws.push((rank, ty));
                }
            }
            "template" | "template-covariant" | "template-contravariant" => {
                let variance = match base {
                    "template-covariant" => Variance::Covariant,
                    "template-contravariant" => Variance::Contravariant,
                    _ => Variance::Invariant,
                };
                if let Some(template) = read_template(body, variance).map_err(wrap)? {
                    collector
                        .templates
                        .entry(template.name.clone())
                        .or_default()
                        .offer(rank, template);
                }
            }
            "extends" | "template-extends" => {
                offer_reference(&mut collector.extends, body, rank).map_err(wrap)?;
            }
            "implements" | "template-implements" => {
                offer_reference(&mut collector.implements, body, rank).map_err(wrap)?;
            }
            "use" | "template-use" => {
                offer_reference(&mut collector.uses, body, rank).map_err(wrap)?;
            }
            "type" => {
                if let Some(alias) = read_type_alias(body).map_err(wrap)? {
                    collector
                        .type_aliases
                        .entry(alias.name.clone())
                        .or_default()
                        .offer(rank, alias);
                }
            }
            "import-type" => {
                if let Some(import) = read_import(body) {
                    let local = import.alias.clone().unwrap_or_else(|| import.name.clone());
                    collector
                        .imported_types
                        .entry(local)
                        .or_default()
                        .offer(rank, import);
                }
            }
            "readonly" | "immutable" => block.readonly = true,
            "final" => block.is_final = true,
            "deprecated" => {
                if block.deprecated.is_none() {
                    block.deprecated = Some(body.to_string());
                }
            }
            _ => trace!(tag = %tag.name, "ignoring unknown tag"),
        }
    }

    let best_throws = collector.throws.iter().map(|(rank, _)| *rank).max();
    block.throws = collector
        .throws
        .into_iter()
        .filter(|(rank, _)| Some(*rank) == best_throws)
        .map(|(_, ty)| ty)
        .collect();
    block.vars = finish(collector.vars);
    block.params = finish(collector.params);
    block.return_type = collector.return_type.into_inner();
    block.templates = finish(collector.templates);
    block.extends = finish(collector.extends);
    block.implements = finish(collector.implements);
    block.uses = finish(collector.uses);
    block.type_aliases = finish(collector.type_aliases);
    block.imported_types = finish(collector.imported_types);
    Ok(block)
}

// =============================================================================
// Tag bodies
// =============================================================================

fn read_type(body: &str) -> Result<Option<TypeNode>, DocParseError> {
    if body.is_empty() {
        return Ok(None);
    }
    let (ty, _) = parse_type_prefix(body)?;
    Ok(Some(ty))
}

fn read_var(body: &str) -> Result<Option<VarTag>, DocParseError> {
    if body.is_empty() || body.starts_with('$') {
        return Ok(None);
    }
    let (ty, rest) = parse_type_prefix(body)?;
    let name = rest
        .trim_start()
        .strip_prefix('$')
        .map(|rest| take_word(rest).to_string())
        .filter(|name| !name.is_empty());
    Ok(Some(VarTag { name, ty }))
}

fn read_param(body: &str) -> Result<Option<ParamTag>, DocParseError> {
    let starts_untyped = ["$", "&$", "...$", "&...$"]
        .iter()
        .any(|prefix| body.starts_with(prefix));
    if body.is_empty() || starts_untyped {
        return Ok(None);
    }
    let (ty, rest) = parse_type_prefix(body)?;
    let mut rest = rest.trim_start();
    let by_ref = match rest.strip_prefix('&') {
        Some(stripped) => {
            rest = stripped.trim_start();
            true
        }
        None => false,
    };
    let variadic = match rest.strip_prefix("...") {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };
    let Some(rest) = rest.strip_prefix('$') else {
        return Ok(None);
    };
    let name = take_word(rest);
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(ParamTag {
        name: name.to_string(),
        ty,
        by_ref,
        variadic,
    }))
}

fn read_template(body: &str, variance: Variance) -> Result<Option<TemplateTag>, DocParseError> {
    let name = take_word(body);
    if name.is_empty() {
        return Ok(None);
    }
    let rest = body[name.len()..].trim_start();
    let constraint = match rest
        .strip_prefix("of ")
        .or_else(|| rest.strip_prefix("as "))
    {
        Some(constraint) => Some(parse_type_prefix(constraint.trim_start())?.0),
        None => None,
    };
    Ok(Some(TemplateTag {
        name: name.to_string(),
        constraint,
        variance,
    }))
}

fn offer_reference(
    target: &mut IndexMap<String, Ranked<TypeNode>>,
    body: &str,
    rank: i32,
) -> Result<(), DocParseError> {
    let Some(ty) = read_type(body)? else {
        return Ok(());
    };
    let base = match &ty {
        TypeNode::Generic { base, .. } | TypeNode::Identifier(base) => base.clone(),
        _ => {
            return Err(DocParseError::InvalidType {
                text: body.to_string(),
                reason: "expected a class reference".to_string(),
            });
        }
    };
    target.entry(base).or_default().offer(rank, ty);
    Ok(())
}

fn read_type_alias(body: &str) -> Result<Option<TypeAliasTag>, DocParseError> {
    let name = take_word(body);
    if name.is_empty() {
        return Ok(None);
    }
    let rest = body[name.len()..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
    let (ty, _) = parse_type_prefix(rest)?;
    Ok(Some(TypeAliasTag {
        name: name.to_string(),
        ty,
    }))
}

fn read_import(body: &str) -> Option<ImportedTypeTag> {
    let mut words = body.split_whitespace();
    let name = words.next()?;
    if !words.next()?.eq_ignore_ascii_case("from") {
        return None;
    }
    let from = words.next()?;
    let alias = match words.next() {
        Some(word) if word.eq_ignore_ascii_case("as") => words.next().map(str::to_string),
        _ => None,
    };
    Some(ImportedTypeTag {
        name: name.to_string(),
        from: from.to_string(),
        alias,
    })
}

fn take_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
#[path = "../tests/tags_tests.rs"]
mod tests;
