//! Syntax tree to [`Expression`].

use super::{Argument, ArrayEntry, ClassTarget, Expression, Value};
use crate::error::EvaluationError;
use prism_common::recursion::{DepthCounter, RecursionProfile};
use prism_syntax::{ClassRef, Expr, Literal, MagicConstant, NewTarget};
use prism_types::{ClassId, NameContext};

/// Lexical scope of an expression.
#[derive(Clone, Copy, Debug)]
pub struct CompileScope<'a> {
    pub names: &'a NameContext,
    pub file: Option<&'a str>,
    /// The enclosing class-like, bound for `self`.
    pub class: Option<&'a ClassId>,
    /// Resolved parent class name, bound for `parent`.
    pub parent: Option<&'a str>,
    pub is_trait: bool,
    pub function: Option<&'a str>,
    pub property: Option<&'a str>,
}

impl<'a> CompileScope<'a> {
    pub fn new(names: &'a NameContext) -> Self {
        Self {
            names,
            file: None,
            class: None,
            parent: None,
            is_trait: false,
            function: None,
            property: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: Option<&'a str>) -> Self {
        self.file = file;
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &'a ClassId, parent: Option<&'a str>, is_trait: bool) -> Self {
        self.class = Some(class);
        self.parent = parent;
        self.is_trait = is_trait;
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: &'a str) -> Self {
        self.function = Some(function);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: &'a str) -> Self {
        self.property = Some(property);
        self
    }
}

/// Compile an expression, folding what is lexically known.
pub fn compile(expr: &Expr, scope: &CompileScope<'_>) -> Result<Expression, EvaluationError> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Evaluation);
    Compiler { scope, depth: &mut depth }.compile(expr)
}

struct Compiler<'s, 'a> {
    scope: &'s CompileScope<'a>,
    depth: &'s mut DepthCounter,
}

impl Compiler<'_, '_> {
    fn compile(&mut self, expr: &Expr) -> Result<Expression, EvaluationError> {
        if !self.depth.enter() {
            return Err(EvaluationError::TooDeep);
        }
        let result = self.compile_inner(expr);
        self.depth.leave();
        result
    }

    fn boxed(&mut self, expr: &Expr) -> Result<Box<Expression>, EvaluationError> {
        Ok(Box::new(self.compile(expr)?))
    }

    fn compile_inner(&mut self, expr: &Expr) -> Result<Expression, EvaluationError> {
        match expr {
            Expr::Literal(literal) => Ok(Expression::Value(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(value) => Value::Bool(*value),
                Literal::Int(value) => Value::Int(*value),
                Literal::Float(value) => Value::Float(*value),
                Literal::String(value) => Value::String(value.clone()),
            })),
            Expr::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    entries.push(ArrayEntry {
                        key: match &item.key {
                            Some(key) => Some(self.compile(key)?),
                            None => None,
                        },
                        value: self.compile(&item.value)?,
                        spread: item.spread,
                    });
                }
                Ok(Expression::Array(entries))
            }
            Expr::Binary { op, left, right } => {
                if *op == prism_syntax::BinaryOp::Coalesce {
                    if let Expr::ArrayDim {
                        array,
                        index: Some(index),
                    } = left.as_ref()
                    {
                        return Ok(Expression::ArrayFetchCoalesce {
                            array: self.boxed(array)?,
                            key: self.boxed(index)?,
                            default: self.boxed(right)?,
                        });
                    }
                }
                Ok(Expression::Binary {
                    op: *op,
                    left: self.boxed(left)?,
                    right: self.boxed(right)?,
                })
            }
            Expr::Unary { op, operand } => Ok(Expression::Unary {
                op: *op,
                operand: self.boxed(operand)?,
            }),
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => Ok(Expression::Ternary {
                condition: self.boxed(condition)?,
                then: match then {
                    Some(then) => Some(self.boxed(then)?),
                    None => None,
                },
                otherwise: self.boxed(otherwise)?,
            }),
            Expr::ConstFetch(name) => {
                let bare = name.without_prefix();
                if !name.is_qualified() && !name.is_relative() {
                    match bare.to_ascii_lowercase().as_str() {
                        "true" => return Ok(Expression::Value(Value::Bool(true))),
                        "false" => return Ok(Expression::Value(Value::Bool(false))),
                        "null" => return Ok(Expression::Value(Value::Null)),
                        _ => {}
                    }
                }
                let resolved = self.scope.names.resolve_constant(name);
                Ok(Expression::ConstantFetch {
                    primary: resolved.primary,
                    fallback: resolved.fallback,
                })
            }
            Expr::ClassConstFetch { class, constant } => {
                let class = self.class_target(class)?;
                if constant.eq_ignore_ascii_case("class") {
                    if let ClassTarget::Class(id) = &class {
                        return Ok(Expression::Value(Value::String(id.type_name())));
                    }
                }
                Ok(Expression::ClassConstantFetch {
                    class,
                    name: constant.clone(),
                })
            }
            Expr::New { target, arguments } => {
                let class = match target {
                    NewTarget::Class(class) => self.class_target(class)?,
                    NewTarget::Anonymous(node) => ClassTarget::Class(ClassId::anonymous(
                        self.scope.file.unwrap_or_default(),
                        node.span.start_line,
                        node.span.start_column,
                    )),
                };
                let mut compiled = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    if argument.spread {
                        return Err(EvaluationError::NotConstant("argument unpacking"));
                    }
                    compiled.push(Argument {
                        name: argument.name.clone(),
                        value: self.compile(&argument.value)?,
                    });
                }
                Ok(Expression::Instantiation {
                    class,
                    arguments: compiled,
                })
            }
            Expr::ArrayDim { array, index } => match index {
                Some(index) => Ok(Expression::ArrayFetch {
                    array: self.boxed(array)?,
                    key: self.boxed(index)?,
                }),
                None => Err(EvaluationError::NotConstant("`[]` read")),
            },
            Expr::Magic { constant, line } => Ok(Expression::Value(self.magic(*constant, *line))),
            Expr::Closure(_) => Err(EvaluationError::NotConstant("closure")),
            Expr::Yield { .. } | Expr::YieldFrom(_) => Err(EvaluationError::NotConstant("yield")),
            Expr::Variable(_) => Err(EvaluationError::NotConstant("variable")),
            Expr::Call { .. } => Err(EvaluationError::NotConstant("function call")),
            Expr::Assign { .. } => Err(EvaluationError::NotConstant("assignment")),
        }
    }

    fn class_target(&self, class: &ClassRef) -> Result<ClassTarget, EvaluationError> {
        match class {
            ClassRef::Named(name) => Ok(ClassTarget::Class(ClassId::named(
                &self.scope.names.resolve_class(name),
            ))),
            ClassRef::SelfRef => self
                .scope
                .class
                .map(|class| ClassTarget::Class(class.clone()))
                .ok_or(EvaluationError::NotConstant("`self` outside of a class")),
            ClassRef::Parent => self
                .scope
                .parent
                .map(|parent| ClassTarget::Class(ClassId::named(parent)))
                .ok_or(EvaluationError::NotConstant("`parent` without a parent class")),
            ClassRef::Static => Ok(ClassTarget::Static),
            ClassRef::Dynamic(_) => Err(EvaluationError::NotConstant("dynamic class reference")),
        }
    }

    fn magic(&self, constant: MagicConstant, line: u32) -> Value {
        let scope = self.scope;
        let text = |value: Option<&str>| Value::String(value.unwrap_or_default().to_string());
        match constant {
            MagicConstant::Line => Value::Int(i64::from(line)),
            MagicConstant::File => text(scope.file),
            MagicConstant::Dir => text(
                scope
                    .file
                    .map(|file| file.rsplit_once('/').map_or(".", |(dir, _)| dir)),
            ),
            MagicConstant::Namespace => text(scope.names.namespace()),
            MagicConstant::Class => Value::String(
                scope
                    .class
                    .filter(|_| !scope.is_trait)
                    .map(ClassId::type_name)
                    .unwrap_or_default(),
            ),
            MagicConstant::Trait => Value::String(
                scope
                    .class
                    .filter(|_| scope.is_trait)
                    .map(ClassId::type_name)
                    .unwrap_or_default(),
            ),
            MagicConstant::Function => text(scope.function),
            MagicConstant::Method => match (scope.class, scope.function) {
                (Some(class), Some(function)) => Value::String(format!("{}::{function}", class.type_name())),
                (_, function) => text(function),
            },
            MagicConstant::Property => text(scope.property),
        }
    }
}
