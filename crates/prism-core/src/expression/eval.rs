//! Expression evaluation.

use super::value::{self, ArrayBuilder, ArrayKey, Value};
use super::{ClassTarget, Expression};
use crate::data;
use crate::error::{EvaluationError, ReflectionError};
use crate::session::Reflect;
use prism_common::recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use prism_syntax::BinaryOp;
use prism_types::{ClassId, DeclId};
use std::cell::RefCell;
use tracing::trace;

/// What an expression can look up while it is evaluated.
pub trait EvaluationContext {
    /// A global constant by fully qualified name; `Ok(None)` when undefined.
    fn constant(&self, name: &str) -> Result<Option<Value>, EvaluationError>;

    /// A class constant or enum case.
    fn class_constant(&self, class: &ClassId, name: &str) -> Result<Value, EvaluationError>;

    /// Maximum nesting of a single expression tree.
    fn max_depth(&self) -> u32 {
        RecursionProfile::Evaluation.max_depth()
    }
}

/// Constants every program can use without declaring them.
pub fn builtin_constant(name: &str) -> Option<Value> {
    let value = match name {
        "PHP_EOL" => Value::String("\n".to_string()),
        "PHP_INT_MAX" => Value::Int(i64::MAX),
        "PHP_INT_MIN" => Value::Int(i64::MIN),
        "PHP_INT_SIZE" => Value::Int(8),
        "PHP_FLOAT_EPSILON" => Value::Float(f64::EPSILON),
        "PHP_FLOAT_MAX" => Value::Float(f64::MAX),
        "PHP_FLOAT_MIN" => Value::Float(f64::MIN_POSITIVE),
        "PHP_FLOAT_DIG" => Value::Int(15),
        "NAN" => Value::Float(f64::NAN),
        "INF" => Value::Float(f64::INFINITY),
        "M_PI" => Value::Float(std::f64::consts::PI),
        "M_E" => Value::Float(std::f64::consts::E),
        "DIRECTORY_SEPARATOR" => Value::String("/".to_string()),
        "PATH_SEPARATOR" => Value::String(":".to_string()),
        "E_ERROR" => Value::Int(1),
        "E_WARNING" => Value::Int(2),
        "E_NOTICE" => Value::Int(8),
        "E_STRICT" => Value::Int(2048),
        "E_DEPRECATED" => Value::Int(8192),
        "E_ALL" => Value::Int(32767),
        _ => return None,
    };
    Some(value)
}

impl Expression {
    /// Evaluate with `static` bound to `static_class`.
    pub fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        static_class: Option<&ClassId>,
    ) -> Result<Value, EvaluationError> {
        let mut frame = Frame {
            context,
            static_class,
            depth: DepthCounter::new(context.max_depth()),
        };
        frame.eval(self)
    }
}

struct Frame<'c> {
    context: &'c dyn EvaluationContext,
    static_class: Option<&'c ClassId>,
    depth: DepthCounter,
}

impl Frame<'_> {
    fn eval(&mut self, expr: &Expression) -> Result<Value, EvaluationError> {
        if !self.depth.enter() {
            return Err(EvaluationError::TooDeep);
        }
        let result = self.eval_inner(expr);
        self.depth.leave();
        result
    }

    fn eval_inner(&mut self, expr: &Expression) -> Result<Value, EvaluationError> {
        match expr {
            Expression::Value(value) => Ok(value.clone()),
            Expression::Array(entries) => {
                let mut array = ArrayBuilder::new();
                for entry in entries {
                    let key = match &entry.key {
                        Some(key) => Some(ArrayKey::from_value(&self.eval(key)?)?),
                        None => None,
                    };
                    let value = self.eval(&entry.value)?;
                    if entry.spread {
                        let Value::Array(items) = value else {
                            return Err(EvaluationError::InvalidOperand("spread of a non-array"));
                        };
                        for (key, item) in items {
                            match key {
                                ArrayKey::Int(_) => array.push(item),
                                ArrayKey::String(_) => array.insert(key, item),
                            }
                        }
                        continue;
                    }
                    match key {
                        Some(key) => array.insert(key, value),
                        None => array.push(value),
                    }
                }
                Ok(array.finish())
            }
            Expression::Binary { op, left, right } => {
                let left = self.eval(left)?;
                match op {
                    BinaryOp::LogicalAnd if !left.is_truthy() => Ok(Value::Bool(false)),
                    BinaryOp::LogicalOr if left.is_truthy() => Ok(Value::Bool(true)),
                    BinaryOp::Coalesce if !matches!(left, Value::Null) => Ok(left),
                    _ => {
                        let right = self.eval(right)?;
                        value::binary(*op, &left, &right)
                    }
                }
            }
            Expression::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                value::unary(*op, &operand)
            }
            Expression::Ternary {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.eval(condition)?;
                if condition.is_truthy() {
                    match then {
                        Some(then) => self.eval(then),
                        None => Ok(condition),
                    }
                } else {
                    self.eval(otherwise)
                }
            }
            Expression::ConstantFetch { primary, fallback } => {
                if let Some(value) = self.context.constant(primary)? {
                    return Ok(value);
                }
                if let Some(fallback) = fallback {
                    if let Some(value) = self.context.constant(fallback)? {
                        return Ok(value);
                    }
                }
                Err(EvaluationError::UndefinedConstant(primary.clone()))
            }
            Expression::ClassConstantFetch { class, name } => {
                let class = self.bind(class)?;
                if name.eq_ignore_ascii_case("class") {
                    return Ok(Value::String(class.type_name()));
                }
                self.context.class_constant(&class, name)
            }
            Expression::Instantiation { class, arguments } => {
                let class = self.bind(class)?;
                let mut evaluated = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push((argument.name.clone(), self.eval(&argument.value)?));
                }
                Ok(Value::Object {
                    class,
                    arguments: evaluated,
                })
            }
            Expression::ArrayFetch { array, key } => {
                let array = self.eval(array)?;
                let key = self.eval(key)?;
                value::fetch(&array, &key)?.ok_or_else(|| {
                    EvaluationError::UndefinedKey(match ArrayKey::from_value(&key) {
                        Ok(key) => key.to_string(),
                        Err(_) => key.type_name().to_string(),
                    })
                })
            }
            Expression::ArrayFetchCoalesce {
                array,
                key,
                default,
            } => {
                let array = self.eval(array)?;
                let key = self.eval(key)?;
                match value::fetch(&array, &key) {
                    Ok(Some(value)) if !matches!(value, Value::Null) => Ok(value),
                    _ => self.eval(default),
                }
            }
        }
    }

    fn bind(&self, class: &ClassTarget) -> Result<ClassId, EvaluationError> {
        match class {
            ClassTarget::Class(class) => Ok(class.clone()),
            ClassTarget::Static => self.static_class.cloned().ok_or(EvaluationError::UnboundStatic),
        }
    }
}

// =============================================================================
// Contexts
// =============================================================================

/// Evaluates without reflecting anything: only builtin constants resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalContext;

impl EvaluationContext for LocalContext {
    fn constant(&self, name: &str) -> Result<Option<Value>, EvaluationError> {
        Ok(builtin_constant(name))
    }

    fn class_constant(&self, class: &ClassId, name: &str) -> Result<Value, EvaluationError> {
        Err(EvaluationError::UndefinedClassConstant {
            class: class.type_name(),
            name: name.to_string(),
        })
    }
}

/// Evaluates against reflected declarations.
///
/// Constants are looked up through [`Reflect`]; a constant that is reached
/// again while its own value is being evaluated is a circular reference.
pub struct Evaluator<'r> {
    reflect: &'r dyn Reflect,
    max_depth: u32,
    visiting: RefCell<RecursionGuard<DeclId>>,
}

impl<'r> Evaluator<'r> {
    pub fn new(reflect: &'r dyn Reflect, max_depth: u32) -> Self {
        Self {
            reflect,
            max_depth,
            visiting: RefCell::new(RecursionGuard::new(
                max_depth,
                RecursionProfile::Evaluation.max_iterations(),
            )),
        }
    }

    fn guarded(
        &self,
        id: DeclId,
        value: &Expression,
        static_class: Option<&ClassId>,
    ) -> Result<Value, EvaluationError> {
        let entered = self.visiting.borrow_mut().enter(id.clone());
        match entered {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return Err(EvaluationError::CircularReference(id.to_string())),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                return Err(EvaluationError::TooDeep);
            }
        }
        trace!(constant = %id, "evaluating");
        let result = value.evaluate(self, static_class);
        self.visiting.borrow_mut().leave(&id);
        result
    }
}

impl EvaluationContext for Evaluator<'_> {
    fn constant(&self, name: &str) -> Result<Option<Value>, EvaluationError> {
        if let Some(value) = builtin_constant(name) {
            return Ok(Some(value));
        }
        let id = DeclId::constant(name);
        let data = match self.reflect.reflect(&id) {
            Ok(data) => data,
            Err(ReflectionError::DeclarationNotFound(_)) => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        match data.get(&data::VALUE) {
            Some(value) => self.guarded(id.clone(), value, None).map(Some),
            None => Ok(None),
        }
    }

    fn class_constant(&self, class: &ClassId, name: &str) -> Result<Value, EvaluationError> {
        let data = self.reflect.reflect(&DeclId::Class(class.clone()))?;
        let undefined = || EvaluationError::UndefinedClassConstant {
            class: class.type_name(),
            name: name.to_string(),
        };
        let constant = data::member(&data, &data::CONSTANTS, name).ok_or_else(undefined)?;
        if *constant.get(&data::ENUM_CASE) {
            return Ok(Value::EnumCase {
                class: class.clone(),
                case: name.to_string(),
            });
        }
        let value = constant.get(&data::VALUE).ok_or_else(undefined)?;
        self.guarded(DeclId::class_constant(class, name), value, Some(class))
    }

    fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
