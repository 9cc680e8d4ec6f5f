//! Parsed, unresolved type expressions.
//!
//! A `TypeNode` is the syntax of a documentation type. Names are kept as
//! written; [`crate::compile`] resolves them against a `TypeContext`.

#[derive(Clone, Debug, PartialEq)]
pub enum TypeNode {
    /// A keyword or class name as written: `int`, `positive-int`, `Foo\Bar`.
    Identifier(String),
    /// `$this`
    This,
    /// `Name<A, B>`
    Generic { base: String, args: Vec<TypeNode> },
    /// `?T`
    Nullable(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    /// `T[]`
    ArrayOf(Box<TypeNode>),
    /// `T['key']`
    OffsetAccess {
        base: Box<TypeNode>,
        offset: Box<TypeNode>,
    },
    /// `array{...}`, `list{...}`, `object{...}`
    Shape {
        base: String,
        items: Vec<ShapeItemNode>,
        sealed: bool,
    },
    /// `callable(int, string=): void`, `Closure(...)`
    Callable {
        base: String,
        params: Vec<CallableParamNode>,
        ret: Option<Box<TypeNode>>,
    },
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    /// `Foo::BAR`, `Foo::class`, `Foo::BAR_*`
    ConstFetch { class: String, name: String },
    Conditional {
        subject: SubjectNode,
        target: Box<TypeNode>,
        if_true: Box<TypeNode>,
        if_false: Box<TypeNode>,
        negated: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKeyNode {
    Identifier(String),
    Int(i64),
    String(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeItemNode {
    pub key: Option<ShapeKeyNode>,
    pub optional: bool,
    pub value: TypeNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallableParamNode {
    pub ty: TypeNode,
    pub name: Option<String>,
    pub by_ref: bool,
    pub variadic: bool,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubjectNode {
    /// `$param is ...`
    Parameter(String),
    /// `T is ...`
    Type(Box<TypeNode>),
}
