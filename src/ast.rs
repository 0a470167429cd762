// ABOUTME: Abstract syntax tree node types for expressions and statements

use crate::location::Location;
use crate::types::TypeTag;
use crate::value::Value;

/// A parsed type annotation: either a primitive tag or an identifier that
/// must resolve to an enum statement at evaluation time (spec section 4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub tag: TypeTag,
    pub name: Option<String>,
}

impl TypeAnnotation {
    pub fn primitive(tag: TypeTag) -> Self {
        TypeAnnotation { tag, name: None }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeAnnotation {
            tag: TypeTag::Unknown,
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_ann: TypeAnnotation,
    pub nullable: bool,
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    EnumOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Typeof,
    Length,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Name(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Value,
        lexeme: String,
    },
    Variable {
        name: String,
        location: Location,
    },
    Grouping(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: Location,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        location: Location,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Is {
        operand: Box<Expr>,
        type_ann: TypeAnnotation,
        location: Location,
    },
    TypeConversion {
        target: TypeAnnotation,
        operand: Box<Expr>,
        location: Location,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        location: Location,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: Location,
    },
    Member {
        object: Box<Expr>,
        property: MemberProperty,
        location: Location,
    },
    NamespaceMember {
        namespace: String,
        property: String,
        location: Location,
    },
    Array {
        elements: Vec<Expr>,
    },
    Hashmap {
        pairs: Vec<(Expr, Expr)>,
    },
    Function {
        name: Option<String>,
        params: Vec<Param>,
        return_type: TypeAnnotation,
        nullable_return: bool,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub name: String,
    pub declared_type: TypeAnnotation,
    pub nullable: bool,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Expr,
    pub handler: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Expression(Expr),
    Var {
        declarator: VarDeclarator,
        initializer: Option<Expr>,
    },
    ArrayDestructuring {
        declarators: Vec<VarDeclarator>,
        source: Expr,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    ConditionalFor {
        condition: Option<Expr>,
        body: Box<Stmt>,
    },
    InitializedFor {
        init: Box<Stmt>,
        stop: Expr,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Return {
        value: Option<Expr>,
        location: Location,
    },
    Break(Location),
    Continue(Location),
    Print {
        expr: Expr,
        channel: Channel,
    },
    Public {
        names: Vec<String>,
        location: Location,
    },
    Import {
        path: String,
        location: Location,
    },
    Enum {
        name: String,
        members: Vec<(String, Vec<TypeAnnotation>)>,
    },
    Match {
        scrutinee: Expr,
        cases: Vec<MatchCase>,
    },
    FunctionDecl {
        name: String,
        function: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub declarations: Vec<Stmt>,
}
