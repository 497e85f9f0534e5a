//! Expression syntax tree types
//!
//! `Display` renders a tree back to canonical source text. Parsing that text
//! again yields an equal tree.

use std::fmt;

/// Sub-kind of a literal, decided by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    Imaginary,
    Char,
    String,
    Bool,
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal with its raw source text (quotes and escapes included)
    Literal { kind: LiteralKind, raw: String },
    /// Cell coordinate, context keyword or free variable
    Identifier(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call or type conversion
    Call { callee: String, args: Vec<Expr> },
    /// Parenthesized group, kept so the source can be reproduced
    Paren(Box<Expr>),
}

impl Expr {
    pub fn literal<S: Into<String>>(kind: LiteralKind, raw: S) -> Self {
        Expr::Literal {
            kind,
            raw: raw.into(),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Nodes on the longest path from this node down to a leaf
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, level)) = pending.pop() {
            deepest = deepest.max(level);
            match expr {
                Expr::Literal { .. } | Expr::Identifier(_) => {}
                Expr::Unary { operand, .. } | Expr::Paren(operand) => {
                    pending.push((operand.as_ref(), level + 1));
                }
                Expr::Binary { left, right, .. } => {
                    pending.push((left.as_ref(), level + 1));
                    pending.push((right.as_ref(), level + 1));
                }
                Expr::Call { args, .. } => {
                    pending.extend(args.iter().map(|arg| (arg, level + 1)));
                }
            }
        }
        deepest
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Bitwise
    BitOr,
    BitXor,
    BitAnd,
    AndNot,
    ShiftLeft,
    ShiftRight,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

impl BinaryOperator {
    /// Binding strength, higher binds tighter
    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            Or => 1,
            And => 2,
            Equal | NotEqual | LessThan | LessEqual | GreaterThan | GreaterEqual => 3,
            BitOr => 4,
            BitXor => 5,
            BitAnd | AndNot => 6,
            ShiftLeft | ShiftRight => 7,
            Add | Subtract => 8,
            Multiply | Divide | Remainder => 9,
            Power => 10,
        }
    }

    /// `**` groups to the right, everything else to the left
    pub fn is_right_associative(self) -> bool {
        self == BinaryOperator::Power
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Or => "||",
            And => "&&",
            Equal => "==",
            NotEqual => "!=",
            LessThan => "<",
            LessEqual => "<=",
            GreaterThan => ">",
            GreaterEqual => ">=",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            AndNot => "&^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Remainder => "%",
            Power => "**",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Negate,
    /// Bitwise complement (`^x`)
    Complement,
    /// Logical not (`!x`)
    Not,
    /// Postfix factorial (`x!`)
    Factorial,
}

impl UnaryOperator {
    pub fn is_postfix(self) -> bool {
        self == UnaryOperator::Factorial
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Negate => "-",
            UnaryOperator::Complement => "^",
            UnaryOperator::Not | UnaryOperator::Factorial => "!",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { raw, .. } => f.write_str(raw),
            Expr::Identifier(name) => f.write_str(name),
            Expr::Unary { op, operand } if op.is_postfix() => {
                write!(f, "{}{}", operand, op.symbol())
            }
            Expr::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
            Expr::Binary { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}
