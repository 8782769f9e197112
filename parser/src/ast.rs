//! FILENAME: parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The evaluator traverses the tree
//! to compute the final result, and `Display` renders the canonical text
//! form used when a formula is echoed back for editing.
//!
//! SUPPORTED EXPRESSIONS:
//! - Number literals: 42, 3.14
//! - Cell references: A1, AA100
//! - Binary operations: +, -, *, /
//! - Unary operations: + and - (sign)
//! - Parentheses for grouping

/// Represents a parsed formula expression.
/// This is the core data structure that the evaluator will traverse.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),

    /// A single cell reference like A1, B2, or AA100.
    /// The column is stored as matched (e.g., "A", "AA") and the row as a
    /// 1-based number, so references past the sheet limits survive parsing
    /// and surface as runtime reference errors instead.
    CellRef { col: String, row: u32 },

    /// A unary operation: op operand (e.g., -5, +A1).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// A binary operation: left op right (e.g., 5 + 3, A1 * B2).
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

/// Binary operators for expressions, with the usual two precedence tiers.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
}

impl BinaryOperator {
    /// 1 for additive operators, 2 for multiplicative ones.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

/// Unary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Plus,   // +
    Negate, // -
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

/// Decides whether `child` must be parenthesized when printed under a
/// binary `parent` operator. Parentheses are kept only where dropping them
/// would regroup the expression:
/// - an additive child under a multiplicative parent always needs them;
/// - an equal-precedence child needs them only as the right operand of a
///   non-commutative parent (`-` or `/`), where left associativity would
///   otherwise capture it: 1-(2-3) vs 1-2-3, 1/(2*3) vs 1/2*3.
/// Unary operands and atoms bind tighter than any binary operator.
fn needs_parens(parent: BinaryOperator, is_right: bool, child: &Expression) -> bool {
    let child_op = match child {
        Expression::BinaryOp { op, .. } => *op,
        _ => return false,
    };

    if child_op.precedence() < parent.precedence() {
        return true;
    }

    child_op.precedence() == parent.precedence()
        && is_right
        && matches!(parent, BinaryOperator::Subtract | BinaryOperator::Divide)
}

impl Expression {
    fn fmt_child(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        parent: BinaryOperator,
        is_right: bool,
    ) -> std::fmt::Result {
        if needs_parens(parent, is_right, self) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl std::fmt::Display for Expression {
    /// Prints the canonical form: no whitespace, minimal parentheses, and
    /// numbers in their shortest round-trip decimal representation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::CellRef { col, row } => write!(f, "{}{}", col, row),
            Expression::UnaryOp { op, operand } => {
                write!(f, "{}", op)?;
                // Only an additive subtree regroups under a sign: -(1+2)
                // must keep its parentheses, while -1*2 and --1 do not.
                if matches!(
                    operand.as_ref(),
                    Expression::BinaryOp { op, .. } if op.precedence() == 1
                ) {
                    write!(f, "({})", operand)
                } else {
                    write!(f, "{}", operand)
                }
            }
            Expression::BinaryOp { left, op, right } => {
                left.fmt_child(f, *op, false)?;
                write!(f, "{}", op)?;
                right.fmt_child(f, *op, true)
            }
        }
    }
}
