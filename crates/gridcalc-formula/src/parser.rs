//! Expression parser
//!
//! A one-pass operator-stack parser. Each nesting level (top level, a
//! parenthesized group, a call argument) keeps its own operand stack. A binary
//! operator pops the pending left operand, reads exactly one right operand and
//! then rotates the new node into the right spine of the left operand while the
//! left operator binds more loosely. That rotation is what turns
//! `1 + 2 * 3` into `1 + (2 * 3)` without a separate precedence table pass.
//!
//! Leading `-`, `+`, `^` and `!` produce [`Expr::Unary`] nodes rather than an
//! implicit `0 - x`, so the operand keeps its kind and the tree prints back to
//! the text it came from.
//!
//! No tree deeper than [`MAX_DEPTH`] is ever built. Evaluating, printing and
//! dropping a tree all recurse over it.

use crate::ast::{BinaryOperator, Expr, LiteralKind, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token, TokenKind};

/// Deepest expression tree the parser accepts
///
/// Counts the nodes on the longest path from the root to a leaf, so `((1))`
/// is three deep and `1 + 2 + 3` is three deep as well.
pub const MAX_DEPTH: usize = 256;

const TOO_DEEP: &str = "expression nested too deeply";

/// Parse expression text into a tree
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse;
///
/// let expr = parse("1 + 2 * 3").unwrap();
/// assert_eq!(expr.to_string(), "1 + 2 * 3");
/// assert!(parse("(1 + 2").is_err());
/// ```
pub fn parse(source: &str) -> FormulaResult<Expr> {
    let tokens = tokenize(source)?;
    parse_tokens(&tokens, source.len())
}

/// Parse an already lexed token sequence
///
/// `end_offset` is reported for errors found after the last token.
pub fn parse_tokens(tokens: &[Token], end_offset: usize) -> FormulaResult<Expr> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        end_offset,
        nesting: 0,
    };

    let expr = parser.parse_sequence()?;
    if let Some(token) = parser.peek() {
        return Err(match token.kind {
            TokenKind::RParen => FormulaError::parse(token.offset, "unbalanced parenthesis"),
            _ => FormulaError::parse(token.offset, format!("unexpected {:?}", token.text)),
        });
    }

    expr.ok_or_else(|| FormulaError::parse(end_offset, "empty expression"))
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    end_offset: usize,
    /// Open groups, calls and prefix operators around the current position
    nesting: usize,
}

impl<'t> Parser<'t> {
    // === Token access ===

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end_offset, |t| t.offset)
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        offset: usize,
        parse: impl FnOnce(&mut Self) -> FormulaResult<T>,
    ) -> FormulaResult<T> {
        if self.nesting + 1 >= MAX_DEPTH {
            return Err(FormulaError::parse(offset, TOO_DEEP));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    // === Sequences ===

    /// Parse operands and operators until end of input, `)` or `,`
    ///
    /// Returns `None` when the level holds no operand at all.
    fn parse_sequence(&mut self) -> FormulaResult<Option<Expr>> {
        // Operands with an upper bound on their height
        let mut stack: Vec<(Expr, usize)> = Vec::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::RParen | TokenKind::Comma => break,

                // Postfix factorial binds to the operand just completed
                TokenKind::Bang if !stack.is_empty() => {
                    self.next();
                    if let Some((left, height)) = stack.pop() {
                        stack.push(bounded(apply_factorial(left), height + 1, token.offset)?);
                    }
                }

                kind => {
                    if let Some(op) = binary_operator(kind) {
                        if stack.is_empty() && prefix_operator(kind).is_none() {
                            return Err(FormulaError::parse(
                                token.offset,
                                "missing left-hand side",
                            ));
                        }
                        if let Some((left, left_height)) = stack.pop() {
                            self.next();
                            let right = self.parse_operand()?;
                            let right_height = right.depth();
                            let (expr, descended) = insert(left, op, right);
                            let height = left_height.max(descended + right_height) + 1;
                            stack.push(bounded(expr, height, token.offset)?);
                            continue;
                        }
                    }

                    if !stack.is_empty() {
                        return Err(FormulaError::parse(token.offset, "trailing tokens"));
                    }
                    let operand = self.parse_operand()?;
                    let height = operand.depth();
                    stack.push(bounded(operand, height, token.offset)?);
                }
            }
        }

        Ok(stack.pop().map(|(expr, _)| expr))
    }

    /// Parse exactly one operand: prefix operators followed by a primary
    fn parse_operand(&mut self) -> FormulaResult<Expr> {
        let offset = self.offset();
        let Some(token) = self.next() else {
            return Err(FormulaError::parse(offset, "missing right-hand side"));
        };

        if let Some(op) = prefix_operator(token.kind) {
            let operand = self.nested(token.offset, Self::parse_operand)?;
            return Ok(Expr::unary(op, operand));
        }

        match token.kind {
            TokenKind::Int => Ok(Expr::literal(LiteralKind::Int, &token.text)),
            TokenKind::Float => Ok(Expr::literal(LiteralKind::Float, &token.text)),
            TokenKind::Imaginary => Ok(Expr::literal(LiteralKind::Imaginary, &token.text)),
            TokenKind::Char => Ok(Expr::literal(LiteralKind::Char, &token.text)),
            TokenKind::String => Ok(Expr::literal(LiteralKind::String, &token.text)),
            TokenKind::Ident => {
                if self.peek_kind() == Some(TokenKind::LParen) {
                    self.next();
                    return self.nested(token.offset, |p| p.parse_call(&token.text));
                }
                match token.text.as_str() {
                    "true" | "false" => Ok(Expr::literal(LiteralKind::Bool, &token.text)),
                    _ => Ok(Expr::Identifier(token.text.clone())),
                }
            }
            TokenKind::LParen => self.nested(token.offset, |p| p.parse_group(token.offset)),
            TokenKind::RParen | TokenKind::Comma => {
                Err(FormulaError::parse(token.offset, "missing right-hand side"))
            }
            _ => Err(FormulaError::parse(
                token.offset,
                format!("unexpected operator {:?}", token.text),
            )),
        }
    }

    /// Parse the rest of a parenthesized group after its `(`
    fn parse_group(&mut self, open_offset: usize) -> FormulaResult<Expr> {
        let inner = self.parse_sequence()?;
        match self.peek_kind() {
            Some(TokenKind::RParen) => {
                self.next();
            }
            Some(TokenKind::Comma) => {
                return Err(FormulaError::parse(self.offset(), "unexpected \",\""));
            }
            _ => return Err(FormulaError::parse(open_offset, "unbalanced parenthesis")),
        }

        match inner {
            Some(inner) => Ok(Expr::Paren(Box::new(inner))),
            None => Err(FormulaError::parse(open_offset, "empty parentheses")),
        }
    }

    /// Parse call arguments after `callee(`
    fn parse_call(&mut self, callee: &str) -> FormulaResult<Expr> {
        let mut args = Vec::new();

        if self.peek_kind() == Some(TokenKind::RParen) {
            self.next();
            return Ok(Expr::Call {
                callee: callee.to_string(),
                args,
            });
        }

        loop {
            let offset = self.offset();
            let arg = self
                .parse_sequence()?
                .ok_or_else(|| FormulaError::parse(offset, "empty argument"))?;
            args.push(arg);

            match self.next().map(|t| t.kind) {
                Some(TokenKind::Comma) => continue,
                Some(TokenKind::RParen) => break,
                _ => return Err(FormulaError::parse(self.end_offset, "unbalanced parenthesis")),
            }
        }

        Ok(Expr::Call {
            callee: callee.to_string(),
            args,
        })
    }
}

fn bounded(expr: Expr, height: usize, offset: usize) -> FormulaResult<(Expr, usize)> {
    if height > MAX_DEPTH {
        return Err(FormulaError::parse(offset, TOO_DEEP));
    }
    Ok((expr, height))
}

/// Attach `op right` to `left`, descending the right spine of `left` while its
/// operator binds more loosely
///
/// Also returns how many spine nodes were descended.
fn insert(left: Expr, op: BinaryOperator, right: Expr) -> (Expr, usize) {
    let mut spine = Vec::new();
    let mut node = left;
    loop {
        match node {
            Expr::Binary {
                op: left_op,
                left: inner_left,
                right: inner_right,
            } if left_op.precedence() < op.precedence()
                || (left_op.precedence() == op.precedence() && op.is_right_associative()) =>
            {
                spine.push((left_op, inner_left));
                node = *inner_right;
            }
            other => {
                node = other;
                break;
            }
        }
    }

    let descended = spine.len();
    let mut expr = Expr::binary(op, node, right);
    while let Some((left_op, inner_left)) = spine.pop() {
        expr = Expr::Binary {
            op: left_op,
            left: inner_left,
            right: Box::new(expr),
        };
    }
    (expr, descended)
}

enum SpineNode {
    Binary(BinaryOperator, Box<Expr>),
    Prefix(UnaryOperator),
}

/// Wrap the rightmost operand of `expr` in a factorial
fn apply_factorial(expr: Expr) -> Expr {
    let mut spine = Vec::new();
    let mut node = expr;
    loop {
        match node {
            Expr::Binary { op, left, right } => {
                spine.push(SpineNode::Binary(op, left));
                node = *right;
            }
            Expr::Unary { op, operand } if !op.is_postfix() => {
                spine.push(SpineNode::Prefix(op));
                node = *operand;
            }
            other => {
                node = other;
                break;
            }
        }
    }

    let mut expr = Expr::unary(UnaryOperator::Factorial, node);
    while let Some(parent) = spine.pop() {
        expr = match parent {
            SpineNode::Binary(op, left) => Expr::Binary {
                op,
                left,
                right: Box::new(expr),
            },
            SpineNode::Prefix(op) => Expr::unary(op, expr),
        };
    }
    expr
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::OrOr => BinaryOperator::Or,
        TokenKind::AndAnd => BinaryOperator::And,
        TokenKind::EqEq => BinaryOperator::Equal,
        TokenKind::NotEq => BinaryOperator::NotEqual,
        TokenKind::Lt => BinaryOperator::LessThan,
        TokenKind::Le => BinaryOperator::LessEqual,
        TokenKind::Gt => BinaryOperator::GreaterThan,
        TokenKind::Ge => BinaryOperator::GreaterEqual,
        TokenKind::Pipe => BinaryOperator::BitOr,
        TokenKind::Caret => BinaryOperator::BitXor,
        TokenKind::Amp => BinaryOperator::BitAnd,
        TokenKind::AmpCaret => BinaryOperator::AndNot,
        TokenKind::Shl => BinaryOperator::ShiftLeft,
        TokenKind::Shr => BinaryOperator::ShiftRight,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Remainder,
        TokenKind::StarStar => BinaryOperator::Power,
        _ => return None,
    };
    Some(op)
}

fn prefix_operator(kind: TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::Plus => Some(UnaryOperator::Plus),
        TokenKind::Minus => Some(UnaryOperator::Negate),
        TokenKind::Caret => Some(UnaryOperator::Complement),
        TokenKind::Bang => Some(UnaryOperator::Not),
        _ => None,
    }
}
