//! Expression trees for index columns, partial-index predicates and
//! column defaults.
//!
//! The tree carries no operator precedence: nodes are folded left to right
//! in token order. It exists to be printed back or to have its column
//! references rewritten, never to be evaluated.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use super::lexer::{Token, TokenKind};

/// Maximum nesting of groups, calls and prefix operators.
const MAX_DEPTH: usize = 256;

/// Maximum height of a finished tree, matching SQLite's default
/// `SQLITE_MAX_EXPR_DEPTH`. Operator chains count one level per operator.
const MAX_HEIGHT: usize = 1000;

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// A single token: column, literal or `*`.
    Leaf(Token),
    /// `op operand`, e.g. `-x` or `NOT x`.
    Prefix {
        /// The operator token.
        op: Token,
        /// The operand.
        operand: Box<Expr>,
    },
    /// `left op right`.
    ///
    /// Call arguments and row values use a synthetic `,` operator; two
    /// operands written next to each other use the empty juxtaposition
    /// operator.
    Infix {
        /// Left operand.
        left: Box<Expr>,
        /// The operator token.
        op: Token,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `operand op`, e.g. `x DESC` or `x ISNULL`.
    Postfix {
        /// The operand.
        operand: Box<Expr>,
        /// The postfix keyword.
        op: Token,
    },
    /// `callee(args)`.
    Call {
        /// The function name, always a [`Expr::Leaf`].
        callee: Box<Expr>,
        /// Arguments chained with the synthetic comma operator, if any.
        args: Option<Box<Expr>>,
    },
    /// `(inner)`.
    Group(Box<Expr>),
}

impl Expr {
    /// The synthetic operator joining call arguments and row values.
    #[must_use]
    pub fn comma() -> Token {
        Token::new(",", TokenKind::Punctuation)
    }

    /// The synthetic operator joining two adjacent operands.
    #[must_use]
    pub fn juxtaposition() -> Token {
        Token::new("", TokenKind::Punctuation)
    }

    /// Build an infix node.
    #[must_use]
    pub fn infix(left: Expr, op: Token, right: Expr) -> Self {
        Expr::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Returns the wrapped token when this is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Token> {
        match self {
            Expr::Leaf(token) => Some(token),
            _ => None,
        }
    }

    /// Visit every leaf token in print order.
    pub fn for_each_leaf<'a>(&'a self, visit: &mut impl FnMut(&'a Token)) {
        match self {
            Expr::Leaf(token) => visit(token),
            Expr::Prefix { operand, .. } | Expr::Postfix { operand, .. } => {
                operand.for_each_leaf(visit);
            }
            Expr::Infix { left, right, .. } => {
                left.for_each_leaf(visit);
                right.for_each_leaf(visit);
            }
            Expr::Call { callee, args } => {
                callee.for_each_leaf(visit);
                if let Some(args) = args {
                    args.for_each_leaf(visit);
                }
            }
            Expr::Group(inner) => inner.for_each_leaf(visit),
        }
    }
}

/// Parse one expression from the front of `tokens`.
///
/// Parsing stops, leaving the stopping token in the queue, at a `)` or `,`
/// at this call's own nesting level, at a bare word matching one of
/// `terminators` (case-insensitive), or at other punctuation. Commas inside
/// parentheses are folded into the tree.
///
/// Returns `None` when an operand is missing, a `(` is never closed, an
/// operator that cannot be a prefix shows up where an operand is required,
/// or the tree would grow deeper than SQLite's expression depth limit.
/// Consumed tokens are not restored on failure.
pub fn parse_expression(tokens: &mut VecDeque<Token>, terminators: &[&str]) -> Option<Expr> {
    ExprParser::new(tokens)
        .expression(terminators, false)
        .map(|node| node.expr)
}

/// Parse a single operand: a literal, name, call, group or prefixed operand.
pub(crate) fn parse_operand(tokens: &mut VecDeque<Token>) -> Option<Expr> {
    ExprParser::new(tokens).operand().map(|node| node.expr)
}

struct ExprParser<'a> {
    tokens: &'a mut VecDeque<Token>,
    depth: usize,
}

/// A subtree together with its height, so folds can be bounded without
/// walking the tree again.
struct Node {
    expr: Expr,
    height: usize,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: &'a mut VecDeque<Token>) -> Self {
        Self { tokens, depth: 0 }
    }

    fn next_is_punct(&self, symbol: char) -> bool {
        self.tokens.front().is_some_and(|t| t.is_punct(symbol))
    }

    /// Wrap `expr` as a node sitting one level above `child_height`.
    fn node(expr: Expr, child_height: usize) -> Option<Node> {
        let height = child_height + 1;
        (height <= MAX_HEIGHT).then_some(Node { expr, height })
    }

    fn fold(lhs: Node, op: Token, right: Node) -> Option<Node> {
        let height = lhs.height.max(right.height);
        Self::node(Expr::infix(lhs.expr, op, right.expr), height)
    }

    fn expression(&mut self, terminators: &[&str], fold_commas: bool) -> Option<Node> {
        let mut lhs = self.operand()?;

        while let Some(next) = self.tokens.front() {
            if next.is_punct(',') {
                if !fold_commas {
                    break;
                }
                self.tokens.pop_front();
                let right = self.operand()?;
                lhs = Self::fold(lhs, Expr::comma(), right)?;
                continue;
            }
            if next.kind == TokenKind::Identifier
                && terminators
                    .iter()
                    .any(|word| next.text.eq_ignore_ascii_case(word))
            {
                break;
            }

            let kind = next.kind;
            let opens_group = next.is_punct('(');
            match kind {
                TokenKind::PostfixKeyword => {
                    let op = self.tokens.pop_front()?;
                    let Node { expr, height } = lhs;
                    lhs = Self::node(
                        Expr::Postfix {
                            operand: Box::new(expr),
                            op,
                        },
                        height,
                    )?;
                }
                TokenKind::Operator => {
                    let op = self.tokens.pop_front()?;
                    let right = self.operand()?;
                    lhs = Self::fold(lhs, op, right)?;
                }
                TokenKind::Punctuation if !opens_group => break,
                _ => {
                    let right = self.operand()?;
                    lhs = Self::fold(lhs, Expr::juxtaposition(), right)?;
                }
            }
        }

        Some(lhs)
    }

    fn operand(&mut self) -> Option<Node> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        let token = self.tokens.pop_front()?;

        match token.kind {
            TokenKind::Punctuation if token.is_punct('(') => {
                let inner = self.nested(|parser| parser.expression(&[], true))?;
                self.close_paren()?;
                Self::node(Expr::Group(Box::new(inner.expr)), inner.height)
            }
            TokenKind::Operator
                if token.text == "*" && (self.next_is_punct(')') || self.next_is_punct(',')) =>
            {
                Self::node(Expr::Leaf(token), 0)
            }
            TokenKind::Operator if is_prefix_operator(&token) => {
                let operand = self.nested(Self::operand)?;
                Self::node(
                    Expr::Prefix {
                        op: token,
                        operand: Box::new(operand.expr),
                    },
                    operand.height,
                )
            }
            TokenKind::Identifier if self.next_is_punct('(') => {
                self.tokens.pop_front();
                let args = if self.next_is_punct(')') {
                    None
                } else {
                    Some(self.nested(|parser| parser.expression(&[], true))?)
                };
                self.close_paren()?;
                let height = args.as_ref().map_or(1, |args| args.height);
                Self::node(
                    Expr::Call {
                        callee: Box::new(Expr::Leaf(token)),
                        args: args.map(|args| Box::new(args.expr)),
                    },
                    height,
                )
            }
            kind if kind.is_operand() => Self::node(Expr::Leaf(token), 0),
            _ => None,
        }
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Node>) -> Option<Node> {
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn close_paren(&mut self) -> Option<()> {
        if self.next_is_punct(')') {
            self.tokens.pop_front();
            Some(())
        } else {
            None
        }
    }
}

/// Operators allowed in operand position.
///
/// Every keyword operator qualifies: `NOT x`, `CASE ...`, `CAST (...)`, and
/// keyword-named functions such as `glob(...)` all start an operand.
fn is_prefix_operator(token: &Token) -> bool {
    matches!(token.text.as_str(), "-" | "+" | "~" | "!")
        || token.text.bytes().all(|b| b.is_ascii_alphabetic())
}
