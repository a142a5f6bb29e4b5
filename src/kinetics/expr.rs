//! Arithmetic expression trees for rate laws.
//!
//! Rate-law templates are parsed once into an [`Expr`] and rendered back to text after
//! substitution. Rendering is canonical: binary operators are surrounded by single
//! spaces (`^` is written tight), parentheses written in the source are kept and no
//! algebraic simplification takes place.

use std::collections::BTreeSet;
use std::fmt;

use crate::kinetics::KineticModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }

    /// Left and right binding power. `^` is right associative.
    fn binding_power(&self) -> (u8, u8) {
        match self {
            BinaryOp::Add | BinaryOp::Sub => (1, 2),
            BinaryOp::Mul | BinaryOp::Div => (3, 4),
            BinaryOp::Pow => (8, 7),
        }
    }
}

const PREFIX_BINDING_POWER: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// Parenthesized sub-expression
    Group(Box<Expr>),
}

impl Expr {
    /// Parses an expression from text.
    pub fn parse(text: &str) -> Result<Expr, KineticModelError> {
        let tokens = lex(text)?;
        let mut parser = Parser {
            tokens,
            position: 0,
            source: text,
        };

        let expr = parser.expression(0)?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(parser.unexpected(&token.clone())),
        }
    }

    /// Builds the product of the given identifiers, parenthesized when more than one.
    pub fn product<S: AsRef<str>>(identifiers: &[S]) -> Option<Expr> {
        let mut iter = identifiers.iter().map(|id| Expr::Ident(id.as_ref().to_string()));
        let first = iter.next()?;
        let rest = iter.collect::<Vec<_>>();

        if rest.is_empty() {
            return Some(first);
        }

        let product = rest.into_iter().fold(first, |lhs, rhs| Expr::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        });

        Some(Expr::Group(Box::new(product)))
    }

    /// Returns all variable names used in the expression. Function names are excluded.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut identifiers = BTreeSet::new();
        self.collect_identifiers(&mut identifiers);
        identifiers
    }

    fn collect_identifiers(&self, identifiers: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => {
                identifiers.insert(name.clone());
            }
            Expr::Neg(inner) | Expr::Group(inner) => inner.collect_identifiers(identifiers),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_identifiers(identifiers);
                rhs.collect_identifiers(identifiers);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_identifiers(identifiers);
                }
            }
        }
    }

    /// Replaces identifier leaves for which `replace` returns an expression.
    ///
    /// Replacement is a single pass: inserted expressions are not visited again.
    pub fn substitute<F>(&self, replace: &F) -> Expr
    where
        F: Fn(&str) -> Option<Expr>,
    {
        match self {
            Expr::Number(value) => Expr::Number(*value),
            Expr::Ident(name) => replace(name).unwrap_or_else(|| Expr::Ident(name.clone())),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.substitute(replace))),
            Expr::Group(inner) => Expr::Group(Box::new(inner.substitute(replace))),
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.substitute(replace)),
                rhs: Box::new(rhs.substitute(replace)),
            },
            Expr::Call { name, args } => Expr::Call {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(replace)).collect(),
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Neg(inner) => write!(f, "-{inner}"),
            Expr::Group(inner) => write!(f, "({inner})"),
            Expr::Binary {
                op: BinaryOp::Pow,
                lhs,
                rhs,
            } => write!(f, "{lhs}^{rhs}"),
            Expr::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Expr::Call { name, args } => {
                let args = args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
                write!(f, "{name}({})", args.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn lex(text: &str) -> Result<Vec<Token>, KineticModelError> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' | '-' | '*' | '/' | '^' => {
                let op = match c {
                    '+' => BinaryOp::Add,
                    '-' => BinaryOp::Sub,
                    '*' => BinaryOp::Mul,
                    '/' => BinaryOp::Div,
                    _ => BinaryOp::Pow,
                };
                tokens.push(Token::Op(op));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent part, e.g. 1e-3
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }

                let literal = chars[start..i].iter().collect::<String>();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| KineticModelError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(KineticModelError::InvalidExpression {
                    expression: text.to_string(),
                    reason: format!("unexpected character '{other}'"),
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn unexpected(&self, token: &Token) -> KineticModelError {
        KineticModelError::InvalidExpression {
            expression: self.source.to_string(),
            reason: format!("unexpected '{token}'"),
        }
    }

    fn end_of_input(&self) -> KineticModelError {
        KineticModelError::InvalidExpression {
            expression: self.source.to_string(),
            reason: "unexpected end of expression".to_string(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), KineticModelError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.unexpected(&token)),
            None => Err(self.end_of_input()),
        }
    }

    fn expression(&mut self, min_bp: u8) -> Result<Expr, KineticModelError> {
        let mut lhs = match self.advance() {
            Some(Token::Number(value)) => Expr::Number(value),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    Expr::Call {
                        name,
                        args: self.arguments()?,
                    }
                } else {
                    Expr::Ident(name)
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression(0)?;
                self.expect(Token::RParen)?;
                Expr::Group(Box::new(inner))
            }
            Some(Token::Op(BinaryOp::Sub)) => {
                Expr::Neg(Box::new(self.expression(PREFIX_BINDING_POWER)?))
            }
            Some(Token::Op(BinaryOp::Add)) => self.expression(PREFIX_BINDING_POWER)?,
            Some(token) => return Err(self.unexpected(&token)),
            None => return Err(self.end_of_input()),
        };

        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }

            self.advance();
            let rhs = self.expression(right_bp)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// Parses call arguments after the opening parenthesis.
    fn arguments(&mut self) -> Result<Vec<Expr>, KineticModelError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.expression(0)?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(token) => return Err(self.unexpected(&token)),
                None => return Err(self.end_of_input()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str) -> String {
        Expr::parse(text).expect("Failed to parse expression").to_string()
    }

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(roundtrip("kcat*E*S/(Km+S)"), "kcat * E * S / (Km + S)");
        assert_eq!(roundtrip("k_f * A  -  k_r*B"), "k_f * A - k_r * B");
        assert_eq!(roundtrip("x ^ 2"), "x^2");
        assert_eq!(roundtrip("-k * exp(-E / T)"), "-k * exp(-E / T)");
        assert_eq!(roundtrip("max(a, b)"), "max(a, b)");
        assert_eq!(roundtrip("1e-3 * 2.50"), "0.001 * 2.5");
    }

    #[test]
    fn test_precedence() {
        let expr = Expr::parse("a + b * c").unwrap();
        match expr {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("Unexpected expression {other:?}"),
        }

        // Unary minus binds weaker than the power operator
        let expr = Expr::parse("-x^2").unwrap();
        assert!(matches!(expr, Expr::Neg(_)));

        // Power is right associative
        let expr = Expr::parse("a^b^c").unwrap();
        match expr {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(op, BinaryOp::Pow);
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("Unexpected expression {other:?}"),
        }
    }

    #[test]
    fn test_identifiers_exclude_functions() {
        let expr = Expr::parse("vmax * exp(-s0 / K)").unwrap();
        let identifiers = expr.identifiers().into_iter().collect::<Vec<_>>();
        assert_eq!(identifiers, vec!["K", "s0", "vmax"]);
    }

    #[test]
    fn test_product() {
        assert_eq!(Expr::product(&["s0"]).unwrap().to_string(), "s0");
        assert_eq!(
            Expr::product(&["s0", "s1", "s2"]).unwrap().to_string(),
            "(s0 * s1 * s2)"
        );
        assert!(Expr::product::<&str>(&[]).is_none());
    }

    #[test]
    fn test_substitute_leaves_only() {
        let expr = Expr::parse("k * A").unwrap();
        let substituted = expr.substitute(&|name: &str| match name {
            "A" => Expr::product(&["s0", "s1"]),
            _ => None,
        });
        assert_eq!(substituted.to_string(), "k * (s0 * s1)");
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(Expr::parse("k *").is_err());
        assert!(Expr::parse("(a + b").is_err());
        assert!(Expr::parse("a + b)").is_err());
        assert!(Expr::parse("a $ b").is_err());
        assert!(Expr::parse("1.2.3").is_err());
        assert!(Expr::parse("").is_err());
    }
}
