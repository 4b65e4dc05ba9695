//! Tokenizer and recursive descent parser for dice formulas.

use super::DiceError;
use super::ast::{BinaryOp, Dice, DiceSource, Expr, Modifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// The `d` separating count from sides.
    Dice,
    Modifier(ModifierKind),
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, Copy)]
struct Spanned {
    token: Token,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierKind {
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
    Min,
    Max,
}

impl ModifierKind {
    fn with_arg(self, arg: Option<i64>) -> Modifier {
        match self {
            Self::KeepHighest => Modifier::KeepHighest(arg),
            Self::KeepLowest => Modifier::KeepLowest(arg),
            Self::DropHighest => Modifier::DropHighest(arg),
            Self::DropLowest => Modifier::DropLowest(arg),
            Self::Min => Modifier::Min(arg),
            Self::Max => Modifier::Max(arg),
        }
    }
}

/// Parse a dice formula such as `2d6+3` or `{1d12, 2d10}dl` into an AST.
///
/// # Errors
///
/// Returns a [`DiceError`] describing the first offending token; positions
/// are character offsets into `input`.
pub fn parse(input: &str) -> Result<Expr, DiceError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let expr = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(parser.unexpected(token, parser.pos));
    }
    Ok(expr)
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, DiceError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            let value = digits.parse::<i64>().map_err(|_| DiceError::NumberTooLarge(digits.clone()))?;
            tokens.push(Spanned { token: Token::Number(value), offset: start });
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();
            let token = match word.as_str() {
                "d" => Token::Dice,
                "kh" => Token::Modifier(ModifierKind::KeepHighest),
                "kl" => Token::Modifier(ModifierKind::KeepLowest),
                "dh" => Token::Modifier(ModifierKind::DropHighest),
                "dl" => Token::Modifier(ModifierKind::DropLowest),
                "min" => Token::Modifier(ModifierKind::Min),
                "max" => Token::Modifier(ModifierKind::Max),
                _ => return Err(DiceError::UnexpectedToken { token: word, position: start }),
            };
            tokens.push(Spanned { token, offset: start });
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            other => return Err(DiceError::UnexpectedToken { token: other.to_string(), position: i }),
        };
        tokens.push(Spanned { token, offset: i });
        i += 1;
    }

    Ok(tokens)
}

fn describe(token: Token) -> String {
    match token {
        Token::Number(n) => n.to_string(),
        Token::Plus => "+".into(),
        Token::Minus => "-".into(),
        Token::Star => "*".into(),
        Token::Slash => "/".into(),
        Token::LParen => "(".into(),
        Token::RParen => ")".into(),
        Token::LBrace => "{".into(),
        Token::RBrace => "}".into(),
        Token::Comma => ",".into(),
        Token::Dice => "d".into(),
        Token::Modifier(kind) => match kind {
            ModifierKind::KeepHighest => "kh",
            ModifierKind::KeepLowest => "kl",
            ModifierKind::DropHighest => "dh",
            ModifierKind::DropLowest => "dl",
            ModifierKind::Min => "min",
            ModifierKind::Max => "max",
        }
        .into(),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    /// Error for `token`, found at token index `index`.
    fn unexpected(&self, token: Token, index: usize) -> DiceError {
        let position = self.tokens.get(index).map_or(0, |s| s.offset);
        DiceError::UnexpectedToken { token: describe(token), position }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), DiceError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.unexpected(token, self.pos - 1)),
            None => Err(DiceError::UnexpectedEnd),
        }
    }

    /// `expr := term (("+" | "-") term)*`, left associative.
    fn expr(&mut self) -> Result<Expr, DiceError> {
        let mut left = self.term()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    /// `term := factor (("*" | "/") factor)*`, left associative.
    fn term(&mut self) -> Result<Expr, DiceError> {
        let mut left = self.factor()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }) {
            self.pos += 1;
            let right = self.factor()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, DiceError> {
        match self.peek() {
            Some(Token::LBrace | Token::Dice) => Ok(Expr::Dice(self.dice()?)),
            Some(_) => {
                let atom = self.atom()?;
                if self.peek() == Some(Token::Dice) {
                    self.pos += 1;
                    Ok(Expr::Dice(self.simple_dice(atom)?))
                } else {
                    Ok(atom)
                }
            }
            None => Err(DiceError::UnexpectedEnd),
        }
    }

    /// A dice group or pool; used for pool members, which must be dice.
    fn dice(&mut self) -> Result<Dice, DiceError> {
        match self.peek() {
            Some(Token::LBrace) => {
                self.pos += 1;
                let mut members = vec![self.dice()?];
                while self.peek() == Some(Token::Comma) {
                    self.pos += 1;
                    members.push(self.dice()?);
                }
                self.expect(Token::RBrace)?;
                let modifiers = self.modifiers();
                Ok(Dice { source: DiceSource::Pool(members), modifiers })
            }
            Some(Token::Dice) => {
                self.pos += 1;
                self.simple_dice(Expr::Constant(1))
            }
            Some(_) => {
                let start = self.pos;
                let count = self.atom()?;
                if self.peek() == Some(Token::Dice) {
                    self.pos += 1;
                    self.simple_dice(count)
                } else {
                    let (token, position) =
                        self.tokens.get(start).map_or_else(|| (String::new(), 0), |s| (describe(s.token), s.offset));
                    Err(DiceError::ExpectedDice { token, position })
                }
            }
            None => Err(DiceError::UnexpectedEnd),
        }
    }

    /// Finish `count d sides modifiers` after the `d` was consumed.
    fn simple_dice(&mut self, count: Expr) -> Result<Dice, DiceError> {
        let sides = self.atom()?;
        let modifiers = self.modifiers();
        Ok(Dice { source: DiceSource::Simple { count: Box::new(count), sides: Box::new(sides) }, modifiers })
    }

    /// `atom := NUMBER | "(" expr ")"`
    fn atom(&mut self) -> Result<Expr, DiceError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Constant(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(token) => Err(self.unexpected(token, self.pos - 1)),
            None => Err(DiceError::UnexpectedEnd),
        }
    }

    fn modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        while let Some(Token::Modifier(kind)) = self.peek() {
            self.pos += 1;
            let arg = match self.peek() {
                Some(Token::Number(n)) => {
                    self.pos += 1;
                    Some(n)
                }
                _ => None,
            };
            modifiers.push(kind.with_arg(arg));
        }
        modifiers
    }
}
