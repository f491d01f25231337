// qaspec-core/src/infrastructure/expression.rs

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::error::DomainError;
use crate::domain::model::name_key;
use crate::domain::ports::IssueFilterExpressionParser;

fn re_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\s*(?:(\()|(\))|"([^"]*)"|'([^']*)'|([^\s()'"]+))"#)
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Name(String),
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < expression.len() {
        let rest = &expression[position..];
        if rest.trim().is_empty() {
            break;
        }
        let captures = match re_token().captures(rest) {
            Some(c) if c.get(0).is_some_and(|m| m.start() == 0) => c,
            _ => return Err(format!("unexpected input at offset {}", position)),
        };

        let token = if captures.get(1).is_some() {
            Token::Open
        } else if captures.get(2).is_some() {
            Token::Close
        } else if let Some(quoted) = captures.get(3).or_else(|| captures.get(4)) {
            if quoted.as_str().trim().is_empty() {
                return Err("empty quoted name".to_string());
            }
            Token::Name(quoted.as_str().to_string())
        } else if let Some(word) = captures.get(5) {
            match word.as_str().to_uppercase().as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Name(word.as_str().to_string()),
            }
        } else {
            return Err(format!("unexpected input at offset {}", position));
        };

        tokens.push(token);
        position += captures.get(0).map_or(rest.len(), |m| m.end());
    }
    Ok(tokens)
}

/// Recursive descent over `or := and (OR and)*`, `and := unary (AND unary)*`,
/// `unary := NOT unary | '(' or ')' | name`.
struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    names: Vec<String>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn parse_or(&mut self) -> Result<(), String> {
        self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            self.parse_and()?;
        }
        Ok(())
    }

    fn parse_and(&mut self) -> Result<(), String> {
        self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            self.parse_unary()?;
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<(), String> {
        match self.next() {
            Some(Token::Not) => self.parse_unary(),
            Some(Token::Open) => {
                self.parse_or()?;
                match self.next() {
                    Some(Token::Close) => Ok(()),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(Token::Name(name)) => {
                let key = name_key(name);
                if !self.names.iter().any(|n| name_key(n) == key) {
                    self.names.push(name.trim().to_string());
                }
                Ok(())
            }
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Boolean issue filter expressions: `F1 AND (F2 OR NOT 'Filter 3')`.
/// Operators are case-insensitive; names may be bare or quoted.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanExpressionParser;

impl BooleanExpressionParser {
    pub fn new() -> Self {
        Self
    }
}

impl IssueFilterExpressionParser for BooleanExpressionParser {
    fn referenced_filters(&self, expression: &str) -> Result<Vec<String>, DomainError> {
        if expression.trim().is_empty() {
            return Ok(Vec::new());
        }
        let invalid = |message: String| DomainError::InvalidExpression {
            expression: expression.to_string(),
            message,
        };

        let tokens = tokenize(expression).map_err(invalid)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            names: Vec::new(),
        };
        parser.parse_or().map_err(invalid)?;
        if let Some(token) = parser.peek() {
            return Err(invalid(format!("unexpected trailing {:?}", token)));
        }
        Ok(parser.names)
    }
}
