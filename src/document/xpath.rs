//! Translation of a small XPath subset into CSS selectors
//!
//! Supported: `/` and `//` steps (optionally prefixed with `.`), element names
//! and `*`, and predicates `[@a]`, `[@a='v']`, `[contains(@a,'v')]`,
//! `[starts-with(@a,'v')]`, `[n]`, `[last()]`, joined with `and`.
//! Axes, attribute steps and node tests such as `text()` are rejected.

use crate::error::{ExtractError, Result};

/// Whether `expr` should be read as XPath rather than as a CSS selector.
pub fn is_xpath(expr: &str) -> bool {
    let expr = expr.trim_start();
    expr.starts_with('/') || expr.starts_with("./")
}

pub fn to_css(expr: &str) -> Result<String> {
    XPathParser::new(expr).parse_path()
}

#[derive(Clone, Copy)]
enum Combinator {
    Root,
    Child,
    Descendant,
}

struct XPathParser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> XPathParser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            chars: expr.trim().chars().collect(),
            pos: 0,
        }
    }

    fn parse_path(&mut self) -> Result<String> {
        let mut combinator = if self.eat_str(".//") || self.eat_str("//") {
            Combinator::Descendant
        } else if self.eat_str("./") || self.eat('/') {
            Combinator::Root
        } else {
            return Err(self.unsupported(self.rest()));
        };

        let mut css = String::new();
        loop {
            let step = self.parse_step()?;
            match combinator {
                Combinator::Root => {
                    css.push_str(&step);
                    css.push_str(":root");
                }
                Combinator::Descendant if css.is_empty() => css.push_str(&step),
                Combinator::Descendant => {
                    css.push(' ');
                    css.push_str(&step);
                }
                Combinator::Child => {
                    css.push_str(" > ");
                    css.push_str(&step);
                }
            }

            if self.at_end() {
                break;
            }
            combinator = if self.eat_str("//") {
                Combinator::Descendant
            } else if self.eat('/') {
                Combinator::Child
            } else {
                return Err(self.unsupported(self.rest()));
            };
        }

        Ok(css)
    }

    fn parse_step(&mut self) -> Result<String> {
        let name = if self.eat('*') {
            "*".to_string()
        } else {
            self.parse_name()
        };

        if name.is_empty() {
            return Err(self.unsupported(self.rest()));
        }
        if self.peek() == Some('(') {
            return Err(self.unsupported(&format!("{}()", name)));
        }
        if self.peek() == Some(':') {
            return Err(self.unsupported(&format!("{}::", name)));
        }

        let mut step = name.clone();
        while self.eat('[') {
            loop {
                self.skip_ws();
                step.push_str(&self.parse_condition(&name)?);
                if !self.eat_keyword("and") {
                    break;
                }
            }
            self.skip_ws();
            if !self.eat(']') {
                return Err(ExtractError::InvalidLocator {
                    expr: self.expr.to_string(),
                    reason: "unterminated predicate".to_string(),
                });
            }
        }

        Ok(step)
    }

    fn parse_condition(&mut self, element: &str) -> Result<String> {
        if self.eat('@') {
            let attr = self.parse_name();
            self.skip_ws();
            if self.eat('=') {
                self.skip_ws();
                let value = self.parse_literal()?;
                return Ok(format!("[{}=\"{}\"]", attr, escape(&value)));
            }
            if self.peek() == Some('!') {
                return Err(self.unsupported("!="));
            }
            return Ok(format!("[{}]", attr));
        }

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let mut digits = String::new();
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                digits.push(c);
                self.pos += 1;
            }
            return Ok(if element == "*" {
                format!(":nth-child({})", digits)
            } else {
                format!(":nth-of-type({})", digits)
            });
        }

        let function = self.parse_name();
        match function.as_str() {
            "last" if self.eat_str("()") => Ok(if element == "*" {
                ":last-child".to_string()
            } else {
                ":last-of-type".to_string()
            }),
            "contains" | "starts-with" => {
                self.skip_ws();
                if !self.eat('(') {
                    return Err(self.unsupported(&function));
                }
                self.skip_ws();
                if !self.eat('@') {
                    return Err(self.unsupported(&format!("{}({}", function, self.rest())));
                }
                let attr = self.parse_name();
                self.skip_ws();
                if !self.eat(',') {
                    return Err(self.unsupported(&function));
                }
                self.skip_ws();
                let value = self.parse_literal()?;
                self.skip_ws();
                if !self.eat(')') {
                    return Err(self.unsupported(&function));
                }
                let operator = if function == "contains" { "*=" } else { "^=" };
                Ok(format!("[{}{}\"{}\"]", attr, operator, escape(&value)))
            }
            "" => Err(self.unsupported(self.rest())),
            other => Err(self.unsupported(other)),
        }
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self
            .peek()
            .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        {
            name.push(c);
            self.pos += 1;
        }
        name
    }

    fn parse_literal(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.unsupported(self.rest())),
        };
        self.pos += 1;

        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == quote {
                return Ok(value);
            }
            value.push(c);
        }

        Err(ExtractError::InvalidLocator {
            expr: self.expr.to_string(),
            reason: "unterminated string literal".to_string(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let len = s.chars().count();
        let matches = self.chars.len() >= self.pos + len
            && self.chars[self.pos..self.pos + len].iter().copied().eq(s.chars());
        if matches {
            self.pos += len;
        }
        matches
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let start = self.pos;
        self.skip_ws();
        if self.eat_str(keyword)
            && !self
                .peek()
                .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return true;
        }
        self.pos = start;
        false
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn rest(&self) -> &str {
        let offset: usize = self.chars[..self.pos.min(self.chars.len())]
            .iter()
            .map(|c| c.len_utf8())
            .sum();
        self.expr.trim().get(offset..).unwrap_or("")
    }

    fn unsupported(&self, construct: &str) -> ExtractError {
        ExtractError::UnsupportedXPath {
            expr: self.expr.to_string(),
            construct: construct.to_string(),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
