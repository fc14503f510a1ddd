//! Button action evaluation.
//!
//! A button's `action` is untrusted text. It is never executed as code:
//! [`ScriptedAction`] accepts a small call-only subset, routes each call to
//! the `log` facade and reports what it did. Anything outside the subset is
//! rejected with an [`ActionError`].
//!
//! Accepted form: `;`-separated calls such as
//! `console.log("saved", 3); alert('done')`, where every argument is a
//! string, number, boolean or `null` literal.

use thiserror::Error;

/// Error evaluating a button action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Unexpected '{found}' at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },
    #[error("Unexpected end of action")]
    UnexpectedEnd,
    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("Function '{0}' is not allowed")]
    UnknownFunction(String),
}

/// Where an evaluated call sends its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChannel {
    Log,
    Info,
    Warn,
    Error,
    Alert,
}

impl ActionChannel {
    fn from_callee(callee: &str) -> Option<Self> {
        match callee {
            "console.log" => Some(ActionChannel::Log),
            "console.info" => Some(ActionChannel::Info),
            "console.warn" => Some(ActionChannel::Warn),
            "console.error" => Some(ActionChannel::Error),
            "alert" => Some(ActionChannel::Alert),
            _ => None,
        }
    }
}

/// One effect produced by evaluating an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEffect {
    pub channel: ActionChannel,
    /// Arguments joined with single spaces.
    pub message: String,
}

/// Evaluates button actions.
pub trait ActionEvaluator {
    /// Evaluate `source`, returning the effects it produced in order.
    fn evaluate(&self, source: &str) -> Result<Vec<ActionEffect>, ActionError>;
}

/// Evaluator for the restricted call subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedAction;

impl ScriptedAction {
    pub fn new() -> Self {
        Self
    }
}

impl ActionEvaluator for ScriptedAction {
    fn evaluate(&self, source: &str) -> Result<Vec<ActionEffect>, ActionError> {
        // Parse everything first so a bad call late in the script has no effects.
        let effects = Parser::new(source).parse_script()?;
        for effect in &effects {
            match effect.channel {
                ActionChannel::Log | ActionChannel::Info => log::info!("[action] {}", effect.message),
                ActionChannel::Warn => log::warn!("[action] {}", effect.message),
                ActionChannel::Error => log::error!("[action] {}", effect.message),
                ActionChannel::Alert => log::info!("[action alert] {}", effect.message),
            }
        }
        Ok(effects)
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn unexpected(&self) -> ActionError {
        match self.peek() {
            Some(found) => ActionError::UnexpectedChar {
                offset: self.pos,
                found,
            },
            None => ActionError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ActionError> {
        self.skip_whitespace();
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_script(&mut self) -> Result<Vec<ActionEffect>, ActionError> {
        let mut effects = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Ok(effects),
                Some(';') => {
                    self.bump();
                }
                Some(_) => {
                    effects.push(self.parse_call()?);
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Ok(effects),
                        Some(';') => {
                            self.bump();
                        }
                        Some(_) => return Err(self.unexpected()),
                    }
                }
            }
        }
    }

    fn parse_ident(&mut self) -> Result<&'a str, ActionError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        let source = self.source;
        Ok(&source[start..self.pos])
    }

    fn parse_call(&mut self) -> Result<ActionEffect, ActionError> {
        let start = self.pos;
        self.parse_ident()?;
        while self.peek() == Some('.') {
            self.bump();
            self.parse_ident()?;
        }
        let source = self.source;
        let callee = &source[start..self.pos];
        let channel = ActionChannel::from_callee(callee)
            .ok_or_else(|| ActionError::UnknownFunction(callee.to_string()))?;

        self.expect('(')?;
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
        } else {
            loop {
                args.push(self.parse_literal()?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => continue,
                    Some(')') => break,
                    Some(found) => {
                        return Err(ActionError::UnexpectedChar {
                            offset: self.pos - found.len_utf8(),
                            found,
                        });
                    }
                    None => return Err(ActionError::UnexpectedEnd),
                }
            }
        }

        Ok(ActionEffect {
            channel,
            message: args.join(" "),
        })
    }

    fn parse_literal(&mut self) -> Result<String, ActionError> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ ('"' | '\'' | '`')) => self.parse_string(quote),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.parse_ident()?;
                match word {
                    "true" | "false" | "null" | "undefined" => Ok(word.to_string()),
                    _ => Err(ActionError::UnknownFunction(word.to_string())),
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ActionError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ActionError::UnterminatedString(start)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(ActionError::UnterminatedString(start)),
                },
                // Template interpolation would evaluate code.
                Some('$') if quote == '`' && self.peek() == Some('{') => {
                    return Err(ActionError::UnexpectedChar {
                        offset: self.pos,
                        found: '{',
                    });
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<String, ActionError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        let source = self.source;
        let text = &source[start..self.pos];
        if self.pos == digits_start || text.parse::<f64>().is_err() {
            return Err(ActionError::UnexpectedChar {
                offset: start,
                found: text.chars().next().unwrap_or('-'),
            });
        }
        Ok(text.to_string())
    }
}
