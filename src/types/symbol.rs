//! Morse symbols and patterns

use serde::{Deserialize, Serialize};

/// A single Morse element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    pub fn as_char(&self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Symbol::Dot),
            '-' => Some(Symbol::Dash),
            _ => None,
        }
    }
}

/// Ordered sequence of symbols making up one letter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pattern(Vec<Symbol>);

impl Pattern {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse ".-" style notation
    pub fn parse(s: &str) -> Option<Self> {
        s.chars().map(Symbol::from_char).collect::<Option<Vec<_>>>().map(Self)
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Symbol>> for Pattern {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}

impl TryFrom<String> for Pattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pattern::parse(&value).ok_or_else(|| format!("invalid morse pattern: {:?}", value))
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}
