use std::fmt;

/// A single element of a host message.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Float(f64),
    Symbol(String),
}

impl Atom {
    /// Parses a token, anything that isn't a number being a symbol.
    pub fn parse(token: &str) -> Self {
        match token.parse::<f64>() {
            Ok(value) => Atom::Float(value),
            Err(_) => Atom::Symbol(token.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Atom::Float(value) => Some(*value),
            Atom::Symbol(_) => None,
        }
    }
}

impl From<f64> for Atom {
    fn from(value: f64) -> Self {
        Atom::Float(value)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Float(value) => write!(f, "{value}"),
            Atom::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

/// A selector followed by its arguments, e.g. `add 1 0.1 0.2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub selector: String,
    pub args: Vec<Atom>,
}

impl Message {
    pub fn new(selector: impl Into<String>, args: Vec<Atom>) -> Self {
        Self {
            selector: selector.into(),
            args,
        }
    }

    /// Parses a whitespace separated line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let selector = tokens.next()?;

        Some(Self::new(selector, tokens.map(Atom::parse).collect()))
    }
}
