use std::fmt;

use super::Atom;

/// Something a session sends back to its host.
///
/// Results go out through two channels: the primary one (`0`) carries predicted
/// labels and regression vectors, the auxiliary one (`1`) tagged notifications.
/// `Post` lines are meant for the host's console.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Label(u32),
    Vector(Vec<f64>),
    Tagged { tag: String, atoms: Vec<Atom> },
    Post(String),
}

impl Output {
    pub fn tagged(tag: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Output::Tagged {
            tag: tag.into(),
            atoms,
        }
    }

    /// The channel the output goes through, `None` for console lines.
    pub fn outlet(&self) -> Option<usize> {
        match self {
            Output::Label(_) | Output::Vector(_) => Some(0),
            Output::Tagged { .. } => Some(1),
            Output::Post(_) => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Label(label) => write!(f, "{label}"),
            Output::Vector(values) => {
                let values: Vec<String> = values.iter().map(f64::to_string).collect();
                f.write_str(&values.join(" "))
            }
            Output::Tagged { tag, atoms } => {
                f.write_str(tag)?;
                for atom in atoms {
                    write!(f, " {atom}")?;
                }
                Ok(())
            }
            Output::Post(line) => f.write_str(line),
        }
    }
}
