//! Games read from PGN text.
//!
//! Everything here is built once by the parser and never mutated afterwards.
//! The `Display` implementations write canonical PGN back.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database {
    pub games: Vec<Game>,
}

impl Database {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Game> {
        self.games.iter()
    }
}

impl IntoIterator for Database {
    type Item = Game;
    type IntoIter = std::vec::IntoIter<Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.into_iter()
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Game;
    type IntoIter = std::slice::Iter<'a, Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub tags: Vec<TagPair>,
    pub movetext: MovetextSection,
}

impl Game {
    /// Value of the first tag called `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.value.as_str())
    }

    pub fn termination(&self) -> GameTermination {
        self.movetext.termination
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPair {
    pub name: String,
    pub value: String,
}

impl TagPair {
    pub fn new(name: &str, value: &str) -> Self {
        TagPair {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

pub type ElementSequence = Vec<Node>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovetextSection {
    pub elements: ElementSequence,
    pub termination: GameTermination,
}

impl MovetextSection {
    /// SAN moves of the main line, variations excluded.
    pub fn main_line(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|node| match node {
            Node::Element(Element::SanMove(san)) => Some(san.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Variation(Variation),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Variation {
    pub elements: ElementSequence,
}

impl Variation {
    /// Number of nested variation levels, this one included.
    pub fn depth(&self) -> usize {
        // Iterative, so that deep trees don't exhaust the stack
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((variation, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for node in &variation.elements {
                if let Node::Variation(inner) = node {
                    pending.push((inner, depth + 1));
                }
            }
        }
        deepest
    }
}

impl Drop for Variation {
    fn drop(&mut self) {
        // Unnest before dropping, so that deep trees don't exhaust the stack
        let mut pending: Vec<Variation> = Vec::new();
        let mut elements = std::mem::take(&mut self.elements);
        loop {
            for node in elements.drain(..) {
                if let Node::Variation(inner) = node {
                    pending.push(inner);
                }
            }
            match pending.pop() {
                Some(mut variation) => elements = std::mem::take(&mut variation.elements),
                None => break,
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    MoveNumber { number: u32, has_period: bool },
    SanMove(String),
    /// Numeric annotation glyph, `$` included.
    Nag(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameTermination {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameTermination {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameTermination::WhiteWins => "1-0",
            GameTermination::BlackWins => "0-1",
            GameTermination::Draw => "1/2-1/2",
            GameTermination::Unknown => "*",
        }
    }
}

fn write_sequence(f: &mut fmt::Formatter, elements: &[Node]) -> fmt::Result {
    for (index, node) in elements.iter().enumerate() {
        if index > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, game) in self.games.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", game)?;
        }
        Ok(())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for tag in &self.tags {
            writeln!(f, "{}", tag)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.movetext)
    }
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} \"", self.name)?;
        for c in self.value.chars() {
            if c == '"' || c == '\\' {
                write!(f, "\\")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "\"]")
    }
}

impl fmt::Display for MovetextSection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_sequence(f, &self.elements)?;
        if !self.elements.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "{}", self.termination)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Element(element) => write!(f, "{}", element),
            Node::Variation(variation) => write!(f, "{}", variation),
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        write_sequence(f, &self.elements)?;
        write!(f, ")")
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::MoveNumber {
                number,
                has_period: true,
            } => write!(f, "{}.", number),
            Element::MoveNumber {
                number,
                has_period: false,
            } => write!(f, "{}", number),
            Element::SanMove(san) => write!(f, "{}", san),
            Element::Nag(nag) => write!(f, "{}", nag),
        }
    }
}

impl fmt::Display for GameTermination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
