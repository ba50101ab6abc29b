//! Syntax tree types for VWF files.
//!
//! The tree mirrors the file's generic block structure. It carries no
//! semantic meaning yet: attribute types, signal references and level
//! values are checked by the model builder.

use std::fmt;

/// Complete syntax tree of a parsed VWF file.
#[derive(Debug, Clone, Default)]
pub struct VwfAst {
    /// Top-level sections in file order
    pub sections: Vec<Section>,
}

impl VwfAst {
    /// Iterate over the sections of one kind, in file order.
    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }
}

/// Keywords allowed at the top level of a VWF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Global timing information
    Header,
    /// Signal declaration
    Signal,
    /// Level list of one signal
    TransitionList,
    /// Saved waveform-editor row
    DisplayLine,
    /// Saved time bar (ignored)
    TimeBar,
    /// Saved signal group (ignored)
    Group,
}

impl SectionKind {
    /// Parse a section keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "HEADER" => Some(Self::Header),
            "SIGNAL" => Some(Self::Signal),
            "TRANSITION_LIST" => Some(Self::TransitionList),
            "DISPLAY_LINE" => Some(Self::DisplayLine),
            "TIME_BAR" => Some(Self::TimeBar),
            "GROUP" => Some(Self::Group),
            _ => None,
        }
    }

    /// The keyword as written in the file.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Header => "HEADER",
            Self::Signal => "SIGNAL",
            Self::TransitionList => "TRANSITION_LIST",
            Self::DisplayLine => "DISPLAY_LINE",
            Self::TimeBar => "TIME_BAR",
            Self::Group => "GROUP",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A top-level section such as `SIGNAL("clk") { ... }`.
#[derive(Debug, Clone)]
pub struct Section {
    /// Section keyword
    pub kind: SectionKind,
    /// Optional parenthesized index
    pub index: Option<Literal>,
    /// Section contents
    pub body: Vec<Stanza>,
    /// Source line number for error reporting
    pub line: usize,
}

/// One statement inside a section or NODE block.
#[derive(Debug, Clone)]
pub enum Stanza {
    /// `KEY = value;` or `KEY = a, b, c;`
    Assignment(Assignment),
    /// `NODE { ... }`
    Node(NodeBlock),
    /// `LEVEL v FOR d;`
    Level(LevelStatement),
}

/// An attribute assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Attribute name
    pub key: String,
    /// Assigned value(s); more than one for comma-separated lists
    pub values: Vec<Literal>,
    /// Source line number
    pub line: usize,
}

/// A nested `NODE` block of a transition list.
#[derive(Debug, Clone)]
pub struct NodeBlock {
    /// Block contents (REPEAT assignment, LEVEL statements, nested NODEs)
    pub body: Vec<Stanza>,
    /// Source line number
    pub line: usize,
}

/// A `LEVEL v FOR d;` statement.
#[derive(Debug, Clone)]
pub struct LevelStatement {
    /// Level value as written
    pub value: Literal,
    /// Duration, as the raw number text
    pub duration: String,
    /// Source line number
    pub line: usize,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Double-quoted string, without the quotes
    Str(String),
    /// Number in its source text form
    Number(String),
    /// Bare identifier
    Ident(String),
}

impl Literal {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Number(_) => "number",
            Self::Ident(_) => "identifier",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{}\"", s),
            Self::Number(s) | Self::Ident(s) => f.write_str(s),
        }
    }
}
