//! Line-feed pipeline
//!
//! Wraps any iterator of lines, strips each line and skips blank ones. Used by line
//! counting.

/// What [`Feed`] strips from both ends of every line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Strip {
    #[default]
    Nothing,
    Whitespace,
    /// Any of the given characters
    Chars(String),
}

impl Strip {
    fn apply(&self, line: String) -> String {
        match self {
            Strip::Nothing => line,
            Strip::Whitespace => line.trim().to_string(),
            Strip::Chars(chars) => line.trim_matches(|c| chars.contains(c)).to_string(),
        }
    }
}

/// A lazy line filter: each line is stripped and, with `skip`, dropped when empty.
pub struct Feed<I>
where
    I: Iterator<Item = String>,
{
    lines: I,
    strip: Strip,
    skip: bool,
}

impl<I> Feed<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            strip: Strip::Nothing,
            skip: false,
        }
    }

    pub fn strip(mut self, strip: Strip) -> Self {
        self.strip = strip;
        self
    }

    /// Skip lines that are empty after stripping
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl<I> Iterator for Feed<I>
where
    I: Iterator<Item = String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let line = self.strip.apply(self.lines.next()?);
            if !line.is_empty() || !self.skip {
                return Some(line);
            }
        }
    }
}
