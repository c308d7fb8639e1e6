//! Name patterns: shell-style globs and prefix-anchored regular expressions

use crate::error::FileError;
use regex::Regex;

/// Translate a shell-style glob into an anchored regular expression.
///
/// `*` matches any run, `?` any one character, `[seq]` any character in `seq` and
/// `[!seq]` any character not in it. Everything else is literal. An unclosed `[` is
/// taken literally.
pub fn translate(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut translated = String::with_capacity(glob.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        match c {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }

                if j >= chars.len() {
                    translated.push_str(r"\[");
                    continue;
                }

                translated.push('[');
                let mut class = &chars[i..j];
                if class.first() == Some(&'!') {
                    translated.push('^');
                    class = &class[1..];
                } else if class.first() == Some(&'^') {
                    translated.push_str(r"\^");
                    class = &class[1..];
                }
                for &member in class {
                    if matches!(member, '\\' | '[' | ']' | '&' | '~') {
                        translated.push('\\');
                    }
                    translated.push(member);
                }
                translated.push(']');
                i = j + 1;
            }
            _ => translated.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    format!(r"^(?s:{})\z", translated)
}

/// Compile a glob for whole-name matching
pub fn glob(glob: &str) -> Result<Regex, FileError> {
    Ok(Regex::new(&translate(glob))?)
}

/// Compile a regular expression that must match at the start of a name
pub fn prefix(pattern: &str) -> Result<Regex, FileError> {
    Ok(Regex::new(&format!("^(?:{})", pattern))?)
}

/// Entry-name filter applied in a fixed order: hidden patterns, glob, regex.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    hidden: Vec<Regex>,
    glob: Option<Regex>,
    regex: Option<Regex>,
}

impl NameFilter {
    /// `hidden` patterns only take effect when `hide` is set
    pub fn new(
        hide: bool,
        hidden: &[String],
        glob_pattern: Option<&str>,
        regex_pattern: Option<&str>,
    ) -> Result<Self, FileError> {
        let hidden = if hide {
            hidden
                .iter()
                .map(|pattern| glob(pattern))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            hidden,
            glob: glob_pattern.map(glob).transpose()?,
            regex: regex_pattern.map(prefix).transpose()?,
        })
    }

    pub fn keeps(&self, name: &str) -> bool {
        if self.hidden.iter().any(|hidden| hidden.is_match(name)) {
            return false;
        }
        if let Some(glob) = &self.glob {
            if !glob.is_match(name) {
                return false;
            }
        }
        if let Some(regex) = &self.regex {
            if !regex.is_match(name) {
                return false;
            }
        }
        true
    }

    /// Keep the names that pass, in their original order
    pub fn apply<'a>(&self, names: &'a [String]) -> Vec<&'a String> {
        names.iter().filter(|name| self.keeps(name)).collect()
    }
}
