//! Composable file-selection predicates applied before packing.
//!
//! Each predicate answers "should this file be packed?" for an absolute
//! path. Composites are ordinary structs over boxed predicates: [`AllOf`]
//! accepts a file only when every inner predicate does, [`NoneOf`] only when
//! none does. Filters that need file metadata (size, mtime) stat lazily and
//! treat unreadable files as non-matching; the scanner logs those
//! separately.

use regex::Regex;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::PackError;

/// A file-selection predicate.
pub trait Predicate {
    fn matches(&self, path: &Path) -> bool;
}

/// Accepts everything.
pub struct MatchAll;

impl Predicate for MatchAll {
    fn matches(&self, _path: &Path) -> bool {
        true
    }
}

/// Conjunction: accepts a path only when every inner predicate accepts it.
#[derive(Default)]
pub struct AllOf {
    items: Vec<Box<dyn Predicate>>,
}

impl AllOf {
    pub fn new() -> Self {
        AllOf { items: Vec::new() }
    }

    pub fn push(&mut self, predicate: Box<dyn Predicate>) {
        self.items.push(predicate);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Predicate for AllOf {
    fn matches(&self, path: &Path) -> bool {
        self.items.iter().all(|p| p.matches(path))
    }
}

/// Negated disjunction: accepts a path only when no inner predicate does.
#[derive(Default)]
pub struct NoneOf {
    items: Vec<Box<dyn Predicate>>,
}

impl NoneOf {
    pub fn new() -> Self {
        NoneOf { items: Vec::new() }
    }

    pub fn push(&mut self, predicate: Box<dyn Predicate>) {
        self.items.push(predicate);
    }
}

impl Predicate for NoneOf {
    fn matches(&self, path: &Path) -> bool {
        !self.items.iter().any(|p| p.matches(path))
    }
}

/// Translates a shell glob into an anchored regex. Supports `*`, `?` and
/// `[...]` character classes (with leading `!` negation).
fn glob_to_regex(pattern: &str) -> Result<Regex, PackError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                re.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    re.push('^');
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    if matches!(inner, '\\' | '^') {
                        re.push('\\');
                    }
                    re.push(inner);
                }
                re.push(']');
            }
            _ => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| PackError::Config(format!("bad glob pattern '{}': {}", pattern, e)))
}

/// Selects files matching shell glob patterns. An empty include list means
/// include all; exclusions win over inclusions.
pub struct GlobFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl GlobFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, PackError> {
        let include = if include.is_empty() {
            vec![glob_to_regex("*")?]
        } else {
            include.iter().map(|p| glob_to_regex(p)).collect::<Result<_, _>>()?
        };
        let exclude = exclude.iter().map(|p| glob_to_regex(p)).collect::<Result<_, _>>()?;
        Ok(GlobFilter { include, exclude })
    }
}

impl Predicate for GlobFilter {
    fn matches(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.include.iter().any(|p| p.is_match(&name))
            && !self.exclude.iter().any(|p| p.is_match(&name))
    }
}

/// Selects files matching regex patterns. Patterns match from the start of
/// the path (like `Regex::find` anchored at 0, not a substring search). An
/// empty include list means include all.
pub struct RegexFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl RegexFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, PackError> {
        let compile = |pat: &String| {
            Regex::new(&format!("^(?:{})", pat))
                .map_err(|e| PackError::Config(format!("bad regex '{}': {}", pat, e)))
        };
        let include = if include.is_empty() {
            vec![compile(&String::new())?]
        } else {
            include.iter().map(compile).collect::<Result<_, _>>()?
        };
        let exclude = exclude.iter().map(compile).collect::<Result<_, _>>()?;
        Ok(RegexFilter { include, exclude })
    }
}

impl Predicate for RegexFilter {
    fn matches(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.include.iter().any(|p| p.is_match(&name))
            && !self.exclude.iter().any(|p| p.is_match(&name))
    }
}

/// Selects files whose size is within `[min_size, max_size]` (both
/// inclusive, either side optional).
pub struct SizeFilter {
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl Predicate for SizeFilter {
    fn matches(&self, path: &Path) -> bool {
        let Ok(meta) = std::fs::metadata(path) else {
            return false;
        };
        let size = meta.len();
        self.min_size.map_or(true, |min| size >= min)
            && self.max_size.map_or(true, |max| size <= max)
    }
}

/// Selects files whose modification time is within `[after, before]`
/// (inclusive, seconds since the epoch, either side optional).
pub struct TimeFilter {
    pub after: Option<i64>,
    pub before: Option<i64>,
}

impl Predicate for TimeFilter {
    fn matches(&self, path: &Path) -> bool {
        let mtime = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| match t.duration_since(UNIX_EPOCH) {
                Ok(d) => Some(d.as_secs() as i64),
                Err(e) => Some(-(e.duration().as_secs() as i64)),
            });
        let Some(mtime) = mtime else {
            return false;
        };
        self.after.map_or(true, |a| mtime >= a) && self.before.map_or(true, |b| mtime <= b)
    }
}
