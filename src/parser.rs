//! Splitting an input line into pipeline stages.
//!
//! There is no quoting, escaping or nesting: `|` always separates stages and a single
//! space always separates words.

/// Separator between pipeline stages.
pub const PIPE: char = '|';

/// One command within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Zero-based index of the stage in its pipeline.
    pub position: usize,
    /// The stage text after trimming, before tokenization.
    pub raw: String,
    /// First word of the stage. Empty for an empty stage.
    pub name: String,
    /// Remaining words, split on single spaces.
    pub args: Vec<String>,
}

impl Stage {
    /// Tokenize a stage string found at `position`.
    ///
    /// Consecutive spaces produce empty arguments; this mirrors the plain split the
    /// interpreter has always used.
    pub fn new(position: usize, raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let mut words = raw.split(' ').map(str::to_string);
        let name = words.next().unwrap_or_default();
        let args = words.collect();
        Self {
            position,
            raw,
            name,
            args,
        }
    }

    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    /// Arguments joined back with single spaces.
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Ordered stages derived from one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Parse a raw input line. Always yields at least one (possibly empty) stage.
    pub fn parse(line: &str) -> Self {
        let stages = line
            .split(PIPE)
            .enumerate()
            .map(|(position, raw)| Stage::new(position, raw))
            .collect();
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// True when the line contained at least one pipe. Changes how `cd` and `echo`
    /// treat the buffer.
    pub fn is_multi_stage(&self) -> bool {
        self.stages.len() > 1
    }
}
