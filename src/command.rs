use crate::parser::Stage;
use std::fmt;

/// Built-in commands known to the shell at compile time.
///
/// This is the whole registry: a stage whose name is not listed here is an unknown
/// command. External programs are only reachable through [`Builtin::Exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Cd,
    Pwd,
    Echo,
    Kill,
    Ps,
    Exec,
    Quit,
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Echo,
        Builtin::Kill,
        Builtin::Ps,
        Builtin::Exec,
        Builtin::Quit,
    ];

    /// Canonical name of the command, e.g. "echo" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Echo => "echo",
            Builtin::Kill => "kill",
            Builtin::Ps => "ps",
            Builtin::Exec => "exec",
            Builtin::Quit => "\\quit",
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage together with what the runner knows about its surroundings.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub stage: &'a Stage,
    /// The pipeline has more than one stage.
    pub multi_stage: bool,
}

impl<'a> Invocation<'a> {
    pub fn new(stage: &'a Stage, multi_stage: bool) -> Self {
        Self { stage, multi_stage }
    }

    /// True for every stage after the first one of a multi-stage pipeline: such stages
    /// take their input from the buffer.
    pub fn reads_buffer(&self) -> bool {
        self.multi_stage && !self.stage.is_first()
    }
}

/// What the runner does after a stage completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// End the session without running any further stage.
    Quit,
}
