use std::fmt;

/// Where a generation run currently is.
///
/// Each non-terminal stage is entered before its work starts, so a run that
/// fails records the stage it failed in just before [`Stage::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    DirectoryPrep,
    BaseApplied,
    ModulesApplied,
    PostStepsRun,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::DirectoryPrep => "directory-prep",
            Self::BaseApplied => "base-applied",
            Self::ModulesApplied => "modules-applied",
            Self::PostStepsRun => "post-steps-run",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
