//! Structured check results.
//!
//! A run yields an ordered list of [`CheckOutcome`]s. Rendering them to text
//! and turning them into an exit status is left to the caller.

use std::fmt;

use crate::screenshot::ScreenshotArtifact;

/// Something read from the page while checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// An attribute read on a named element
    Attribute {
        /// Element name
        subject: String,
        /// Attribute name
        attribute: String,
        /// Value read, if present
        value: Option<String>,
    },
    /// Number of elements matching a group selector
    Count {
        /// Group name
        subject: String,
        /// Matches found
        count: usize,
    },
    /// Toggle state at one phase of the interaction
    State {
        /// Phase of the interaction
        phase: Phase,
        /// Attribute name
        attribute: String,
        /// Value read, if present
        value: Option<String>,
    },
}

/// When a toggle state was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the click
    Initial,
    /// After the click settled
    AfterClick,
    /// After reloading the document
    AfterReload,
}

impl Phase {
    /// Label used in report lines
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::AfterClick => "After click",
            Self::AfterReload => "After reload",
        }
    }
}

fn show(value: Option<&String>) -> &str {
    value.map_or("<missing>", String::as_str)
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute {
                subject,
                attribute,
                value,
            } => write!(f, "{subject} {attribute}: {}", show(value.as_ref())),
            Self::Count { subject, count } => write!(f, "Found {count} {subject}"),
            Self::State {
                phase,
                attribute,
                value,
            } => write!(f, "{} {attribute}: {}", phase.label(), show(value.as_ref())),
        }
    }
}

/// Why a check failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// Attribute differs from the expected literal
    Mismatch {
        /// Expected literal
        expected: String,
        /// Value read, if present
        actual: Option<String>,
    },
    /// No element matched the selector
    ElementNotFound {
        /// Selector used
        selector: String,
    },
    /// A group selector matched zero elements
    NoMatches {
        /// Selector used
        selector: String,
    },
    /// The toggle state did not change after the click
    Unchanged {
        /// State before and after
        value: Option<String>,
    },
    /// Reloading did not restore the initial toggle state
    NotReset {
        /// State before the click
        initial: Option<String>,
        /// State after the reload
        after_reload: Option<String>,
    },
    /// The page failed while the check was reading or clicking
    Fault {
        /// Driver error text
        message: String,
    },
}

/// Result of one independent check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Check name
    pub name: String,
    /// Element or group the check targets
    pub subject: String,
    /// Attribute the check reads
    pub attribute: String,
    /// Values read, in order
    pub observations: Vec<Observation>,
    /// Failure, if any
    pub failure: Option<CheckFailure>,
}

impl CheckOutcome {
    pub(crate) fn new(name: impl Into<String>, subject: &str, attribute: &str) -> Self {
        Self {
            name: name.into(),
            subject: subject.to_string(),
            attribute: attribute.to_string(),
            observations: Vec::new(),
            failure: None,
        }
    }

    pub(crate) fn observe(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub(crate) fn fail(mut self, failure: CheckFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Whether the check passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// One-line explanation of the outcome
    #[must_use]
    pub fn detail(&self) -> String {
        let attribute = &self.attribute;
        let subject = &self.subject;
        match &self.failure {
            None => format!("{subject} {attribute} ok"),
            Some(CheckFailure::Mismatch { .. }) => {
                format!("{subject} missing correct {attribute}")
            }
            Some(CheckFailure::ElementNotFound { selector }) => {
                format!("{subject} not found ({selector})")
            }
            Some(CheckFailure::NoMatches { selector }) => {
                format!("no {subject} found ({selector})")
            }
            Some(CheckFailure::Unchanged { .. }) => format!("{attribute} did not toggle"),
            Some(CheckFailure::NotReset {
                initial,
                after_reload,
            }) => format!(
                "{attribute} not reset by reload (initial {}, after reload {})",
                show(initial.as_ref()),
                show(after_reload.as_ref())
            ),
            Some(CheckFailure::Fault { message }) => {
                format!("{subject} {attribute} check errored: {message}")
            }
        }
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// URL of the checked document
    pub target: String,
    /// Outcomes in execution order
    pub outcomes: Vec<CheckOutcome>,
    /// Screenshot written at the end of the run
    pub screenshot: ScreenshotArtifact,
}

impl CheckReport {
    /// Whether every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    /// Failed outcomes, in order
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// Look up an outcome by name
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}
