//! Event log of a rewrite run.
//!
//! Passes record what they did to which call site as [`Event`]s. The log is append-only and
//! shared by every worker of a run, so events arrive in completion order, not in class order.
//! Counters are never tracked separately: [`DerivedStats`] recomputes them from the log.
//!
//! # Example
//!
//! ```rust
//! use strscope::rewrite::{DerivedStats, EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::StringReplaced)
//!     .at("com.example.Main", "onCreate", 3)
//!     .message("#42 -> \"hello\"");
//! log.record(EventKind::ClassAnnotated).class("com.example.Main");
//!
//! let stats = DerivedStats::from_log(&log);
//! assert_eq!(stats.to_string(), "1 string replaced in 1 method, 1 class annotated");
//! ```

use std::{collections::HashSet, fmt, time::Duration};

use strum::Display;

/// What an [`Event`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// A lookup argument was replaced with its decoded string
    StringReplaced,
    /// A marker comment was attached to a class
    ClassAnnotated,
    /// A target call was left alone because its index is not a literal
    CallSkipped,
    /// A pass loaded its table and is ready to visit
    PassInitialized,
    /// Informational message
    Info,
    /// Something unexpected that did not stop the run
    Warning,
    /// A fatal failure
    Error,
}

/// Location of an event in the decompiled code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Site {
    /// Fully qualified class name
    pub class: String,
    /// Method name, `None` for class-level events
    pub method: Option<String>,
    /// Instruction position within the method
    pub position: Option<usize>,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class)?;
        if let Some(method) = &self.method {
            write!(f, "::{method}")?;
        }
        if let Some(position) = self.position {
            write!(f, "@{position}")?;
        }
        Ok(())
    }
}

/// A single recorded event.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// Where it happened, if it concerns a class or call site
    pub site: Option<Site>,
    /// Pass that recorded the event
    pub pass: Option<&'static str>,
    /// Free-form detail
    pub message: String,
}

impl Event {
    fn new(kind: EventKind) -> Self {
        Event {
            kind,
            site: None,
            pass: None,
            message: String::new(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(site) = &self.site {
            write!(f, " {site}")?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

/// Fills in an event; it is appended to the log when the builder is dropped.
///
/// Created by [`EventLog::record`].
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    event: Event,
}

impl EventBuilder<'_> {
    /// Places the event at an instruction of a method.
    pub fn at(mut self, class: impl Into<String>, method: impl Into<String>, position: usize) -> Self {
        self.event.site = Some(Site {
            class: class.into(),
            method: Some(method.into()),
            position: Some(position),
        });
        self
    }

    /// Places the event on a class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.event.site = Some(Site {
            class: class.into(),
            method: None,
            position: None,
        });
        self
    }

    /// Names the pass recording the event.
    pub fn pass(mut self, pass: &'static str) -> Self {
        self.event.pass = Some(pass);
        self
    }

    /// Attaches a detail message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.event.message = message.into();
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let kind = self.event.kind;
        let event = std::mem::replace(&mut self.event, Event::new(kind));
        self.log.events.push(event);
    }
}

/// Append-only, thread-safe collection of [`Event`]s.
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts an event of the given kind.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder {
            log: self,
            event: Event::new(kind),
        }
    }

    /// Records an informational message.
    pub fn info(&self, message: impl Into<String>) {
        self.record(EventKind::Info).message(message);
    }

    /// Records a warning.
    pub fn warn(&self, message: impl Into<String>) {
        self.record(EventKind::Warning).message(message);
    }

    /// Records a fatal failure.
    pub fn error(&self, message: impl Into<String>) {
        self.record(EventKind::Error).message(message);
    }

    /// All events in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, event)| event)
    }

    /// Events recorded after the first `start` ones.
    ///
    /// Pass [`EventLog::len`] taken before a run to see only that run's events.
    pub fn since(&self, start: usize) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(move |(index, _)| *index >= start)
            .map(|(_, event)| event)
    }

    /// Events of one kind.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.iter().filter(move |event| event.kind == kind)
    }

    /// Events placed on `class` or on one of its methods.
    pub fn for_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Event> {
        self.iter()
            .filter(move |event| event.site.as_ref().is_some_and(|site| site.class == class))
    }

    /// Returns `true` if an event of `kind` was recorded.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    /// Number of events of `kind`.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }
}

/// Counters computed from an [`EventLog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedStats {
    /// Call sites rewritten
    pub strings_replaced: usize,
    /// Distinct methods with at least one rewritten call site
    pub methods_transformed: usize,
    /// Marker comments attached
    pub classes_annotated: usize,
    /// Target calls left alone because of a non-literal index
    pub calls_skipped: usize,
    /// Warnings recorded
    pub warnings: usize,
    /// Fatal failures recorded
    pub errors: usize,
    /// Wall time of the run, zero if unknown
    pub total_time: Duration,
}

impl DerivedStats {
    /// Counts the events of `log`.
    #[must_use]
    pub fn from_log(log: &EventLog) -> Self {
        Self::from_events(log.iter())
    }

    /// Counts `events`, for example [`EventLog::since`] for a single run.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut stats = Self::default();
        let mut methods = HashSet::new();

        for event in events {
            match event.kind {
                EventKind::StringReplaced => {
                    stats.strings_replaced += 1;
                    if let Some(Site {
                        class,
                        method: Some(method),
                        ..
                    }) = &event.site
                    {
                        methods.insert((class.as_str(), method.as_str()));
                    }
                }
                EventKind::ClassAnnotated => stats.classes_annotated += 1,
                EventKind::CallSkipped => stats.calls_skipped += 1,
                EventKind::Warning => stats.warnings += 1,
                EventKind::Error => stats.errors += 1,
                EventKind::PassInitialized | EventKind::Info => {}
            }
        }

        stats.methods_transformed = methods.len();
        stats
    }

    /// Sets the wall time of the run.
    #[must_use]
    pub fn with_time(mut self, time: Duration) -> Self {
        self.total_time = time;
        self
    }
}

fn counted(n: usize, singular: &str, plural: &str) -> String {
    format!("{n} {}", if n == 1 { singular } else { plural })
}

impl fmt::Display for DerivedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.strings_replaced > 0 {
            parts.push(format!(
                "{} replaced in {}",
                counted(self.strings_replaced, "string", "strings"),
                counted(self.methods_transformed, "method", "methods")
            ));
        }
        if self.classes_annotated > 0 {
            parts.push(format!("{} annotated", counted(self.classes_annotated, "class", "classes")));
        }
        if self.calls_skipped > 0 {
            parts.push(format!("{} skipped", counted(self.calls_skipped, "call", "calls")));
        }
        if self.warnings > 0 {
            parts.push(counted(self.warnings, "warning", "warnings"));
        }
        if self.errors > 0 {
            parts.push(counted(self.errors, "error", "errors"));
        }

        if parts.is_empty() {
            f.write_str("no transformations")?;
        } else {
            f.write_str(&parts.join(", "))?;
        }
        if !self.total_time.is_zero() {
            write!(f, " in {:?}", self.total_time)?;
        }
        Ok(())
    }
}

/// Shortens `s` to at most `max_chars` characters, ending in `...` when cut.
#[must_use]
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
