//! # System Groups
//!
//! A [`Group`] owns an ordered list of systems and is itself a system, so
//! groups nest. Every phase visits entries in registration order, descending
//! into nested groups as it reaches them.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use super::system::{short_name, System, SystemContext};

/// The per-frame phases a group dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// [`System::initialize`].
    Initialize,
    /// [`System::before_update`].
    BeforeUpdate,
    /// [`System::update`].
    Update,
    /// [`System::after_update`].
    AfterUpdate,
    /// [`System::render_ui`].
    RenderUi,
}

impl Phase {
    /// Every phase, in frame order.
    pub const ALL: [Self; 5] = [
        Self::Initialize,
        Self::BeforeUpdate,
        Self::Update,
        Self::RenderUi,
        Self::AfterUpdate,
    ];

    const fn slot(self) -> usize {
        match self {
            Self::Initialize => 0,
            Self::BeforeUpdate => 1,
            Self::Update => 2,
            Self::AfterUpdate => 3,
            Self::RenderUi => 4,
        }
    }

    fn dispatch(self, system: &mut dyn System, ctx: &mut SystemContext<'_>) {
        match self {
            Self::Initialize => system.initialize(ctx),
            Self::BeforeUpdate => system.before_update(ctx),
            Self::Update => system.update(ctx),
            Self::AfterUpdate => system.after_update(ctx),
            Self::RenderUi => system.render_ui(ctx),
        }
    }
}

/// Timing of one phase of one system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseStats {
    /// Times the phase ran.
    pub calls: u64,
    /// Duration of the latest run (microseconds).
    pub last_us: f64,
    /// Rolling average (microseconds).
    pub avg_us: f64,
    /// Slowest run (microseconds).
    pub max_us: f64,
}

impl PhaseStats {
    /// Folds one run into the stats.
    pub fn record(&mut self, elapsed: Duration) {
        let us = elapsed.as_secs_f64() * 1_000_000.0;
        self.calls += 1;
        self.last_us = us;
        self.avg_us = if self.calls == 1 {
            us
        } else {
            (self.avg_us * 15.0 + us) / 16.0
        };
        self.max_us = self.max_us.max(us);
    }
}

/// Per-phase timing of a registered system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SystemTimings {
    phases: [PhaseStats; 5],
}

impl SystemTimings {
    /// Stats for `phase`.
    #[inline]
    #[must_use]
    pub const fn phase(&self, phase: Phase) -> &PhaseStats {
        &self.phases[phase.slot()]
    }

    fn record(&mut self, phase: Phase, elapsed: Duration) {
        self.phases[phase.slot()].record(elapsed);
    }
}

/// A system registered in a group, with its timings.
pub struct SystemEntry {
    system: Box<dyn System>,
    timings: SystemTimings,
}

impl SystemEntry {
    /// The registered system.
    #[inline]
    #[must_use]
    pub fn system(&self) -> &dyn System {
        &*self.system
    }

    /// The registered system, mutably.
    #[inline]
    pub fn system_mut(&mut self) -> &mut dyn System {
        &mut *self.system
    }

    /// Phase timings recorded so far.
    #[inline]
    #[must_use]
    pub const fn timings(&self) -> &SystemTimings {
        &self.timings
    }

    /// The system as `T`, if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: System>(&self) -> Option<&T> {
        self.system().as_any().downcast_ref::<T>()
    }

    /// The system as `&mut T`, if that is its concrete type.
    pub fn downcast_mut<T: System>(&mut self) -> Option<&mut T> {
        self.system_mut().as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for SystemEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemEntry")
            .field("system", &self.system.name())
            .field("timings", &self.timings)
            .finish()
    }
}

/// An ordered, nestable list of systems.
///
/// # Example
///
/// ```rust,ignore
/// let logic = Group::new("logic")
///     .with(MovementSystem::default())
///     .with(Group::new("gameplay").with(DestroyAfterTimeSystem));
///
/// let movement = logic.get::<MovementSystem>();
/// ```
#[derive(Debug)]
pub struct Group {
    name: String,
    entries: Vec<SystemEntry>,
}

impl Group {
    /// Empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Group name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a system after the existing ones.
    pub fn add<S: System>(&mut self, system: S) -> &mut Self {
        self.add_boxed(Box::new(system))
    }

    /// Appends an already boxed system.
    pub fn add_boxed(&mut self, system: Box<dyn System>) -> &mut Self {
        debug!(group = %self.name, system = short_name(system.name()), "System added");
        self.entries.push(SystemEntry {
            system,
            timings: SystemTimings::default(),
        });
        self
    }

    /// Builder form of [`Group::add`].
    #[must_use]
    pub fn with<S: System>(mut self, system: S) -> Self {
        self.add(system);
        self
    }

    /// Direct entries, nested groups counted once.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` with no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[SystemEntry] {
        &self.entries
    }

    /// First system of type `T`, depth-first in registration order.
    #[must_use]
    pub fn get<T: System>(&self) -> Option<&T> {
        for entry in &self.entries {
            if let Some(found) = entry.downcast_ref::<T>() {
                return Some(found);
            }
            if let Some(found) = entry.system().as_group().and_then(Group::get::<T>) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable counterpart of [`Group::get`].
    pub fn get_mut<T: System>(&mut self) -> Option<&mut T> {
        for entry in &mut self.entries {
            if entry.system().as_any().is::<T>() {
                return entry.downcast_mut::<T>();
            }
            if let Some(found) = entry.system_mut().as_group_mut().and_then(Group::get_mut::<T>) {
                return Some(found);
            }
        }
        None
    }

    /// Every system of type `T`, depth-first in registration order.
    #[must_use]
    pub fn find<T: System>(&self) -> Vec<&T> {
        let mut found = Vec::new();
        self.collect_into(&mut found);
        found
    }

    fn collect_into<'a, T: System>(&'a self, found: &mut Vec<&'a T>) {
        for entry in &self.entries {
            if let Some(system) = entry.downcast_ref::<T>() {
                found.push(system);
            }
            if let Some(group) = entry.system().as_group() {
                group.collect_into(found);
            }
        }
    }

    /// Timings of the first system of type `T`, searched like [`Group::get`].
    #[must_use]
    pub fn timings<T: System>(&self) -> Option<&SystemTimings> {
        for entry in &self.entries {
            if entry.system().as_any().is::<T>() {
                return Some(entry.timings());
            }
            if let Some(found) = entry.system().as_group().and_then(Group::timings::<T>) {
                return Some(found);
            }
        }
        None
    }

    fn run_phase(&mut self, phase: Phase, ctx: &mut SystemContext<'_>) {
        for entry in &mut self.entries {
            let start = Instant::now();
            phase.dispatch(&mut *entry.system, ctx);
            entry.timings.record(phase, start.elapsed());
        }
    }
}

impl System for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut SystemContext<'_>) {
        self.run_phase(Phase::Initialize, ctx);
    }

    fn before_update(&mut self, ctx: &mut SystemContext<'_>) {
        self.run_phase(Phase::BeforeUpdate, ctx);
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) {
        self.run_phase(Phase::Update, ctx);
    }

    fn after_update(&mut self, ctx: &mut SystemContext<'_>) {
        self.run_phase(Phase::AfterUpdate, ctx);
    }

    fn render_ui(&mut self, ctx: &mut SystemContext<'_>) {
        self.run_phase(Phase::RenderUi, ctx);
    }

    fn as_group(&self) -> Option<&Group> {
        Some(self)
    }

    fn as_group_mut(&mut self) -> Option<&mut Group> {
        Some(self)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group = {{ Name = {}, Systems = {{ ", self.name)?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(short_name(entry.system.name()))?;
        }
        f.write_str(" } }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tandem_core::EntityStore;

    use crate::destruction::DestructionQueue;
    use crate::testing::idle_physics;
    use crate::time::GameTime;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        log: Log,
    }

    impl System for Recorder {
        fn before_update(&mut self, _ctx: &mut SystemContext<'_>) {
            self.log.lock().push(format!("{}.before", self.tag));
        }

        fn update(&mut self, _ctx: &mut SystemContext<'_>) {
            self.log.lock().push(format!("{}.update", self.tag));
        }
    }

    struct Marker(u32);
    impl System for Marker {}

    fn run(group: &mut Group, phase: Phase) {
        let mut store = EntityStore::new(8);
        let destruction = DestructionQueue::new();
        let manager = idle_physics();
        let physics = manager.queue();
        let mut ctx = SystemContext {
            store: &mut store,
            destruction: &destruction,
            physics: &physics,
            time: GameTime::new(0.016, 0.0),
        };
        phase.dispatch(group, &mut ctx);
    }

    #[test]
    fn test_phases_visit_nested_groups_in_order() {
        let log = Log::default();
        let inner = Group::new("inner").with(Recorder {
            tag: "B",
            log: Arc::clone(&log),
        });
        let mut outer = Group::new("outer")
            .with(Recorder {
                tag: "A",
                log: Arc::clone(&log),
            })
            .with(inner);

        run(&mut outer, Phase::BeforeUpdate);
        run(&mut outer, Phase::Update);

        assert_eq!(*log.lock(), ["A.before", "B.before", "A.update", "B.update"]);
    }

    #[test]
    fn test_get_is_depth_first() {
        let mut group = Group::new("root")
            .with(Group::new("nested").with(Marker(1)))
            .with(Marker(2));

        assert_eq!(group.get::<Marker>().map(|m| m.0), Some(1));
        assert_eq!(group.find::<Marker>().iter().map(|m| m.0).collect::<Vec<_>>(), [1, 2]);

        if let Some(marker) = group.get_mut::<Marker>() {
            marker.0 = 10;
        }
        assert_eq!(group.get::<Marker>().map(|m| m.0), Some(10));
        assert!(group.get::<Recorder>().is_none());
    }

    #[test]
    fn test_timings_accumulate() {
        let mut group = Group::new("root").with(Marker(0));
        run(&mut group, Phase::Update);
        run(&mut group, Phase::Update);

        let timings = group.timings::<Marker>().copied().unwrap_or_default();
        assert_eq!(timings.phase(Phase::Update).calls, 2);
        assert_eq!(timings.phase(Phase::AfterUpdate).calls, 0);
    }

    #[test]
    fn test_display() {
        let group = Group::new("logic").with(Marker(0)).with(Group::new("inner"));
        assert_eq!(group.to_string(), "Group = { Name = logic, Systems = { Marker,inner } }");
    }

    #[test]
    fn test_phase_stats_rolling_average() {
        let mut stats = PhaseStats::default();
        stats.record(Duration::from_micros(160));
        stats.record(Duration::from_micros(0));
        assert_eq!(stats.calls, 2);
        assert!((stats.avg_us - 150.0).abs() < 1e-6);
        assert!((stats.max_us - 160.0).abs() < 1e-6);
    }
}
