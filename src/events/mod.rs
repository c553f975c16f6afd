//! # Astronomical events
//!
//! Rising, culminations, setting and twilight boundaries of a body for one civil day.
//!
//! * [`EventKind`] – what happened,
//! * [`AstronomicalEvent`] – when, for which bodies, seen from which origin,
//! * [`EventSet`] – the ordered result of a computation,
//! * [`solver`] – the iterative rise/transit/set solver,
//! * [`body`] – per-body policies (standard altitude, reported events, twilight),
//! * [`params`] – solver configuration.
//!
//! Two events are the same event when kind, body set and origin agree and their instants are
//! at most two seconds apart. [`EventSet::dedup_near`] relies on that equality.
pub mod body;
pub mod params;
pub mod solver;

use smallvec::SmallVec;

use crate::constants::EVENT_EQUALITY_SECONDS;
use crate::coordinates::{CoordinateFrameOrigin, SphericalCoordinates};
use crate::time::Instant;
use body::BodyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Rising,
    UpperCulmination,
    Setting,
    LowerCulmination,
    CivilDawn,
    CivilDusk,
    NauticalDawn,
    NauticalDusk,
    AstronomicalDawn,
    AstronomicalDusk,
}

/// One event of one or more bodies.
#[derive(Debug, Clone)]
pub struct AstronomicalEvent {
    pub kind: EventKind,
    pub instant: Instant,
    pub bodies: SmallVec<[BodyKind; 2]>,
    /// Equatorial coordinates of the body at the event, when computed.
    pub coordinates: Option<SphericalCoordinates>,
    pub origin: CoordinateFrameOrigin,
}

impl AstronomicalEvent {
    pub fn new(kind: EventKind, instant: Instant, origin: CoordinateFrameOrigin) -> Self {
        AstronomicalEvent {
            kind,
            instant,
            bodies: SmallVec::new(),
            coordinates: None,
            origin,
        }
    }

    pub fn with_coordinates(mut self, coordinates: SphericalCoordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_bodies(mut self, bodies: &[BodyKind]) -> Self {
        self.bodies = SmallVec::from_slice(bodies);
        self
    }

    fn same_bodies(&self, other: &AstronomicalEvent) -> bool {
        self.bodies.len() == other.bodies.len()
            && self.bodies.iter().all(|b| other.bodies.contains(b))
    }
}

impl PartialEq for AstronomicalEvent {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.origin == other.origin
            && self.same_bodies(other)
            && self.instant.seconds_since(&other.instant).abs() <= EVENT_EQUALITY_SECONDS
    }
}

/// Ordered collection of events.
#[derive(Debug, Clone, Default)]
pub struct EventSet {
    events: Vec<AstronomicalEvent>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AstronomicalEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: EventSet) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AstronomicalEvent> {
        self.events.iter()
    }

    /// Earliest event of `kind`.
    pub fn first(&self, kind: EventKind) -> Option<&AstronomicalEvent> {
        self.of_kind(kind)
            .min_by(|a, b| a.instant.julian_day().total_cmp(&b.instant.julian_day()))
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &AstronomicalEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn rising(&self) -> Option<Instant> {
        self.first(EventKind::Rising).map(|e| e.instant)
    }

    pub fn transit(&self) -> Option<Instant> {
        self.first(EventKind::UpperCulmination).map(|e| e.instant)
    }

    pub fn setting(&self) -> Option<Instant> {
        self.first(EventKind::Setting).map(|e| e.instant)
    }

    pub fn antitransit(&self) -> Option<Instant> {
        self.first(EventKind::LowerCulmination).map(|e| e.instant)
    }

    /// Drop every event equal (same kind, bodies, origin, within 2 s) to an earlier one.
    pub fn dedup_near(&mut self) {
        let mut kept: Vec<AstronomicalEvent> = Vec::with_capacity(self.events.len());
        for event in self.events.drain(..) {
            if !kept.contains(&event) {
                kept.push(event);
            }
        }
        self.events = kept;
    }

    pub fn sort_by_instant(&mut self) {
        self.events
            .sort_by(|a, b| a.instant.julian_day().total_cmp(&b.instant.julian_day()));
    }

    pub fn relabel(&mut self, from: EventKind, to: EventKind) {
        self.events
            .iter_mut()
            .filter(|e| e.kind == from)
            .for_each(|e| e.kind = to);
    }

    pub fn remove_kind(&mut self, kind: EventKind) {
        self.events.retain(|e| e.kind != kind);
    }

    /// Attach the same body set to every event.
    pub fn set_bodies(&mut self, bodies: &[BodyKind]) {
        for event in &mut self.events {
            event.bodies = SmallVec::from_slice(bodies);
        }
    }
}

impl IntoIterator for EventSet {
    type Item = AstronomicalEvent;
    type IntoIter = std::vec::IntoIter<AstronomicalEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a AstronomicalEvent;
    type IntoIter = std::slice::Iter<'a, AstronomicalEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<AstronomicalEvent> for EventSet {
    fn from_iter<T: IntoIterator<Item = AstronomicalEvent>>(iter: T) -> Self {
        EventSet {
            events: iter.into_iter().collect(),
        }
    }
}
