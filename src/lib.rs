//! # Almagest
//!
//! Positions and visibility events of solar-system bodies from tabulated ephemerides.
//!
//! The crate is built from three coupled engines:
//!
//! * [`interpolation`] – time-indexed tables of sampled vectors and 5-point Bessel
//!   interpolation inside the valid window of the table,
//! * [`transform`] – conversions between equatorial (ICRF, FK4, FK5), ecliptic, galactic and
//!   horizontal frames, every rotation going through the galactic frame with angles read from
//!   interpolated tables,
//! * [`events`] – rising, transit, setting, antitransit and twilight instants, refined until the
//!   body position used matches the event instant.
//!
//! [`context::EphemerisContext`] bundles the rotation tables, the solver parameters and the body
//! ephemerides into one read-only value built at startup.
//!
//! Supporting modules: [`time`] (Julian days, epochs, sidereal time), [`coordinates`] (frames,
//! spherical and rectangular coordinates, observer locations), [`ref_system`] (the analytic
//! precession/nutation model the rotation tables are generated from) and [`constants`].
//!
//! ## Logging
//!
//! The library emits [`tracing`] events (`debug!` for table builds and solved days, `trace!` for
//! refinement steps, `warn!` on non-convergence) and never installs a subscriber.
//!
//! ## Errors
//!
//! Every fallible operation returns [`almagest_errors::AlmagestError`]. Circumpolar bodies and
//! unknown distances are not errors: they show up as missing events and `None` distances.
pub mod almagest_errors;
pub mod constants;
pub mod context;
pub mod coordinates;
pub mod events;
pub mod interpolation;
pub mod ref_system;
pub mod time;
pub mod transform;
