//! A schedule importer and calendar API for university timetable portals.
//!
//! The core is the [`resolver`]: a pure function family that turns symbolic
//! time strings like `星期一 3-4节` into concrete timestamp ranges anchored
//! to the ISO week of a reference date. Around it sit the [`grid`]
//! generators for week/month/year views, a SQLite [`db`] event store with
//! duplicate suppression, pluggable schedule [`source`]s, a best-effort
//! [`importer`], and fan-out calendar [`export`] destinations. The
//! [`server`] module exposes the whole pipeline over HTTP.

pub mod config;
pub mod db;
pub mod export;
pub mod grid;
pub mod importer;
pub mod record;
pub mod resolver;
pub mod server;
pub mod source;
