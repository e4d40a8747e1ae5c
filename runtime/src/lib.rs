//! Runtime value primitives for generated XSD bindings.
//!
//! Generated `read_*`/`write_*`/`validate_*` code parses and formats these
//! types for the built-in XSD datatypes that don't map onto a native Rust
//! scalar: `xs:integer` (arbitrary precision), `xs:decimal` (fixed point),
//! and the calendar/duration family.

mod calendar;
mod date;
mod date_time;
mod decimal;
mod duration;
mod error;
mod integer;
mod time;

pub use date::Date;
pub use date_time::DateTime;
pub use decimal::Decimal;
pub use duration::{DayTimeDuration, Duration, YearMonthDuration};
pub use error::Error;
pub use integer::Integer;
pub use time::Time;
