//! Imagery acquisition module.

mod acquire;
mod provider;
pub mod providers;
mod types;

pub use acquire::{Acquirer, SuccessPredicate, NO_COVERAGE_MESSAGE};
pub use provider::{Geocoder, ImageryResponse, StreetImagery};
pub use types::{
    AcquiredImage, AngleSchedule, Coordinates, ImageFormat, ImageSize, LocationQuery,
    ViewingAngle, CARDINAL_HEADINGS,
};
