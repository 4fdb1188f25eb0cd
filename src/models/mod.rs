//! Data models for Waypoint

pub mod activity;
pub mod announcement;
pub mod checkin;
pub mod location;
pub mod user;
pub mod venue;

// Re-export commonly used types
pub use activity::{Activity, ActivityDetails, OverrideState};
pub use announcement::Announcement;
pub use checkin::{CheckIn, CheckInRequest};
pub use location::Location;
pub use user::{Role, User, UserClaims, UserProfile};
pub use venue::Venue;
