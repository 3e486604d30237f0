pub mod model;
pub mod service;

pub use model::{NewProfile, Profile, ProfileChanges, ValidationError};
pub use service::ProfileService;
