// src/content/sources/mod.rs
pub mod curated;
pub mod emergency;
pub mod linkedin;

pub use curated::{CuratedPostSet, CuratedSource};
pub use emergency::EmergencySource;
pub use linkedin::LinkedInSource;
