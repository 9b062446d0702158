//! Plot Locator: finds a farm plot from GPS fixes, photo metadata or
//! manual entry, and resolves it into a confidence-scored administrative
//! location.

pub mod acquisition;
pub mod config;
pub mod exif;
pub mod geo;
pub mod geography;
pub mod location;
pub mod server;
