use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinates};

/// Host capability that reports the device position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Position supplied up front, from flags or the config file.
///
/// With no position the capability is reported as unsupported, which sends
/// `locate` down the default-city path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredLocation {
    position: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        match self.position {
            Some(coords) if coords.validate().is_ok() => Ok(coords),
            Some(_) => Err(LocationError::Unavailable),
            None => Err(LocationError::Unsupported),
        }
    }
}
