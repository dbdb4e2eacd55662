//! Simulated device sensor for the desktop driver

use async_trait::async_trait;
use meal_map_lib::{Accuracy, Coordinate, Geolocation, Permission, Result};

/// A device that is either parked at a fixed position or refuses to share it
pub struct FixedGeolocation {
    position: Option<Coordinate>,
}

impl FixedGeolocation {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocation for FixedGeolocation {
    async fn request_permission(&self) -> Permission {
        if self.position.is_some() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinate> {
        self.position.ok_or(meal_map_lib::Error::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_position() {
        let here = Coordinate::new(37.56, 126.99).unwrap();
        let device = FixedGeolocation::new(Some(here));
        assert_eq!(device.request_permission().await, Permission::Granted);
        assert_eq!(device.current_position(Accuracy::High).await.unwrap(), here);
    }

    #[tokio::test]
    async fn test_no_position_denies() {
        let device = FixedGeolocation::new(None);
        assert_eq!(device.request_permission().await, Permission::Denied);
        assert!(device.current_position(Accuracy::Low).await.is_err());
    }
}
