//! Initial viewport from the device location
//!
//! The position fetch is raced against a fixed timeout; every failure path
//! degrades to the fallback region, so callers always get something to show.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Coordinate, Error, Region, Result};

/// Default bound on the position fetch
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(6);

/// Default span (degrees) around a device fix
pub const DEFAULT_DEVICE_SPAN: f64 = 0.005;

/// Outcome of a permission request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Location services are off or missing on this device
    Unavailable,
}

/// Accuracy hint passed to the sensor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Accuracy {
    Low,
    #[default]
    Balanced,
    High,
}

/// Device geolocation capability
///
/// `current_position` may reject or never resolve; the provider bounds it.
#[async_trait]
pub trait Geolocation: Send + Sync + 'static {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinate>;
}

/// Where the initial region came from
#[derive(Clone, Debug, PartialEq)]
pub enum RegionSource {
    Device,
    /// The fallback region was used; the error says why
    Fallback(Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitialRegion {
    pub region: Region,
    pub source: RegionSource,
}

impl InitialRegion {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, RegionSource::Fallback(_))
    }
}

/// Resolves the first viewport of a screen
#[derive(Clone)]
pub struct LocationProvider {
    geolocation: Arc<dyn Geolocation>,
    fallback: Region,
    timeout: Duration,
    span: f64,
    accuracy: Accuracy,
}

impl LocationProvider {
    pub fn new(geolocation: Arc<dyn Geolocation>, fallback: Region) -> Self {
        Self {
            geolocation,
            fallback,
            timeout: DEFAULT_LOCATION_TIMEOUT,
            span: DEFAULT_DEVICE_SPAN,
            accuracy: Accuracy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_span(mut self, span: f64) -> Self {
        self.span = span;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn fallback(&self) -> Region {
        self.fallback
    }

    /// The initial region, never failing
    pub async fn acquire_initial_region(&self) -> Region {
        self.acquire().await.region
    }

    /// The initial region along with where it came from
    pub async fn acquire(&self) -> InitialRegion {
        #[cfg(feature = "profiling")]
        profiling::scope!("location::acquire");

        match self.try_device_region().await {
            Ok(region) => {
                tracing::debug!(
                    lat = region.center().latitude(),
                    lon = region.center().longitude(),
                    "Initial region from device location"
                );
                InitialRegion {
                    region,
                    source: RegionSource::Device,
                }
            }
            Err(e) => {
                tracing::info!("Using fallback region: {e}");
                InitialRegion {
                    region: self.fallback,
                    source: RegionSource::Fallback(e),
                }
            }
        }
    }

    async fn try_device_region(&self) -> Result<Region> {
        match self.geolocation.request_permission().await {
            Permission::Granted => {}
            Permission::Denied => return Err(Error::PermissionDenied),
            Permission::Unavailable => {
                return Err(Error::LocationUnavailable(
                    "location services disabled".to_string(),
                ));
            }
        }

        let fix = tokio::time::timeout(
            self.timeout,
            self.geolocation.current_position(self.accuracy),
        )
        .await
        .map_err(|_| Error::LocationTimeout(self.timeout))??;

        Region::around(fix, self.span)
    }
}
