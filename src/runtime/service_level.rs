//! Service level — a single byte advertising how usable the server is.
//!
//! Clients pick between redundant servers by comparing this value. Ranges
//! follow the usual subranges: 0 maintenance, 1 no data, 2-199 degraded,
//! 200-255 healthy.

use crate::runtime::Variant;

/// Health band a service level falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceBand {
    /// Server is under maintenance (level 0)
    Maintenance,
    /// Server has no data to serve (level 1)
    NoData,
    /// Server works with reduced quality (levels 2-199)
    Degraded,
    /// Server is fully usable (levels 200-255)
    Healthy,
}

/// Value written to `Server.ServiceLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServiceLevel(pub u8);

impl ServiceLevel {
    /// Published by the test server once bootstrap succeeds.
    pub const FULLY_OPERATIONAL: ServiceLevel = ServiceLevel(255);

    pub fn band(self) -> ServiceBand {
        match self.0 {
            0 => ServiceBand::Maintenance,
            1 => ServiceBand::NoData,
            2..=199 => ServiceBand::Degraded,
            _ => ServiceBand::Healthy,
        }
    }
}

impl From<ServiceLevel> for Variant {
    fn from(level: ServiceLevel) -> Self {
        Variant::Byte(level.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ServiceLevel(0).band(), ServiceBand::Maintenance);
        assert_eq!(ServiceLevel(1).band(), ServiceBand::NoData);
        assert_eq!(ServiceLevel(2).band(), ServiceBand::Degraded);
        assert_eq!(ServiceLevel(199).band(), ServiceBand::Degraded);
        assert_eq!(ServiceLevel(200).band(), ServiceBand::Healthy);
    }

    #[test]
    fn test_fully_operational() {
        assert_eq!(ServiceLevel::FULLY_OPERATIONAL.band(), ServiceBand::Healthy);
        assert_eq!(
            Variant::from(ServiceLevel::FULLY_OPERATIONAL),
            Variant::Byte(255)
        );
    }
}
