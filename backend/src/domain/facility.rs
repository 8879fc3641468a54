//! Facility contact details shown to drivers.

use serde::{Deserialize, Serialize};

/// Contact numbers for the facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInfo {
    /// Main facility line.
    pub facility_phone: Option<String>,
    /// Support line.
    pub support_phone: Option<String>,
}

impl FacilityInfo {
    /// Trim both numbers and treat blanks as unset.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|raw| raw.trim().to_owned())
                .filter(|trimmed| !trimmed.is_empty())
        };
        Self {
            facility_phone: clean(self.facility_phone),
            support_phone: clean(self.support_phone),
        }
    }
}
