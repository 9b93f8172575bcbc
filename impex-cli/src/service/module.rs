//! Plant modules a reporting point can belong to

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Module {
    Downtime,
    Production,
    Quality,
    Knowledge,
    Energy,
    Metrics,
    Maintenance,
    Inventory,
    Planning,
}

impl Module {
    pub const ALL: [Module; 9] = [
        Module::Downtime,
        Module::Production,
        Module::Quality,
        Module::Knowledge,
        Module::Energy,
        Module::Metrics,
        Module::Maintenance,
        Module::Inventory,
        Module::Planning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Downtime => "Downtime",
            Module::Production => "Production",
            Module::Quality => "Quality",
            Module::Knowledge => "Knowledge",
            Module::Energy => "Energy",
            Module::Metrics => "Metrics",
            Module::Maintenance => "Maintenance",
            Module::Inventory => "Inventory",
            Module::Planning => "Planning",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownModule(pub String);

impl std::fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown module '{}'", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for Module {
    type Err = UnknownModule;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Module::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
