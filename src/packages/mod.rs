//! Package requirements for the launched application
//!
//! Requirements are reconciled in list order; the GUI toolkit comes first
//! because later packages import it during their own install checks.

use serde::{Deserialize, Serialize};

pub mod reconciler;

pub use reconciler::*;

/// A package the application needs before it can start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequirement {
    /// Install spec handed to the package manager
    pub name: String,
    /// Module name used for the availability probe
    pub module: String,
    /// Optional packages never abort the run when they fail to install
    #[serde(default)]
    pub optional: bool,
}

impl PackageRequirement {
    pub fn required(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            optional: true,
        }
    }

    /// Default requirement set for VeighNa Trader
    pub fn defaults() -> Vec<Self> {
        vec![
            // GUI toolkit, must stay first
            Self::required("PySide6", "PySide6"),
            Self::required("importlib_metadata", "importlib_metadata"),
            Self::required("vnpy", "vnpy"),
            Self::required("vnpy_sqlite", "vnpy_sqlite"),
            // Brokerage gateway and app plugins degrade gracefully
            Self::optional("vnpy_futu", "vnpy_futu"),
            Self::optional("vnpy_paperaccount", "vnpy_paperaccount"),
            Self::optional("vnpy_ctastrategy", "vnpy_ctastrategy"),
            Self::optional("vnpy_datamanager", "vnpy_datamanager"),
        ]
    }
}
