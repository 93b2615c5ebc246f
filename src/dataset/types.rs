use serde::Serialize;
use std::fmt;

use crate::exposure::Exposure;

/// Name of the plain view when it is selected by state string
pub const NO_REF: &str = "no_ref";

/// Which rendering of a (protein, exposure) slice to select
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewSelector {
    /// Raw combined means of every state
    NoRef,
    /// Means relative to a baseline state, with Tukey p-values against it
    Reference(String),
}

impl ViewSelector {
    /// Selector for an optional baseline state; `"no_ref"` names the plain view.
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            None | Some(NO_REF) => ViewSelector::NoRef,
            Some(state) => ViewSelector::Reference(state.to_string()),
        }
    }
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSelector::NoRef => f.write_str(NO_REF),
            ViewSelector::Reference(state) => write!(f, "{state}"),
        }
    }
}

/// Composite cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    /// Protein identifier
    pub protein: String,
    /// Normalized exposure
    pub exposure: Exposure,
    /// View selector
    pub view: ViewSelector,
}

/// One plotted point of a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    /// Residue position
    pub position: u32,
    /// Experimental state
    pub state: String,
    /// Combined mean, or its difference to the baseline state in reference views
    pub mean: f64,
    /// Combined variance
    pub variance: f64,
    /// Combined replicate count
    pub count: u64,
    /// ANOVA p-value at this position and exposure
    pub anova_p: f64,
    /// Tukey p-value against the baseline state (reference views only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

impl ViewRow {
    /// Lower and upper whisker of this point.
    pub fn bounds(&self) -> (f64, f64) {
        (self.mean - self.variance, self.mean + self.variance)
    }
}

/// Rows of one cache entry and the y-axis bounds a chart should use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetView {
    /// Rows ordered by position, then state
    pub data: Vec<ViewRow>,
    /// Chart bounds `(min, max)`
    pub min_max: (f64, f64),
}
