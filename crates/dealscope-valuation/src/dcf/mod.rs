//! Discounted cash flow pipeline.
//!
//! Normalized statements feed a [`BaseFcfProfile`], which is projected
//! forward ([`project`]) and discounted ([`value_dcf`]). A
//! [`SensitivityGrid`] re-runs projection and valuation over perturbed
//! growth and discount rates. [`DcfModel`] runs the whole chain and
//! attaches a confidence breakdown.

mod base_fcf;
mod model;
mod projection;
mod sensitivity;
mod valuator;

pub use base_fcf::{BaseFcfProfile, STATUTORY_TAX_RATE, estimate_base_fcf};
pub use model::{DcfConfig, DcfModel};
pub use projection::{
    DEFAULT_HORIZON, GrowthAssumptions, Projection, ProjectionConfig, TerminalGrowth, project,
    project_with,
};
pub use sensitivity::{
    CENTER, SensitivityConfig, SensitivityGrid, sensitivity_grid, sensitivity_grid_with,
};
pub use valuator::{DcfAssumptions, DcfResult, Provenance, discounted_value, value_dcf};
