pub mod face;
pub mod metrics;
pub mod registry;

pub use face::FontFace;
pub use metrics::{FontMetrics, ScaledFontMetrics};
pub use registry::{FontDescriptor, FontRegistry, FontResolver};
