pub mod features;
pub mod model;
pub mod simulate;

pub use features::{feature_vector, FEATURE_COLUMNS};
pub use model::GbtModel;
pub use simulate::{simulate, SimulationResult};
