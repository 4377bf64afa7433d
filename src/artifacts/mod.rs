//! Pre-fitted preprocessing artifacts and their loader

pub mod encoders;
pub mod loader;
pub mod scaler;

pub use encoders::{LabelEncoder, OneHotEncoder};
pub use loader::{ArtifactCache, ArtifactLoader, Artifacts};
pub use scaler::StandardScaler;
