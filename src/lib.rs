pub mod common;
pub mod container;
pub mod entities;
pub mod errors;
pub mod gateways;
pub mod settings;
pub mod usecases;

pub use common::dimensions::dimensions_for;
pub use common::format::Format;
pub use common::variant::{storage_path_for, variants_to_generate, VariantKind};
pub use container::Container;
pub use entities::media::{MediaRecord, StorageRecord};
pub use errors::IngestError;
pub use settings::Settings;
