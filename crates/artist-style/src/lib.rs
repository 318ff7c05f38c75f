pub mod error;
pub mod normalize;
pub mod dictionary;
pub mod storage;
pub mod fetch;
pub mod cache;
pub mod matcher;
pub mod extract;
pub mod generate;
pub mod provider;
pub mod settings;
pub mod engine;
pub mod server;

pub use crate::cache::{CacheConfig, DictionaryCache};
pub use crate::dictionary::StyleDictionary;
pub use crate::engine::{ApplyOutcome, StyleEngine};
pub use crate::error::{StyleError, StyleResult};
pub use crate::generate::{generate_styles, GenerationOutcome, StyleSource};
pub use crate::matcher::{replace_fuzzy, replace_known};
pub use crate::normalize::normalize_name;
pub use crate::provider::{ProviderKind, ProviderTable};
pub use crate::server::{Server, ServerConfig};
pub use crate::settings::ClientSettings;
