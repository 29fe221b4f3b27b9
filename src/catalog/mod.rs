pub mod provider;
pub mod types;

pub use provider::{
    is_valid_language_code, load_catalog_file, CatalogProvider, ConsistencyReport,
    DirectoryCatalog, FALLBACK_LANGUAGE,
};
pub use types::{
    Catalog, CatalogError, CatalogSummary, Domain, Keyed, QuestionSpec, FACETS_PER_DOMAIN,
    FULL_CATALOG_SIZE,
};
