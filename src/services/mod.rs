pub mod providers;
pub mod recommendations;
pub mod title_search;

pub use providers::{find_trailer, Catalog, TmdbCatalog};
pub use recommendations::Recommender;
