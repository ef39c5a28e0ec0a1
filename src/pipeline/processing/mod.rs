// Pipeline processing: lookup enrichment, regional aggregation, and output shaping

pub mod aggregate;
pub mod choropleth;
pub mod demographics;
pub mod enrich;
pub mod lookup;
pub mod shape;

pub use aggregate::{aggregate, Aggregation};
pub use choropleth::{choropleth_points, ChoroplethPoint, MapSettings};
pub use enrich::{enrich, EnrichmentOutcome};
pub use lookup::StateLookup;
pub use shape::{shape, ShapedOutput};
