//! Optional select query components

pub mod facet_set;
pub mod grouping;
pub mod json_facet;
pub mod stats;

pub use facet_set::{
    FacetSetComponent, FieldFacetComponent, FieldFacetEntry, FieldFacetMethod, FieldFacetSort,
    PivotFacetComponent,
};
pub use grouping::{GroupFormatting, GroupingComponent};
pub use json_facet::{
    JsonFacetComponent, JsonFacetMap, JsonFacetType, JsonQueryFacet, JsonStatFacet, JsonTermsFacet,
};
pub use stats::StatsComponent;
