//! proteomap-kg — Knowledge graph queries over the canonical entity set.
//! - Storage trait and in-memory store
//! - Disease–protein graph assembly with degree and filters
//! - Hub and disease-cluster analysis
//! - Detail views and search

pub mod graph;
pub mod hubs;
pub mod store;
pub mod views;

pub use graph::{build_graph, graph_from_store, GraphEdge, GraphFilters, GraphNode, GraphResult};
pub use hubs::{find_disease_clusters, hub_details, identify_hubs, ClusterRecord, HubDetail, HubRecord};
pub use store::{InMemoryStore, KnowledgeStore};
pub use views::{disease_detail, protein_context, search, DiseaseDetail, ProteinContext, SearchResult};
