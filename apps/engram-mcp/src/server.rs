//! # Engram MCP Server
//!
//! Implements `ServerHandler` with 11 MCP tools backed by the embedded
//! [`MemoryStore`]. Every tool responds with a JSON text payload so the
//! calling model can parse results mechanically.

use engram_core::{
    Entity, KeywordExtractor, MemoryStore, ObservationRef, Relation, review_conversation,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server that exposes a knowledge-graph memory file as tools.
#[derive(Clone)]
pub struct EngramMcp {
    store: MemoryStore,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

/// Wire shape of an entity as supplied by the calling model.
///
/// Mirrors the storage schema but carries its own `JsonSchema` derive so
/// engram-core stays free of schema machinery.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpec {
    /// Unique name identifying the entity.
    #[schemars(description = "Unique name identifying the entity")]
    pub name: String,
    /// Category label, e.g. 'person', 'location', 'concept'.
    #[schemars(description = "Category label, e.g. 'person', 'location', 'concept'")]
    pub entity_type: String,
    /// Free-text facts attached to the entity.
    #[schemars(description = "Free-text facts attached to the entity")]
    #[serde(default)]
    pub observations: Vec<String>,
    /// Initial relevance weight (default 0).
    #[schemars(description = "Initial relevance weight (default 0)")]
    #[serde(default)]
    pub weight: u64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationSpec {
    /// Name of the source entity.
    #[schemars(description = "Name of the source entity")]
    pub from: String,
    /// Name of the target entity.
    #[schemars(description = "Name of the target entity")]
    pub to: String,
    /// Relation label in active voice, e.g. 'works_at'.
    #[schemars(description = "Relation label in active voice, e.g. 'works_at'")]
    pub relation_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSpec {
    /// Name of the entity the observation belongs to.
    #[schemars(description = "Name of the entity the observation belongs to")]
    pub entity_name: String,
    /// The observation text.
    #[schemars(description = "The observation text")]
    pub observation: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateEntitiesParams {
    /// Entities to create. Names already in the graph are skipped.
    #[schemars(description = "Entities to create. Names already in the graph are skipped")]
    pub entities: Vec<EntitySpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRelationsParams {
    /// Relations to create. Exact duplicates are skipped.
    #[schemars(description = "Relations to create. Exact duplicates are skipped")]
    pub relations: Vec<RelationSpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddObservationsParams {
    /// Observations to append to existing entities.
    #[schemars(description = "Observations to append to existing entities")]
    pub observations: Vec<ObservationSpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteEntitiesParams {
    /// Names of the entities to delete, with all their relations.
    #[schemars(description = "Names of the entities to delete, with all their relations")]
    pub entity_names: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteObservationsParams {
    /// Specific observations to remove from entities.
    #[schemars(description = "Specific observations to remove from entities")]
    pub deletions: Vec<ObservationSpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRelationsParams {
    /// Relations to delete, matched on all three fields.
    #[schemars(description = "Relations to delete, matched on all three fields")]
    pub relations: Vec<RelationSpec>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchNodesParams {
    /// Case-insensitive substring matched against names, types and observations.
    #[schemars(
        description = "Case-insensitive substring matched against names, types and observations"
    )]
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OpenNodesParams {
    /// Names of the entities to retrieve.
    #[schemars(description = "Names of the entities to retrieve")]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PruneEntitiesParams {
    /// Entities with weight strictly below this value are removed.
    #[schemars(description = "Entities with weight strictly below this value are removed")]
    pub threshold: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewConversationParams {
    /// Conversation text to mine for entities and relations.
    #[schemars(description = "Conversation text to mine for entities and relations")]
    pub conversation: String,
}

// =============================================================================
// TOOL IMPLEMENTATIONS
// =============================================================================

impl From<EntitySpec> for Entity {
    fn from(spec: EntitySpec) -> Self {
        Self {
            name: spec.name,
            entity_type: spec.entity_type,
            observations: spec.observations,
            weight: spec.weight,
        }
    }
}

impl From<RelationSpec> for Relation {
    fn from(spec: RelationSpec) -> Self {
        Self {
            from: spec.from,
            to: spec.to,
            relation_type: spec.relation_type,
        }
    }
}

impl From<ObservationSpec> for ObservationRef {
    fn from(spec: ObservationSpec) -> Self {
        Self {
            entity_name: spec.entity_name,
            observation: spec.observation,
        }
    }
}

#[tool_router]
impl EngramMcp {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Create new entities in the knowledge graph memory")]
    async fn create_entities(
        &self,
        params: Parameters<CreateEntitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        let entities: Vec<Entity> = params.0.entities.into_iter().map(Entity::from).collect();
        match self.store.create_entities(entities) {
            Ok(created) => json_success(serde_json::json!({
                "success": true,
                "created": created,
                "message": format!("Created {created} new entities"),
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Create relations between existing entities in the knowledge graph")]
    async fn create_relations(
        &self,
        params: Parameters<CreateRelationsParams>,
    ) -> Result<CallToolResult, McpError> {
        let relations: Vec<Relation> = params.0.relations.into_iter().map(Relation::from).collect();
        match self.store.create_relations(relations) {
            Ok(created) => json_success(serde_json::json!({
                "success": true,
                "created": created,
                "message": format!("Created {created} new relations"),
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Add observations to existing entities in the knowledge graph")]
    async fn add_observations(
        &self,
        params: Parameters<AddObservationsParams>,
    ) -> Result<CallToolResult, McpError> {
        let refs: Vec<ObservationRef> = params
            .0
            .observations
            .into_iter()
            .map(ObservationRef::from)
            .collect();
        match self.store.add_observations(&refs) {
            Ok(added) => json_success(serde_json::json!({
                "success": true,
                "added": added,
                "message": format!("Added {added} observations"),
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Delete entities and all relations that reference them")]
    async fn delete_entities(
        &self,
        params: Parameters<DeleteEntitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.delete_entities(&params.0.entity_names) {
            Ok(()) => json_success(serde_json::json!({
                "success": true,
                "message": "Entities deleted",
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Delete specific observations from entities in the knowledge graph")]
    async fn delete_observations(
        &self,
        params: Parameters<DeleteObservationsParams>,
    ) -> Result<CallToolResult, McpError> {
        let refs: Vec<ObservationRef> = params
            .0
            .deletions
            .into_iter()
            .map(ObservationRef::from)
            .collect();
        match self.store.delete_observations(&refs) {
            Ok(()) => json_success(serde_json::json!({
                "success": true,
                "message": "Observations deleted",
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Delete relations from the knowledge graph")]
    async fn delete_relations(
        &self,
        params: Parameters<DeleteRelationsParams>,
    ) -> Result<CallToolResult, McpError> {
        let relations: Vec<Relation> = params.0.relations.into_iter().map(Relation::from).collect();
        match self.store.delete_relations(&relations) {
            Ok(()) => json_success(serde_json::json!({
                "success": true,
                "message": "Relations deleted",
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Read the entire knowledge graph memory")]
    async fn read_graph(&self) -> Result<CallToolResult, McpError> {
        let graph = self.store.load();
        json_success(serde_json::json!({
            "entities": graph.entities,
            "relations": graph.relations,
        }))
    }

    #[tool(
        description = "Search entities by substring across names, types and observations. \
                       Matched entities gain relevance weight."
    )]
    async fn search_nodes(
        &self,
        params: Parameters<SearchNodesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.search_nodes(&params.0.query) {
            Ok(entities) => json_success(serde_json::json!({
                "success": true,
                "count": entities.len(),
                "entities": entities,
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(
        description = "Retrieve specific entities by exact name. \
                       Retrieved entities gain relevance weight."
    )]
    async fn open_nodes(
        &self,
        params: Parameters<OpenNodesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.open_nodes(&params.0.names) {
            Ok(entities) => json_success(serde_json::json!({
                "success": true,
                "count": entities.len(),
                "entities": entities,
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Remove entities whose relevance weight is below a threshold")]
    async fn prune_entities(
        &self,
        params: Parameters<PruneEntitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.prune_entities(params.0.threshold) {
            Ok(pruned) => json_success(serde_json::json!({
                "success": true,
                "count": pruned.len(),
                "pruned_entities": pruned,
                "message": format!("Pruned {} entities", pruned.len()),
            })),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(
        description = "Review a conversation transcript, extract candidate entities and \
                       relations, and reinforce mentioned entities"
    )]
    async fn review_conversation(
        &self,
        params: Parameters<ReviewConversationParams>,
    ) -> Result<CallToolResult, McpError> {
        match review_conversation(&self.store, &KeywordExtractor, &params.0.conversation) {
            Ok(outcome) => match serde_json::to_value(&outcome) {
                Ok(value) => json_success(value),
                Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
            },
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

#[tool_handler]
impl ServerHandler for EngramMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Engram persistent memory server. Use tools to store entities, \
                 relations and observations, retrieve them by search or name, \
                 review conversations for new knowledge, and prune entities \
                 that are no longer relevant."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// =============================================================================
// RESPONSE FORMATTING
// =============================================================================

/// Wrap a JSON payload as a successful text tool result.
fn json_success(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        value.to_string(),
    )]))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_spec_carries_supplied_weight_into_storage() {
        let spec: EntitySpec = serde_json::from_str(
            r#"{"name":"Alice","entityType":"person","observations":["engineer"],"weight":3}"#,
        )
        .expect("deserialize");

        let entity = Entity::from(spec);
        assert_eq!(entity.name, "Alice");
        assert_eq!(entity.weight, 3);
        assert_eq!(entity.observations, vec!["engineer"]);
    }

    #[test]
    fn entity_spec_weight_defaults_to_zero() {
        let spec: EntitySpec =
            serde_json::from_str(r#"{"name":"Bob","entityType":"person"}"#).expect("deserialize");

        let entity = Entity::from(spec);
        assert_eq!(entity.weight, 0);
        assert!(entity.observations.is_empty());
    }
}
