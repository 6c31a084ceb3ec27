//! Filterable list of the resources and data sources a schema document offers.

use std::collections::BTreeMap;

use schematree::schema::ProviderSchema;
use schematree::{Block, EntitySchema, ProviderSchemas, ViewportCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    DataSource,
}

impl EntityKind {
    pub fn toggled(self) -> Self {
        match self {
            EntityKind::Resource => EntityKind::DataSource,
            EntityKind::DataSource => EntityKind::Resource,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Resource => "Resources",
            EntityKind::DataSource => "Data Sources",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub block: Block,
}

impl Entity {
    /// `12 attributes, 2 blocks`, or `Empty schema`.
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if !self.block.attributes.is_empty() {
            parts.push(format!("{} attributes", self.block.attributes.len()));
        }
        if !self.block.block_types.is_empty() {
            parts.push(format!("{} blocks", self.block.block_types.len()));
        }
        if parts.is_empty() {
            return String::from("Empty schema");
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
struct ProviderEntry {
    name: String,
    resources: Vec<Entity>,
    data_sources: Vec<Entity>,
}

impl ProviderEntry {
    fn new(name: &str, schema: &ProviderSchema) -> Self {
        Self {
            name: name.to_string(),
            resources: collect_entities(&schema.resource_schemas),
            data_sources: collect_entities(&schema.data_source_schemas),
        }
    }

    fn entities(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Resource => &self.resources,
            EntityKind::DataSource => &self.data_sources,
        }
    }
}

fn collect_entities(map: &BTreeMap<String, EntitySchema>) -> Vec<Entity> {
    map.iter()
        .map(|(name, schema)| Entity {
            name: name.clone(),
            block: schema.block.clone(),
        })
        .collect()
}

/// Short provider name: `registry.terraform.io/hashicorp/aws` becomes `aws`.
pub fn short_provider_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Entities of one provider and kind, narrowed by a case-insensitive filter.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    providers: Vec<ProviderEntry>,
    provider: usize,
    kind: EntityKind,
    filter: String,
    matches: Vec<usize>,
    cursor: ViewportCursor,
}

impl EntityCatalog {
    /// `only` restricts the catalog to providers whose full or short name
    /// matches it exactly.
    pub fn from_schemas(schemas: &ProviderSchemas, only: Option<&str>) -> Self {
        let providers = schemas
            .provider_schemas
            .iter()
            .filter(|(name, _)| match only {
                Some(wanted) => name.as_str() == wanted || short_provider_name(name) == wanted,
                None => true,
            })
            .map(|(name, schema)| ProviderEntry::new(name, schema))
            .collect::<Vec<_>>();

        let mut catalog = Self {
            providers,
            provider: 0,
            kind: EntityKind::Resource,
            filter: String::new(),
            matches: Vec::new(),
            cursor: ViewportCursor::new(0),
        };
        catalog.refresh();
        log::info!(
            "Entity catalog built: {} providers, {} entities",
            catalog.providers.len(),
            catalog.total_len()
        );
        catalog
    }

    pub fn empty() -> Self {
        Self::from_schemas(&ProviderSchemas::default(), None)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.providers.get(self.provider).map(|p| p.name.as_str())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn current(&self) -> &[Entity] {
        self.providers
            .get(self.provider)
            .map(|p| p.entities(self.kind))
            .unwrap_or(&[])
    }

    fn total_len(&self) -> usize {
        self.providers
            .iter()
            .map(|p| p.resources.len() + p.data_sources.len())
            .sum()
    }

    /// Number of entities passing the filter.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn refresh(&mut self) {
        let needle = self.filter.to_lowercase();
        self.matches = self
            .current()
            .iter()
            .enumerate()
            .filter(|(_, entity)| needle.is_empty() || entity.name.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect();
        self.cursor.reset();
    }

    pub fn next_provider(&mut self) {
        if self.providers.len() > 1 {
            self.provider = (self.provider + 1) % self.providers.len();
            self.refresh();
        }
    }

    pub fn toggle_kind(&mut self) {
        self.kind = self.kind.toggled();
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.refresh();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.refresh();
    }

    pub fn pop_filter_char(&mut self) {
        if self.filter.pop().is_some() {
            self.refresh();
        }
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.refresh();
        }
    }

    pub fn set_height(&mut self, height: usize) {
        self.cursor.set_height(height);
        self.cursor.clamp(self.matches.len());
    }

    pub fn move_down(&mut self) {
        self.cursor.move_down(self.matches.len());
    }

    pub fn move_up(&mut self) {
        self.cursor.move_up();
    }

    pub fn move_page_down(&mut self) {
        self.cursor.move_page_down(self.matches.len());
    }

    pub fn move_page_up(&mut self) {
        self.cursor.move_page_up(self.matches.len());
    }

    pub fn cursor(&self) -> usize {
        self.cursor.cursor()
    }

    pub fn selected(&self) -> Option<&Entity> {
        let idx = *self.matches.get(self.cursor.cursor())?;
        self.current().get(idx)
    }

    /// Matching entities inside the viewport window, with their row index.
    pub fn window(&self) -> Vec<(usize, &Entity)> {
        let entities = self.current();
        self.cursor
            .window(self.matches.len())
            .filter_map(|row| entities.get(self.matches[row]).map(|entity| (row, entity)))
            .collect()
    }
}
