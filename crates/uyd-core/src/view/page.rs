//! Page model: named containers of nodes plus element visibility flags.
//!
//! A `Node` only carries the field slots its markup actually has. Patches
//! never add a slot to an existing node, so markup that lacks an element
//! for a field simply does not show it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A displayable slot inside a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Title,
    Description,
    Content,
    Month,
    Day,
    Time,
    Date,
    Location,
    Category,
    EventType,
    Author,
    Image,
    ImageAlt,
    Link,
    Participants,
    Number,
    CounterEnd,
}

/// Containers reconcilers write into. Each maps to a fixed spot in the
/// site template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerId {
    HeroStats,
    Counters,
    HomeEvents,
    EventsList,
    FeaturedPrograms,
    LatestNews,
    EventDetail,
    NewsDetail,
}

impl ContainerId {
    /// CSS selector of the container in the site template
    pub fn selector(&self) -> &'static str {
        match self {
            ContainerId::HeroStats => ".stat-number",
            ContainerId::Counters => "[data-purecounter-end]",
            ContainerId::HomeEvents => "#events .row",
            ContainerId::EventsList => "#events-list",
            ContainerId::FeaturedPrograms => "#programs .row",
            ContainerId::LatestNews => "#recent-resources .row",
            ContainerId::EventDetail => "#event-details",
            ContainerId::NewsDetail => "#news-details",
        }
    }
}

/// Standalone elements whose visibility is toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementId {
    EventsLoading,
    NoEventsMessage,
}

impl ElementId {
    pub fn dom_id(&self) -> &'static str {
        match self {
            ElementId::EventsLoading => "events-loading",
            ElementId::NoEventsMessage => "no-events-message",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub fields: BTreeMap<Field, String>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with the given slots, all empty
    pub fn with_slots(slots: &[Field]) -> Self {
        Self {
            fields: slots.iter().map(|&f| (f, String::new())).collect(),
        }
    }

    /// Builder-style slot assignment
    pub fn field(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub nodes: Vec<Node>,
}

impl Container {
    pub fn new(id: ContainerId, nodes: Vec<Node>) -> Self {
        Self { id, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One step of a view patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PatchOp {
    SetField {
        container: ContainerId,
        index: usize,
        field: Field,
        value: String,
    },
    Remove {
        container: ContainerId,
        index: usize,
    },
    Append {
        container: ContainerId,
        node: Node,
    },
    SetVisible {
        element: ElementId,
        visible: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub containers: BTreeMap<ContainerId, Container>,
    pub visibility: BTreeMap<ElementId, bool>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.containers.insert(container.id, container);
        self
    }

    pub fn with_element(mut self, element: ElementId, visible: bool) -> Self {
        self.visibility.insert(element, visible);
        self
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    /// Visibility of `element`; `None` when the page has no such element
    pub fn is_visible(&self, element: ElementId) -> Option<bool> {
        self.visibility.get(&element).copied()
    }

    /// Apply `ops` in order. Ops that point at missing containers, nodes,
    /// slots or elements are skipped.
    pub fn apply(&mut self, ops: &[PatchOp]) {
        for op in ops {
            match op {
                PatchOp::SetField {
                    container,
                    index,
                    field,
                    value,
                } => {
                    let slot = self
                        .containers
                        .get_mut(container)
                        .and_then(|c| c.nodes.get_mut(*index))
                        .and_then(|node| node.fields.get_mut(field));
                    match slot {
                        Some(slot) => slot.clone_from(value),
                        None => debug!(?container, index, ?field, "Skipping patch for missing slot"),
                    }
                }
                PatchOp::Remove { container, index } => {
                    if let Some(c) = self.containers.get_mut(container) {
                        if *index < c.nodes.len() {
                            c.nodes.remove(*index);
                        }
                    }
                }
                PatchOp::Append { container, node } => {
                    if let Some(c) = self.containers.get_mut(container) {
                        c.nodes.push(node.clone());
                    }
                }
                PatchOp::SetVisible { element, visible } => {
                    if let Some(flag) = self.visibility.get_mut(element) {
                        *flag = *visible;
                    }
                }
            }
        }
    }
}
