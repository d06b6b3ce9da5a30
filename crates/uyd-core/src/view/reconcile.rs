//! View reconcilers.
//!
//! Each reconciler takes the current state of its container (if the page
//! has one) and the fetched records, and returns the patch that brings the
//! container in line with the records:
//!
//! 1. no container, no ops;
//! 2. existing nodes are reused in order, with `SetField` emitted only for
//!    slots the node has and whose text differs;
//! 3. nodes beyond the record count are removed, last first;
//! 4. records beyond the node count are rendered and appended.
//!
//! Running a reconciler again on the patched container with the same
//! records yields an empty patch. Reconcilers never fail: missing record
//! fields render as fallbacks or empty text.

use crate::models::{Event, NewsArticle, Program, SiteStats};

use super::format::{truncate, DateParts, CARD_DESCRIPTION_BUDGET, LIST_DESCRIPTION_BUDGET};
use super::page::{Container, ElementId, Field, Node, PatchOp};

/// Event cards on the home page
pub const HOME_EVENT_LIMIT: usize = 3;

/// News items in the recent-resources section
pub const HOME_NEWS_LIMIT: usize = 4;

/// Program cards in the featured section
pub const FEATURED_PROGRAM_LIMIT: usize = 3;

const DEFAULT_EVENT_IMAGE: &str = "assets/img/education/events-3.webp";
const DEFAULT_PROGRAM_IMAGE: &str = "assets/img/education/programs-1.webp";
const EVENT_FALLBACK_DESCRIPTION: &str = "Join us for this exciting event!";

// Template figures shown until stats arrive
const SUBSCRIBERS_FALLBACK: &str = "5000+";
const PROGRAMS_FALLBACK: &str = "50+";
const EVENTS_FALLBACK: &str = "15+";

/// Counter end value in the template that stands for the subscriber count
const SUBSCRIBER_COUNTER_PLACEHOLDER: &str = "5000";

fn event_link(id: i64) -> String {
    format!("event-details.html?id={}", id)
}

fn news_link(id: i64) -> String {
    format!("news-details.html?id={}", id)
}

fn program_link(id: i64) -> String {
    format!("program-details.html?id={}", id)
}

/// `SetField` for `container[index].field`, or nothing when the slot is
/// missing or already holds `value`.
fn set_field(container: &Container, index: usize, field: Field, value: &str) -> Option<PatchOp> {
    let current = container.nodes.get(index)?.get(field)?;
    (current != value).then(|| PatchOp::SetField {
        container: container.id,
        index,
        field,
        value: value.to_string(),
    })
}

/// Generic list reconciliation (see module docs).
pub fn reconcile_list<R>(
    container: Option<&Container>,
    records: &[R],
    render: impl Fn(&R) -> Node,
) -> Vec<PatchOp> {
    let Some(container) = container else {
        return Vec::new();
    };

    let mut ops = Vec::new();
    let existing = container.nodes.len();

    for (index, (node, record)) in container.nodes.iter().zip(records).enumerate() {
        let fresh = render(record);
        ops.extend(
            node.fields
                .keys()
                .filter_map(|&field| set_field(container, index, field, fresh.get(field)?)),
        );
    }

    for index in (records.len()..existing).rev() {
        ops.push(PatchOp::Remove {
            container: container.id,
            index,
        });
    }

    for record in records.iter().skip(existing) {
        ops.push(PatchOp::Append {
            container: container.id,
            node: render(record),
        });
    }

    ops
}

// ============================================================================
// Renderers
// ============================================================================

/// Home page event card
pub fn event_card(event: &Event) -> Node {
    let date = DateParts::from_raw(event.start_date.as_deref());
    let event_type = event.event_type.clone().unwrap_or_default();
    Node::new()
        .field(Field::Month, date.month)
        .field(Field::Day, date.day)
        .field(Field::Time, date.time)
        .field(Field::Title, event.title.as_str())
        .field(
            Field::Description,
            truncate(event.description.as_deref().unwrap_or_default(), CARD_DESCRIPTION_BUDGET),
        )
        .field(Field::Location, event.location.clone().unwrap_or_default())
        .field(Field::EventType, event_type)
        .field(
            Field::Image,
            event.featured_image.as_deref().unwrap_or(DEFAULT_EVENT_IMAGE),
        )
        .field(Field::ImageAlt, event.title.as_str())
        .field(Field::Participants, event.capacity_label())
        .field(Field::Link, event_link(event.id))
}

/// Events page list item
pub fn event_list_item(event: &Event) -> Node {
    let date = DateParts::from_raw(event.start_date.as_deref());
    let description = match event.description.as_deref() {
        Some(text) if !text.is_empty() => truncate(text, LIST_DESCRIPTION_BUDGET),
        _ => EVENT_FALLBACK_DESCRIPTION.to_string(),
    };
    Node::new()
        .field(Field::Day, date.day)
        .field(Field::Month, date.month)
        .field(Field::Title, event.title.as_str())
        .field(Field::Time, date.time)
        .field(Field::Location, event.location.clone().unwrap_or_default())
        .field(Field::Description, description)
        .field(Field::Link, event_link(event.id))
}

/// Featured program card
pub fn program_card(program: &Program) -> Node {
    Node::new()
        .field(Field::Title, program.title.as_str())
        .field(Field::Category, program.category.clone().unwrap_or_default())
        .field(
            Field::Description,
            truncate(program.description.as_deref().unwrap_or_default(), CARD_DESCRIPTION_BUDGET),
        )
        .field(
            Field::Image,
            program.featured_image.as_deref().unwrap_or(DEFAULT_PROGRAM_IMAGE),
        )
        .field(Field::ImageAlt, program.title.as_str())
        .field(Field::Link, program_link(program.id))
}

/// Recent-resources news item. The category slot is only filled when the
/// article has one.
pub fn news_item(article: &NewsArticle) -> Node {
    let summary = match article.excerpt.as_deref() {
        Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
        _ => truncate(article.content.as_deref().unwrap_or_default(), CARD_DESCRIPTION_BUDGET),
    };
    let mut node = Node::new()
        .field(Field::Title, article.title.as_str())
        .field(Field::Link, news_link(article.id))
        .field(Field::Description, summary)
        .field(Field::Date, DateParts::from_raw(article.publish_date.as_deref()).long);
    if let Some(category) = article.category_name() {
        node = node.field(Field::Category, category);
    }
    node
}

/// Event details page body
pub fn event_detail_node(event: &Event) -> Node {
    let date = DateParts::from_raw(event.start_date.as_deref());
    Node::new()
        .field(Field::Title, event.title.as_str())
        .field(Field::Month, date.month)
        .field(Field::Day, date.day)
        .field(Field::Time, date.time)
        .field(Field::Date, date.long)
        .field(Field::Location, event.location.clone().unwrap_or_default())
        .field(Field::EventType, event.event_type.clone().unwrap_or_default())
        .field(Field::Participants, event.capacity_label())
        .field(
            Field::Image,
            event.featured_image.as_deref().unwrap_or(DEFAULT_EVENT_IMAGE),
        )
        .field(Field::Description, event.description.clone().unwrap_or_default())
        .field(Field::Content, event.content.clone().unwrap_or_default())
}

/// News details page body
pub fn news_detail_node(article: &NewsArticle) -> Node {
    let mut node = Node::new()
        .field(Field::Title, article.title.as_str())
        .field(Field::Date, DateParts::from_raw(article.publish_date.as_deref()).long)
        .field(Field::Author, article.author.clone().unwrap_or_default())
        .field(Field::Content, article.content.clone().unwrap_or_default());
    if let Some(ref image) = article.featured_image {
        node = node.field(Field::Image, image.as_str());
    }
    if let Some(category) = article.category_name() {
        node = node.field(Field::Category, category);
    }
    node
}

// ============================================================================
// Reconcilers
// ============================================================================

/// Hero numbers and the impact counters.
///
/// The hero is only touched when it has at least three numbers; counters
/// are only touched when the subscriber count is known.
pub fn site_stats(
    hero: Option<&Container>,
    counters: Option<&Container>,
    stats: &SiteStats,
) -> Vec<PatchOp> {
    let mut ops = Vec::new();

    if let Some(hero) = hero.filter(|h| h.len() >= 3) {
        let values = [
            stats
                .subscribers()
                .map_or_else(|| SUBSCRIBERS_FALLBACK.to_string(), |n| n.to_string()),
            stats
                .programs_total()
                .map_or_else(|| PROGRAMS_FALLBACK.to_string(), |n| n.to_string()),
            stats
                .events_total()
                .map_or_else(|| EVENTS_FALLBACK.to_string(), |n| n.to_string()),
        ];
        for (index, value) in values.iter().enumerate() {
            ops.extend(set_field(hero, index, Field::Number, value));
        }
    }

    if let (Some(counters), Some(subscribers)) = (counters, stats.subscribers()) {
        let value = subscribers.to_string();
        for (index, node) in counters.nodes.iter().enumerate() {
            if node.get(Field::CounterEnd) == Some(SUBSCRIBER_COUNTER_PLACEHOLDER) {
                ops.extend(set_field(counters, index, Field::CounterEnd, &value));
            }
        }
    }

    ops
}

/// Up to three event cards on the home page
pub fn home_events(container: Option<&Container>, events: &[Event]) -> Vec<PatchOp> {
    let shown = &events[..events.len().min(HOME_EVENT_LIMIT)];
    reconcile_list(container, shown, event_card)
}

/// The "no events" state of the events page
pub fn no_events() -> Vec<PatchOp> {
    vec![
        PatchOp::SetVisible {
            element: ElementId::EventsLoading,
            visible: false,
        },
        PatchOp::SetVisible {
            element: ElementId::NoEventsMessage,
            visible: true,
        },
    ]
}

/// Full event list on the events page. An empty list, or a page without
/// the list container, shows the "no events" state.
pub fn events_page(container: Option<&Container>, events: &[Event]) -> Vec<PatchOp> {
    if container.is_none() || events.is_empty() {
        return no_events();
    }

    let mut ops = vec![
        PatchOp::SetVisible {
            element: ElementId::EventsLoading,
            visible: false,
        },
        PatchOp::SetVisible {
            element: ElementId::NoEventsMessage,
            visible: false,
        },
    ];
    ops.extend(reconcile_list(container, events, event_list_item));
    ops
}

pub fn featured_programs(container: Option<&Container>, programs: &[Program]) -> Vec<PatchOp> {
    let shown = &programs[..programs.len().min(FEATURED_PROGRAM_LIMIT)];
    reconcile_list(container, shown, program_card)
}

pub fn latest_news(container: Option<&Container>, articles: &[NewsArticle]) -> Vec<PatchOp> {
    let shown = &articles[..articles.len().min(HOME_NEWS_LIMIT)];
    reconcile_list(container, shown, news_item)
}

pub fn event_detail(container: Option<&Container>, event: &Event) -> Vec<PatchOp> {
    reconcile_list(container, std::slice::from_ref(event), event_detail_node)
}

pub fn news_detail(container: Option<&Container>, article: &NewsArticle) -> Vec<PatchOp> {
    reconcile_list(container, std::slice::from_ref(article), news_detail_node)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EngagementStats, NewsCategory, TotalCount};
    use crate::view::page::{ContainerId, Page};
    use crate::view::templates;

    fn event(id: i64, title: &str) -> Event {
        Event {
            id,
            title: title.to_string(),
            description: Some(format!("About {}", title)),
            event_type: Some("workshop".to_string()),
            start_date: Some("2025-03-08T09:30:00".to_string()),
            location: Some("Arusha".to_string()),
            ..Event::default()
        }
    }

    fn article(id: i64, title: &str) -> NewsArticle {
        NewsArticle {
            id,
            title: title.to_string(),
            content: Some("x".repeat(200)),
            publish_date: Some("2025-01-15T08:00:00".to_string()),
            ..NewsArticle::default()
        }
    }

    fn reconcile_into(page: &mut Page, id: ContainerId, plan: impl Fn(Option<&Container>) -> Vec<PatchOp>) -> Vec<PatchOp> {
        let ops = plan(page.container(id));
        page.apply(&ops);
        ops
    }

    #[test]
    fn test_missing_container_is_noop() {
        assert!(home_events(None, &[event(1, "A")]).is_empty());
        assert!(latest_news(None, &[article(1, "A")]).is_empty());
        assert!(site_stats(None, None, &SiteStats::default()).is_empty());
    }

    #[test]
    fn test_reuses_existing_nodes_in_place() {
        let mut page = templates::home_page();
        let before = page.container(ContainerId::HomeEvents).unwrap().len();
        let events = vec![event(1, "Tree Planting"), event(2, "Coding Camp"), event(3, "Health Fair")];

        let ops = reconcile_into(&mut page, ContainerId::HomeEvents, |c| home_events(c, &events));
        assert!(ops.iter().all(|op| matches!(op, PatchOp::SetField { .. })));

        let container = page.container(ContainerId::HomeEvents).unwrap();
        assert_eq!(container.len(), before);
        assert_eq!(container.nodes[1].get(Field::Title), Some("Coding Camp"));
        assert_eq!(container.nodes[1].get(Field::Month), Some("MAR"));
        assert_eq!(container.nodes[1].get(Field::Day), Some("8"));
        // Template cards have no image slot, so none is written
        assert!(!container.nodes[1].has(Field::Image));
    }

    #[test]
    fn test_removes_surplus_nodes() {
        let mut page = templates::home_page();
        let ops = reconcile_into(&mut page, ContainerId::HomeEvents, |c| home_events(c, &[event(1, "Only")]));

        let removals: Vec<usize> = ops
            .iter()
            .filter_map(|op| match op {
                PatchOp::Remove { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(removals, vec![2, 1]);

        let container = page.container(ContainerId::HomeEvents).unwrap();
        assert_eq!(container.len(), 1);
        assert_eq!(container.nodes[0].get(Field::Title), Some("Only"));
    }

    #[test]
    fn test_appends_missing_nodes() {
        let mut page = templates::events_page();
        let events = vec![event(1, "A"), event(2, "B")];
        reconcile_into(&mut page, ContainerId::EventsList, |c| events_page(c, &events));

        let container = page.container(ContainerId::EventsList).unwrap();
        assert_eq!(container.len(), 2);
        assert_eq!(container.nodes[1].get(Field::Link), Some("event-details.html?id=2"));
        assert_eq!(page.is_visible(ElementId::EventsLoading), Some(false));
        assert_eq!(page.is_visible(ElementId::NoEventsMessage), Some(false));
    }

    #[test]
    fn test_home_events_capped_at_three() {
        let mut page = templates::home_page();
        let events: Vec<Event> = (1..=6).map(|i| event(i, &format!("E{}", i))).collect();
        reconcile_into(&mut page, ContainerId::HomeEvents, |c| home_events(c, &events));
        assert_eq!(page.container(ContainerId::HomeEvents).unwrap().len(), HOME_EVENT_LIMIT);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let events: Vec<Event> = (1..=5).map(|i| event(i, &format!("E{}", i))).collect();
        let articles: Vec<NewsArticle> = (1..=2).map(|i| article(i, &format!("N{}", i))).collect();

        let mut once = templates::events_page();
        reconcile_into(&mut once, ContainerId::EventsList, |c| events_page(c, &events));

        let mut twice = once.clone();
        reconcile_into(&mut twice, ContainerId::EventsList, |c| events_page(c, &events));
        assert_eq!(once, twice);

        let mut home = templates::home_page();
        reconcile_into(&mut home, ContainerId::LatestNews, |c| latest_news(c, &articles));
        let snapshot = home.clone();
        let second = reconcile_into(&mut home, ContainerId::LatestNews, |c| latest_news(c, &articles));
        assert!(second.is_empty());
        assert_eq!(home, snapshot);
    }

    #[test]
    fn test_empty_events_page_shows_no_events() {
        let mut page = templates::events_page();
        reconcile_into(&mut page, ContainerId::EventsList, |c| events_page(c, &[]));
        assert_eq!(page.is_visible(ElementId::EventsLoading), Some(false));
        assert_eq!(page.is_visible(ElementId::NoEventsMessage), Some(true));
    }

    #[test]
    fn test_card_description_truncated() {
        let mut long = event(1, "Long");
        long.description = Some("d".repeat(151));
        let node = event_card(&long);
        let description = node.get(Field::Description).unwrap();
        assert_eq!(description.len(), 153);
        assert!(description.ends_with("..."));

        long.description = Some("d".repeat(150));
        assert_eq!(event_card(&long).get(Field::Description).unwrap().len(), 150);
    }

    #[test]
    fn test_list_item_description_fallback() {
        let mut bare = event(4, "Bare");
        bare.description = None;
        assert_eq!(
            event_list_item(&bare).get(Field::Description),
            Some(EVENT_FALLBACK_DESCRIPTION)
        );
        bare.description = Some("e".repeat(250));
        assert_eq!(event_list_item(&bare).get(Field::Description).unwrap().len(), 203);
    }

    #[test]
    fn test_card_and_detail_share_date_format() {
        let e = event(9, "Summit");
        let card = event_card(&e);
        let detail = event_detail_node(&e);
        let item = event_list_item(&e);
        for field in [Field::Month, Field::Day, Field::Time] {
            assert_eq!(card.get(field), detail.get(field));
            assert_eq!(card.get(field), item.get(field));
        }
    }

    #[test]
    fn test_news_item_prefers_excerpt_and_optional_category() {
        let mut a = article(3, "Report");
        let node = news_item(&a);
        assert_eq!(node.get(Field::Description).unwrap().len(), 153);
        assert_eq!(node.get(Field::Date), Some("Jan 15, 2025"));
        assert!(!node.has(Field::Category));

        a.excerpt = Some("Short summary".to_string());
        a.category = Some(NewsCategory::Name("Education".to_string()));
        let node = news_item(&a);
        assert_eq!(node.get(Field::Description), Some("Short summary"));
        assert_eq!(node.get(Field::Category), Some("Education"));
    }

    #[test]
    fn test_news_category_not_cleared_when_absent() {
        let mut page = templates::home_page();
        let before = page.container(ContainerId::LatestNews).unwrap().nodes[0]
            .get(Field::Category)
            .map(str::to_string);
        reconcile_into(&mut page, ContainerId::LatestNews, |c| latest_news(c, &[article(1, "N")]));
        let after = page.container(ContainerId::LatestNews).unwrap().nodes[0]
            .get(Field::Category)
            .map(str::to_string);
        assert_eq!(before, after);
    }

    #[test]
    fn test_site_stats_fill_hero_and_counters() {
        let mut page = templates::home_page();
        let stats = SiteStats {
            programs: Some(TotalCount { total: Some(12) }),
            events: Some(TotalCount { total: None }),
            news: None,
            engagement: Some(EngagementStats { subscribers: Some(1250) }),
        };
        let ops = site_stats(
            page.container(ContainerId::HeroStats),
            page.container(ContainerId::Counters),
            &stats,
        );
        page.apply(&ops);

        let hero = page.container(ContainerId::HeroStats).unwrap();
        let numbers: Vec<_> = hero.nodes.iter().map(|n| n.get(Field::Number).unwrap()).collect();
        assert_eq!(numbers, vec!["1250", "12", EVENTS_FALLBACK]);

        let counters = page.container(ContainerId::Counters).unwrap();
        assert_eq!(counters.nodes[0].get(Field::CounterEnd), Some("1250"));
        assert_eq!(counters.nodes[1].get(Field::CounterEnd), Some("50"));

        // Second pass changes nothing
        let again = site_stats(
            page.container(ContainerId::HeroStats),
            page.container(ContainerId::Counters),
            &stats,
        );
        assert!(again.is_empty());
    }

    #[test]
    fn test_site_stats_needs_three_hero_numbers() {
        let hero = Container::new(
            ContainerId::HeroStats,
            vec![Node::with_slots(&[Field::Number]), Node::with_slots(&[Field::Number])],
        );
        assert!(site_stats(Some(&hero), None, &SiteStats::default()).is_empty());
    }

    #[test]
    fn test_detail_reconcilers_patch_single_node() {
        let mut page = templates::event_details_page();
        let e = event(5, "Community Clean-up");
        reconcile_into(&mut page, ContainerId::EventDetail, |c| event_detail(c, &e));
        let node = &page.container(ContainerId::EventDetail).unwrap().nodes[0];
        assert_eq!(node.get(Field::Title), Some("Community Clean-up"));
        assert_eq!(node.get(Field::Date), Some("Mar 8, 2025"));
        assert_eq!(node.get(Field::Participants), Some("Open Participants"));

        let mut page = templates::news_details_page();
        let mut a = article(2, "Annual Report");
        a.category = Some(NewsCategory::Object { name: Some("Reports".to_string()) });
        reconcile_into(&mut page, ContainerId::NewsDetail, |c| news_detail(c, &a));
        let node = &page.container(ContainerId::NewsDetail).unwrap().nodes[0];
        assert_eq!(node.get(Field::Title), Some("Annual Report"));
        assert_eq!(node.get(Field::Category), Some("Reports"));
    }

    #[test]
    fn test_featured_programs_render_links() {
        let mut page = templates::home_page();
        let programs = vec![Program {
            id: 7,
            title: "Girls in STEM".to_string(),
            description: Some("Mentorship".to_string()),
            category: Some("Education".to_string()),
            ..Program::default()
        }];
        reconcile_into(&mut page, ContainerId::FeaturedPrograms, |c| featured_programs(c, &programs));
        let container = page.container(ContainerId::FeaturedPrograms).unwrap();
        assert_eq!(container.len(), 1);
        assert_eq!(container.nodes[0].get(Field::Link), Some("program-details.html?id=7"));
        assert_eq!(container.nodes[0].get(Field::Category), Some("Education"));
    }
}
