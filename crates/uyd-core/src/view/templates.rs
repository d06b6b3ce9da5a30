//! Markup snapshots of the site's pages as shipped, before any data loads.
//!
//! These mirror the static template: the home page carries three event
//! cards, three program cards and four news items with placeholder copy,
//! and the events page starts with its loading indicator showing.

use super::page::{Container, ContainerId, ElementId, Field, Node, Page};

const EVENT_CARD_SLOTS: &[Field] = &[Field::Month, Field::Day, Field::Title, Field::Description, Field::Location];
const PROGRAM_CARD_SLOTS: &[Field] = &[Field::Title, Field::Category, Field::Description, Field::Image, Field::Link];

fn placeholder(slots: &[Field], title: &str) -> Node {
    slots
        .iter()
        .fold(Node::new(), |node, &field| match field {
            Field::Title => node.field(field, title),
            _ => node.field(field, ""),
        })
}

fn news_placeholder(title: &str, category: &str) -> Node {
    Node::new()
        .field(Field::Title, title)
        .field(Field::Link, "#")
        .field(Field::Description, "")
        .field(Field::Date, "")
        .field(Field::Category, category)
}

/// Home page
pub fn home_page() -> Page {
    Page::new()
        .with_container(Container::new(
            ContainerId::HeroStats,
            ["5000+", "50+", "15+"]
                .iter()
                .map(|n| Node::new().field(Field::Number, *n))
                .collect(),
        ))
        .with_container(Container::new(
            ContainerId::Counters,
            ["5000", "50", "15"]
                .iter()
                .map(|n| Node::new().field(Field::CounterEnd, *n))
                .collect(),
        ))
        .with_container(Container::new(
            ContainerId::HomeEvents,
            vec![
                placeholder(EVENT_CARD_SLOTS, "Youth Leadership Summit"),
                placeholder(EVENT_CARD_SLOTS, "Community Health Day"),
                placeholder(EVENT_CARD_SLOTS, "Digital Skills Bootcamp"),
            ],
        ))
        .with_container(Container::new(
            ContainerId::FeaturedPrograms,
            vec![
                placeholder(PROGRAM_CARD_SLOTS, "Education Support"),
                placeholder(PROGRAM_CARD_SLOTS, "Youth Empowerment"),
                placeholder(PROGRAM_CARD_SLOTS, "Community Development"),
            ],
        ))
        .with_container(Container::new(
            ContainerId::LatestNews,
            vec![
                news_placeholder("Annual Impact Report", "Reports"),
                news_placeholder("Scholarship Winners Announced", "Education"),
                news_placeholder("New Partnership", "Partnerships"),
                news_placeholder("Volunteer Spotlight", "Community"),
            ],
        ))
}

/// Events page: empty list, loading indicator on, no-events message off
pub fn events_page() -> Page {
    Page::new()
        .with_container(Container::new(ContainerId::EventsList, Vec::new()))
        .with_element(ElementId::EventsLoading, true)
        .with_element(ElementId::NoEventsMessage, false)
}

/// Event details page
pub fn event_details_page() -> Page {
    Page::new().with_container(Container::new(
        ContainerId::EventDetail,
        vec![Node::with_slots(&[
            Field::Title,
            Field::Month,
            Field::Day,
            Field::Time,
            Field::Date,
            Field::Location,
            Field::EventType,
            Field::Participants,
            Field::Image,
            Field::Description,
            Field::Content,
        ])],
    ))
}

/// News details page
pub fn news_details_page() -> Page {
    Page::new().with_container(Container::new(
        ContainerId::NewsDetail,
        vec![Node::with_slots(&[
            Field::Title,
            Field::Date,
            Field::Category,
            Field::Author,
            Field::Image,
            Field::Content,
        ])],
    ))
}
