//! Service layer for the indexer application.
//!
//! This module contains the upstream collaborators:
//! - GraphQL transport helper (`GraphClient`)
//! - Project and birthday sources (`ProjectSource`, `BirthdaySource`)
//! - Account name resolution (`NameCache`)
//! - Marketplace event feed and notification sink (`EventFeed`, `NotificationSink`)

mod events;
mod graphql;
mod names;
mod projects;

pub use events::{EventFeed, HttpEventFeed, LogSink, NotificationSink};
pub use graphql::GraphClient;
pub use names::{HttpNameLookup, NameCache, NameLookup};
pub use projects::{
    BirthdaySource, GraphProjectSource, MetadataBirthdaySource, ProjectSource, fetch_paginated,
};
