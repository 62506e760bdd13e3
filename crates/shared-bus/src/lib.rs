//! # Shared Bus - Status Event Bus
//!
//! Carries operation lifecycle notifications from the Submission Gateway
//! (lr-03) and the Confirmation Monitor (lr-04) to presentation-layer
//! subscribers.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐   subscribe()   ┌────────────┐
//! │ Gateway (3)  │ ────────────→ │  Event Bus   │ ──────────────→ │ Subscriber │
//! │ Monitor (4)  │               │ (broadcast)  │   filter by     │ callbacks  │
//! └──────────────┘               └──────────────┘   local_id      └────────────┘
//! ```
//!
//! ## Delivery
//!
//! The bus itself is fire-and-forget: events published while nobody listens
//! are dropped. At-least-once delivery of terminal transitions is provided
//! one level up, by replaying the persisted record state on subscribe.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, RelayEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
