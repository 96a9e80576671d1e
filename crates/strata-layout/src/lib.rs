//! Strata Layout - per-frame layout pipeline for the Strata timeline engine
//!
//! Turns a borrowed event collection plus a viewport into a deterministic,
//! collision-free frame layout: lane indices, pixel bounds, the active level
//! of detail, visible labels, and cluster markers at coarse zoom. Everything
//! here is pure and synchronous except the optional lane-assignment offload
//! in [`service`].

pub mod cluster;
pub mod config;
pub mod frame;
pub mod label;
pub mod lane;
pub mod lod;
pub mod service;
pub mod spatial;

pub use cluster::{cluster_events, ClusterGroup};
pub use config::{GeometryConfig, LayoutConfig, PerformanceConfig};
pub use frame::{layout_frame, EventLayout, FrameLayout};
pub use label::{resolve_labels, LabelCandidate};
pub use lane::{assign_lanes, LaneAssignment};
pub use lod::{determine_lod, filter_events_by_lod, LodTier};
pub use service::{LaneComputation, LayoutCoordinator, LayoutService, ServiceError, ServiceHandle};
pub use spatial::{Bounds, SpatialIndex, SpatialStats};
