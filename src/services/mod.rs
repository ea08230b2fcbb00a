//! Business logic services.
//!
//! This module contains the reviewer assignment engine and the operations
//! built around it: pull request lifecycle, reassignment, batch
//! deactivation, statistics, teams and users.
//!
//! Services hold no state of their own. Everything durable goes through a
//! shared [`DirectoryStore`], and every random draw goes through an injected
//! [`RandomSource`].

pub mod assignment;
pub mod lifecycle;
pub mod membership;
pub mod random;
pub mod reassignment;
pub mod statistics;
pub mod team;
pub mod user;

#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::db::DirectoryStore;

pub use assignment::AssignmentEngine;
pub use lifecycle::LifecycleController;
pub use membership::MembershipResolver;
pub use random::{OsRandom, RandomSource};
pub use reassignment::{Reassignment, ReassignmentEngine};
pub use statistics::{PartialStatistics, StatisticsAggregator};
pub use team::TeamService;
pub use user::UserService;

/// Current time at millisecond precision, which is what the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Every service, wired to one store and one random source.
#[derive(Clone)]
pub struct Services {
    pub membership: MembershipResolver,
    pub assignment: AssignmentEngine,
    pub lifecycle: LifecycleController,
    pub reassignment: ReassignmentEngine,
    pub statistics: StatisticsAggregator,
    pub teams: TeamService,
    pub users: UserService,
}

impl Services {
    pub fn new(store: Arc<dyn DirectoryStore>, random: Arc<dyn RandomSource>) -> Self {
        let membership = MembershipResolver::new(store.clone());
        Self {
            assignment: AssignmentEngine::new(store.clone(), membership.clone(), random.clone()),
            lifecycle: LifecycleController::new(store.clone()),
            reassignment: ReassignmentEngine::new(store.clone(), random),
            statistics: StatisticsAggregator::new(store.clone()),
            teams: TeamService::new(store.clone()),
            users: UserService::new(store),
            membership,
        }
    }
}
