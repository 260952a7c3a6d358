//! Business logic services

pub mod auth;
pub mod catalog;
pub mod lending;
pub mod members;
pub mod reservations;
pub mod staff;

use crate::{
    config::{AuthConfig, LendingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub reservations: reservations::ReservationsService,
    pub members: members::MembersService,
    pub staff: staff::StaffService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        lending_config: LendingConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone(), lending_config),
            reservations: reservations::ReservationsService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            staff: staff::StaffService::new(repository),
        }
    }
}
