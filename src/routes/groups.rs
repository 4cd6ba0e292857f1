use axum::Router;

use crate::app::AppState;

/// The externally implemented route groups and where they are mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteGroup {
    Clinics,
    Doctors,
    VisitTypes,
    Slots,
    Appointments,
    Auth,
    Catalog,
}

impl RouteGroup {
    /// Mount order.
    pub const ALL: [RouteGroup; 7] = [
        RouteGroup::Clinics,
        RouteGroup::Doctors,
        RouteGroup::VisitTypes,
        RouteGroup::Slots,
        RouteGroup::Appointments,
        RouteGroup::Auth,
        RouteGroup::Catalog,
    ];

    pub const fn prefix(self) -> &'static str {
        match self {
            RouteGroup::Clinics => "/api/clinics",
            RouteGroup::Doctors => "/api/doctors",
            RouteGroup::VisitTypes => "/api/visit-types",
            RouteGroup::Slots => "/api/slots",
            RouteGroup::Appointments => "/api/appointments",
            RouteGroup::Auth => "/api/auth",
            RouteGroup::Catalog => "/api/catalog",
        }
    }
}

type Factory = Box<dyn FnOnce(&AppState) -> Router<AppState> + Send>;

/// Registry of route group factories.
///
/// Factories run once during bootstrap, after configuration and the database
/// handle exist. Groups without a factory are simply not mounted.
#[derive(Default)]
pub struct RouteGroups {
    factories: Vec<(RouteGroup, Factory)>,
}

impl RouteGroups {
    pub fn new() -> Self {
        RouteGroups::default()
    }

    /// Register the router of `group`. Registering a group twice replaces it.
    pub fn mount<F>(mut self, group: RouteGroup, factory: F) -> Self
    where
        F: FnOnce(&AppState) -> Router<AppState> + Send + 'static,
    {
        self.factories.retain(|(existing, _)| *existing != group);
        self.factories.push((group, Box::new(factory)));
        self
    }

    pub fn is_mounted(&self, group: RouteGroup) -> bool {
        self.factories.iter().any(|(existing, _)| *existing == group)
    }

    /// Build every registered group, in [`RouteGroup::ALL`] order.
    pub(crate) fn build(mut self, state: &AppState) -> Vec<(RouteGroup, Router<AppState>)> {
        let unmounted: Vec<_> = RouteGroup::ALL
            .into_iter()
            .filter(|group| !self.is_mounted(*group))
            .map(RouteGroup::prefix)
            .collect();
        if !unmounted.is_empty() {
            tracing::warn!(?unmounted, "route groups without an implementation answer 404");
        }

        self.factories.sort_by_key(|(group, _)| *group);

        self.factories
            .into_iter()
            .map(|(group, factory)| {
                tracing::debug!(prefix = group.prefix(), "mounting route group");
                (group, factory(state))
            })
            .collect()
    }
}
