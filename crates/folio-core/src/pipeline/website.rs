//! # Website Manager
//!
//! Stage 1 of a request: bind the incoming [`Request`] to the page entity.
//! The page receives a [`Route`] component describing where it lives, then
//! every component the request carries, in order.

use super::config::SiteConfig;
use crate::component::{Class, ComponentRef};
use crate::component_class;
use crate::entity::Entity;
use crate::lifecycle::{RunStage, Staged};
use crate::types::FolioResult;
use tracing::debug;

/// One incoming page request.
#[derive(Debug, Clone)]
pub struct Request {
    path: String,
    components: Vec<ComponentRef>,
}

impl Request {
    /// A request for `path` carrying no components.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            components: Vec::new(),
        }
    }

    /// Add a component to attach to the page.
    #[must_use]
    pub fn with<C: Class>(mut self, component: C) -> Self {
        self.components.push(ComponentRef::new(component));
        self
    }

    /// Add an existing component handle to attach to the page.
    #[must_use]
    pub fn with_ref(mut self, component: ComponentRef) -> Self {
        self.components.push(component);
        self
    }

    /// Requested path, relative to the site's base path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Components to attach to the page.
    #[must_use]
    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }
}

/// Where the current page lives. Attached to every page by the website stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Site display name.
    pub site: String,
    /// Request path as received.
    pub path: String,
    /// Request path joined under the site's base path.
    pub full_path: String,
}

component_class!(Route);

fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Request-level singleton manager.
#[derive(Debug)]
pub struct Website {
    stage: RunStage,
    site: SiteConfig,
}

impl Website {
    /// Ordinal of [`Website::run`].
    pub const RUN: u32 = 1;

    pub(crate) fn new(site: SiteConfig) -> Self {
        Self {
            stage: RunStage::for_type::<Self>(),
            site,
        }
    }

    /// Site settings.
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Build the route for `request`.
    #[must_use]
    pub fn route_for(&self, request: &Request) -> Route {
        Route {
            site: self.site.name.clone(),
            path: request.path().to_string(),
            full_path: join_path(&self.site.base_path, request.path()),
        }
    }

    /// Stage 1: attach the route and the request's components to `page`.
    pub fn run(&mut self, request: &Request, page: &mut Entity) -> FolioResult<()> {
        self.stage.assert_stage(Self::RUN)?;

        let route = self.route_for(request);
        debug!(site = %route.site, path = %route.full_path, "website stage");
        page.add(route);
        for component in request.components() {
            page.attach(component.clone());
        }
        Ok(())
    }
}

impl Staged for Website {
    fn run_stage(&self) -> &RunStage {
        &self.stage
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Singleton;
    use crate::types::FolioError;

    struct FormTag;
    component_class!(FormTag);

    fn website(base_path: &str) -> Singleton<Website> {
        let mut slot = Singleton::new();
        let site = SiteConfig {
            name: "docs".to_string(),
            base_path: base_path.to_string(),
        };
        slot.init(Website::new(site)).expect("website");
        slot
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        assert_eq!(join_path("/", "/about"), "/about");
        assert_eq!(join_path("/docs/", "intro"), "/docs/intro");
        assert_eq!(join_path("/docs", "/"), "/docs/");
    }

    #[test]
    fn run_attaches_route_then_request_components() {
        let mut slot = website("/docs");
        let site = slot.instance_mut().expect("live");
        let form = ComponentRef::new(FormTag);
        let request = Request::new("/intro").with_ref(form.clone());
        let mut page = Entity::new(request.path());

        site.run(&request, &mut page).expect("stage 1");

        let route = page.get::<Route>().expect("route");
        assert_eq!(route.site, "docs");
        assert_eq!(route.full_path, "/docs/intro");
        assert_eq!(page.components()[1], form);
        assert_eq!(site.current_stage(), 2);
    }

    #[test]
    fn run_twice_is_rejected() {
        let mut slot = website("/");
        let site = slot.instance_mut().expect("live");
        let request = Request::new("/").with(FormTag);
        let mut page = Entity::new("/");

        site.run(&request, &mut page).expect("first");
        assert!(matches!(
            site.run(&request, &mut page),
            Err(FolioError::StageAlreadyRun { owner: "Website", .. })
        ));
        assert_eq!(page.len(), 2);
    }
}
