//! # Demo Components
//!
//! A small set of page tags, systems and modules that exercise the kernel
//! from the command line.
//!
//! | Tag | Component | Handled by |
//! |-----|-----------|------------|
//! | `database[=TABLE]` | [`DatabaseTag`] | [`TableSystem`], [`ReadOnlyNotice`] |
//! | `readonly` | [`ReadOnlyTag`] | vetoes tables and forms |
//! | `form` | [`FormTag`] | [`FormSystem`] (registered by [`FormsModule`]) |
//! | `login` | [`LoginForm`], a `FormTag` subtype | [`FormSystem`] |
//! | `title=TEXT` | [`TitleTag`] | [`TitleSystem`] |
//!
//! A form on a read-only page is a wiring error: [`FormGuard`] aborts the
//! request.

use folio_core::{
    ComponentClass, ComponentRef, Entity, Family, FolioError, FolioResult, Module, ModuleContext,
    Pipeline, PipelineConfig, Priority, Request, Route, System, component_class,
};

/// Table name used when `database` is given without one.
pub const DEFAULT_TABLE: &str = "records";

// =============================================================================
// COMPONENTS
// =============================================================================

/// The page lists rows from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTag {
    /// Source table.
    pub table: String,
}

/// The page must not offer any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnlyTag;

/// The page carries a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormTag;

/// A login form; matches anything that asks for a [`FormTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginForm;

/// Page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTag {
    /// Title text.
    pub text: String,
}

component_class!(DatabaseTag);
component_class!(ReadOnlyTag);
component_class!(FormTag);
component_class!(LoginForm: FormTag);
component_class!(TitleTag);

/// Parse a command-line tag such as `database=users` into a component.
pub fn parse_tag(raw: &str) -> FolioResult<ComponentRef> {
    let (kind, value) = match raw.split_once('=') {
        Some((kind, value)) => (kind.trim(), Some(value.trim())),
        None => (raw.trim(), None),
    };

    match (kind, value) {
        ("database" | "db", value) => {
            let table = value.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_TABLE);
            Ok(ComponentRef::new(DatabaseTag {
                table: table.to_string(),
            }))
        }
        ("readonly" | "read-only", None) => Ok(ComponentRef::new(ReadOnlyTag)),
        ("form", None) => Ok(ComponentRef::new(FormTag)),
        ("login", None) => Ok(ComponentRef::new(LoginForm)),
        ("title", Some(text)) if !text.is_empty() => Ok(ComponentRef::new(TitleTag {
            text: text.to_string(),
        })),
        _ => Err(FolioError::Config(format!(
            "unknown tag {raw:?}; expected database[=TABLE], readonly, form, login or title=TEXT"
        ))),
    }
}

/// Build a request for `path` carrying the parsed `tags`, in order.
pub fn demo_request(path: &str, tags: &[String]) -> FolioResult<Request> {
    let mut request = Request::new(path);
    for tag in tags {
        request = request.with_ref(parse_tag(tag)?);
    }
    Ok(request)
}

// =============================================================================
// SYSTEMS
// =============================================================================

/// Writes `<title>` into the head.
pub struct TitleSystem {
    family: Family,
}

impl Default for TitleSystem {
    fn default() -> Self {
        Self {
            family: Family::new().all::<TitleTag>(),
        }
    }
}

impl System for TitleSystem {
    fn family(&self) -> &Family {
        &self.family
    }

    fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
        let title = entity.get::<TitleTag>()?.text.clone();
        entity.append("head", &format!("<title>{title}</title>"));
        Ok(())
    }
}

/// Renders one table per database tag on writable pages.
pub struct TableSystem {
    family: Family,
}

impl Default for TableSystem {
    fn default() -> Self {
        Self {
            family: Family::new().all::<DatabaseTag>().none::<ReadOnlyTag>(),
        }
    }
}

impl System for TableSystem {
    fn family(&self) -> &Family {
        &self.family
    }

    fn priority(&self) -> Priority {
        Priority::new(10)
    }

    fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
        let tables: Vec<String> = entity
            .get_all::<DatabaseTag>()?
            .into_iter()
            .map(|tag| format!("<table data-source=\"{}\"></table>", tag.table))
            .collect();
        for table in tables {
            entity.append("body", &table);
        }
        Ok(())
    }
}

/// Explains why a database page shows no table.
pub struct ReadOnlyNotice {
    family: Family,
}

impl Default for ReadOnlyNotice {
    fn default() -> Self {
        Self {
            family: Family::new().all::<DatabaseTag>().all::<ReadOnlyTag>(),
        }
    }
}

impl System for ReadOnlyNotice {
    fn family(&self) -> &Family {
        &self.family
    }

    fn priority(&self) -> Priority {
        Priority::new(10)
    }

    fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
        let table = entity.get::<DatabaseTag>()?.table.clone();
        entity.append("body", &format!("<p class=\"read-only\">{table} is read-only</p>"));
        Ok(())
    }
}

/// Renders every form, login forms with their own action.
pub struct FormSystem {
    family: Family,
}

impl Default for FormSystem {
    fn default() -> Self {
        Self {
            family: Family::new().one::<FormTag>().none::<ReadOnlyTag>(),
        }
    }
}

impl System for FormSystem {
    fn family(&self) -> &Family {
        &self.family
    }

    fn priority(&self) -> Priority {
        Priority::new(20)
    }

    fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
        let forms: Vec<&'static str> = entity
            .all_of_class(&ComponentClass::of::<FormTag>())?
            .into_iter()
            .map(|form| {
                if form.downcast_ref::<LoginForm>().is_some() {
                    "<form action=\"/login\"></form>"
                } else {
                    "<form></form>"
                }
            })
            .collect();
        for form in forms {
            entity.append("body", form);
        }
        Ok(())
    }
}

/// Aborts the request when a form lands on a read-only page.
pub struct FormGuard {
    family: Family,
}

impl Default for FormGuard {
    fn default() -> Self {
        Self {
            family: Family::new().all::<FormTag>().all::<ReadOnlyTag>(),
        }
    }
}

impl System for FormGuard {
    fn family(&self) -> &Family {
        &self.family
    }

    fn priority(&self) -> Priority {
        Priority::new(-100)
    }

    fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
        Err(FolioError::aborted(
            self.name(),
            format!("form on read-only page {}", entity.name()),
        ))
    }
}

// =============================================================================
// MODULES
// =============================================================================

/// Site chrome: a fallback title early, a footer late.
#[derive(Debug, Default)]
pub struct ChromeModule;

impl Module for ChromeModule {
    fn name(&self) -> &str {
        "chrome"
    }

    fn run_early(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        let page = cx.page();
        if !page.has::<TitleTag>() {
            let site = page.get::<Route>()?.site.clone();
            page.add(TitleTag { text: site });
        }
        Ok(())
    }

    fn run_late(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        let page = cx.page();
        let footer = format!("<footer>{}</footer>", page.get::<Route>()?.site);
        page.append("body", &footer);
        Ok(())
    }
}

/// Registers [`FormSystem`]; disable `forms` to drop form rendering.
#[derive(Debug, Default)]
pub struct FormsModule;

impl Module for FormsModule {
    fn name(&self) -> &str {
        "forms"
    }

    fn run_early(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        cx.register_system(FormSystem::default())
    }
}

/// The demo pipeline: both modules plus the always-on systems.
pub fn demo_pipeline(config: PipelineConfig) -> FolioResult<Pipeline> {
    Pipeline::builder(config)
        .module(ChromeModule)
        .module(FormsModule)
        .system(FormGuard::default())
        .system(TitleSystem::default())
        .system(TableSystem::default())
        .system(ReadOnlyNotice::default())
        .build()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|tag| (*tag).to_string()).collect()
    }

    #[test]
    fn parses_known_tags() {
        let db = parse_tag("database=users").expect("database");
        assert_eq!(
            db.downcast_ref::<DatabaseTag>().map(|tag| tag.table.as_str()),
            Some("users")
        );

        let default_db = parse_tag("db").expect("db");
        assert_eq!(
            default_db.downcast_ref::<DatabaseTag>().map(|tag| tag.table.as_str()),
            Some(DEFAULT_TABLE)
        );

        let login = parse_tag("login").expect("login");
        assert!(login.is_a(&ComponentClass::of::<FormTag>()));
    }

    #[test]
    fn rejects_unknown_or_malformed_tags() {
        assert!(matches!(parse_tag("banner"), Err(FolioError::Config(_))));
        assert!(matches!(parse_tag("title="), Err(FolioError::Config(_))));
        assert!(matches!(parse_tag("form=x"), Err(FolioError::Config(_))));
    }

    #[test]
    fn renders_writable_database_page() {
        let mut pipeline = demo_pipeline(PipelineConfig::default()).expect("pipeline");
        let request = demo_request("/users", &tags(&["database=users", "form"])).expect("request");

        let page = pipeline.run(&request).expect("run").expect("page");

        assert_eq!(
            page.body,
            "<title>folio</title><table data-source=\"users\"></table><form></form><footer>folio</footer>"
        );
        assert_eq!(page.systems, vec!["TitleSystem", "TableSystem", "FormSystem"]);
    }

    #[test]
    fn read_only_vetoes_table() {
        let mut pipeline = demo_pipeline(PipelineConfig::default()).expect("pipeline");
        let request = demo_request("/", &tags(&["database", "readonly", "title=Audit"]))
            .expect("request");

        let page = pipeline.run(&request).expect("run").expect("page");

        assert_eq!(page.systems, vec!["TitleSystem", "ReadOnlyNotice"]);
        assert!(page.body.starts_with("<title>Audit</title>"));
        assert!(page.body.contains("records is read-only"));
    }

    #[test]
    fn form_on_read_only_page_aborts() {
        let mut pipeline = demo_pipeline(PipelineConfig::default()).expect("pipeline");
        let request = demo_request("/", &tags(&["login", "readonly"])).expect("request");

        let err = pipeline.run(&request).expect_err("aborted");
        assert!(matches!(err, FolioError::Aborted { ref origin, .. } if origin == "FormGuard"));
    }

    #[test]
    fn disabled_forms_module_drops_forms() {
        let mut config = PipelineConfig::default();
        config.modules.disabled.push("forms".to_string());
        let mut pipeline = demo_pipeline(config).expect("pipeline");
        let request = demo_request("/", &tags(&["login"])).expect("request");

        let page = pipeline.run(&request).expect("run").expect("page");

        assert_eq!(page.systems, vec!["TitleSystem"]);
        assert!(!page.body.contains("<form"));
    }
}
