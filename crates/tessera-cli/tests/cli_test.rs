use std::{fs, path::Path};

use tempfile::{TempDir, tempdir};

use tessera::{Document, validation::Severity};
use tessera_core::geometry::Point;
use tessera_orm::{
    controller::{AddField, AddReference, AddTable, Controller},
    model,
};

use tessera_cli::{Args, CliError, Command, run};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().to_string()
    }

    fn args(&self, command: Command) -> Args {
        Args {
            command,
            config: Some(self.path("config.toml")),
            log_level: "off".to_string(),
        }
    }

    /// Saves a two-table design; `Orders` has no primary key.
    fn shop(&self) -> String {
        let controller = Controller::default();
        let mut document = model::new_document("shop.tdm").unwrap();
        let users = controller
            .execute(&mut document, AddTable::new(Point::new(0.0, 0.0)).with_name("Users"))
            .element_id()
            .unwrap();
        let orders = controller
            .execute(&mut document, AddTable::new(Point::new(400.0, 0.0)).with_name("Orders"))
            .element_id()
            .unwrap();
        controller.execute(&mut document, AddField::new(users).with_name("Id").primary_key());
        controller.execute(&mut document, AddReference::new(orders, users));

        let path = self.path("shop.tdm");
        document.save(&path).unwrap();
        path
    }
}

fn run_quiet(args: &Args) -> Result<Vec<tessera::validation::ValidationIssue>, CliError> {
    let mut out = Vec::new();
    run(args, &mut out)
}

#[test]
fn test_validate_reports_warnings() {
    let workspace = Workspace::new();
    let input = workspace.shop();

    let issues = run_quiet(&workspace.args(Command::Validate { input })).unwrap();

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity(), Severity::Warning);
    assert_eq!(issues[0].code(), Some("T300"));
    assert_eq!(issues[0].element_name(), "Orders");
}

#[test]
fn test_validate_honors_config() {
    let workspace = Workspace::new();
    let input = workspace.shop();
    fs::write(
        workspace.path("config.toml"),
        "[validation]\nwarn_on_missing_primary_key = false\n",
    )
    .unwrap();

    let issues = run_quiet(&workspace.args(Command::Validate { input })).unwrap();

    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn test_normalize_writes_canonical_form() {
    let workspace = Workspace::new();
    let input = workspace.shop();
    let output = workspace.path("normalized.tdm");

    let issues = run_quiet(&workspace.args(Command::Normalize {
        input: input.clone(),
        output: Some(output.clone()),
    }))
    .unwrap();

    assert!(issues.is_empty());
    model::ensure_registered();
    let original = Document::load(&input).unwrap();
    let normalized = fs::read_to_string(&output).unwrap();
    assert_eq!(normalized, original.to_xml().unwrap());
}

#[test]
fn test_tree_prints_hierarchy() {
    let workspace = Workspace::new();
    let input = workspace.shop();
    let mut out = Vec::new();

    run(&workspace.args(Command::Tree { input }), &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<_> = printed.lines().collect();
    assert!(lines[0].starts_with("OrmDesign Design ["), "{printed}");
    assert!(lines.iter().any(|line| line.starts_with("  Table Users [")));
    assert!(lines.iter().any(|line| line.starts_with("    Field Id [")));
    assert!(lines.iter().any(|line| line.starts_with("  Reference Reference1 [")));
}

#[test]
fn test_missing_input_is_an_error() {
    let workspace = Workspace::new();
    let input = workspace.path("absent.tdm");

    let err = run_quiet(&workspace.args(Command::Validate { input })).unwrap_err();

    assert!(matches!(err, CliError::Model(_)), "{err:?}");
}

#[test]
fn test_missing_config_is_an_error() {
    let workspace = Workspace::new();
    let input = workspace.shop();
    let mut args = workspace.args(Command::Tree { input });
    args.config = Some(Path::new("no/such/config.toml").to_string_lossy().to_string());

    let err = run_quiet(&args).unwrap_err();

    assert!(matches!(err, CliError::Config(_)), "{err:?}");
}

#[test]
fn test_tree_hides_property_values() {
    let workspace = Workspace::new();
    let input = workspace.shop();
    let mut out = Vec::new();

    run(&workspace.args(Command::Tree { input }), &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(!printed.contains("Values"), "{printed}");
    assert!(!printed.contains("Data "), "{printed}");
    assert_eq!(printed.lines().count(), 5, "{printed}");
}
