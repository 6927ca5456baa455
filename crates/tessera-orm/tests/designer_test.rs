//! End-to-end designer scenarios: controller edits, persistence and
//! validation working together.

use tessera::{Document, validation::Validator};
use tessera_core::{
    geometry::{Point, Rect},
    identifier::Id,
};
use tessera_orm::{
    controller::{AddField, AddReference, AddTable, Controller, RemoveElement},
    model::{
        self,
        field::{IS_NULLABLE, IS_PRIMARY_KEY, TABLE},
        reference::{POINTS, SOURCE, TARGET, TARGET_FIELDS},
        table::{BOUNDS, SCHEMA},
    },
    validate::OrmValidator,
};

fn add_table(controller: &Controller, document: &mut Document, name: &str, x: f64, y: f64) -> Id {
    let result = controller.execute(document, AddTable::new(Point::new(x, y)).with_name(name));
    assert!(result.is_success(), "{:?}", result.message());
    result.element_id().unwrap()
}

#[test]
fn test_table_survives_round_trip() {
    let controller = Controller::default();
    let mut document = model::new_document("shop.tdm").unwrap();
    let users = add_table(&controller, &mut document, "Users", 100.0, 200.0);

    let xml = document.to_xml().unwrap();
    assert!(xml.contains("X=100"), "{xml}");
    assert!(xml.contains("Y=200"), "{xml}");

    let restored = Document::from_xml(&xml).unwrap();
    let design = restored.design().unwrap();
    let tables = model::tables(restored.tree(), design);
    assert_eq!(tables.len(), 1);
    assert_eq!(restored.tree().element(tables[0]).name(), "Users");
    assert_eq!(restored.tree().element(tables[0]).id(), users);
    assert_eq!(
        BOUNDS.get(restored.tree(), tables[0]),
        Rect::new(100.0, 200.0, 200.0, 120.0)
    );
}

#[test]
fn test_design_survives_save_and_load() {
    let controller = Controller::default();
    let mut document = model::new_document("shop.tdm").unwrap();
    let users = add_table(&controller, &mut document, "Users", 0.0, 0.0);
    let orders = add_table(&controller, &mut document, "Orders", 400.0, 0.0);
    let user_id = controller
        .execute(&mut document, AddField::new(users).with_name("Id").primary_key())
        .element_id()
        .unwrap();
    controller.execute(&mut document, AddField::new(orders).with_name("Id").primary_key());
    let reference = controller
        .execute(&mut document, AddReference::new(orders, users).with_target_fields([user_id]))
        .element_id()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.tdm");
    document.save(&path).unwrap();
    let loaded = Document::load(&path).unwrap();

    assert_eq!(loaded.to_xml().unwrap(), document.to_xml().unwrap());
    let tree = loaded.tree();
    let reference = loaded.find(reference).unwrap();
    assert_eq!(SOURCE.target(tree, reference), orders);
    assert_eq!(TARGET.target(tree, reference), users);
    assert_eq!(TARGET_FIELDS.targets(tree, reference), vec![user_id]);
    assert_eq!(
        POINTS.get(tree, reference),
        vec![Point::new(400.0, 60.0), Point::new(200.0, 60.0)]
    );

    let field = loaded.find(user_id).unwrap();
    assert!(IS_NULLABLE.is_locked(tree, field));
    assert!(OrmValidator::default().validate(&loaded).is_empty());
}

#[test]
fn test_loading_repairs_structural_artifacts() {
    model::ensure_registered();
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<Document ID="9d0c0000-0000-4000-8000-000000000001" Name="legacy.tdm">
  <OrmDesign ID="9d0c0000-0000-4000-8000-000000000002" Name="Design">
    <Table ID="9d0c0000-0000-4000-8000-000000000003" Name="Users">
      <Values>
        <Data Name="Bounds" ID="7e550000-0000-4000-8000-000000010001" Type="Rect">{X=10;Y=20;Width=200;Height=120}</Data>
      </Values>
      <Values>
        <Data Name="Schema" ID="7e550000-0000-4000-8000-000000010002" Type="String">sales</Data>
      </Values>
      <Field ID="9d0c0000-0000-4000-8000-000000000004" Name="Id">
        <Values>
          <Data Name="IsPrimaryKey" ID="7e550000-0000-4000-8000-000000020004" Type="Boolean">true</Data>
          <Data Name="IsNullable" ID="7e550000-0000-4000-8000-000000020002" Type="Boolean">true</Data>
        </Values>
      </Field>
    </Table>
  </OrmDesign>
</Document>
"#;

    let document = Document::from_xml(xml).unwrap();
    let tree = document.tree();
    let table = document
        .find(Id::parse("9d0c0000-0000-4000-8000-000000000003").unwrap())
        .unwrap();
    let field = document
        .find(Id::parse("9d0c0000-0000-4000-8000-000000000004").unwrap())
        .unwrap();

    assert_eq!(tree.values_containers(table).len(), 1);
    assert_eq!(BOUNDS.get(tree, table), Rect::new(10.0, 20.0, 200.0, 120.0));
    assert_eq!(SCHEMA.get(tree, table), "sales");

    assert!(IS_PRIMARY_KEY.get(tree, field));
    assert!(!IS_NULLABLE.get(tree, field));
    assert!(IS_NULLABLE.is_locked(tree, field));
    assert_eq!(TABLE.target(tree, field), tree.element(table).id());
}

#[test]
fn test_duplicate_table_names_yield_one_error() {
    let mut document = model::new_document("dupes").unwrap();
    let design = document.design().unwrap();
    let tree = document.tree_mut();
    for name in ["Users", "users"] {
        let table = tree.create(model::table_kind(), name);
        tree.append_child(design, table).unwrap();
    }

    let report = OrmValidator::default().validate(&document);

    let duplicates = report
        .errors()
        .filter(|issue| issue.code() == Some("T201"))
        .count();
    assert_eq!(duplicates, 1);
    assert_eq!(report.errors().count(), 1);
}

#[test]
fn test_empty_design_yields_one_warning() {
    let document = model::new_document("empty").unwrap();

    let report = OrmValidator::default().validate(&document);

    assert_eq!(report.warnings().count(), 1);
    assert!(!report.has_errors());
}

#[test]
fn test_removing_table_removes_its_references() {
    let controller = Controller::default();
    let mut document = model::new_document("cascade").unwrap();
    let users = add_table(&controller, &mut document, "Users", 0.0, 0.0);
    let orders = add_table(&controller, &mut document, "Orders", 400.0, 0.0);
    let invoices = add_table(&controller, &mut document, "Invoices", 0.0, 400.0);
    for (source, target) in [(orders, users), (users, users), (invoices, orders)] {
        assert!(controller.execute(&mut document, AddReference::new(source, target)).is_success());
    }

    let result = controller.execute(&mut document, RemoveElement::new(users));
    assert!(result.is_success());

    let tree = document.tree();
    let design = document.design().unwrap();
    let references = model::references(tree, design);
    assert_eq!(references.len(), 1);
    for reference in references {
        assert_ne!(SOURCE.target(tree, reference), users);
        assert_ne!(TARGET.target(tree, reference), users);
    }
    assert!(OrmValidator::default()
        .validate(&document)
        .errors()
        .next()
        .is_none());
}
