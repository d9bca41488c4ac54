//! E2E Scenario: default data export and load
//!
//! Export the database, ship the CSV files as a theme pattern, then load the
//! pattern back after the data changed.

use bctheme::storage::{Database, FileSystem, LocalFs};

use super::fixture::E2EFixture;

#[test]
fn test_export_then_load_restores_tables() {
    let mut fixture = E2EFixture::new("export_then_load");
    fixture.assert_success(&fixture.init(), "init");
    fixture.create_theme("BcFront", "Front");

    fixture.log_step("Seed database");
    {
        let db = Database::open(fixture.db_path()).unwrap();
        db.set_site_config("name", "Original Site").unwrap();
        db.set_site_config("email", "owner@example.com").unwrap();
        db.conn()
            .execute(
                "INSERT INTO blog_posts (id, blog_content_id, no, name, status) VALUES (1, 1, 1, 'hello', 1)",
                [],
            )
            .unwrap();
    }

    fixture.log_step("Export default data");
    let output = fixture.run(&["--robot", "export-data", "--keep-staging"]);
    fixture.assert_success(&output, "export-data");
    assert!(fixture.temp_dir.path().join("default.zip").is_file());

    let staged = fixture.root.join("tmp/csv");
    let exported =
        std::fs::read_to_string(staged.join("BaserCore/site_configs.csv")).unwrap();
    assert!(exported.contains("Original Site"));
    assert!(!exported.contains("owner@example.com"));

    fixture.log_step("Ship export as a theme pattern");
    LocalFs
        .copy_tree(&staged, &fixture.themes_root().join("BcFront/config/data/default"))
        .unwrap();

    fixture.log_step("Change data");
    {
        let db = Database::open(fixture.db_path()).unwrap();
        db.set_site_config("name", "Changed").unwrap();
        db.set_site_config("email", "new-owner@example.com").unwrap();
        db.conn().execute("DELETE FROM blog_posts", []).unwrap();
    }

    fixture.log_step("Load pattern");
    let output = fixture.run(&["--robot", "load-data", "BcFront.default"]);
    fixture.assert_success(&output, "load-data");
    let json = output.json();
    assert_eq!(json["data"]["kept_values"], 1);

    let db = Database::open(fixture.db_path()).unwrap();
    assert_eq!(db.site_config("name").unwrap().as_deref(), Some("Original Site"));
    assert_eq!(
        db.site_config("email").unwrap().as_deref(),
        Some("new-owner@example.com")
    );
    assert_eq!(db.count_rows("blog_posts").unwrap(), 1);
    assert_eq!(db.count_rows("sites").unwrap(), 1);
}

#[test]
fn test_load_unknown_pattern_fails() {
    let mut fixture = E2EFixture::new("load_unknown_pattern");
    fixture.assert_success(&fixture.init(), "init");
    fixture.create_theme("BcFront", "Front");

    fixture.log_step("Load missing pattern");
    let output = fixture.run(&["--robot", "load-data", "BcFront.missing"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "not_found");

    let output = fixture.run(&["--robot", "load-data", "no-dot"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "validation_failed");
}
