//! E2E Scenario: theme lifecycle
//!
//! init, list, show, copy, apply, download and delete against one install root.

use std::fs::File;

use super::fixture::E2EFixture;

#[test]
fn test_theme_lifecycle() {
    let mut fixture = E2EFixture::new("theme_lifecycle");

    fixture.log_step("Initialize");
    let output = fixture.init();
    fixture.assert_success(&output, "init");

    fixture.log_step("Create themes");
    fixture.create_theme("BcFront", "フロントテーマ");
    fixture.create_theme("BcColumn", "カラムテーマ");
    fixture.write_file("BcFront/Plugin/BcSample/src/Plugin.php", "<?php\n");
    fixture.write_file("BcFront/config/data/default/BaserCore/pages.csv", "id,contents\r\n1,top\r\n");

    fixture.log_step("List themes");
    let output = fixture.run(&["--robot", "list"]);
    fixture.assert_success(&output, "list");
    let json = output.json();
    let themes = json["data"].as_array().unwrap();
    assert_eq!(themes.len(), 2);
    assert_eq!(themes[0]["name"], "BcColumn");
    assert_eq!(themes[1]["name"], "BcFront");
    assert_eq!(themes[1]["has_default_data"], true);
    assert_eq!(themes[1]["bundled_plugins"][0], "BcSample");

    fixture.log_step("Show theme");
    let output = fixture.run(&["--robot", "show", "BcFront"]);
    fixture.assert_success(&output, "show");
    let json = output.json();
    let info: Vec<&str> = json["data"]["info"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        info,
        vec![
            "このテーマは下記のプラグインを同梱しています。",
            "\t・BcSample",
            "",
            "このテーマは初期データを保有しています。",
            "Webサイトにテーマに合ったデータを適用するには、初期データ読込を実行してください。",
        ]
    );
    assert_eq!(
        json["data"]["patterns"]["BcFront.default"],
        "フロントテーマ ( default )"
    );

    fixture.log_step("Copy theme");
    let output = fixture.run(&["--robot", "copy", "BcFront"]);
    fixture.assert_success(&output, "copy");
    assert_eq!(output.json()["data"]["name"], "BcFrontCopy");
    let descriptor =
        std::fs::read_to_string(fixture.themes_root().join("BcFrontCopy/src/Plugin.php")).unwrap();
    assert!(descriptor.contains("namespace BcFrontCopy;"));
    assert!(!descriptor.contains("namespace BcFront;"));

    fixture.log_step("Apply copied theme");
    let output = fixture.run(&["--robot", "apply", "BcFrontCopy"]);
    fixture.assert_success(&output, "apply");
    let json = output.json();
    assert_eq!(json["data"]["site"]["theme"], "BcFrontCopy");
    assert_eq!(json["data"]["messages"].as_array().unwrap().len(), 2);

    fixture.log_step("Download theme");
    let archive = fixture.temp_dir.path().join("BcFrontCopy.zip");
    let output = fixture.run(&["--robot", "download", "BcFrontCopy"]);
    fixture.assert_success(&output, "download");
    assert!(archive.is_file());
    let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    assert!(zip.file_names().any(|n| n == "BcFrontCopy/src/Plugin.php"));

    fixture.log_step("Delete theme");
    let output = fixture.run(&["--robot", "delete", "BcFrontCopy"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "approval_required");
    let output = fixture.run(&["--robot", "delete", "BcFrontCopy", "--yes"]);
    fixture.assert_success(&output, "delete");
    assert_eq!(output.json()["data"]["sites_using"][0], 1);
    assert!(!fixture.themes_root().join("BcFrontCopy").exists());
}

#[test]
fn test_copy_collision_keeps_existing_copy() {
    let mut fixture = E2EFixture::new("copy_collision");
    fixture.assert_success(&fixture.init(), "init");
    fixture.create_theme("BcFront", "Front");

    fixture.log_step("First copy");
    fixture.assert_success(&fixture.run(&["copy", "BcFront"]), "copy");
    fixture.write_file("BcFrontCopy/marker.txt", "edited");

    fixture.log_step("Second copy");
    let output = fixture.run(&["--robot", "copy", "BcFront"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "already_exists");
    assert!(fixture.themes_root().join("BcFrontCopy/marker.txt").is_file());
}
