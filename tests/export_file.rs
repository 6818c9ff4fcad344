//! End-to-end export from a document file to a G-code file

use millpath::{export_document_file, CutSettings, Document, Element, FillMode};

#[test]
fn test_export_document_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("plate.json");
    let output = dir.path().join("plate.nc");

    let mut document = Document::new("plate").with_page(0.0, 50.0);
    document.push(Element::layer(
        "layer1",
        vec![
            Element::circle("hole", 25.0, 25.0, 5.0).with_settings(CutSettings {
                depth: 3.0,
                depth_increment: 1.5,
                fill_mode: FillMode::Hatch,
                tool_diameter: 2.0,
                ..CutSettings::default()
            }),
            Element::rectangle("outline", 0.0, 0.0, 50.0, 50.0).with_settings(CutSettings {
                depth: 6.0,
                depth_increment: 2.0,
                tab_height: 2.0,
                tab_width: Some(5.0),
                tab_start_interval: Some(40.0),
                ..CutSettings::default()
            }),
        ],
    ));
    document.save(&input).expect("save");

    export_document_file(&input, &output).expect("export");

    let text = std::fs::read_to_string(&output).expect("read output");
    assert!(text.starts_with("(Millpath G-code export)"));
    assert!(text.contains("(Name: plate)"));
    assert!(text.contains("(lift to tab depth)"));
    assert!(text.contains("(scan)"));
    assert!(text.trim_end().ends_with("M02 (end of program)"));

    // the outline is drawn last, so it is cut first
    let outline = text.find("id:outline").expect("outline exported");
    let hole = text.find("id:hole").expect("hole exported");
    assert!(outline < hole);
}

#[test]
fn test_export_missing_document_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("absent.json");
    let err = export_document_file(&input, &dir.path().join("out.nc")).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.json"));
}
