//! End-to-end tests: job file in, filled package out.

use docfill_core::{generate, Document, DocumentStore, Job, PartKind};
use docfill_docx::DocxStore;
use docfill_pptx::PptxStore;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;
const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

fn write_package(path: &Path, entries: &[(&str, String)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

fn para(text: &str) -> String {
    format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
}

fn cell(text: &str) -> String {
    format!("<w:tc><w:tcPr/>{}</w:tc>", para(text))
}

/// A report template: split title, header, a table and a repeatable region.
fn docx_template(dir: &Path) -> PathBuf {
    let body = [
        concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Informe {{Cli</w:t></w:r>"#,
            r#"<w:proofErr w:type="spellStart"/>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>ent}}</w:t></w:r>"#,
            r#"<w:proofErr w:type="spellEnd"/></w:p>"#
        )
        .to_string(),
        format!("<w:tbl><w:tblPr/><w:tr>{}{}</w:tr></w:tbl>", cell("Mes"), cell("{{month}}")),
        para("---peticion---"),
        para("{{ID}}: {{Title}}"),
        para("Estado: {{Status}}"),
        para("---peticion---"),
        para("Fin"),
        r#"<w:sectPr><w:headerReference w:type="default" r:id="rId9"/></w:sectPr>"#.to_string(),
    ]
    .concat();

    let path = dir.join("Plantilla.docx");
    write_package(
        &path,
        &[
            ("[Content_Types].xml", "<Types/>".to_string()),
            ("word/document.xml", format!("<w:document {}><w:body>{}</w:body></w:document>", W_NS, body)),
            ("word/header1.xml", format!("<w:hdr {}>{}</w:hdr>", W_NS, para("Cliente: {{Client}}"))),
            ("word/styles.xml", "<w:styles/>".to_string()),
            ("word/media/image1.png", "\u{1}PNG-bytes".to_string()),
        ],
    );
    path
}

fn write_job(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("job.json");
    std::fs::write(&path, json).unwrap();
    path
}

const DOCX_JOB: &str = r#"{
    "template": "Plantilla.docx",
    "output": "out/Informe {{Client}} {{month}}.docx",
    "globals": { "{{Client}}": "Acme", "{{month}}": "noviembre" },
    "blocks": {
        "peticion": [
            { "{{ID}}": "1", "{{Title}}": "Alta", "{{Status}}": "Abierta" },
            { "{{ID}}": "2", "{{Title}}": "Baja", "{{Status}}": "Cerrada" }
        ],
        "ausente": []
    }
}"#;

fn texts(document: &Document, kind: PartKind) -> Vec<String> {
    let mut texts = Vec::new();
    for part in document.parts.iter().filter(|p| p.kind == kind) {
        for container in part.containers() {
            container.for_each_block(&mut |b| texts.push(b.text()));
        }
    }
    texts
}

#[test]
fn test_docx_job_end_to_end() {
    let dir = TempDir::new().unwrap();
    docx_template(dir.path());
    let job = Job::from_path(&write_job(dir.path(), DOCX_JOB)).unwrap();

    let report = generate(&DocxStore::new(), &job).unwrap();

    assert_eq!(report.output, dir.path().join("out/Informe Acme noviembre.docx"));
    assert!(report.output.exists());
    assert_eq!(report.skipped, vec!["ausente".to_string()]);
    assert!(report.is_degraded());
    assert_eq!(report.expanded.len(), 1);
    assert_eq!(report.expanded[0].expansions[0].copies, 2);

    let document = DocxStore::new().load(&report.output).unwrap();
    assert_eq!(
        texts(&document, PartKind::Body),
        vec![
            "Informe Acme",
            "Mes",
            "noviembre",
            "1: Alta",
            "Estado: Abierta",
            "2: Baja",
            "Estado: Cerrada",
            "Fin",
        ]
    );
    assert_eq!(texts(&document, PartKind::Header), vec!["Cliente: Acme"]);

    let title = document.body().unwrap().blocks().next().unwrap();
    assert_eq!(title.runs().count(), 1);
    assert!(title.runs().all(|r| r.style.bold));
    assert_eq!(
        title.properties.as_deref(),
        Some(r#"<w:pPr><w:pStyle w:val="Title"/></w:pPr>"#)
    );
}

#[test]
fn test_docx_untouched_entries_survive() {
    let dir = TempDir::new().unwrap();
    let template = docx_template(dir.path());
    let job = Job::from_path(&write_job(dir.path(), DOCX_JOB)).unwrap();
    let report = generate(&DocxStore::new(), &job).unwrap();

    for name in ["[Content_Types].xml", "word/styles.xml", "word/media/image1.png"] {
        assert_eq!(read_entry(&report.output, name), read_entry(&template, name));
    }

    let xml = String::from_utf8(read_entry(&report.output, "word/document.xml")).unwrap();
    assert!(xml.starts_with(&format!("<w:document {}><w:body>", W_NS)));
    assert!(xml.contains(r#"<w:sectPr><w:headerReference w:type="default" r:id="rId9"/></w:sectPr>"#));
    assert!(xml.contains("<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/>"));
    assert!(!xml.contains("proofErr"));
    assert!(!xml.contains("---peticion---"));
}

#[test]
fn test_docx_region_with_no_records_is_removed() {
    let dir = TempDir::new().unwrap();
    docx_template(dir.path());
    let job = Job::from_path(&write_job(
        dir.path(),
        r#"{ "template": "Plantilla.docx", "output": "empty.docx", "blocks": { "peticion": [] } }"#,
    ))
    .unwrap();

    let report = generate(&DocxStore::new(), &job).unwrap();
    let document = DocxStore::new().load(&report.output).unwrap();
    assert_eq!(
        texts(&document, PartKind::Body),
        vec!["Informe {{Client}}", "Mes", "{{month}}", "Fin"]
    );
}

fn pptx_template(dir: &Path) -> PathBuf {
    let shape = |body: String| {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Body"/></p:nvSpPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            body
        )
    };
    let p = |text: &str| format!(r#"<a:p><a:r><a:rPr lang="es-ES"/><a:t>{}</a:t></a:r></a:p>"#, text);
    let region = [p("---"), p("{{Item}}"), p("---")].concat();
    let slide = format!(
        "<p:sld><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:sld>",
        shape(p("{{Title}}")),
        [shape(region.clone()), shape(region)].concat()
    );

    let path = dir.join("deck.pptx");
    write_package(
        &path,
        &[
            ("[Content_Types].xml", "<Types/>".to_string()),
            (
                "ppt/presentation.xml",
                r#"<p:presentation><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#.to_string(),
            ),
            (
                "ppt/_rels/presentation.xml.rels",
                format!(
                    r#"<Relationships><Relationship Id="rId2" Type="{}" Target="slides/slide1.xml"/></Relationships>"#,
                    SLIDE_REL
                ),
            ),
            ("ppt/slides/slide1.xml", slide),
        ],
    );
    path
}

#[test]
fn test_pptx_job_expands_every_shape() {
    let dir = TempDir::new().unwrap();
    pptx_template(dir.path());
    let job = Job::from_path(&write_job(
        dir.path(),
        r#"{
            "template": "deck.pptx",
            "output": "{{Title}}.pptx",
            "globals": { "{{Title}}": "Resumen" },
            "blocks": { "": [ { "{{Item}}": "A" }, { "{{Item}}": "B" }, { "{{Item}}": "C" } ] }
        }"#,
    ))
    .unwrap();

    let report = generate(&PptxStore::new(), &job).unwrap();
    assert_eq!(report.output, dir.path().join("Resumen.pptx"));
    assert_eq!(report.expanded[0].expansions.len(), 2);

    let document = PptxStore::new().load(&report.output).unwrap();
    assert_eq!(
        texts(&document, PartKind::Slide),
        vec!["Resumen", "A", "B", "C", "A", "B", "C"]
    );
}

#[test]
fn test_format_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    pptx_template(dir.path());
    let job = Job::new(dir.path().join("deck.pptx"), dir.path().join("x.docx").to_string_lossy());
    assert!(generate(&DocxStore::new(), &job).is_err());
    assert!(!dir.path().join("x.docx").exists());
}

#[test]
fn test_cli_fill_reports_skipped_blocks() {
    let dir = TempDir::new().unwrap();
    docx_template(dir.path());
    let job = write_job(dir.path(), DOCX_JOB);

    let output = Command::new(env!("CARGO_BIN_EXE_docfill"))
        .arg("fill")
        .arg(&job)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Informe Acme noviembre.docx"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ausente"));
    assert!(dir.path().join("out/Informe Acme noviembre.docx").exists());
}

#[test]
fn test_cli_fill_output_override() {
    let dir = TempDir::new().unwrap();
    docx_template(dir.path());
    let job = write_job(dir.path(), DOCX_JOB);
    let target = dir.path().join("elsewhere/{{month}}.docx");

    let output = Command::new(env!("CARGO_BIN_EXE_docfill"))
        .arg("fill")
        .arg(&job)
        .arg("--output")
        .arg(&target)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(dir.path().join("elsewhere/noviembre.docx").exists());
}

#[test]
fn test_cli_missing_template_fails() {
    let dir = TempDir::new().unwrap();
    let job = write_job(dir.path(), r#"{ "template": "nope.docx", "output": "o.docx" }"#);

    let output = Command::new(env!("CARGO_BIN_EXE_docfill"))
        .arg("fill")
        .arg(&job)
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_cli_inspect_lists_markers_and_placeholders() {
    let dir = TempDir::new().unwrap();
    let template = docx_template(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_docfill"))
        .arg("inspect")
        .arg(&template)
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let outline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let body = &outline["parts"][0];
    assert_eq!(body["kind"], "body");
    assert_eq!(body["markers"], serde_json::json!(["peticion", "peticion"]));
    assert_eq!(body["blocks"][0]["text"], "Informe {{Client}}");
    assert_eq!(outline["parts"][1]["kind"], "header");
}
