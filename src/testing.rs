//! In-memory fixture containers for tests.
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Build a ZIP archive from (name, content) pairs, in order.
pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a word-processing package whose body holds `body_xml`.
pub fn docx(body_xml: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        W_NS, body_xml
    );
    build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", DOCX_ROOT_RELS),
        ("word/document.xml", document.as_str()),
        ("word/styles.xml", "<w:styles/>"),
    ])
}

/// A paragraph with one run per text.
pub fn para(runs: &[&str]) -> String {
    let mut xml = String::from("<w:p>");
    for text in runs {
        xml.push_str(&format!("<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>", text));
    }
    xml.push_str("</w:p>");
    xml
}

/// A table whose cells each hold one single-run paragraph.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl><w:tblPr/>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str("<w:tc><w:tcPr/>");
            xml.push_str(&para(&[*cell]));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// Build a workbook from an optional shared-string table and (name, sheetData) pairs.
pub fn xlsx(shared_strings: Option<&[&str]>, sheets: &[(&str, &str)]) -> Vec<u8> {
    let mut workbook = format!(r#"<workbook xmlns="{}" xmlns:r="{}"><sheets>"#, S_NS, R_NS);
    let mut rels = String::from(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut parts: Vec<(String, String)> = Vec::new();

    for (i, (name, data)) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, n, n));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, R_NS, n
        ));
        parts.push((
            format!("xl/worksheets/sheet{}.xml", n),
            format!(r#"<worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#, S_NS, data),
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    if let Some(strings) = shared_strings {
        let mut sst = format!(
            r#"<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            S_NS,
            strings.len(),
            strings.len()
        );
        for s in strings {
            sst.push_str(&format!("<si><t>{}</t></si>", s));
        }
        sst.push_str("</sst>");
        parts.push(("xl/sharedStrings.xml".to_string(), sst));
    }

    let mut entries: Vec<(&str, &str)> = vec![
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", XLSX_ROOT_RELS),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", rels.as_str()),
    ];
    entries.extend(parts.iter().map(|(n, c)| (n.as_str(), c.as_str())));
    build_zip(&entries)
}

/// A shared-string cell.
pub fn s_cell(r: &str, index: usize) -> String {
    format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, r, index)
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const DOCX_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const XLSX_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
