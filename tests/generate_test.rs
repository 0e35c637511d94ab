//! End-to-end generation tests against an in-memory diploma template.

use laurea::compose::{ComposeConfig, DiplomaGenerator, FieldValues};
use laurea::opc::Part;
use laurea::opc::packuri::PackURI;
use laurea::pptx::Package;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Minimal PNG signature; the composer only sniffs magic numbers.
const STAR_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

const STATIC_SHAPE: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="6" name="Static"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="5486400"/><a:ext cx="2286000" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="es-ES"/><a:t>Escuela de Danza</a:t></a:r></a:p></p:txBody></p:sp>"#;

fn slide1_xml() -> String {
    let mut shapes = String::new();

    // [Nombre]
    shapes.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Name"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="1143000" y="914400"/><a:ext cx="6858000" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="es-ES"/><a:t>[Nombre]</a:t></a:r></a:p></p:txBody></p:sp>"#,
    );
    // [ESTRELLAS]
    shapes.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Stars"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="2743200" y="3657600"/><a:ext cx="3657600" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="es-ES"/><a:t>[ESTRELLAS]</a:t></a:r></a:p></p:txBody></p:sp>"#,
    );
    // [Mes]
    shapes.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Month"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="1143000" y="4572000"/><a:ext cx="2286000" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="es-ES"/><a:t>[Mes]</a:t></a:r></a:p></p:txBody></p:sp>"#,
    );
    // [Fecha]
    shapes.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Date"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="5715000" y="4572000"/><a:ext cx="2286000" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="es-ES"/><a:t>[Fecha]</a:t></a:r></a:p></p:txBody></p:sp>"#,
    );
    shapes.push_str(STATIC_SHAPE);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#,
    )
}

/// Build the template deck the way the deployment ships it.
fn template_pptx() -> Vec<u8> {
    let mut zip_data = Vec::new();
    {
        let cursor = Cursor::new(&mut zip_data);
        let mut writer = ZipWriter::new(cursor);
        let options = SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#,
            )
            .unwrap();

        writer.start_file("_rels/.rels", options).unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
            )
            .unwrap();

        writer.start_file("ppt/presentation.xml", options).unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
            )
            .unwrap();

        writer
            .start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#,
            )
            .unwrap();

        writer.start_file("ppt/slides/slide1.xml", options).unwrap();
        writer.write_all(slide1_xml().as_bytes()).unwrap();

        writer.finish().unwrap();
    }
    zip_data
}

fn generator() -> DiplomaGenerator {
    DiplomaGenerator::new(ComposeConfig::diploma("t.pptx".into(), "star.png".into()))
}

fn output_slide_xml(deck: &[u8]) -> String {
    let pkg = Package::from_reader(Cursor::new(deck.to_vec())).unwrap();
    let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
    let part = pkg.opc_package().get_part(&partname).unwrap();
    String::from_utf8(part.blob().to_vec()).unwrap()
}

#[test]
fn round_trip_scenario() {
    let values: FieldValues = [
        ("name", "Ana Pérez"),
        ("rating_count", "3"),
        ("month", "Junio"),
        ("date", "2024-06-01"),
    ]
    .into_iter()
    .collect();

    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &values)
        .unwrap();
    assert_eq!(diploma.filename, "diploma_Ana Pérez.pptx");

    let slide = output_slide_xml(&diploma.bytes);

    // Text substitutions, placeholders gone
    assert!(slide.contains("<a:t>Ana Pérez</a:t>"));
    assert!(slide.contains("<a:t>Junio</a:t>"));
    assert!(slide.contains("<a:t>2024-06-01</a:t>"));
    assert!(!slide.contains("[Nombre]"));
    assert!(!slide.contains("[Mes]"));
    assert!(!slide.contains("[Fecha]"));
    assert!(!slide.contains("[ESTRELLAS]"));

    // Name style applied: 40pt, configured typeface, centered paragraph
    assert!(slide.contains(r#"sz="4000""#));
    assert!(slide.contains(r#"<a:latin typeface="TeXGyreChorus"/>"#));
    assert!(slide.contains(r#"<a:pPr algn="ctr"/>"#));

    // Three icons centered in the rating shape's original bounds:
    // w = h = 274320, gap = 182880, shape x=2743200 width=3657600
    // total = 3*274320 + 2*182880 = 1188720
    // start = 2743200 + (3657600 - 1188720)/2 = 3977640, stride = 457200
    assert_eq!(slide.matches("<p:pic>").count(), 3);
    assert!(slide.contains(r#"<a:off x="3977640" y="3657600"/>"#));
    assert!(slide.contains(r#"<a:off x="4434840" y="3657600"/>"#));
    assert!(slide.contains(r#"<a:off x="4892040" y="3657600"/>"#));
    assert!(slide.contains(r#"<a:ext cx="274320" cy="274320"/>"#));

    // The icon media part exists with the right content type and is related
    // from the slide
    let pkg = Package::from_reader(Cursor::new(diploma.bytes.clone())).unwrap();
    let media = PackURI::new("/ppt/media/image1.png").unwrap();
    let media_part = pkg.opc_package().get_part(&media).unwrap();
    assert_eq!(media_part.content_type(), "image/png");

    let slide_part = pkg
        .opc_package()
        .get_part(&PackURI::new("/ppt/slides/slide1.xml").unwrap())
        .unwrap();
    let image_rel = slide_part
        .rels()
        .iter()
        .find(|rel| rel.target_ref() == "../media/image1.png")
        .expect("slide must relate to the icon media part");
    assert!(slide.contains(&format!(r#"r:embed="{}""#, image_rel.r_id())));
}

#[test]
fn untouched_shapes_stay_byte_identical() {
    let values: FieldValues = [("name", "Ana"), ("rating_count", "1")].into_iter().collect();

    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &values)
        .unwrap();
    let slide = output_slide_xml(&diploma.bytes);

    // The static shape's original serialization survives unchanged
    assert!(slide.contains(STATIC_SHAPE));
}

#[test]
fn single_icon_is_centered() {
    let values: FieldValues = [("rating_count", "1")].into_iter().collect();

    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &values)
        .unwrap();
    let slide = output_slide_xml(&diploma.bytes);

    // start = 2743200 + (3657600 - 274320)/2 = 4434840
    assert_eq!(slide.matches("<p:pic>").count(), 1);
    assert!(slide.contains(r#"<a:off x="4434840" y="3657600"/>"#));
}

#[test]
fn zero_count_leaves_region_blank() {
    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &FieldValues::new())
        .unwrap();
    let slide = output_slide_xml(&diploma.bytes);

    assert!(!slide.contains("[ESTRELLAS]"));
    assert!(!slide.contains("<p:pic>"));

    // No icon media part is added when nothing is inserted
    let pkg = Package::from_reader(Cursor::new(diploma.bytes)).unwrap();
    let media = PackURI::new("/ppt/media/image1.png").unwrap();
    assert!(pkg.opc_package().get_part(&media).is_err());
}

#[test]
fn non_numeric_rating_count_degrades_to_zero() {
    let values: FieldValues = [("rating_count", "abc")].into_iter().collect();

    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &values)
        .unwrap();
    let slide = output_slide_xml(&diploma.bytes);

    assert!(!slide.contains("<p:pic>"));
    assert!(!slide.contains("[ESTRELLAS]"));
}

#[test]
fn omitted_fields_substitute_defaults() {
    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &FieldValues::new())
        .unwrap();
    let slide = output_slide_xml(&diploma.bytes);

    assert!(slide.contains("<a:t>Nombre</a:t>"));
    assert!(slide.contains("<a:t>Mes</a:t>"));
    assert!(slide.contains("<a:t>Fecha</a:t>"));
}

#[test]
fn generated_deck_reopens_as_presentation() {
    let values: FieldValues = [("name", "Ana"), ("rating_count", "5")].into_iter().collect();

    let diploma = generator()
        .compose(&template_pptx(), STAR_PNG, &values)
        .unwrap();

    let pkg = Package::from_reader(Cursor::new(diploma.bytes)).unwrap();
    let pres = pkg.presentation().unwrap();
    assert_eq!(pres.slide_count().unwrap(), 1);
    assert_eq!(
        pres.slide_partnames().unwrap()[0].as_str(),
        "/ppt/slides/slide1.xml"
    );
}
