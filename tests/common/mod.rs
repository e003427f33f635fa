#![allow(dead_code)]

use std::{fs, io::Write, path::{Path, PathBuf}};

use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Axis-aligned square as (min x, min y, side).
pub type Square = (f64, f64, f64);

fn clockwise(&(x0, y0, side): &Square) -> Polygon {
    let (x1, y1) = (x0 + side, y0 + side);
    Polygon::with_rings(vec![PolygonRing::Outer(vec![
        Point::new(x0, y0), Point::new(x0, y1), Point::new(x1, y1), Point::new(x1, y0), Point::new(x0, y0),
    ])])
}

/// Write a polygon shapefile with one text field, plus a `.prj` when given.
pub fn write_layer(path: &Path, field: &str, rows: &[(Square, &str)], prj: Option<&str>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let name = FieldName::try_from(field).unwrap();
    let builder = TableWriterBuilder::new().add_character_field(name, 40);
    let mut writer = Writer::from_path(path, builder).unwrap();
    for (square, value) in rows {
        let mut record = Record::default();
        record.insert(field.to_string(), FieldValue::Character(Some(value.to_string())));
        writer.write_shape_and_record(&clockwise(square), &record).unwrap();
    }
    drop(writer);
    if let Some(prj) = prj {
        fs::write(path.with_extension("prj"), prj).unwrap();
    }
}

/// Zip the `.shp`/`.shx`/`.dbf`/`.prj` files of `shp` into `zip_path`.
pub fn zip_layer(shp: &Path, zip_path: &Path) {
    let file = fs::File::create(zip_path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for ext in ["shp", "shx", "dbf", "prj"] {
        let part = shp.with_extension(ext);
        if !part.exists() { continue }
        let name = format!("capa/{}", part.file_name().unwrap().to_string_lossy());
        zip.start_file(name, zip::write::SimpleFileOptions::default()).unwrap();
        zip.write_all(&fs::read(&part).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}

/// `{root}/aviso_{n}/dia{d}/view_aviso.shp`
pub fn day_path(root: &Path, advisory: u32, day: u8) -> PathBuf {
    root.join(format!("aviso_{advisory}/dia{day}/view_aviso.shp"))
}
