mod save;

pub use save::{DirectoryTarget, SaveTarget};

use rust_xlsxwriter::{Image, Workbook};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::batch::CodeArtifact;
use crate::common::{ExportError, ExportResult};

pub const HEADER: [&str; 3] = ["ID", "Code", "Image"];

// Layout
//------------------------------------------------------------------------------

/// Sheet geometry. Column widths are in Excel character units, the row height
/// in points and the embedded image size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLayout {
    pub file_name: String,
    pub sheet_name: String,
    pub id_col_width: f64,
    pub code_col_width: f64,
    pub image_col_width: f64,
    pub row_height: f64,
    pub image_width_px: f64,
    pub image_height_px: f64,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            file_name: "generated_codes_with_images.xlsx".to_string(),
            sheet_name: "Codes".to_string(),
            id_col_width: 15.0,
            code_col_width: 30.0,
            image_col_width: 20.0,
            row_height: 60.0,
            image_width_px: 150.0,
            image_height_px: 60.0,
        }
    }
}

// Table
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub id: u32,
    pub code: String,
    pub image: Vec<u8>,
}

/// Rows of the export in artifact order, image payloads already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTable {
    rows: Vec<ExportRow>,
}

impl ExportTable {
    /// Decodes every artifact's image. The first malformed payload aborts the
    /// whole table; artifacts themselves are never modified.
    pub fn from_artifacts(artifacts: &[CodeArtifact]) -> ExportResult<Self> {
        let rows = artifacts
            .iter()
            .map(|a| {
                let image = a.image().to_bytes().map_err(|source| ExportError::MalformedImage {
                    sequence_id: a.sequence_id(),
                    source,
                })?;
                Ok(ExportRow {
                    id: a.sequence_id(),
                    code: a.code_text().to_string(),
                    image: image.into_owned(),
                })
            })
            .collect::<ExportResult<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    /// Sheet rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn to_xlsx(&self, layout: &ExportLayout) -> ExportResult<Vec<u8>> {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name(&layout.sheet_name)?;

        for (col, title) in HEADER.iter().enumerate() {
            ws.write_string(0, col as u16, *title)?;
        }
        ws.set_column_width(0, layout.id_col_width)?;
        ws.set_column_width(1, layout.code_col_width)?;
        ws.set_column_width(2, layout.image_col_width)?;

        for (i, row) in self.rows.iter().enumerate() {
            let r = i as u32 + 1;
            ws.write_number(r, 0, row.id)?;
            ws.write_string(r, 1, &row.code)?;
            ws.set_row_height(r, layout.row_height)?;

            let img = Image::new_from_buffer(&row.image)?.set_scale_to_size(
                layout.image_width_px,
                layout.image_height_px,
                false,
            );
            ws.insert_image(r, 2, &img)?;
        }

        Ok(wb.save_to_buffer()?)
    }
}

// Document
//------------------------------------------------------------------------------

/// Serialized export together with the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportDocument {
    pub fn save_to<T: SaveTarget + ?Sized>(&self, target: &mut T) -> ExportResult<()> {
        target.save(self)
    }
}

pub fn export_to_table(
    artifacts: &[CodeArtifact],
    layout: &ExportLayout,
) -> ExportResult<ExportDocument> {
    let table = ExportTable::from_artifacts(artifacts)?;
    debug!(rows = table.row_count(), "Export table assembled");

    let bytes = table.to_xlsx(layout)?;
    info!(rows = artifacts.len(), size = bytes.len(), file = %layout.file_name, "Export ready");
    Ok(ExportDocument { file_name: layout.file_name.clone(), bytes })
}

#[cfg(test)]
mod export_tests {
    use std::io::{Cursor, Read};

    use super::{export_to_table, ExportLayout, ExportTable};
    use crate::batch::CodeArtifact;
    use crate::common::{ExportError, Format, PayloadError};
    use crate::encoder::{CodeEncoder, Encoder, ImagePayload, RenderOptions};

    fn artifacts(n: u32, data_uri: bool) -> Vec<CodeArtifact> {
        let enc = CodeEncoder::new(RenderOptions { data_uri, ..Default::default() });
        (1..=n)
            .map(|id| {
                let code = format!("E{id:05}");
                let img = enc.encode(&code, Format::Matrix).unwrap();
                CodeArtifact::new(id, code, img)
            })
            .collect()
    }

    #[test]
    fn test_table_rows() {
        let arts = artifacts(4, true);
        let table = ExportTable::from_artifacts(&arts).unwrap();
        assert_eq!(table.row_count(), 5);
        for (row, art) in table.rows().iter().zip(&arts) {
            assert_eq!(row.id, art.sequence_id());
            assert_eq!(row.code, art.code_text());
            assert_eq!(row.image, *art.image().to_bytes().unwrap());
        }
    }

    #[test]
    fn test_export_xlsx() {
        let doc = export_to_table(&artifacts(3, false), &ExportLayout::default()).unwrap();
        assert_eq!(doc.file_name, "generated_codes_with_images.xlsx");
        assert!(doc.bytes.starts_with(b"PK"));
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_export_sheet_contents() {
        let arts = artifacts(3, false);
        let doc = export_to_table(&arts, &ExportLayout::default()).unwrap();

        let workbook = read_part(&doc.bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="Codes""#));

        let sheet = read_part(&doc.bytes, "xl/worksheets/sheet1.xml");
        // Header plus one row per artifact
        assert_eq!(sheet.matches("<row ").count(), arts.len() + 1);
        for (col, width) in [(1, 15), (2, 30), (3, 20)] {
            assert!(sheet.contains(&format!(r#"<col min="{col}" max="{col}" width="{width}."#)));
        }
        for (i, art) in arts.iter().enumerate() {
            let r = i + 2;
            assert!(sheet.contains(&format!(r#"<c r="A{r}"><v>{}</v></c>"#, art.sequence_id())));
            assert!(sheet.contains(&format!(r#"<row r="{r}""#)));
        }
        assert_eq!(sheet.matches(r#"ht="60""#).count(), arts.len());

        let strings = read_part(&doc.bytes, "xl/sharedStrings.xml");
        for text in ["ID", "Code", "Image"].into_iter().chain(arts.iter().map(|a| a.code_text())) {
            assert!(strings.contains(&format!("<t>{text}</t>")), "missing {text}");
        }

        let zip = zip::ZipArchive::new(Cursor::new(&doc.bytes)).unwrap();
        let media = zip.file_names().filter(|n| n.starts_with("xl/media/")).count();
        assert_eq!(media, arts.len());
    }

    #[test]
    fn test_export_empty() {
        let doc = export_to_table(&[], &ExportLayout::default()).unwrap();
        assert!(doc.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_malformed_payload_aborts() {
        let mut arts = artifacts(3, true);
        arts[1] = CodeArtifact::new(2, "E00002".into(), ImagePayload::DataUri("iVBORw0K".into()));

        let err = export_to_table(&arts, &ExportLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MalformedImage { sequence_id: 2, source: PayloadError::MissingPrefix }
        ));
        // Artifacts are untouched by a failed export
        assert_eq!(arts.len(), 3);
    }
}
