//! Test fixtures and PDF builders.
//!
//! Provides builders for creating multi-page text PDFs with known content
//! and metadata, following the Builder pattern for clean test setup.

use anyhow::Result;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use std::path::{Path, PathBuf};

/// Builder for creating test PDFs, one text block per page.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let bytes = TestPdfBuilder::new()
///     .with_page_size(150.0, 200.0)
///     .with_page("SECRET-0001")
///     .with_page("public page")
///     .with_author("A. Clerk")
///     .build_bytes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    author: Option<String>,
    pages: Vec<String>,
    /// Page size in points
    page_width: f32,
    page_height: f32,
}

impl TestPdfBuilder {
    /// Creates a new test PDF builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            author: None,
            pages: Vec::new(),
            page_width: 612.0,  // US Letter width
            page_height: 792.0, // US Letter height
        }
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Sets the Info dictionary's Author field.
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    /// Adds a page carrying `text`.
    pub fn with_page(mut self, text: &str) -> Self {
        self.pages.push(text.to_string());
        self
    }

    /// Sets the page size in points for every page.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Builds the PDF in memory.
    pub fn build_bytes(self) -> Result<Vec<u8>> {
        let width = Mm::from(Pt(self.page_width));
        let height = Mm::from(Pt(self.page_height));
        let texts = if self.pages.is_empty() {
            vec![self.title.clone()]
        } else {
            self.pages.clone()
        };

        let (doc, page1, layer1) = PdfDocument::new(&self.title, width, height, "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        let mut layers = vec![doc.get_page(page1).get_layer(layer1)];
        for _ in 1..texts.len() {
            let (page, layer) = doc.add_page(width, height, "Layer 1");
            layers.push(doc.get_page(page).get_layer(layer));
        }

        // Text near the top-left corner, clear of any edge.
        let x = Mm::from(Pt(10.0));
        let y = Mm::from(Pt(self.page_height - 30.0));
        for (layer, text) in layers.iter().zip(&texts) {
            layer.use_text(text.as_str(), 10.0, x, y, &font);
        }
        drop(layers);

        let bytes = doc.save_to_bytes()?;
        self.stamp_info(bytes)
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let bytes = self.build_bytes()?;
        std::fs::write(output_path, bytes)?;
        Ok(output_path.to_path_buf())
    }

    /// Writes Title, Author and Producer into the Info dictionary, and pins
    /// every page box to the exact requested size (millimetre conversion
    /// leaves rounding noise).
    fn stamp_info(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(&bytes)?;
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page_width),
            Object::Real(self.page_height),
        ];
        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        for id in page_ids {
            let page = doc.get_object_mut(id)?.as_dict_mut()?;
            page.set("MediaBox", media_box.clone());
            page.remove(b"CropBox");
            page.remove(b"TrimBox");
        }

        let mut info = Dictionary::new();
        info.set("Title", Object::string_literal(self.title.as_str()));
        info.set("Producer", Object::string_literal("fixture-producer"));
        info.set("Creator", Object::string_literal("fixture-creator"));
        if let Some(author) = &self.author {
            info.set("Author", Object::string_literal(author.as_str()));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Three 150x200 pt pages: a secret on the first, public text on the rest.
pub fn three_page_statement() -> Result<Vec<u8>> {
    TestPdfBuilder::new()
        .with_title("Quarterly Statement")
        .with_author("J. Doe")
        .with_page_size(150.0, 200.0)
        .with_page("SECRET-ACCOUNT-0042")
        .with_page("PUBLIC-PAGE-TWO")
        .with_page("PUBLIC-PAGE-THREE")
        .build_bytes()
}

/// Two pages under a /Pages node that supplies MediaBox `[0 0 200 300]` and
/// CropBox `[10 20 110 220]`.
///
/// The first page inherits both boxes and shows 100x200 pt. The second has
/// its own 100x150 pt boxes and /Rotate 90, so it shows 150x100 pt.
pub fn boxed_pages_pdf() -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let first = add_text_page(&mut doc, pages_id, "CROPPED-PAGE-SECRET", Dictionary::new());
    let second = add_text_page(
        &mut doc,
        pages_id,
        "ROTATED-PAGE-SECRET",
        dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 150.into()],
            "CropBox" => vec![0.into(), 0.into(), 100.into(), 150.into()],
            "Rotate" => 90,
        },
    );

    let pages = dictionary! {
        "MediaBox" => vec![0.into(), 0.into(), 200.into(), 300.into()],
        "CropBox" => vec![10.into(), 20.into(), 110.into(), 220.into()],
    };
    finish_document(doc, pages_id, vec![first, second], pages, Dictionary::new())
}

/// Two 150x200 pt pages sharing the text field `acct`, one widget per page.
///
/// The widget on the first page has an appearance stream showing
/// `SECRET-WIDGET-VALUE`; the one on the second shows `PUBLIC-WIDGET-VALUE`.
/// The AcroForm is a direct dictionary in the catalog.
pub fn shared_field_pdf() -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let field_id = doc.new_object_id();
    let first = add_text_page(&mut doc, pages_id, "FORM-PAGE-ONE", Dictionary::new());
    let second = add_text_page(&mut doc, pages_id, "FORM-PAGE-TWO", Dictionary::new());

    let mut widgets = Vec::new();
    for (page_id, shown) in [(first, "SECRET-WIDGET-VALUE"), (second, "PUBLIC-WIDGET-VALUE")] {
        let appearance = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 80.into(), 20.into()],
            },
            format!("BT /F1 10 Tf 2 5 Td ({}) Tj ET", shown).into_bytes(),
        ));
        let widget = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => vec![10.into(), 10.into(), 90.into(), 30.into()],
            "Parent" => field_id,
            "P" => page_id,
            "AP" => dictionary! { "N" => appearance },
        });
        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Annots", vec![Object::from(widget)]);
        widgets.push(Object::from(widget));
    }

    doc.objects.insert(
        field_id,
        Object::Dictionary(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("acct"),
            "Kids" => widgets,
        }),
    );

    let pages = dictionary! {
        "MediaBox" => vec![0.into(), 0.into(), 150.into(), 200.into()],
    };
    let catalog = dictionary! {
        "AcroForm" => dictionary! { "Fields" => vec![Object::from(field_id)] },
    };
    finish_document(doc, pages_id, vec![first, second], pages, catalog)
}

/// Adds a page showing `text` in Helvetica, with `page` as its starting
/// dictionary.
fn add_text_page(doc: &mut Document, pages_id: ObjectId, text: &str, mut page: Dictionary) -> ObjectId {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 10 Tf 20 40 Td ({}) Tj ET", text);
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page.set("Type", "Page");
    page.set("Parent", pages_id);
    page.set("Contents", content_id);
    page.set("Resources", dictionary! { "Font" => dictionary! { "F1" => font_id } });
    doc.add_object(page)
}

/// Installs the /Pages node and the catalog, then serializes.
fn finish_document(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    mut pages: Dictionary,
    mut catalog: Dictionary,
) -> Result<Vec<u8>> {
    pages.set("Type", "Pages");
    pages.set("Count", kids.len() as i64);
    pages.set("Kids", kids.into_iter().map(Object::from).collect::<Vec<_>>());
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    catalog.set("Type", "Catalog");
    catalog.set("Pages", pages_id);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
