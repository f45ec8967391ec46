//! In-memory PDF documents for tests.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Build a PDF with one text line per page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    save(build_document(pages, dictionary! {}))
}

/// Build a PDF encrypted with RC4 under an empty user password.
pub fn build_encrypted_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = build_document(pages, dictionary! {});

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::string_literal(vec![0x42u8; 32]),
        "P" => -4,
        "CF" => dictionary! {
            "StdCF" => dictionary! { "CFM" => "V2" },
        },
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(b"factura-fixture!".to_vec()),
            Object::string_literal(b"factura-fixture!".to_vec()),
        ],
    );

    // RC4 is symmetric, so decrypting plaintext encrypts it
    let key = get_encryption_key(&doc, "", false).unwrap();
    for (&id, object) in doc.objects.iter_mut() {
        if id == encrypt_id || !matches!(object, Object::Stream(_)) {
            continue;
        }
        let encrypted = decrypt_object(&key, id, &*object, false).unwrap();
        if let Object::Stream(stream) = object {
            stream.set_content(encrypted);
        }
    }

    save(doc)
}

/// Build a PDF whose pages also declare a `Type0` font with no `ToUnicode`
/// map. lopdf refuses to decode such pages; pdf-extract only loads the
/// fonts a page actually selects and reads them fine.
pub fn build_pdf_with_undecodable_font(pages: &[&str]) -> Vec<u8> {
    let broken_font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "Missing-Identity",
        "Encoding" => "Identity-H",
    };
    save(build_document(pages, dictionary! { "F2" => broken_font }))
}

fn build_document(pages: &[&str], extra_fonts: Dictionary) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut fonts = dictionary! { "F1" => font_id };
    for (name, font) in extra_fonts.iter() {
        let id = doc.add_object(font.clone());
        fonts.set(name.clone(), id);
    }

    let mut kids = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => fonts.clone() },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
