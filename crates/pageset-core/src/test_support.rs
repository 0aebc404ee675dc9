//! In-memory PDF builders shared by the unit tests

use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

fn label_content(label: &str) -> Vec<u8> {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
            ),
            Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    label.as_bytes().to_vec(),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    content.encode().unwrap()
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

/// Create a PDF with N pages whose content streams draw `<prefix>-Page-<n>`
pub(crate) fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let label = format!("{}-Page-{}", prefix, i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), label_content(&label)));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", letter_media_box()),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Create a PDF whose pages sit under an intermediate `Pages` node and take
/// their MediaBox and Resources from the tree root
pub(crate) fn create_inherited_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_pages_id = doc.new_object_id();
    let middle_pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let label = format!("Nested-Page-{}", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), label_content(&label)));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(middle_pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let middle = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Parent", Object::Reference(root_pages_id)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects
        .insert(middle_pages_id, Object::Dictionary(middle));

    let font = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]);
    let font_id = doc.add_object(font);
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]);

    let root = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(vec![Object::Reference(middle_pages_id)])),
        ("MediaBox", letter_media_box()),
        ("Resources", Object::Dictionary(resources)),
    ]);
    doc.objects.insert(root_pages_id, Object::Dictionary(root));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(root_pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The label drawn on each page of `bytes`, in page order
pub(crate) fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').expect("page has no text operand") + 1;
            let end = start + text[start..].find(')').expect("unterminated string");
            text[start..end].to_string()
        })
        .collect()
}

/// Labels `<prefix>-Page-1` .. `<prefix>-Page-<n>`
pub(crate) fn expected_labels(prefix: &str, pages: impl IntoIterator<Item = u32>) -> Vec<String> {
    pages
        .into_iter()
        .map(|n| format!("{}-Page-{}", prefix, n))
        .collect()
}

fn save(doc: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Add a Link annotation on page `from` whose destination is page `to`
/// (both 1-based)
pub(crate) fn with_page_link(bytes: &[u8], from: u32, to: u32) -> Vec<u8> {
    let mut doc = Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    let (from_id, to_id) = (pages[&from], pages[&to]);

    let link = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Link".to_vec())),
        (
            "Rect",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(100),
                Object::Integer(20),
            ]),
        ),
        (
            "Dest",
            Object::Array(vec![Object::Reference(to_id), Object::Name(b"Fit".to_vec())]),
        ),
    ]);
    let link_id = doc.add_object(link);
    doc.get_object_mut(from_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Annots", Object::Array(vec![Object::Reference(link_id)]));
    save(&mut doc)
}

/// Attach a document info dictionary with Title and Author
pub(crate) fn with_document_info(bytes: &[u8], title: &str, author: &str) -> Vec<u8> {
    let mut doc = Document::load_mem(bytes).unwrap();
    let info = Dictionary::from_iter(vec![
        ("Title", Object::string_literal(title)),
        ("Author", Object::string_literal(author)),
    ]);
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
    save(&mut doc)
}

/// Number of `/Type /Page` objects stored in the file, reachable or not
pub(crate) fn page_object_count(bytes: &[u8]) -> usize {
    let doc = Document::load_mem(bytes).unwrap();
    doc.objects
        .values()
        .filter(|o| o.as_dict().map(|d| d.type_is(b"Page")).unwrap_or(false))
        .count()
}

/// Decoded contents of every stream in the file, concatenated
pub(crate) fn all_stream_text(bytes: &[u8]) -> String {
    let mut doc = Document::load_mem(bytes).unwrap();
    doc.decompress();
    doc.objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .map(|s| String::from_utf8_lossy(&s.content).into_owned())
        .collect()
}

/// Title entry of the document info dictionary, if any
pub(crate) fn info_title(bytes: &[u8]) -> Option<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_object(info_id).ok()?.as_dict().ok()?;
    let title = info.get(b"Title").ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(title).into_owned())
}
