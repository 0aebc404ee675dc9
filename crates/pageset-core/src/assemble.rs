//! Page copying into a fresh output document
//!
//! Every transform is expressed as "start empty, copy these pages from these
//! sources in this order". The algorithm:
//! 1. Push down inheritable attributes onto each requested page and detach it
//!    from the source page tree
//! 2. Copy only the objects those pages reach, under fresh ids; references to
//!    anything left behind (other pages, page-tree nodes) become `null` and
//!    link destinations aimed at them are dropped
//! 3. Record the new page ids in the requested order
//! 4. On finish, hang all pages off one new `Pages` node, write the document
//!    info, compress and serialize

use std::collections::{BTreeMap, HashMap};

use crate::error::PageSetError;
use crate::handle::PdfHandle;
use crate::PRODUCER;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// What goes into the output's document info dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tagging {
    /// Fresh info naming this service as Producer/Creator
    Labelled,
    /// The first source's info entries, carried over unchanged
    Untouched,
}

pub(crate) struct Assembler {
    doc: Document,
    kids: Vec<ObjectId>,
    source_info: Option<Dictionary>,
}

impl Assembler {
    pub(crate) fn new(version: &str) -> Self {
        Self {
            doc: Document::with_version(version),
            kids: Vec::new(),
            source_info: None,
        }
    }

    /// Start an output whose header version and document info come from the
    /// first source
    pub(crate) fn for_sources(sources: &[&PdfHandle]) -> Self {
        let Some(first) = sources.first() else {
            return Self::new("1.7");
        };
        let mut out = Self::new(&first.document().version);
        out.source_info = document_info(first.document());
        out
    }

    /// Copy the pages at `indices` (zero-based, in that order) from `source`
    pub(crate) fn append(
        &mut self,
        source: &PdfHandle,
        indices: &[usize],
    ) -> Result<(), PageSetError> {
        let mut page_ids = Vec::with_capacity(indices.len());
        for &index in indices {
            let id = source.page_id(index).ok_or_else(|| {
                PageSetError::OperationError(format!(
                    "Page index {} out of bounds (document has {} pages)",
                    index,
                    source.page_count()
                ))
            })?;
            page_ids.push(id);
        }

        let source_doc = source.document();

        // Source id -> object to copy, still in source id space
        let mut copied: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut pending = Vec::new();

        for &id in &page_ids {
            if copied.contains_key(&id) {
                continue;
            }
            let mut page = page_dict(source_doc, id)?.clone();
            for (key, value) in inherited_attributes(source_doc, &page) {
                page.set(key, value);
            }
            page.remove(b"Parent");

            let page = Object::Dictionary(page);
            collect_refs(&page, &mut pending);
            copied.insert(id, page);
        }

        while let Some(id) = pending.pop() {
            if copied.contains_key(&id) {
                continue;
            }
            let Some(object) = source_doc.objects.get(&id) else {
                continue;
            };
            // Pages are only copied when selected; page-tree nodes never are
            if is_page_tree_node(object) {
                continue;
            }
            collect_refs(object, &mut pending);
            copied.insert(id, object.clone());
        }

        let id_map: HashMap<ObjectId, ObjectId> = copied
            .keys()
            .map(|&old_id| (old_id, self.doc.new_object_id()))
            .collect();

        for (old_id, object) in copied {
            self.doc
                .objects
                .insert(id_map[&old_id], remap_object_refs(object, &id_map));
        }

        self.kids.extend(page_ids.iter().map(|id| id_map[id]));
        Ok(())
    }

    /// Build the page tree and serialize
    pub(crate) fn finish(mut self, tagging: Tagging) -> Result<Vec<u8>, PageSetError> {
        let pages_id = self.doc.new_object_id();

        for &page_id in &self.kids {
            page_dict_mut(&mut self.doc, page_id)?.set("Parent", Object::Reference(pages_id));
        }

        let kids = self
            .kids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let info = match tagging {
            Tagging::Labelled => Some(Dictionary::from_iter(vec![
                ("Producer", Object::string_literal(PRODUCER)),
                ("Creator", Object::string_literal(PRODUCER)),
            ])),
            Tagging::Untouched => self.source_info.take(),
        };
        if let Some(info) = info {
            let info_id = self.doc.add_object(info);
            self.doc.trailer.set("Info", Object::Reference(info_id));
        }

        self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PageSetError::SerializationError(format!("Failed to save PDF: {}", e)))?;

        Ok(buffer)
    }
}

/// Direct entries of the document info dictionary. Indirect values are
/// skipped so the info never drags other objects along.
fn document_info(doc: &Document) -> Option<Dictionary> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };

    let mut carried = Dictionary::new();
    for (key, value) in info.as_dict().ok()?.iter() {
        match value {
            Object::Reference(_) | Object::Array(_) | Object::Dictionary(_) | Object::Stream(_) => {}
            other => carried.set(key.clone(), other.clone()),
        }
    }
    (!carried.is_empty()).then_some(carried)
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .map(|dict| dict.type_is(b"Page") || dict.type_is(b"Pages"))
        .unwrap_or(false)
}

/// Push every reference held by `object` onto `out`
fn collect_refs(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(arr) => arr.iter().for_each(|o| collect_refs(o, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| collect_refs(v, out)),
        Object::Stream(stream) => stream.dict.iter().for_each(|(_, v)| collect_refs(v, out)),
        _ => {}
    }
}

/// Recursively rewrite references through `id_map`. References to objects
/// that were not copied become `null`.
fn remap_object_refs(obj: Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match obj {
        Object::Reference(id) => match id_map.get(&id) {
            Some(&new_id) => Object::Reference(new_id),
            None => Object::Null,
        },
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, id_map))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), id_map);
            }
            drop_dangling_destination(&mut dict);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), id_map);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Remove `/Dest` or an inline GoTo `/A` whose target page was not copied
fn drop_dangling_destination(dict: &mut Dictionary) {
    if points_at_missing_page(dict.get(b"Dest").ok()) {
        dict.remove(b"Dest");
    }
    let dangling_goto = dict
        .get(b"A")
        .and_then(Object::as_dict)
        .map(|action| points_at_missing_page(action.get(b"D").ok()))
        .unwrap_or(false);
    if dangling_goto {
        dict.remove(b"A");
    }
}

/// Explicit destinations are arrays led by the target page
fn points_at_missing_page(dest: Option<&Object>) -> bool {
    matches!(
        dest.and_then(|d| d.as_array().ok()).and_then(|d| d.first()),
        Some(Object::Null)
    )
}

/// Attributes the page inherits from its ancestors and does not set itself
fn inherited_attributes(doc: &Document, page: &Dictionary) -> Vec<(&'static [u8], Object)> {
    let mut inherited = Vec::new();
    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Bounded walk; a malformed tree may contain a Parent cycle
    let mut depth = 0;
    while let Some(parent_id) = parent {
        if missing.is_empty() || depth > 64 {
            break;
        }
        let Ok(node) = doc.get_object(parent_id).and_then(Object::as_dict) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    inherited
}

fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, PageSetError> {
    doc.get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|_| PageSetError::OperationError(format!("Page {:?} is not a dictionary", page_id)))
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, PageSetError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PageSetError::OperationError(format!("Page {:?} is not a dictionary", page_id)))
}
