//! Turns raw upstream payloads into typed per-category records.
//!
//! The upstream mixes prefixed keys (`MT_`, `AG_`, `DD_`...) with plain
//! ones depending on the endpoint, so every field resolves through a
//! fallback chain. Unknown fields are dropped by construction.

use serde_json::Value;
use tracing::warn;

use crate::records::{
    AgendaItem, Category, CategoryRecord, Decision, Document, DocumentRef, Meeting, Proposal,
};

/// Normalize one raw batch. Items without a usable id or title are skipped
/// with a warning each; the rest of the batch is unaffected.
pub fn normalize_batch(category: Category, raw_items: &[Value]) -> Vec<CategoryRecord> {
    // The documents feed is grouped by agenda item and flattens to one
    // record per document; every other category maps one item to one record.
    if category == Category::Documents {
        return normalize_documents(raw_items);
    }

    let mut records = Vec::with_capacity(raw_items.len());
    for item in raw_items {
        let record = match category {
            Category::Meetings => meeting_from(item).map(CategoryRecord::Meeting),
            Category::Agenda => agenda_from(item).map(CategoryRecord::AgendaItem),
            Category::Decisions => decision_from(item).map(CategoryRecord::Decision),
            Category::Proposals => proposal_from(item).map(CategoryRecord::Proposal),
            Category::Documents => unreachable!("documents are flattened per group"),
        };
        match record {
            Some(record) => records.push(record),
            None => warn_skipped(category, item),
        }
    }
    records
}

fn normalize_documents(raw_items: &[Value]) -> Vec<CategoryRecord> {
    let mut records = Vec::new();
    for group in raw_items {
        let agenda_item = text(group, &["AG_Item", "agenda_item"]);
        let agenda_title = text(group, &["AG_Title", "agenda_title"]);
        let Some(docs) = group.get("documents").and_then(Value::as_array) else {
            continue;
        };
        for doc in docs {
            match document_from(doc, &agenda_item, &agenda_title) {
                Some(document) => records.push(CategoryRecord::Document(document)),
                None => warn_skipped(Category::Documents, doc),
            }
        }
    }
    records
}

fn meeting_from(item: &Value) -> Option<Meeting> {
    Some(Meeting {
        id: required(item, &["id", "MT_id", "meetingId"])?,
        title: required(item, &["title", "MT_title", "meetingTitle"])?,
        date: text(item, &["date", "MT_date", "meetingDateTime"]),
        location: text(item, &["location", "MT_location", "room"]),
        documents: document_refs(item),
    })
}

fn agenda_from(item: &Value) -> Option<AgendaItem> {
    Some(AgendaItem {
        id: required(item, &["id", "AG_id", "AG_Item"])?,
        title: required(item, &["AG_Title", "title"])?,
        item_number: text(item, &["AG_Item", "itemNo", "item"]),
    })
}

fn document_from(doc: &Value, agenda_item: &str, agenda_title: &str) -> Option<Document> {
    Some(Document {
        id: required(doc, &["id", "DD_id", "DD_symbol1"])?,
        title: required(doc, &["DD_officialTitle", "DD_workingTitle", "title"])?,
        symbol: text(doc, &["DD_symbol1", "symbol"]),
        doc_type: text(doc, &["DD_documentType", "doc_type"]),
        date: text(doc, &["DD_officialDate", "date"]),
        agenda_item: agenda_item.to_string(),
        agenda_title: agenda_title.to_string(),
    })
}

fn decision_from(item: &Value) -> Option<Decision> {
    Some(Decision {
        id: required(item, &["id", "DE_id", "DE_symbol"])?,
        title: required(item, &["DE_title", "title"])?,
        number: text(item, &["DE_number", "number", "DE_symbol", "symbol"]),
        date: text(item, &["DE_date", "date"]),
    })
}

fn proposal_from(item: &Value) -> Option<Proposal> {
    Some(Proposal {
        id: required(item, &["id", "PR_id", "PR_symbol"])?,
        title: required(item, &["PR_title", "title"])?,
        symbol: text(item, &["PR_symbol", "symbol"]),
        status: text(item, &["PR_status", "status"]),
    })
}

fn document_refs(item: &Value) -> Vec<DocumentRef> {
    item.get("documents")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .filter_map(|doc| {
                    let symbol = required(doc, &["DD_symbol1", "symbol"])?;
                    Some(DocumentRef {
                        symbol,
                        title: text(doc, &["DD_officialTitle", "DD_workingTitle", "title"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// First non-empty string (or number) among the candidate keys.
fn text(item: &Value, keys: &[&str]) -> String {
    for key in keys {
        match item.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    String::new()
}

fn required(item: &Value, keys: &[&str]) -> Option<String> {
    let value = text(item, keys);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn warn_skipped(category: Category, item: &Value) {
    warn!(%category, item = %item, "skipping item without a usable id or title");
}
