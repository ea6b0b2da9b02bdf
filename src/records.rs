use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The five content types tracked for a General Assembly session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meetings,
    Agenda,
    Documents,
    Decisions,
    Proposals,
}

impl Category {
    pub fn title(&self) -> &'static str {
        match self {
            Category::Meetings => "Meetings",
            Category::Agenda => "Agenda",
            Category::Documents => "Documents",
            Category::Decisions => "Decisions",
            Category::Proposals => "Proposals",
        }
    }
}

/// A document attached to a meeting record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub symbol: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub item_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub agenda_item: String,
    #[serde(default)]
    pub agenda_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub status: String,
}

/// One normalized record, tagged with its category so a stored file can be
/// checked against the category it claims to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryRecord {
    Meeting(Meeting),
    AgendaItem(AgendaItem),
    Document(Document),
    Decision(Decision),
    Proposal(Proposal),
}

impl CategoryRecord {
    pub fn category(&self) -> Category {
        match self {
            CategoryRecord::Meeting(_) => Category::Meetings,
            CategoryRecord::AgendaItem(_) => Category::Agenda,
            CategoryRecord::Document(_) => Category::Documents,
            CategoryRecord::Decision(_) => Category::Decisions,
            CategoryRecord::Proposal(_) => Category::Proposals,
        }
    }

    pub fn as_meeting(&self) -> Option<&Meeting> {
        match self {
            CategoryRecord::Meeting(meeting) => Some(meeting),
            _ => None,
        }
    }

    pub fn as_agenda_item(&self) -> Option<&AgendaItem> {
        match self {
            CategoryRecord::AgendaItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            CategoryRecord::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_decision(&self) -> Option<&Decision> {
        match self {
            CategoryRecord::Decision(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn as_proposal(&self) -> Option<&Proposal> {
        match self {
            CategoryRecord::Proposal(proposal) => Some(proposal),
            _ => None,
        }
    }
}
