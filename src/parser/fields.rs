use scraper::{ElementRef, Html, Selector};

use super::layout::{CompiledLayout, InfoField};
use crate::record::JobRecord;

/// Non-blank text nodes that are direct children of `el`, trimmed.
fn own_texts(el: ElementRef<'_>) -> impl Iterator<Item = String> + '_ {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Own texts of every match, in document order.
fn all_texts(doc: &Html, selector: &Selector) -> Vec<String> {
    doc.select(selector).flat_map(own_texts).collect()
}

/// Every direct text node of `el`, trimmed. A blank node is kept as `""`
/// unless it only pads element children, so positions match the page.
fn positional_texts(el: ElementRef<'_>) -> Vec<String> {
    let has_elements = el.children().any(|node| node.value().is_element());
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !(has_elements && text.is_empty()))
        .map(str::to_string)
        .collect()
}

pub fn title(doc: &Html, layout: &CompiledLayout) -> Option<String> {
    all_texts(doc, &layout.title).into_iter().next()
}

/// One entry per matched element. An element without text yields `""`
/// so the entry count follows the item count.
pub fn list_items(doc: &Html, selector: &Selector) -> Vec<String> {
    doc.select(selector)
        .map(|el| own_texts(el).next().unwrap_or_default())
        .collect()
}

pub fn extract(doc: &Html, layout: &CompiledLayout) -> JobRecord {
    let info: Vec<String> = doc.select(&layout.info).flat_map(positional_texts).collect();
    let mut record = JobRecord {
        title: title(doc, layout),
        tasks: list_items(doc, &layout.tasks),
        requirements: list_items(doc, &layout.requirements),
        ..Default::default()
    };

    for mapping in &layout.info_fields {
        let value = info.get(mapping.index).cloned();
        let slot = match mapping.field {
            InfoField::Code => &mut record.code,
            InfoField::EntryType => &mut record.entry_type,
            InfoField::Location => &mut record.location,
            InfoField::Company => &mut record.company,
        };
        *slot = value;
    }

    record
}
