//! Characteristics container lookup
//!
//! Listing pages come in two layouts: a classed container holding the labelled
//! entries, or a "Caractéristiques" heading followed by a plain list. Each layout
//! is a [`ContainerLookup`]; [`CharacteristicsLocator`] tries them in order.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::ExtractionSelectors;
use super::{compile_selector, compile_selectors, ParsingResult};

/// One strategy for finding the characteristics container
pub trait ContainerLookup: Send + Sync {
    /// Strategy name, for diagnostics
    fn name(&self) -> &'static str;

    /// Locate the container element, if this layout is present
    fn locate<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>>;
}

/// Container marked by a class (`div.product-features ul.list-inline`)
pub struct ClassedContainer {
    selectors: Vec<Selector>,
}

impl ClassedContainer {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }
}

impl ContainerLookup for ClassedContainer {
    fn name(&self) -> &'static str {
        "classed-container"
    }

    fn locate<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        super::select_first(html, &self.selectors)
    }
}

/// Heading whose text names the section, followed by the next list in document order
pub struct HeadingFollowedByList {
    headings: Selector,
    keyword: String,
    list: Selector,
}

impl HeadingFollowedByList {
    pub fn new(headings: Selector, keyword: &str, list: Selector) -> Self {
        Self {
            headings,
            keyword: keyword.to_lowercase(),
            list,
        }
    }
}

impl ContainerLookup for HeadingFollowedByList {
    fn name(&self) -> &'static str {
        "heading-followed-by-list"
    }

    fn locate<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        let heading = html
            .select(&self.headings)
            .find(|h| h.text().collect::<String>().to_lowercase().contains(&self.keyword))?;
        next_in_document_order(heading, &self.list)
    }
}

/// First element after `start` (excluding its descendants) matching `selector`
fn next_in_document_order<'a>(start: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    let mut node = *start;
    loop {
        for sibling in node.next_siblings() {
            let Some(element) = ElementRef::wrap(sibling) else {
                continue;
            };
            if selector.matches(&element) {
                return Some(element);
            }
            if let Some(nested) = element.select(selector).next() {
                return Some(nested);
            }
        }
        node = node.parent()?;
    }
}

/// One labelled entry of the characteristics container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicEntry {
    /// Trimmed label text
    pub label: String,
    /// Raw value text, `None` when the entry has no value element
    pub value: Option<String>,
}

/// Entries of a located characteristics container, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicsSection {
    /// Strategy that found the container
    pub strategy: &'static str,
    pub entries: Vec<CharacteristicEntry>,
}

impl CharacteristicsSection {
    /// Raw value of the first entry whose label satisfies the predicate and has a value
    pub fn find_value(&self, predicate: impl Fn(&str) -> bool) -> Option<&str> {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.label))
            .find_map(|entry| entry.value.as_deref())
    }
}

/// Ordered set of container lookup strategies
pub struct CharacteristicsLocator {
    strategies: Vec<Box<dyn ContainerLookup>>,
    entry: Selector,
    label: Selector,
    value: Selector,
}

impl CharacteristicsLocator {
    /// Build the default strategy order: classed container first, heading second
    pub fn with_config(selectors: &ExtractionSelectors) -> ParsingResult<Self> {
        let strategies: Vec<Box<dyn ContainerLookup>> = vec![
            Box::new(ClassedContainer::new(compile_selectors(
                "characteristics_container",
                &selectors.characteristics_container,
            )?)),
            Box::new(HeadingFollowedByList::new(
                compile_selector(&selectors.characteristics_heading)?,
                &selectors.characteristics_heading_keyword,
                compile_selector(&selectors.characteristics_list)?,
            )),
        ];
        Self::with_strategies(strategies, selectors)
    }

    /// Build with a custom strategy order
    pub fn with_strategies(
        strategies: Vec<Box<dyn ContainerLookup>>,
        selectors: &ExtractionSelectors,
    ) -> ParsingResult<Self> {
        Ok(Self {
            strategies,
            entry: compile_selector(&selectors.entry)?,
            label: compile_selector(&selectors.entry_label)?,
            value: compile_selector(&selectors.entry_value)?,
        })
    }

    /// Locate the container and read its entries
    pub fn locate(&self, html: &Html) -> Option<CharacteristicsSection> {
        let (strategy, container) = self
            .strategies
            .iter()
            .find_map(|s| s.locate(html).map(|container| (s.name(), container)))?;

        let entries: Vec<CharacteristicEntry> = container
            .select(&self.entry)
            .filter_map(|item| {
                let label = item.select(&self.label).next()?;
                Some(CharacteristicEntry {
                    label: label.text().collect::<String>().trim().to_string(),
                    value: item.select(&self.value).next().map(|v| v.text().collect()),
                })
            })
            .collect();

        debug!("Characteristics container found via {} with {} entries", strategy, entries.len());
        Some(CharacteristicsSection { strategy, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> CharacteristicsLocator {
        CharacteristicsLocator::with_config(&ExtractionSelectors::default()).unwrap()
    }

    #[test]
    fn test_classed_container_is_preferred() {
        let html = Html::parse_document(r#"
            <h3>Caractéristiques</h3>
            <ul><li><span class="text-muted">Type</span><span class="fw-bold">Appartement</span></li></ul>
            <div class="product-features">
                <ul class="list-inline">
                    <li><span class="text-muted">Type</span><span class="fw-bold">Maison</span></li>
                </ul>
            </div>
        "#);

        let section = locator().locate(&html).unwrap();
        assert_eq!(section.strategy, "classed-container");
        assert_eq!(section.find_value(|l| l.contains("Type")), Some("Maison"));
    }

    #[test]
    fn test_heading_fallback_finds_next_list() {
        let html = Html::parse_document(r#"
            <ul><li><span class="text-muted">Menu</span><span class="fw-bold">x</span></li></ul>
            <section>
                <h4>Les caractéristiques du bien</h4>
                <p>Intro</p>
            </section>
            <div>
                <ul>
                    <li><span class="text-muted">Surface</span><span class="fw-bold">80 m²</span></li>
                </ul>
            </div>
        "#);

        let section = locator().locate(&html).unwrap();
        assert_eq!(section.strategy, "heading-followed-by-list");
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].label, "Surface");
    }

    #[test]
    fn test_missing_container() {
        let html = Html::parse_document("<div><p>Rien ici</p></div>");
        assert!(locator().locate(&html).is_none());
    }

    #[test]
    fn test_entries_keep_document_order_and_skip_unlabelled() {
        let html = Html::parse_document(r#"
            <div class="product-features"><ul class="list-inline">
                <li><span class="fw-bold">orphan</span></li>
                <li><span class="text-muted">Nombre de pièces</span></li>
                <li><span class="text-muted">Nombre de pièces</span><span class="fw-bold">4</span></li>
                <li><span class="text-muted">Pièces (bis)</span><span class="fw-bold">9</span></li>
            </ul></div>
        "#);

        let section = locator().locate(&html).unwrap();
        assert_eq!(section.entries.len(), 3);
        assert_eq!(section.entries[0].value, None);
        assert_eq!(section.find_value(|l| l.to_lowercase().contains("pièces")), Some("4"));
    }

    struct NeverFound;

    impl ContainerLookup for NeverFound {
        fn name(&self) -> &'static str {
            "never"
        }

        fn locate<'a>(&self, _html: &'a Html) -> Option<ElementRef<'a>> {
            None
        }
    }

    #[test]
    fn test_custom_strategy_order() {
        let selectors = ExtractionSelectors::default();
        let locator = CharacteristicsLocator::with_strategies(vec![Box::new(NeverFound)], &selectors).unwrap();
        let html = Html::parse_document(r#"<div class="product-features"><ul class="list-inline"></ul></div>"#);
        assert!(locator.locate(&html).is_none());
    }
}
