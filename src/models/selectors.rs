// src/models/selectors.rs

//! CSS selectors for scraping reviews out of rendered markup.

use serde::{Deserialize, Serialize};

/// CSS selectors for the DOM review scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSelectors {
    /// Review container selectors, most specific tier first.
    /// The first tier that matches anything wins.
    #[serde(default = "defaults::container_tiers")]
    pub container_tiers: Vec<String>,

    /// Selector for the reviewer name within a container
    #[serde(default = "defaults::username")]
    pub username_selector: String,

    /// Selector for the element carrying "N out of 5" text
    #[serde(default = "defaults::rating")]
    pub rating_selector: String,

    /// Selector for the review text
    #[serde(default = "defaults::comment")]
    pub comment_selector: String,

    /// Selector for the review date
    #[serde(default = "defaults::date")]
    pub date_selector: String,

    /// Selector for the link to the reviewed item
    #[serde(default = "defaults::item_link")]
    pub item_link_selector: String,

    /// Selector for the item title, scoped to the item link
    #[serde(default = "defaults::item_title")]
    pub item_title_selector: String,

    /// Selector for the item image
    #[serde(default = "defaults::item_image")]
    pub item_image_selector: String,

    /// Attribute carrying a stable review identifier on the container
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,
}

impl Default for ReviewSelectors {
    fn default() -> Self {
        Self {
            container_tiers: defaults::container_tiers(),
            username_selector: defaults::username(),
            rating_selector: defaults::rating(),
            comment_selector: defaults::comment(),
            date_selector: defaults::date(),
            item_link_selector: defaults::item_link(),
            item_title_selector: defaults::item_title(),
            item_image_selector: defaults::item_image(),
            id_attr: defaults::id_attr(),
        }
    }
}

impl ReviewSelectors {
    /// All selector strings, for validation.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.container_tiers.iter().map(String::as_str).chain([
            self.username_selector.as_str(),
            self.rating_selector.as_str(),
            self.comment_selector.as_str(),
            self.date_selector.as_str(),
            self.item_link_selector.as_str(),
            self.item_title_selector.as_str(),
            self.item_image_selector.as_str(),
        ])
    }
}

mod defaults {
    pub fn container_tiers() -> Vec<String> {
        vec![
            "[data-review-id], [data-review-region], article[data-review], li[data-review]".into(),
            "div[data-reviews-container] div.wt-grid__item-xs-12".into(),
            ".wt-grid__item-xs-12 .wt-mb-xs-4".into(),
        ]
    }
    pub fn username() -> String {
        r#"p.wt-text-title-01, span.wt-text-title-01, a[href*="/people/"]"#.into()
    }
    pub fn rating() -> String {
        r#"span.wt-screen-reader-only, span[aria-label*="out of 5"], span[aria-label*="star"]"#
            .into()
    }
    pub fn comment() -> String {
        "p.wt-text-body-01.wt-break-word, p.wt-text-body-01, p[data-review-text], .review-text"
            .into()
    }
    pub fn date() -> String {
        "p.wt-text-caption.wt-text-gray, time, .wt-text-caption".into()
    }
    pub fn item_link() -> String {
        r#"a.wt-text-link-no-underline, a[href*="/listing/"]"#.into()
    }
    pub fn item_title() -> String {
        "p.wt-text-caption".into()
    }
    pub fn item_image() -> String {
        "img".into()
    }
    pub fn id_attr() -> String {
        "data-review-id".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let selectors: ReviewSelectors =
            toml::from_str(r#"comment_selector = "div.body""#).unwrap();
        assert_eq!(selectors.comment_selector, "div.body");
        assert_eq!(selectors.container_tiers.len(), 3);
        assert_eq!(selectors.all().count(), 10);
    }
}
