// src/extract/sources/dom.rs

//! Reviews scraped directly out of rendered review cards.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::DOM_SOURCE;
use crate::error::Result;
use crate::models::{ANONYMOUS, Review, ReviewSelectors};
use crate::utils::{element_text, parse_selector, resolve_url, select_text};

static OUT_OF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*out of").unwrap());

/// DOM scanner with pre-parsed selectors.
#[derive(Debug)]
pub struct DomScanner {
    container_tiers: Vec<Selector>,
    username: Selector,
    rating: Selector,
    comment: Selector,
    date: Selector,
    item_link: Selector,
    item_title: Selector,
    item_image: Selector,
    id_attr: String,
}

impl DomScanner {
    /// Parse every configured selector up front.
    pub fn new(selectors: &ReviewSelectors) -> Result<Self> {
        let container_tiers = selectors
            .container_tiers
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            container_tiers,
            username: parse_selector(&selectors.username_selector)?,
            rating: parse_selector(&selectors.rating_selector)?,
            comment: parse_selector(&selectors.comment_selector)?,
            date: parse_selector(&selectors.date_selector)?,
            item_link: parse_selector(&selectors.item_link_selector)?,
            item_title: parse_selector(&selectors.item_title_selector)?,
            item_image: parse_selector(&selectors.item_image_selector)?,
            id_attr: selectors.id_attr.clone(),
        })
    }

    /// Scan `document` for review cards. Relative item links resolve
    /// against `page_url`.
    pub fn scan(&self, document: &Html, page_url: &Url) -> Vec<Review> {
        let Some(containers) = self
            .container_tiers
            .iter()
            .map(|tier| document.select(tier).collect::<Vec<_>>())
            .find(|matched| !matched.is_empty())
        else {
            log::warn!("No review elements found with any container selector.");
            return Vec::new();
        };

        containers
            .iter()
            .filter_map(|container| self.extract_card(container, page_url))
            .collect()
    }

    fn extract_card(&self, card: &ElementRef<'_>, page_url: &Url) -> Option<Review> {
        let rating = card.select(&self.rating).next().and_then(card_rating);
        let comment = select_text(card, &self.comment);
        if !Review::has_content(&comment, rating) {
            return None;
        }

        let username = select_text(card, &self.username);

        let link = card.select(&self.item_link).next();
        let item_title = link
            .map(|a| select_text(&a, &self.item_title))
            .unwrap_or_default();
        let item_url = link
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(|href| resolve_url(page_url, href))
            .unwrap_or_default();

        let item_image = card
            .select(&self.item_image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_string();

        let review_id = card
            .value()
            .attr(&self.id_attr)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Some(Review {
            username: if username.is_empty() {
                ANONYMOUS.to_string()
            } else {
                username
            },
            rating,
            comment,
            date: select_text(card, &self.date),
            item_title,
            item_url,
            item_image,
            review_id,
            source: DOM_SOURCE.to_string(),
            scraped_at: Utc::now(),
        })
    }
}

/// "N out of 5" from the element text, else from its `aria-label`.
fn card_rating(element: ElementRef<'_>) -> Option<u8> {
    let text = element_text(&element);
    let label = element.value().attr("aria-label").unwrap_or_default();
    [text.as_str(), label]
        .into_iter()
        .find_map(|s| OUT_OF_RE.captures(s))
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .filter(|n| (1..=5).contains(n))
}
