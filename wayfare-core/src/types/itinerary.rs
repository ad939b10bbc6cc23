use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    destination::Destination,
    ids::{ImageId, ItineraryId},
    image::ImageFields,
    package::normalize_optional,
};
use crate::error::{CatalogError, Result};

/// One day of an itinerary, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Set when `image` was ingested for this day; the itinerary owns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
}

/// Day-by-day trip plan for a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: ItineraryId,
    pub destination: Destination,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub cover: ImageFields,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub days: Vec<ItineraryDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDraft {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub days: Vec<ItineraryDay>,
}

impl ItineraryDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::invalid("itinerary title is required"));
        }
        if let Some(price) = self.price
            && (!price.is_finite() || price < 0.0)
        {
            return Err(CatalogError::invalid(format!(
                "itinerary price must be a non-negative number, got {price}"
            )));
        }

        let mut seen = HashSet::new();
        for day in &self.days {
            if day.day == 0 {
                return Err(CatalogError::invalid("itinerary days are numbered from 1"));
            }
            if !seen.insert(day.day) {
                return Err(CatalogError::invalid(format!(
                    "itinerary day {} appears more than once",
                    day.day
                )));
            }
            if day.title.trim().is_empty() {
                return Err(CatalogError::invalid(format!(
                    "itinerary day {} needs a title",
                    day.day
                )));
            }
        }
        Ok(())
    }
}

impl Itinerary {
    pub fn from_draft(
        destination: Destination,
        draft: ItineraryDraft,
        cover: ImageFields,
        now: DateTime<Utc>,
    ) -> Self {
        let mut itinerary = Self {
            id: ItineraryId::new(),
            destination,
            title: String::new(),
            subtitle: None,
            duration: String::new(),
            price: None,
            cover,
            highlights: Vec::new(),
            days: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        itinerary.apply(draft, now);
        itinerary
    }

    /// Overwrite the descriptive fields and day plan; cover image columns are
    /// handled by the caller.
    pub fn apply(&mut self, draft: ItineraryDraft, now: DateTime<Utc>) {
        self.title = draft.title.trim().to_string();
        self.subtitle = normalize_optional(draft.subtitle);
        self.duration = draft.duration.trim().to_string();
        self.price = draft.price;
        self.highlights = draft
            .highlights
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        let mut days = draft.days;
        days.sort_by_key(|d| d.day);
        self.days = days;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::image::ImageReference;

    fn day(n: u32, title: &str) -> ItineraryDay {
        ItineraryDay {
            day: n,
            title: title.into(),
            description: String::new(),
            activities: vec![],
            image: None,
            image_id: None,
        }
    }

    #[test]
    fn validation_checks_day_numbering() {
        let mut draft = ItineraryDraft {
            title: "Classic Dubai".into(),
            days: vec![day(1, "Arrival"), day(2, "Desert safari")],
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.days.push(day(2, "Duplicate"));
        assert!(draft.validate().is_err());

        draft.days = vec![day(0, "Zero")];
        assert!(draft.validate().is_err());

        draft.days = vec![day(1, " ")];
        assert!(draft.validate().is_err());
    }

    #[test]
    fn days_are_kept_in_order() {
        let draft = ItineraryDraft {
            title: "Bali Explorer".into(),
            highlights: vec!["Ubud".into(), "  ".into()],
            days: vec![day(3, "Nusa Penida"), day(1, "Arrival"), day(2, "Ubud")],
            ..Default::default()
        };
        let itinerary = Itinerary::from_draft(
            Destination::parse("bali").unwrap(),
            draft,
            ImageFields::from_reference(ImageReference::path("/images/b.jpg")),
            Utc::now(),
        );

        let order: Vec<u32> = itinerary.days.iter().map(|d| d.day).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(itinerary.highlights, vec!["Ubud".to_string()]);
    }
}
