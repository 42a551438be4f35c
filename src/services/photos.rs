// src/services/photos.rs

use crate::models::{ObservationRecord, PhotoConfig, PhotoRef};
use crate::utils::url::resize_photo_url;

/// Picks the representative photo of an observation.
#[derive(Debug, Clone)]
pub struct PhotoSelector {
    source_size: String,
    target_size: String,
}

impl PhotoSelector {
    pub fn new(config: &PhotoConfig) -> Self {
        Self {
            source_size: config.source_size.clone(),
            target_size: config.target_size.clone(),
        }
    }

    /// First photo of the observation, rewritten to the large variant.
    ///
    /// `None` when the observation has no photos. If the upstream URL scheme
    /// stops carrying the source token, the URL passes through unchanged.
    pub fn select(&self, observation: &ObservationRecord) -> Option<PhotoRef> {
        let first = observation.photos.first()?;
        Some(PhotoRef {
            url_template: resize_photo_url(
                &first.url_template,
                &self.source_size,
                &self.target_size,
            ),
            size_variant: self.target_size.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(urls: &[&str]) -> ObservationRecord {
        ObservationRecord {
            id: 1,
            taxon_id: 123,
            vote_score: 0,
            photos: urls
                .iter()
                .map(|u| PhotoRef {
                    url_template: u.to_string(),
                    size_variant: "square".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_selects_first_photo_as_large() {
        let selector = PhotoSelector::new(&PhotoConfig::default());
        let photo = selector
            .select(&observation(&[
                "https://static.example.org/photos/10/square.jpg",
                "https://static.example.org/photos/11/square.jpg",
            ]))
            .unwrap();

        assert_eq!(
            photo.url_template,
            "https://static.example.org/photos/10/large.jpg"
        );
        assert_eq!(photo.size_variant, "large");
    }

    #[test]
    fn test_no_photos_yields_none() {
        let selector = PhotoSelector::new(&PhotoConfig::default());
        assert!(selector.select(&observation(&[])).is_none());
    }

    #[test]
    fn test_custom_tokens() {
        let selector = PhotoSelector::new(&PhotoConfig {
            source_size: "square".into(),
            target_size: "original".into(),
            extension: "jpg".into(),
        });
        let photo = selector
            .select(&observation(&["https://static.example.org/photos/10/square.jpeg"]))
            .unwrap();
        assert!(photo.url_template.ends_with("/10/original.jpeg"));
    }
}
