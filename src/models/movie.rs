use serde::{Deserialize, Serialize};

/// Value OMDb uses for absent fields
pub const PLACEHOLDER: &str = "N/A";

/// A search hit from the movie-metadata provider
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMatch {
    pub imdb_id: String,
    pub title: String,
}

/// Full metadata for one movie; placeholder values are already mapped to `None`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieDetails {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub rating: Option<String>,
}

/// One entry of the aggregated search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub rating: String,
}

impl MovieSummary {
    /// Keeps only movies with a poster, a title and a year
    pub fn from_details(details: MovieDetails) -> Option<Self> {
        let poster = details.poster.filter(|p| !p.trim().is_empty())?;
        if details.title.trim().is_empty() || details.year.trim().is_empty() {
            return None;
        }

        Some(Self {
            id: details.imdb_id,
            title: details.title,
            year: details.year,
            poster,
            rating: details.rating.unwrap_or_else(|| PLACEHOLDER.to_string()),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieSearchResponse {
    pub results: Vec<MovieSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieSearchQuery {
    pub q: Option<String>,
}

// ============================================================================
// OMDb API Types
// ============================================================================

/// Response of `?s=<query>`
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
}

impl From<OmdbSearchItem> for MovieMatch {
    fn from(item: OmdbSearchItem) -> Self {
        Self {
            imdb_id: item.imdb_id,
            title: item.title,
        }
    }
}

/// Response of `?i=<imdb id>`
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbDetails {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Response", default)]
    pub response: String,
}

impl OmdbDetails {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

fn real_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v.trim() != PLACEHOLDER)
}

impl From<OmdbDetails> for MovieDetails {
    fn from(details: OmdbDetails) -> Self {
        Self {
            imdb_id: details.imdb_id,
            title: real_value(Some(details.title)).unwrap_or_default(),
            year: real_value(Some(details.year)).unwrap_or_default(),
            poster: real_value(details.poster),
            rating: real_value(details.imdb_rating),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omdb_search_deserialization() {
        let json = r#"{
            "Search": [
                {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "https://m.media-amazon.com/images/inception.jpg"}
            ],
            "totalResults": "1",
            "Response": "True"
        }"#;

        let response: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_success());
        assert_eq!(response.search.len(), 1);
        assert_eq!(response.search[0].imdb_id, "tt1375666");
    }

    #[test]
    fn test_omdb_search_not_found() {
        let json = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        let response: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_success());
        assert!(response.search.is_empty());
        assert_eq!(response.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn test_omdb_details_maps_placeholders() {
        let json = r#"{
            "Title": "Inception",
            "Year": "2010",
            "imdbID": "tt1375666",
            "Poster": "N/A",
            "imdbRating": "N/A",
            "Response": "True"
        }"#;

        let details: OmdbDetails = serde_json::from_str(json).unwrap();
        let details: MovieDetails = details.into();
        assert_eq!(details.title, "Inception");
        assert_eq!(details.poster, None);
        assert_eq!(details.rating, None);
    }

    #[test]
    fn test_summary_requires_poster_title_and_year() {
        let complete = MovieDetails {
            imdb_id: "tt1375666".into(),
            title: "Inception".into(),
            year: "2010".into(),
            poster: Some("https://example.com/p.jpg".into()),
            rating: None,
        };

        let summary = MovieSummary::from_details(complete.clone()).unwrap();
        assert_eq!(summary.rating, PLACEHOLDER);

        let no_poster = MovieDetails {
            poster: None,
            ..complete.clone()
        };
        assert!(MovieSummary::from_details(no_poster).is_none());

        let no_year = MovieDetails {
            year: String::new(),
            ..complete.clone()
        };
        assert!(MovieSummary::from_details(no_year).is_none());

        let no_title = MovieDetails {
            title: " ".into(),
            ..complete
        };
        assert!(MovieSummary::from_details(no_title).is_none());
    }
}
