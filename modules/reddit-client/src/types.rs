use serde::Deserialize;

// --- Listings ---

/// Top-level envelope for `/r/{subreddit}/comments.json`.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: CommentData,
}

/// Raw comment fields as Reddit returns them. Conversion into the
/// processor-facing comment type happens at the trait boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub link_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
}

// --- OAuth ---

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// --- Reply ---

/// Envelope for `POST /api/comment` with `api_type=json`.
#[derive(Debug, Deserialize)]
pub struct ReplyEnvelope {
    pub json: ReplyBody,
}

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    /// `(code, message, field)` triples; `RATELIMIT` is the one code the
    /// bot treats as transient.
    #[serde(default)]
    pub errors: Vec<(String, String, Option<String>)>,
}
