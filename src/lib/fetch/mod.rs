//! Module implementing the Template Fetcher,
//! which retrieves meme templates from the upstream API.
//!
//! There is no caching and no retrying: every call results in exactly
//! one request to upstream, and its outcome is reported as-is.

mod error;
mod upstream;

pub use self::error::FetchError;
pub use self::upstream::{HttpUpstream, Upstream, DEFAULT_TIMEOUT as DEFAULT_UPSTREAM_TIMEOUT};


use rand::{thread_rng, Rng};
use serde::Deserialize;
use serde_json::{self, Value as Json};

use crate::model::Template;


/// Complete template listing, as returned by upstream.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    /// Verbatim upstream payload.
    pub raw: Vec<u8>,
    /// Templates that could be parsed from the payload.
    pub templates: Vec<Template>,
}


/// Fetches meme templates from an `Upstream`.
#[derive(Debug)]
pub struct TemplateFetcher<U: Upstream = HttpUpstream> {
    upstream: U,
}

impl TemplateFetcher<HttpUpstream> {
    /// Create a fetcher for the default upstream API.
    #[inline]
    pub fn new() -> Result<Self, FetchError> {
        HttpUpstream::new().map(Self::with_upstream)
    }
}

impl<U: Upstream> TemplateFetcher<U> {
    #[inline]
    pub fn with_upstream(upstream: U) -> Self {
        TemplateFetcher{upstream}
    }

    #[inline]
    pub fn upstream(&self) -> &U {
        &self.upstream
    }
}

impl<U: Upstream> TemplateFetcher<U> {
    /// Fetch the full template listing.
    ///
    /// The payload is only required to be JSON with a truthy `success` flag.
    /// Template entries that cannot be parsed are skipped.
    pub fn fetch_listing(&self) -> Result<Listing, FetchError> {
        let (raw, json) = self.fetch_json()?;
        let templates: Vec<Template> = template_list(&json)
            .and_then(Json::as_array)
            .map(|memes| memes.iter()
                .filter_map(|m| Template::deserialize(m)
                    .map_err(|e| debug!("Skipping unparseable template entry: {}", e))
                    .ok())
                .collect())
            .unwrap_or_default();

        debug!("Upstream listed {} template(s)", templates.len());
        Ok(Listing{raw, templates})
    }

    /// List all available templates.
    ///
    /// Unlike `fetch_listing`, this requires a complete and non-empty list.
    pub fn list_templates(&self) -> Result<Vec<Template>, FetchError> {
        let (_, json) = self.fetch_json()?;
        let memes = template_list(&json)
            .ok_or_else(|| FetchError::malformed("no template list"))?;
        let templates = Vec::<Template>::deserialize(memes).map_err(|e| {
            warn!("Cannot parse template list: {}", e);
            FetchError::malformed(e)
        })?;
        if templates.is_empty() {
            warn!("Upstream returned an empty template list");
            return Err(FetchError::malformed("no templates"));
        }
        Ok(templates)
    }

    /// Pick a template at random.
    #[inline]
    pub fn pick_random_template(&self) -> Result<Template, FetchError> {
        self.pick_random_template_with(&mut thread_rng())
    }

    /// Pick a template uniformly at random, using given source of randomness.
    pub fn pick_random_template_with<R: Rng>(&self, rng: &mut R) -> Result<Template, FetchError> {
        let mut templates = self.list_templates()?;
        let index = rng.gen_range(0..templates.len());
        let template = templates.swap_remove(index);
        debug!("Picked template #{} out of {}: {}", index, templates.len() + 1, template);
        Ok(template)
    }

    /// Find the template with given ID.
    ///
    /// Returns `Ok(None)` if upstream doesn't list such template.
    pub fn find_template(&self, id: &str) -> Result<Option<Template>, FetchError> {
        let template = self.list_templates()?.into_iter().find(|t| t.id == id);
        if template.is_none() {
            debug!("Template `{}` not found upstream", id);
        }
        Ok(template)
    }

    /// Download the source image of given template.
    pub fn load_image(&self, template: &Template) -> Result<Vec<u8>, FetchError> {
        debug!("Downloading image of template {}", template);
        self.upstream.get_image(&template.source_url)
    }
}

impl<U: Upstream> TemplateFetcher<U> {
    /// Request the listing and check its `success` flag,
    /// returning both the raw body and its parsed JSON.
    fn fetch_json(&self) -> Result<(Vec<u8>, Json), FetchError> {
        let body = self.upstream.get_memes()?;
        trace!("Parsing {} byte(s) of template listing", body.len());

        let json: Json = serde_json::from_slice(&body).map_err(|e| {
            warn!("Upstream returned invalid JSON: {}", e);
            FetchError::malformed(e)
        })?;
        if !is_truthy(json.get("success")) {
            warn!("Upstream response lacks a truthy `success` flag");
            return Err(FetchError::malformed("unsuccessful response"));
        }
        Ok((body, json))
    }
}

fn template_list(json: &Json) -> Option<&Json> {
    json.get("data").and_then(|d| d.get("memes"))
}

/// Whether a JSON value is truthy in the JavaScript sense.
fn is_truthy(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => false,
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Json::String(s)) => !s.is_empty(),
        Some(Json::Array(_)) | Some(Json::Object(_)) => true,
    }
}
