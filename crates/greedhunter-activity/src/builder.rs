//! Activity event builder
//!
//! Normalizes caller-supplied event metadata plus extracted request context
//! into an `ActivityEntry`. Building never fails: malformed entity IDs and
//! geo payloads collapse to safe defaults so a bad value can never abort the
//! write it describes.

use chrono::Utc;
use greedhunter_context::{classify_user_agent, extract_context, RequestMeta};
use greedhunter_types::ActivityEntryId;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entry::ActivityEntry;

/// Explicit coordinates supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Builder for one activity entry
#[derive(Debug, Clone, Default)]
pub struct ActivityEventBuilder<'a> {
    event_type: String,
    description: String,
    request: Option<&'a RequestMeta>,
    entity_type: Option<String>,
    entity_id: Option<String>,
    session_id: Option<String>,
    extra_props: Map<String, Value>,
    geo: Option<GeoPoint>,
}

impl<'a> ActivityEventBuilder<'a> {
    pub fn new(event_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Attach the inbound request for context enrichment
    pub fn request(mut self, meta: &'a RequestMeta) -> Self {
        self.request = Some(meta);
        self
    }

    /// Reference the subject resource. The ID is validated at build time and
    /// stored as None when malformed.
    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Fallback session id, used when no token can be extracted
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// One caller-supplied prop; overrides base keys on collision
    pub fn prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_props.insert(key.into(), value);
        self
    }

    /// Merge a map of caller-supplied props
    pub fn props(mut self, props: Map<String, Value>) -> Self {
        self.extra_props.extend(props);
        self
    }

    /// Explicit coordinates, preferred over geo headers
    pub fn geo(mut self, point: GeoPoint) -> Self {
        self.geo = Some(point);
        self
    }

    /// Assemble the entry. Infallible.
    pub fn build(self) -> ActivityEntry {
        let context = extract_context(self.request, self.session_id.as_deref());
        let ua = classify_user_agent(&context.user_agent);
        let geo_location = geo_location(self.geo, self.request);

        let mut props = Map::new();
        props.insert("geo_location".into(), Value::String(geo_location));
        props.insert("ip_address".into(), Value::String(context.ip_address));
        props.insert("device".into(), Value::String(ua.device));
        props.insert("browser".into(), Value::String(ua.browser));
        props.insert("platform".into(), Value::String(ua.platform));
        // Caller values win on key collision
        props.extend(self.extra_props);

        let now = Utc::now();
        ActivityEntry {
            id: ActivityEntryId::new(),
            event_type: self.event_type,
            description: self.description,
            entity_type: self.entity_type,
            entity_id: self.entity_id.as_deref().and_then(parse_entity_id),
            session_id: context.token,
            props,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Invalid identifiers are stored as None; logging never fails the caller's
/// primary operation.
fn parse_entity_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Derive the "lat,long" geo string. Explicit coordinates win, then the
/// `X-User-Latitude`/`X-User-Longitude` headers; anything malformed becomes
/// an empty string.
fn geo_location(geo: Option<GeoPoint>, request: Option<&RequestMeta>) -> String {
    if let Some(point) = geo {
        if point.latitude.is_finite() && point.longitude.is_finite() {
            return format!("{},{}", point.latitude, point.longitude);
        }
        return String::new();
    }

    if let Some(meta) = request {
        let latitude = meta.header("X-User-Latitude");
        let longitude = meta.header("X-User-Longitude");
        if latitude.is_some() || longitude.is_some() {
            return format!("{},{}", latitude.unwrap_or(""), longitude.unwrap_or(""));
        }
    }

    String::new()
}
