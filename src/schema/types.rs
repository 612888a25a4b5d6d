use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// HTTP method a handler is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// Which part of a call a validation model applies to.
///
/// Also tags validation failures and selects skip-list entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationType {
    Body,
    Query,
    Params,
    Output,
    Iteration,
}

impl ValidationType {
    pub const ALL: [ValidationType; 5] = [
        ValidationType::Body,
        ValidationType::Query,
        ValidationType::Params,
        ValidationType::Output,
        ValidationType::Iteration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationType::Body => "body",
            ValidationType::Query => "query",
            ValidationType::Params => "params",
            ValidationType::Output => "output",
            ValidationType::Iteration => "iteration",
        }
    }

    /// `true` for the types checked before the handler runs.
    pub fn is_request_side(&self) -> bool {
        matches!(
            self,
            ValidationType::Body | ValidationType::Query | ValidationType::Params
        )
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw skip configuration: `false`, `true` or an explicit list of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkipSetting {
    Flag(bool),
    List(Vec<ValidationType>),
}

impl Default for SkipSetting {
    fn default() -> Self {
        SkipSetting::Flag(false)
    }
}

impl From<bool> for SkipSetting {
    fn from(flag: bool) -> Self {
        SkipSetting::Flag(flag)
    }
}

impl From<Vec<ValidationType>> for SkipSetting {
    fn from(list: Vec<ValidationType>) -> Self {
        SkipSetting::List(list)
    }
}

/// Resolved set of validation types to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList(BTreeSet<ValidationType>);

impl SkipList {
    pub fn resolve(setting: &SkipSetting) -> Self {
        match setting {
            SkipSetting::Flag(false) => SkipList(BTreeSet::new()),
            SkipSetting::Flag(true) => SkipList(ValidationType::ALL.into_iter().collect()),
            SkipSetting::List(list) => SkipList(list.iter().copied().collect()),
        }
    }

    pub fn contains(&self, ty: ValidationType) -> bool {
        self.0.contains(&ty)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidationType> + '_ {
        self.0.iter().copied()
    }
}

impl From<&SkipSetting> for SkipList {
    fn from(setting: &SkipSetting) -> Self {
        SkipList::resolve(setting)
    }
}

/// Validation model descriptors attached to a handler.
///
/// Each model is an opaque, serializable description (typically JSON Schema)
/// consumed by a [`crate::validation::Validate`] implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationModels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<Value>,
}

impl ValidationModels {
    pub fn get(&self, ty: ValidationType) -> Option<&Value> {
        match ty {
            ValidationType::Body => self.body.as_ref(),
            ValidationType::Query => self.query.as_ref(),
            ValidationType::Params => self.params.as_ref(),
            ValidationType::Output => self.output.as_ref(),
            ValidationType::Iteration => self.iteration.as_ref(),
        }
    }

    fn slot_mut(&mut self, ty: ValidationType) -> &mut Option<Value> {
        match ty {
            ValidationType::Body => &mut self.body,
            ValidationType::Query => &mut self.query,
            ValidationType::Params => &mut self.params,
            ValidationType::Output => &mut self.output,
            ValidationType::Iteration => &mut self.iteration,
        }
    }

    pub fn set(&mut self, ty: ValidationType, model: Value) {
        *self.slot_mut(ty) = Some(model);
    }

    pub fn is_empty(&self) -> bool {
        ValidationType::ALL.iter().all(|ty| self.get(*ty).is_none())
    }

    /// Copy of these models without the types named in `skip`.
    pub fn without(&self, skip: &SkipList) -> ValidationModels {
        let mut out = self.clone();
        for ty in skip.iter() {
            *out.slot_mut(ty) = None;
        }
        out
    }

    /// Both `output` and `iteration` are declared.
    pub fn has_conflicting_output(&self) -> bool {
        self.output.is_some() && self.iteration.is_some()
    }
}

/// Schema of one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSchema {
    pub http_method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationModels>,
}

impl HandlerSchema {
    pub fn new(http_method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method,
            path: path.into(),
            openapi: None,
            validation: None,
        }
    }

    pub fn with_validation(mut self, models: ValidationModels) -> Self {
        self.validation = (!models.is_empty()).then_some(models);
        self
    }

    pub fn model(&self, ty: ValidationType) -> Option<&Value> {
        self.validation.as_ref().and_then(|v| v.get(ty))
    }

    /// Streams its output (declares an `iteration` model).
    pub fn is_streaming(&self) -> bool {
        self.model(ValidationType::Iteration).is_some()
    }
}

/// Handlers sharing a path prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSchema {
    #[serde(default)]
    pub controller_name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerSchema>,
}

fn default_emit_schema() -> bool {
    true
}

/// Schema of one segment: its controllers plus the emission flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSchema {
    #[serde(default)]
    pub segment_name: String,
    #[serde(default)]
    pub controllers: BTreeMap<String, ControllerSchema>,
    #[serde(default = "default_emit_schema")]
    pub emit_schema: bool,
}

impl SegmentSchema {
    pub fn new(segment_name: impl Into<String>) -> Self {
        Self {
            segment_name: segment_name.into(),
            controllers: BTreeMap::new(),
            emit_schema: true,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.controllers.values().map(|c| c.handlers.len()).sum()
    }
}

/// Complete `segment name → segment schema` tree.
///
/// Serializes as a plain JSON object keyed by segment name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FullSchema {
    segments: BTreeMap<String, SegmentSchema>,
}

impl FullSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segment_name: &str) -> Option<&SegmentSchema> {
        self.segments.get(segment_name)
    }

    pub fn get_mut(&mut self, segment_name: &str) -> Option<&mut SegmentSchema> {
        self.segments.get_mut(segment_name)
    }

    pub fn insert(&mut self, schema: SegmentSchema) -> Option<SegmentSchema> {
        self.segments.insert(schema.segment_name.clone(), schema)
    }

    /// Entry for `segment_name`, created empty when missing.
    pub fn entry(&mut self, segment_name: &str) -> &mut SegmentSchema {
        self.segments
            .entry(segment_name.to_string())
            .or_insert_with(|| SegmentSchema::new(segment_name))
    }

    pub fn contains(&self, segment_name: &str) -> bool {
        self.segments.contains_key(segment_name)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SegmentSchema)> {
        self.segments.iter()
    }

    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }

    /// Every handler as `(segment, controller, handler key, schema)`.
    pub fn handlers(&self) -> impl Iterator<Item = (&str, &str, &str, &HandlerSchema)> {
        self.segments.iter().flat_map(|(segment, s)| {
            s.controllers.iter().flat_map(move |(controller, c)| {
                c.handlers.iter().map(move |(key, h)| {
                    (segment.as_str(), controller.as_str(), key.as_str(), h)
                })
            })
        })
    }

    /// Only the segments whose `emit_schema` flag is set.
    pub fn emitted(&self) -> FullSchema {
        FullSchema {
            segments: self
                .segments
                .iter()
                .filter(|(_, s)| s.emit_schema)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Fill in `segment_name`/`controller_name` from the map keys.
    ///
    /// Schema files may omit the names since they repeat the keys.
    pub fn normalize(&mut self) {
        for (segment_name, segment) in self.segments.iter_mut() {
            if segment.segment_name.is_empty() {
                segment.segment_name = segment_name.clone();
            }
            for (controller_name, controller) in segment.controllers.iter_mut() {
                if controller.controller_name.is_empty() {
                    controller.controller_name = controller_name.clone();
                }
            }
        }
    }
}

impl FromIterator<SegmentSchema> for FullSchema {
    fn from_iter<I: IntoIterator<Item = SegmentSchema>>(iter: I) -> Self {
        let mut schema = FullSchema::new();
        for segment in iter {
            schema.insert(segment);
        }
        schema
    }
}

/// A discovered segment: name, ordered controller names and free-form metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub segment_name: String,
    #[serde(default)]
    pub controllers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Segment {
    pub fn new(segment_name: impl Into<String>) -> Self {
        Self {
            segment_name: segment_name.into(),
            controllers: Vec::new(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Segments for every entry of `schema`, in key order.
    pub fn from_schema(schema: &FullSchema) -> Vec<Segment> {
        schema
            .iter()
            .map(|(name, s)| Segment {
                segment_name: name.clone(),
                controllers: s.controllers.keys().cloned().collect(),
                meta: None,
            })
            .collect()
    }
}
