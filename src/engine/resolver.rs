// ABOUTME: Resolution pipeline turning placeholders into text
// ABOUTME: Fans out one task per unique placeholder and isolates every failure to its own marker

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::cache::ResolutionCache;
use super::context::ResolveContext;
use super::error::ResolveError;
use super::result::{CompileResult, PlaceholderResult, ResolutionSource};
use crate::output::substitute;
use crate::parser::{FilterCall, ParsedTemplate, Placeholder, PlaceholderKind, StaticSubstitutions};
use crate::variables::{
    Candidate, FileVariable, ProviderLookup, Validation, VariableRegistry, VariableType,
};

/// Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<VariableRegistry>,
    file: Arc<dyn VariableType>,
    substitutions: Arc<StaticSubstitutions>,
    project_root: PathBuf,
    timeout: Option<Duration>,
}

/// The parts of a variable placeholder the pipeline needs.
struct Request<'a> {
    raw: &'a str,
    type_name: &'a str,
    key: &'a str,
    filters: &'a [FilterCall],
    default: Option<&'a str>,
}

impl Resolver {
    pub fn new(registry: Arc<VariableRegistry>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            file: Arc::new(FileVariable::new()),
            substitutions: Arc::new(StaticSubstitutions::default()),
            project_root: project_root.into(),
            timeout: None,
        }
    }

    pub fn with_substitutions(mut self, substitutions: StaticSubstitutions) -> Self {
        self.substitutions = Arc::new(substitutions);
        self
    }

    /// Bound each placeholder's resolution. Unbounded when `None`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Apply static substitutions and parse, without resolving anything.
    pub fn prepare(&self, text: &str) -> ParsedTemplate {
        if self.substitutions.is_empty() {
            ParsedTemplate::parse(text)
        } else {
            ParsedTemplate::parse(&self.substitutions.apply(text))
        }
    }

    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub async fn compile(&self, text: &str) -> CompileResult {
        let context = Arc::new(ResolveContext::new(self.project_root.clone()));
        let mut compile = CompileResult::new(context.compile_id.clone(), context.start_time);
        let parsed = self.prepare(text);

        info!(
            "Compiling {} unique placeholders ({} occurrences), compile_id: {}",
            parsed.placeholders().len(),
            parsed.occurrences().len(),
            context.compile_id
        );

        let mut identities = Vec::with_capacity(parsed.placeholders().len());
        let mut handles = Vec::with_capacity(parsed.placeholders().len());
        for placeholder in parsed.placeholders() {
            identities.push((
                placeholder.raw.clone(),
                placeholder.type_name().map(str::to_string),
            ));

            let resolver = self.clone();
            let context = Arc::clone(&context);
            let placeholder = placeholder.clone();
            handles.push(tokio::spawn(async move {
                resolver.resolve_bounded(&placeholder, &context).await
            }));
        }

        let joined = join_all(handles).await;

        let mut cache = ResolutionCache::new();
        for ((raw, type_name), outcome) in identities.into_iter().zip(joined) {
            let result = match outcome {
                Ok(result) => result,
                Err(join_error) => {
                    let message = if join_error.is_panic() {
                        "variable provider panicked".to_string()
                    } else {
                        join_error.to_string()
                    };
                    error!("Resolution task for {} failed: {}", raw, message);
                    PlaceholderResult::fail(raw.clone(), ResolveError::Aborted {
                        raw: raw.clone(),
                        message,
                    })
                    .with_type(type_name.as_deref())
                }
            };
            cache.insert(raw, result.value.clone());
            compile.placeholders.push(result);
        }

        compile.output = substitute(&parsed, &cache);
        compile.mark_completed(parsed.occurrences().len());

        if compile.has_failures() {
            warn!(
                "Compile finished with {} failed placeholders",
                compile.summary.failed
            );
        } else {
            info!("Compile finished: {} placeholders resolved", compile.summary.total_placeholders);
        }

        compile
    }

    async fn resolve_bounded(
        &self,
        placeholder: &Placeholder,
        context: &ResolveContext,
    ) -> PlaceholderResult {
        let Some(limit) = self.timeout else {
            return self.resolve(placeholder, context).await;
        };

        match tokio::time::timeout(limit, self.resolve(placeholder, context)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Resolution of {} timed out after {:?}", placeholder.raw, limit);
                PlaceholderResult::fail(
                    placeholder.raw.clone(),
                    ResolveError::Timeout {
                        raw: placeholder.raw.clone(),
                        millis: limit.as_millis(),
                    },
                )
                .with_type(placeholder.type_name())
            }
        }
    }

    /// Resolve one placeholder. Never fails: errors come back as marker results.
    pub async fn resolve(
        &self,
        placeholder: &Placeholder,
        context: &ResolveContext,
    ) -> PlaceholderResult {
        let started = Instant::now();

        let mut result = match &placeholder.kind {
            PlaceholderKind::Malformed { error } => {
                warn!("Malformed placeholder {}: {}", placeholder.raw, error);
                PlaceholderResult::fail(
                    placeholder.raw.clone(),
                    ResolveError::Parse {
                        raw: placeholder.raw.clone(),
                        reason: error.clone(),
                    },
                )
            }
            PlaceholderKind::File { path } => {
                let request = Request {
                    raw: &placeholder.raw,
                    type_name: "file",
                    key: path,
                    filters: &[],
                    default: None,
                };
                self.run(&request, ProviderLookup::File, context).await
            }
            PlaceholderKind::Variable {
                type_name,
                key,
                filters,
                default,
            } => {
                let request = Request {
                    raw: &placeholder.raw,
                    type_name,
                    key,
                    filters,
                    default: default.as_deref(),
                };
                let lookup = self.registry.lookup(type_name);
                self.run(&request, lookup, context).await
            }
        };

        result.duration = started.elapsed();
        debug!(
            "Resolved {} via {} in {:?}",
            placeholder.raw, result.source, result.duration
        );
        result.with_type(placeholder.type_name())
    }

    async fn run(
        &self,
        request: &Request<'_>,
        lookup: ProviderLookup,
        context: &ResolveContext,
    ) -> PlaceholderResult {
        let provider: Arc<dyn VariableType> = match lookup {
            ProviderLookup::File => self.file.clone(),
            ProviderLookup::Registered { provider, .. } => provider,
            ProviderLookup::EnvironmentFallback => {
                if !request.filters.is_empty() {
                    debug!(
                        "Ignoring filters on {}: type '{}' is not registered",
                        request.raw, request.type_name
                    );
                }
                return self.fallback(request, false, None);
            }
        };

        let mut discovery_error = None;
        let mut candidates = match provider.discover(request.key, context).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Discovery failed for {}: {}", request.raw, e);
                discovery_error = Some(e.to_string());
                Vec::new()
            }
        };
        let discovered = candidates.len();

        for call in request.filters {
            let Some(filter) = provider.filter(&call.name) else {
                warn!("Unknown filter '{}' in {}", call.name, request.raw);
                return annotate(
                    PlaceholderResult::fail(
                        request.raw,
                        ResolveError::UnknownFilter {
                            raw: request.raw.to_string(),
                            type_name: request.type_name.to_string(),
                            filter: call.name.clone(),
                        },
                    ),
                    discovered,
                    discovery_error,
                );
            };

            candidates = match filter(candidates, call.arg.as_deref()) {
                Ok(narrowed) => narrowed,
                Err(e) => {
                    warn!("Filter '{}' failed in {}: {}", call.name, request.raw, e);
                    return annotate(
                        PlaceholderResult::fail(
                            request.raw,
                            ResolveError::Filter {
                                raw: request.raw.to_string(),
                                filter: call.name.clone(),
                                message: e.to_string(),
                            },
                        ),
                        discovered,
                        discovery_error,
                    );
                }
            };
        }

        let Some(candidate) = candidates.into_iter().next() else {
            let result = self.fallback(request, true, discovery_error.as_deref());
            return annotate(result, discovered, discovery_error);
        };

        let result = self
            .select(request, provider.as_ref(), &candidate, context)
            .await;
        annotate(result, discovered, discovery_error)
    }

    /// Validate and render the chosen candidate.
    async fn select(
        &self,
        request: &Request<'_>,
        provider: &dyn VariableType,
        candidate: &Candidate,
        context: &ResolveContext,
    ) -> PlaceholderResult {
        match provider.validate(candidate, request.key, context).await {
            Validation::Accepted => {}
            Validation::Message(message) => {
                warn!("Validation failed for {}: {}", request.raw, message);
                return PlaceholderResult::fail(
                    request.raw,
                    ResolveError::Validation {
                        raw: request.raw.to_string(),
                        message,
                    },
                );
            }
            Validation::Rejected => {
                warn!("Validation rejected {}", request.raw);
                return PlaceholderResult::fail(
                    request.raw,
                    ResolveError::ValidationRejected {
                        raw: request.raw.to_string(),
                    },
                );
            }
        }

        let rendered = match provider.render(candidate) {
            Ok(rendered) => rendered,
            Err(e) => return render_failure(request.raw, e.to_string()),
        };

        if !provider.embeds_file_contents() {
            return PlaceholderResult::succeed(request.raw, ResolutionSource::Discovered, rendered);
        }

        match FileVariable::load(std::path::Path::new(&rendered)).await {
            Ok(embedded) => {
                let mut result = PlaceholderResult::succeed(
                    request.raw,
                    ResolutionSource::Discovered,
                    embedded.content,
                );
                for warning in embedded.warnings {
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
                result
            }
            Err(e) => render_failure(request.raw, e.to_string()),
        }
    }

    /// Nothing was selected: default literal, then environment, then a marker.
    fn fallback(
        &self,
        request: &Request<'_>,
        registered: bool,
        discovery_error: Option<&str>,
    ) -> PlaceholderResult {
        if let Some(default) = request.default {
            debug!("Using default for {}", request.raw);
            return PlaceholderResult::succeed(
                request.raw,
                ResolutionSource::Default,
                default.to_string(),
            );
        }

        if let Ok(value) = std::env::var(request.key) {
            debug!("Using environment variable '{}' for {}", request.key, request.raw);
            return PlaceholderResult::succeed(request.raw, ResolutionSource::Environment, value);
        }

        let error = if registered {
            let discovery = match discovery_error {
                Some(message) => format!("discovery failed ({})", message),
                None => "no items discovered".to_string(),
            };
            ResolveError::NotFound {
                type_name: request.type_name.to_string(),
                key: request.key.to_string(),
                attempts: format!("{}, no default, not an environment variable", discovery),
            }
        } else {
            ResolveError::UnregisteredType {
                type_name: request.type_name.to_string(),
                key: request.key.to_string(),
            }
        };
        warn!("{}", error);
        PlaceholderResult::fail(request.raw, error)
    }
}

fn annotate(
    mut result: PlaceholderResult,
    candidates: usize,
    discovery_error: Option<String>,
) -> PlaceholderResult {
    result.candidates = candidates;
    result.discovery_error = discovery_error;
    result
}

fn render_failure(raw: &str, message: String) -> PlaceholderResult {
    warn!("Render failed for {}: {}", raw, message);
    PlaceholderResult::fail(
        raw,
        ResolveError::Render {
            raw: raw.to_string(),
            message,
        },
    )
}
